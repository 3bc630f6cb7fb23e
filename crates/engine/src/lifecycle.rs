//! Status transitions.
//!
//! Staff set the status by hand; there is no automatic progression and no
//! forbidden transition. `Loss` and `Success` can be re-opened. The only
//! guarded target is `Follow up`, which needs a note and a follow-up date in
//! the future.

use chrono::{DateTime, Utc};

use crate::{EngineError, Enquiry, EnquiryStatus, HistoryEntry, ResultEngine, util};

/// A requested status change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub status: EnquiryStatus,
    /// Staff member making the change; becomes the enquiry's attender.
    pub actor: String,
    pub note: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl Transition {
    pub fn new(status: EnquiryStatus, actor: impl Into<String>) -> Self {
        Self {
            status,
            actor: actor.into(),
            note: None,
            follow_up_date: None,
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn follow_up_at(mut self, date: DateTime<Utc>) -> Self {
        self.follow_up_date = Some(date);
        self
    }
}

impl Enquiry {
    /// Change the status and append one history entry.
    ///
    /// `now` is the submission time: a `Follow up` date must be strictly
    /// after it. A rejected transition leaves the enquiry untouched.
    pub fn transition(&mut self, transition: Transition, now: DateTime<Utc>) -> ResultEngine<()> {
        let note = transition.note.unwrap_or_default();

        let follow_up_date = if transition.status == EnquiryStatus::FollowUp {
            if util::is_blank(&note) {
                return Err(EngineError::InvalidTransition(
                    "follow up requires a note".to_string(),
                ));
            }
            let date = transition.follow_up_date.ok_or_else(|| {
                EngineError::InvalidTransition("follow up requires a date".to_string())
            })?;
            if date <= now {
                return Err(EngineError::InvalidTransition(format!(
                    "follow up date {} is not in the future",
                    date.to_rfc3339()
                )));
            }
            Some(date)
        } else {
            None
        };

        let actor = transition.actor;
        self.status = Some(transition.status);
        self.attender = actor.clone();
        self.note = note.clone();
        self.follow_up_date = follow_up_date;
        self.history.push(HistoryEntry {
            updated_at: now,
            attender: actor,
            status: Some(transition.status),
            note,
        });
        Ok(())
    }
}
