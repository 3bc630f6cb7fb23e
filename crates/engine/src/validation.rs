//! Field-level validation of enquiry drafts.
//!
//! Validation is pure: it reads the draft and reports what is wrong, keyed by
//! the wire field name so a form can show the message next to the input.

use std::{collections::BTreeMap, fmt};

use crate::{Enquiry, EnquiryStatus, util};

/// Field name → human-readable message. Empty means accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding one error.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise a validation error.
    pub fn into_result(self) -> crate::ResultEngine<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::EngineError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Check a draft before it is created or updated.
///
/// Rules:
/// - `name` and `phone` are required, `phone` is exactly 10 digits;
/// - course, experience, working-in, learning mode, source, status and
///   attender must be selected;
/// - `follow_up_date` and `note` are required when the status is
///   `Follow up`.
#[must_use]
pub fn validate(draft: &Enquiry) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if util::is_blank(&draft.name) {
        errors.insert("name", "Name is required");
    }
    if util::is_blank(&draft.phone) {
        errors.insert("phone", "Phone is required");
    } else if !is_phone(&draft.phone) {
        errors.insert("phone", "Phone must be 10 digits");
    }
    if util::is_blank(&draft.course) {
        errors.insert("course", "Course is required");
    }
    if draft.experience.is_none() {
        errors.insert("are_you", "This field is required");
    }
    if draft.working_in.is_none() {
        errors.insert("currently_working_in", "This field is required");
    }
    if draft.learning_mode.is_none() {
        errors.insert("learning_mode", "Learning mode is required");
    }
    if draft.source.is_none() {
        errors.insert("source", "Source is required");
    }
    if draft.status.is_none() {
        errors.insert("status", "Status is required");
    }
    if util::is_blank(&draft.attender) {
        errors.insert("attender", "Attender is required");
    }
    if draft.status == Some(EnquiryStatus::FollowUp) {
        if draft.follow_up_date.is_none() {
            errors.insert("follow_up_date", "Follow-up time required");
        }
        if util::is_blank(&draft.note) {
            errors.insert("note", "Note is required");
        }
    }

    errors
}

fn is_phone(value: &str) -> bool {
    value.len() == 10 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Experience, LeadSource, LearningMode, WorkSector};

    fn complete() -> Enquiry {
        Enquiry {
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            course: "Full Stack".to_string(),
            experience: Some(Experience::Fresher),
            working_in: Some(WorkSector::It),
            learning_mode: Some(LearningMode::Online),
            source: Some(LeadSource::Meta),
            attender: "Ravi".to_string(),
            ..Enquiry::draft()
        }
    }

    #[test]
    fn complete_draft_is_accepted() {
        assert!(validate(&complete()).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let mut draft = Enquiry::draft();
        draft.status = None;
        let errors = validate(&draft);
        for field in [
            "name",
            "phone",
            "course",
            "are_you",
            "currently_working_in",
            "learning_mode",
            "source",
            "status",
            "attender",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert!(errors.get("note").is_none());
    }

    #[test]
    fn phone_must_be_ten_digits() {
        for phone in ["98765", "98765432101", "98765abcde", "+919876543"] {
            let draft = Enquiry {
                phone: phone.to_string(),
                ..complete()
            };
            assert_eq!(validate(&draft).get("phone"), Some("Phone must be 10 digits"));
        }
    }

    #[test]
    fn follow_up_needs_date_and_note() {
        let draft = Enquiry {
            status: Some(EnquiryStatus::FollowUp),
            ..complete()
        };
        let errors = validate(&draft);
        assert_eq!(errors.len(), 2);
        assert!(errors.get("follow_up_date").is_some());
        assert!(errors.get("note").is_some());

        let draft = Enquiry {
            follow_up_date: Some(Utc::now()),
            note: "call back".to_string(),
            ..draft
        };
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn errors_display_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert("phone", "Phone is required");
        errors.insert("name", "Name is required");
        assert_eq!(
            errors.to_string(),
            "name: Name is required; phone: Phone is required"
        );
    }
}
