//! Dashboard refresh: fetch a window of enquiries and summarize it.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{Enquiry, Metrics, ReportWindow, summarize};

use crate::{api::Api, error::Result, versioning::QueryVersions};

const ENQUIRIES_QUERY: &str = "enquiries";

/// Result of a refresh that was still current when it completed.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub enquiries: Vec<Enquiry>,
    pub metrics: Metrics,
}

pub struct Dashboard {
    api: Api,
    versions: QueryVersions,
    tz: Tz,
}

impl Dashboard {
    pub fn new(api: Api, tz: Tz) -> Self {
        Self {
            api,
            versions: QueryVersions::new(),
            tz,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Load `window` and summarize it.
    ///
    /// Returns `Ok(None)` when a newer refresh was started while this one
    /// was waiting on the backend; its data is dropped.
    pub async fn refresh(&self, window: ReportWindow) -> Result<Option<Snapshot>> {
        let ticket = self.versions.issue(ENQUIRIES_QUERY);
        let enquiries = self.api.list_enquiries(window).await?;

        if !self.versions.is_current(&ticket) {
            tracing::debug!(version = ticket.version(), "discarding superseded refresh");
            return Ok(None);
        }

        let metrics = summarize(&enquiries, window);
        tracing::info!(
            from = %window.start(),
            to = %window.end(),
            total = metrics.total_enquiries,
            "dashboard refreshed"
        );
        Ok(Some(Snapshot { enquiries, metrics }))
    }

    /// Refresh the current day in the reporting time zone.
    pub async fn refresh_today(&self, now: DateTime<Utc>) -> Result<Option<Snapshot>> {
        self.refresh(ReportWindow::today(now, self.tz)).await
    }
}
