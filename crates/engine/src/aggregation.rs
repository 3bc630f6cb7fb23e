//! Dashboard metrics over a window of enquiries.
//!
//! [`summarize`] is a pure function: same enquiries, same window, same
//! [`Metrics`]. Grouped counts are kept in ordered maps so two runs over the
//! same input produce identical output.
//!
//! Revenue is the sum of every payment of every enquiry in the window,
//! whatever the payment date. The window only selects enquiries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Enquiry, EnquiryStatus, Money, ReportWindow};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metrics {
    #[serde(skip)]
    pub window: ReportWindow,
    pub total_enquiries: usize,
    pub count_by_status: BTreeMap<String, u64>,
    pub count_by_source: BTreeMap<String, u64>,
    pub count_by_attender: BTreeMap<String, u64>,
    pub count_by_course: BTreeMap<String, u64>,
    pub total_revenue: Money,
    pub revenue_by_attender: BTreeMap<String, Money>,
}

impl Metrics {
    /// Count for one status, 0 when absent.
    #[must_use]
    pub fn status_count(&self, status: EnquiryStatus) -> u64 {
        self.count_by_status
            .get(status.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// Group and sum a window of enquiries.
///
/// `enquiries` is expected to be exactly what the backend returned for
/// `window`; no date filtering happens here.
#[must_use]
pub fn summarize(enquiries: &[Enquiry], window: ReportWindow) -> Metrics {
    let mut metrics = Metrics {
        window,
        total_enquiries: enquiries.len(),
        count_by_status: BTreeMap::new(),
        count_by_source: BTreeMap::new(),
        count_by_attender: BTreeMap::new(),
        count_by_course: BTreeMap::new(),
        total_revenue: Money::ZERO,
        revenue_by_attender: BTreeMap::new(),
    };

    for enquiry in enquiries {
        let collected: Money = enquiry.payments.iter().map(|payment| payment.amount).sum();
        metrics.total_revenue += collected;

        if let Some(status) = enquiry.status {
            bump(&mut metrics.count_by_status, status.as_str());
        }
        if let Some(source) = enquiry.source {
            bump(&mut metrics.count_by_source, source.as_str());
        }
        if let Some(course) = category(&enquiry.course) {
            bump(&mut metrics.count_by_course, course);
        }
        if let Some(attender) = category(&enquiry.attender) {
            bump(&mut metrics.count_by_attender, attender);
            *metrics
                .revenue_by_attender
                .entry(attender.to_string())
                .or_insert(Money::ZERO) += collected;
        }
    }

    metrics
}

fn category(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn bump(counts: &mut BTreeMap<String, u64>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}
