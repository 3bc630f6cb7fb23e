//! The `Enquiry` type: one prospective student and everything recorded
//! about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    CourseCatalog, EnquiryStatus, Experience, LeadSource, LearningMode, Ledger, Money, Payment,
    PaymentStatus, ResultEngine, WorkSector, util,
};

/// An audit record written by every accepted lifecycle update.
///
/// Entries are only ever appended to [`Enquiry::history`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub attender: String,
    #[serde(default, deserialize_with = "util::lenient_label")]
    pub status: Option<EnquiryStatus>,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub note: String,
}

/// A lead.
///
/// `paid_amount`, `balance_amount` and `payment_status` are derived from
/// `course_fee` and `payments`; they are public for reading and serialization
/// but are only written through [`Ledger::derive`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enquiry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub course: String,
    #[serde(default)]
    pub course_fee: Money,
    #[serde(rename = "are_you", default, deserialize_with = "util::lenient_label")]
    pub experience: Option<Experience>,
    #[serde(
        rename = "currently_working_in",
        default,
        deserialize_with = "util::lenient_label"
    )]
    pub working_in: Option<WorkSector>,
    #[serde(default, deserialize_with = "util::lenient_label")]
    pub learning_mode: Option<LearningMode>,
    #[serde(default, deserialize_with = "util::lenient_label")]
    pub source: Option<LeadSource>,
    #[serde(default, deserialize_with = "util::lenient_label")]
    pub status: Option<EnquiryStatus>,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub attender: String,
    #[serde(default, deserialize_with = "follow_up_date")]
    pub follow_up_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "util::null_as_empty")]
    pub note: String,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub paid_amount: Money,
    #[serde(default)]
    pub balance_amount: Money,
    #[serde(default, deserialize_with = "util::lenient_or_default")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Enquiry {
    /// A fresh, zero-valued draft: status `Pending`, nothing paid, no
    /// history.
    #[must_use]
    pub fn draft() -> Self {
        let mut draft = Self {
            status: Some(EnquiryStatus::Pending),
            ..Self::default()
        };
        draft.refresh_ledger();
        draft
    }

    /// Select a course from the catalog and snapshot its current fee.
    ///
    /// This is the only way `course_fee` changes. Later edits to the catalog
    /// do not reach existing enquiries until the course is selected again.
    pub fn select_course(&mut self, catalog: &CourseCatalog, title: &str) -> ResultEngine<()> {
        let course = catalog.find(title)?;
        self.course = course.title.trim().to_string();
        self.course_fee = course.fee;
        self.refresh_ledger();
        Ok(())
    }

    /// Append a payment and recompute the derived ledger fields.
    ///
    /// Payments are validated on construction (see [`Payment::new`]); the
    /// amount is checked again here because the fields are public.
    pub fn apply_payment(&mut self, payment: Payment) -> ResultEngine<()> {
        payment.check()?;
        self.payments.push(payment);
        self.refresh_ledger();
        Ok(())
    }

    /// Current derived totals.
    #[must_use]
    pub fn ledger(&self) -> Ledger {
        Ledger::derive(self.course_fee, &self.payments)
    }

    /// Re-derive `paid_amount`, `balance_amount` and `payment_status`.
    pub fn refresh_ledger(&mut self) {
        let ledger = self.ledger();
        self.paid_amount = ledger.paid_amount;
        self.balance_amount = ledger.balance_amount;
        self.payment_status = ledger.payment_status;
    }

    /// Case-insensitive substring match on name or phone.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query) || self.phone.to_lowercase().contains(&query)
    }
}

fn follow_up_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if util::is_blank(&value) => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value.trim())
            .map(|date| Some(date.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
