//! Payments recorded against an enquiry and the fields derived from them.
//!
//! [`Ledger::derive`] is the only place where `paid_amount`,
//! `balance_amount` and `payment_status` are computed. Every mutation of an
//! [`Enquiry`](crate::Enquiry) that touches payments or the fee snapshot goes
//! through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, PaymentMode, PaymentStatus, ResultEngine, util};

/// One payment collected for a course.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "payment_date")]
    pub paid_at: DateTime<Utc>,
    #[serde(rename = "payment_mode", default, deserialize_with = "util::lenient_label")]
    pub mode: Option<PaymentMode>,
    #[serde(rename = "paid_amount", default)]
    pub amount: Money,
}

impl Payment {
    /// Build a payment, rejecting non-positive amounts.
    pub fn new(mode: PaymentMode, amount: Money, paid_at: DateTime<Utc>) -> ResultEngine<Self> {
        let payment = Self {
            paid_at,
            mode: Some(mode),
            amount,
        };
        payment.check()?;
        Ok(payment)
    }

    /// Reject non-positive amounts.
    pub fn check(&self) -> ResultEngine<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "payment must be greater than zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Derived totals for one enquiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ledger {
    pub paid_amount: Money,
    pub balance_amount: Money,
    pub payment_status: PaymentStatus,
}

impl Ledger {
    /// Compute paid, balance and payment status from a fee and its payments.
    ///
    /// - `paid_amount` is the sum of every payment.
    /// - `balance_amount` is `course_fee - paid_amount`, floored at zero.
    /// - `payment_status` is `Unpaid` when nothing was paid, `FullyPaid` once
    ///   the fee is covered, `PartiallyPaid` otherwise.
    #[must_use]
    pub fn derive(course_fee: Money, payments: &[Payment]) -> Self {
        let paid_amount: Money = payments.iter().map(|payment| payment.amount).sum();
        let payment_status = if paid_amount.is_zero() {
            PaymentStatus::Unpaid
        } else if paid_amount >= course_fee {
            PaymentStatus::FullyPaid
        } else {
            PaymentStatus::PartiallyPaid
        };

        Self {
            paid_amount,
            balance_amount: course_fee.saturating_floor_sub(paid_amount),
            payment_status,
        }
    }
}
