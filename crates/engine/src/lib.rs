//! Lead lifecycle, payment ledger and dashboard aggregation.
//!
//! The engine is synchronous and holds no state of its own: it validates and
//! mutates [`Enquiry`] values in memory and derives metrics from slices of
//! them. Persisting the result is the caller's job.

pub use aggregation::{Metrics, summarize};
pub use categories::{
    EnquiryStatus, Experience, LeadSource, LearningMode, PaymentMode, PaymentStatus, WorkSector,
};
pub use course::{Course, CourseCatalog};
pub use enquiry::{Enquiry, HistoryEntry};
pub use error::EngineError;
pub use ledger::{Ledger, Payment};
pub use lifecycle::Transition;
pub use money::Money;
pub use validation::{FieldErrors, validate};
pub use window::{DEFAULT_TIMEZONE, ReportWindow};

pub mod credentials;

mod aggregation;
mod categories;
mod course;
mod enquiry;
mod error;
mod ledger;
mod lifecycle;
mod money;
mod util;
mod validation;
mod window;

pub type ResultEngine<T> = Result<T, EngineError>;
