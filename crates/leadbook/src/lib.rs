//! Client core of the lead-management dashboard.
//!
//! [`session::SessionStore`] holds who is signed in, [`gateway::Gateway`] is
//! the single path to the backend and [`api::Api`] exposes one typed
//! operation per backend endpoint on top of it. Enquiry rules and metrics
//! live in the `engine` crate.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod gateway;
pub mod session;
pub mod versioning;

pub use error::{AppError, Result};
