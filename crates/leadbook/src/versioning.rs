//! Monotonic request versions per query key.
//!
//! Every refresh takes a [`Ticket`] before it goes to the network. When the
//! response comes back it is only used if no newer ticket was issued for the
//! same key in the meantime.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    version: u64,
}

impl Ticket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Default)]
pub struct QueryVersions {
    latest: Mutex<HashMap<String, u64>>,
}

impl QueryVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next version for `key`.
    pub fn issue(&self, key: &str) -> Ticket {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let version = latest.entry(key.to_string()).or_insert(0);
        *version += 1;
        Ticket {
            key: key.to_string(),
            version: *version,
        }
    }

    /// `true` while no newer ticket exists for the ticket's key.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.get(&ticket.key).copied() == Some(ticket.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let versions = QueryVersions::new();
        let first = versions.issue("enquiries");
        assert!(versions.is_current(&first));

        let second = versions.issue("enquiries");
        assert!(!versions.is_current(&first));
        assert!(versions.is_current(&second));
        assert!(second.version() > first.version());
    }

    #[test]
    fn keys_are_independent() {
        let versions = QueryVersions::new();
        let enquiries = versions.issue("enquiries");
        let courses = versions.issue("courses");
        versions.issue("courses");
        assert!(versions.is_current(&enquiries));
        assert!(!versions.is_current(&courses));
    }
}
