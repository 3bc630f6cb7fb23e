//! Internal helpers for wire conversion.
//!
//! These utilities are **not** part of the public API. The backend stores
//! unselected form fields as empty strings; these helpers turn them into
//! `None` so the rest of the engine only deals with real values.
//!
//! Labels outside the known enumerations are dropped with a warning; stored
//! records may hold raw CSV cells.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional enumeration.
///
/// `null`, `""` and unrecognised labels all become `None`.
pub(crate) fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        if is_blank(&value) {
            return None;
        }
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(%value, "ignoring stored label: {err}");
                None
            }
        }
    }))
}

/// Like [`lenient_label`], falling back to `T::default()`.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    Ok(lenient_label(deserializer)?.unwrap_or_default())
}

/// Deserialize a string that the backend may send as `null`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
