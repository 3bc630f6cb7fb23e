//! Courses offered by the institute.

use serde::{Deserialize, Serialize};

use crate::{EngineError, FieldErrors, Money, ResultEngine};

/// A course with its current listed fee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub fee: Money,
}

impl Course {
    pub fn new(title: impl Into<String>, fee: Money) -> ResultEngine<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(EngineError::Validation(FieldErrors::single(
                "title",
                "Title is required",
            )));
        }
        if fee.paise() < 0 {
            return Err(EngineError::InvalidAmount(format!(
                "course fee cannot be negative, got {fee}"
            )));
        }
        Ok(Self {
            id: None,
            title,
            fee,
        })
    }
}

/// The course list as last fetched from the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseCatalog {
    courses: Vec<Course>,
}

impl CourseCatalog {
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Find a course by title, ignoring surrounding blanks and ASCII case.
    pub fn find(&self, title: &str) -> ResultEngine<&Course> {
        let title = title.trim();
        self.courses
            .iter()
            .find(|course| course.title.trim().eq_ignore_ascii_case(title))
            .ok_or_else(|| EngineError::KeyNotFound(format!("course {title}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl From<Vec<Course>> for CourseCatalog {
    fn from(courses: Vec<Course>) -> Self {
        Self::new(courses)
    }
}
