//! Enrolled courses.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::user::UserId;

/// A course the user is enrolled in.
///
/// `id` is assigned by the backend and is `None` for rows that have not been
/// inserted yet. `credits` are ECTS and may be fractional; `grade` is on a
/// 0–10 scale, with `0` or `None` meaning "not graded yet".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Course {
    /// Backend row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, e.g. `"Operating Systems"`.
    pub name: String,
    /// Catalogue code, e.g. `"CS-301"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Teaching professor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    /// ECTS credits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    /// Final or current grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    /// Semester label, e.g. `"Fall"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    /// Academic year label, e.g. `"2025"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Course {
    /// Create a course with only a name set.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Check that every field the course form requires is filled in.
    ///
    /// Required: name, professor, credits, semester, year and code. Blank
    /// strings count as missing.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut fields = Vec::new();
        if self.name.trim().is_empty() {
            fields.push("name");
        }
        if is_blank(self.professor.as_deref()) {
            fields.push("professor");
        }
        if self.credits.is_none() {
            fields.push("credits");
        }
        if is_blank(self.semester.as_deref()) {
            fields.push("semester");
        }
        if is_blank(self.year.as_deref()) {
            fields.push("year");
        }
        if is_blank(self.code.as_deref()) {
            fields.push("code");
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ModelError::MissingFields { fields })
        }
    }

    /// The grade, if the course has been graded (strictly positive).
    pub fn effective_grade(&self) -> Option<f64> {
        self.grade.filter(|g| *g > 0.0)
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Course {
        Course {
            name: "Operating Systems".into(),
            code: Some("CS-301".into()),
            professor: Some("Dr. Tanenbaum".into()),
            credits: Some(6.0),
            semester: Some("Fall".into()),
            year: Some("2025".into()),
            ..Course::default()
        }
    }

    #[test]
    fn complete_course_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let course = Course {
            professor: Some("   ".into()),
            code: None,
            ..complete()
        };
        assert_eq!(
            course.validate(),
            Err(ModelError::MissingFields {
                fields: vec!["professor", "code"]
            })
        );
    }

    #[test]
    fn unsaved_course_omits_id_and_owner() {
        let json = serde_json::to_value(Course::new("Physics")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Physics" }));
    }

    #[test]
    fn zero_grade_is_ungraded() {
        let mut course = Course::new("Physics");
        course.grade = Some(0.0);
        assert_eq!(course.effective_grade(), None);
        course.grade = Some(8.5);
        assert_eq!(course.effective_grade(), Some(8.5));
    }
}
