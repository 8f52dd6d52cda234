//! Class meetings.
//!
//! A [`ClassItem`] is a single dated meeting of a course, either in a
//! classroom or online behind a meeting link. Dates and times are kept as
//! the strings the backend stores (`YYYY-MM-DD`, `hh:mm AM`) and parsed on
//! demand so that one malformed row never poisons a whole listing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::course::is_blank;
use crate::error::ModelError;
use crate::user::UserId;

/// Storage format of [`ClassItem::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of [`ClassItem::start_time`] and [`ClassItem::end_time`].
pub const CLASS_TIME_FORMAT: &str = "%I:%M %p";

/// A single class meeting.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ClassItem {
    /// Backend row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display title.
    pub title: String,
    /// Video-call link for online classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    /// Room for in-person classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classroom: Option<String>,
    /// Teaching professor.
    #[serde(default)]
    pub professor: String,
    /// Course this class belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Meeting date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Start time, `hh:mm AM`.
    #[serde(default)]
    pub start_time: String,
    /// End time, `hh:mm AM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Whether the class happens online.
    #[serde(default)]
    pub is_online: bool,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl ClassItem {
    /// Parsed meeting date, or `None` when absent or malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
    }

    /// Parsed start time, or `None` when malformed.
    pub fn parsed_start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.start_time.trim(), CLASS_TIME_FORMAT).ok()
    }

    /// When the class starts.
    ///
    /// Falls back to midnight of the meeting date when the start time cannot
    /// be parsed; `None` only when the date itself is missing or malformed.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let date = self.parsed_date()?;
        Some(date.and_time(self.parsed_start_time().unwrap_or(NaiveTime::MIN)))
    }

    /// Check the class form rules.
    ///
    /// Title, professor, course, date and start time are always required.
    /// Online classes additionally need a well-formed meeting link, in-person
    /// classes a classroom.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut fields = Vec::new();
        if self.title.trim().is_empty() {
            fields.push("title");
        }
        if self.professor.trim().is_empty() {
            fields.push("professor");
        }
        if is_blank(self.course_id.as_deref()) {
            fields.push("course_id");
        }
        if is_blank(self.date.as_deref()) {
            fields.push("date");
        }
        if self.start_time.trim().is_empty() {
            fields.push("start_time");
        }
        if self.is_online {
            if is_blank(self.meeting_link.as_deref()) {
                fields.push("meeting_link");
            }
        } else if is_blank(self.classroom.as_deref()) {
            fields.push("classroom");
        }
        if !fields.is_empty() {
            return Err(ModelError::MissingFields { fields });
        }

        if self.parsed_date().is_none() {
            return Err(ModelError::InvalidField {
                field: "date",
                value: self.date.clone().unwrap_or_default(),
                reason: "expected YYYY-MM-DD".into(),
            });
        }

        if let Some(link) = self.meeting_link.as_deref().filter(|_| self.is_online) {
            if !looks_like_url(link) {
                return Err(ModelError::InvalidField {
                    field: "meeting_link",
                    value: link.to_string(),
                    reason: "please enter a valid URL".into(),
                });
            }
        }
        Ok(())
    }
}

/// Loose URL check: optional `http(s)://`, a dotted host whose last label is
/// 2–6 ASCII letters, then an optional path without whitespace.
pub fn looks_like_url(input: &str) -> bool {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);
    if rest.chars().any(char::is_whitespace) {
        return false;
    }

    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = rest[..host_end]
        .rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map_or(&rest[..host_end], |(h, _)| h);

    let Some((name, tld)) = host.rsplit_once('.') else {
        return false;
    };
    !name.is_empty()
        && !name.split('.').any(str::is_empty)
        && (2..=6).contains(&tld.len())
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online_class() -> ClassItem {
        ClassItem {
            title: "Weekly Study Session".into(),
            professor: "Prof. Johnson".into(),
            course_id: Some("c1".into()),
            date: Some("2025-06-05".into()),
            start_time: "09:30 AM".into(),
            meeting_link: Some("https://zoom.us/j/123".into()),
            is_online: true,
            ..ClassItem::default()
        }
    }

    #[test]
    fn starts_at_combines_date_and_time() {
        let class = online_class();
        let expected = NaiveDate::from_ymd_opt(2025, 6, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(class.starts_at(), Some(expected));
    }

    #[test]
    fn unparseable_time_falls_back_to_midnight() {
        let class = ClassItem {
            start_time: "half past nine".into(),
            ..online_class()
        };
        let midnight = NaiveDate::from_ymd_opt(2025, 6, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(class.starts_at(), Some(midnight));
    }

    #[test]
    fn malformed_date_has_no_start() {
        let class = ClassItem {
            date: Some("June 5th".into()),
            ..online_class()
        };
        assert_eq!(class.starts_at(), None);
    }

    #[test]
    fn online_class_requires_link_in_person_requires_room() {
        let online = ClassItem {
            meeting_link: None,
            ..online_class()
        };
        assert_eq!(
            online.validate(),
            Err(ModelError::MissingFields {
                fields: vec!["meeting_link"]
            })
        );

        let in_person = ClassItem {
            is_online: false,
            meeting_link: None,
            ..online_class()
        };
        assert_eq!(
            in_person.validate(),
            Err(ModelError::MissingFields {
                fields: vec!["classroom"]
            })
        );
    }

    #[test]
    fn bad_meeting_link_is_rejected() {
        let class = ClassItem {
            meeting_link: Some("not a link".into()),
            ..online_class()
        };
        assert!(matches!(
            class.validate(),
            Err(ModelError::InvalidField {
                field: "meeting_link",
                ..
            })
        ));
    }

    #[test]
    fn url_check() {
        assert!(looks_like_url("https://zoom.us/j/123"));
        assert!(looks_like_url("meet.google.com/abc-defg-hij"));
        assert!(looks_like_url("http://localhost.dev:8080/room"));
        assert!(!looks_like_url("zoom"));
        assert!(!looks_like_url("https://.com"));
        assert!(!looks_like_url("https://zoom.us/j/1 23"));
    }
}
