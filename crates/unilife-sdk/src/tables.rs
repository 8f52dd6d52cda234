//! Canonical table names and endpoint paths.
//!
//! All REST and real-time paths used by the client are built through
//! [`Tables`] so the naming convention lives in one place.
//!
//! ```text
//! /rest/v1/{table}             ← CRUD over PostgREST
//! /realtime/v1/websocket       ← change feed
//! ```

/// Current API version prefix.
const VERSION: &str = "v1";

/// Central authority for table names and paths.
///
/// # Examples
///
/// ```
/// use unilife_sdk::Tables;
///
/// assert_eq!(Tables::rest_path(Tables::COURSES), "/rest/v1/courses");
/// assert_eq!(Tables::realtime_path(), "/realtime/v1/websocket");
/// ```
pub struct Tables;

impl Tables {
    /// Enrolled courses.
    pub const COURSES: &'static str = "courses";
    /// Class meetings.
    pub const CLASSES: &'static str = "classes";
    /// Assignments and to-dos.
    pub const TASKS: &'static str = "tasks";

    /// REST path for CRUD on a table.
    pub fn rest_path(table: &str) -> String {
        format!("/rest/{VERSION}/{table}")
    }

    /// Path of the real-time websocket endpoint.
    pub fn realtime_path() -> String {
        format!("/realtime/{VERSION}/websocket")
    }
}
