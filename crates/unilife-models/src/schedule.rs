//! Merged schedule of classes and open tasks.
//!
//! The calendar shows classes and not-yet-finished tasks side by side,
//! ordered by time and colored by course:
//!
//! ```text
//! courses ──┐ (index → palette color, id → name)
//! classes ──┼──► build_schedule ──► Vec<ScheduleEvent> (sorted by `at`)
//! tasks   ──┘ (Finished dropped)
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};

use crate::class::ClassItem;
use crate::course::Course;
use crate::task::Task;

/// Palette assigned to courses by their position in the course list.
pub const COURSE_COLORS: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899",
];

/// Color for events that are not linked to a known course.
pub const UNASSIGNED_COLOR: &str = "#64748b";

/// Course label for events that are not linked to a known course.
pub const UNASSIGNED_COURSE: &str = "General";

/// Whether a schedule entry is a class meeting or a task deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// A class meeting.
    Class,
    /// A task deadline.
    Task,
}

/// The record a [`ScheduleEvent`] was derived from.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSource {
    /// Derived from a class.
    Class(ClassItem),
    /// Derived from a task.
    Task(Task),
}

/// One entry on the merged schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    /// Id of the underlying row (empty for unsaved rows).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Start time for classes, due time for tasks.
    pub at: NaiveDateTime,
    /// Class or task.
    pub kind: EventKind,
    /// Course color (see [`COURSE_COLORS`]).
    pub color: &'static str,
    /// Course name, or [`UNASSIGNED_COURSE`].
    pub course_name: String,
    /// The original record.
    pub source: EventSource,
}

impl ScheduleEvent {
    /// The calendar day this event falls on.
    pub fn day(&self) -> NaiveDate {
        self.at.date()
    }
}

struct CourseLookup<'a> {
    by_id: HashMap<&'a str, (&'a str, &'static str)>,
}

impl<'a> CourseLookup<'a> {
    fn new(courses: &'a [Course]) -> Self {
        let by_id = courses
            .iter()
            .enumerate()
            .filter_map(|(index, course)| {
                let id = course.id.as_deref()?;
                Some((
                    id,
                    (course.name.as_str(), COURSE_COLORS[index % COURSE_COLORS.len()]),
                ))
            })
            .collect();
        Self { by_id }
    }

    fn resolve(&self, course_id: Option<&str>) -> (String, &'static str) {
        match course_id.and_then(|id| self.by_id.get(id)) {
            Some(&(name, color)) => (name.to_string(), color),
            None => (UNASSIGNED_COURSE.to_string(), UNASSIGNED_COLOR),
        }
    }
}

/// Merge classes and open tasks into a single time-ordered list.
///
/// Entries without a parseable date are skipped. Finished tasks are left
/// out. Events at the same instant keep classes before tasks and otherwise
/// preserve input order.
pub fn build_schedule(courses: &[Course], classes: &[ClassItem], tasks: &[Task]) -> Vec<ScheduleEvent> {
    let lookup = CourseLookup::new(courses);

    let class_events = classes.iter().filter_map(|class| {
        let at = class.starts_at()?;
        let (course_name, color) = lookup.resolve(class.course_id.as_deref());
        Some(ScheduleEvent {
            id: class.id.clone().unwrap_or_default(),
            title: class.title.clone(),
            at,
            kind: EventKind::Class,
            color,
            course_name,
            source: EventSource::Class(class.clone()),
        })
    });

    let task_events = tasks
        .iter()
        .filter(|task| task.status.is_open())
        .filter_map(|task| {
            let at = task.due_at()?;
            let (course_name, color) = lookup.resolve(task.course_id.as_deref());
            Some(ScheduleEvent {
                id: task.id.clone().unwrap_or_default(),
                title: task.title.clone(),
                at,
                kind: EventKind::Task,
                color,
                course_name,
                source: EventSource::Task(task.clone()),
            })
        });

    let mut events: Vec<ScheduleEvent> = class_events.chain(task_events).collect();
    events.sort_by_key(|e| e.at);
    events
}

/// Bucket events by calendar day, keeping the order within each day.
pub fn group_by_day(events: &[ScheduleEvent]) -> BTreeMap<NaiveDate, Vec<&ScheduleEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<&ScheduleEvent>> = BTreeMap::new();
    for event in events {
        days.entry(event.day()).or_default().push(event);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: Some(id.into()),
            ..Course::new(name)
        }
    }

    fn class(id: &str, course_id: Option<&str>, date: &str, time: &str) -> ClassItem {
        ClassItem {
            id: Some(id.into()),
            title: format!("class {id}"),
            course_id: course_id.map(String::from),
            date: Some(date.into()),
            start_time: time.into(),
            ..ClassItem::default()
        }
    }

    fn task(id: &str, course_id: Option<&str>, due: Option<&str>, status: TaskStatus) -> Task {
        Task {
            id: Some(id.into()),
            course_id: course_id.map(String::from),
            due_date: due.map(String::from),
            status,
            ..Task::new(&format!("task {id}"))
        }
    }

    #[test]
    fn merges_and_sorts_by_time() {
        let courses = [course("c1", "Mathematics"), course("c2", "Physics")];
        let classes = [
            class("k1", Some("c2"), "2025-06-06", "10:00 AM"),
            class("k2", Some("c1"), "2025-06-05", "02:00 PM"),
        ];
        let tasks = [task("t1", Some("c1"), Some("2025-06-05"), TaskStatus::ToDo)];

        let events = build_schedule(&courses, &classes, &tasks);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["t1", "k2", "k1"]);

        assert_eq!(events[1].course_name, "Mathematics");
        assert_eq!(events[1].color, COURSE_COLORS[0]);
        assert_eq!(events[2].color, COURSE_COLORS[1]);
        assert_eq!(events[0].kind, EventKind::Task);
    }

    #[test]
    fn finished_and_undated_entries_are_dropped() {
        let classes = [class("k1", None, "not-a-date", "09:00 AM")];
        let tasks = [
            task("t1", None, Some("2025-06-05"), TaskStatus::Finished),
            task("t2", None, None, TaskStatus::InProgress),
            task("t3", None, Some("2025-06-05"), TaskStatus::InProgress),
        ];

        let events = build_schedule(&[], &classes, &tasks);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "t3");
    }

    #[test]
    fn unknown_course_falls_back_to_general() {
        let tasks = [task("t1", Some("gone"), Some("2025-06-05"), TaskStatus::ToDo)];
        let events = build_schedule(&[], &[], &tasks);
        assert_eq!(events[0].course_name, UNASSIGNED_COURSE);
        assert_eq!(events[0].color, UNASSIGNED_COLOR);
    }

    #[test]
    fn palette_wraps_around() {
        let courses: Vec<Course> = (0..8)
            .map(|i| course(&format!("c{i}"), &format!("Course {i}")))
            .collect();
        let classes = [class("k1", Some("c6"), "2025-06-05", "09:00 AM")];
        let events = build_schedule(&courses, &classes, &[]);
        assert_eq!(events[0].color, COURSE_COLORS[0]);
    }

    #[test]
    fn groups_by_day() {
        let classes = [
            class("k1", None, "2025-06-05", "09:00 AM"),
            class("k2", None, "2025-06-06", "09:00 AM"),
            class("k3", None, "2025-06-05", "11:00 AM"),
        ];
        let events = build_schedule(&[], &classes, &[]);
        let days = group_by_day(&events);
        assert_eq!(days.len(), 2);
        let first = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        let ids: Vec<&str> = days[&first].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["k1", "k3"]);
    }
}
