//! Plain-text output for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use unilife_models::{Course, EventKind, ScheduleEvent, Statistics, Task};

const EVENT_TIME_FORMAT: &str = "%H:%M";
const DAY_FORMAT: &str = "%a %d %b %Y";

pub fn schedule(days: &BTreeMap<NaiveDate, Vec<&ScheduleEvent>>) -> String {
    if days.is_empty() {
        return "Nothing scheduled.\n".to_string();
    }
    let mut out = String::new();
    for (day, events) in days {
        let _ = writeln!(out, "{}", day.format(DAY_FORMAT));
        for event in events {
            let marker = match event.kind {
                EventKind::Class => "class",
                EventKind::Task => "due  ",
            };
            let _ = writeln!(
                out,
                "  {}  {marker}  {}  [{}]",
                event.at.format(EVENT_TIME_FORMAT),
                event.title,
                event.course_name
            );
        }
    }
    out
}

pub fn courses(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "No courses yet.\n".to_string();
    }
    let mut out = String::new();
    for course in courses {
        let code = course.code.as_deref().unwrap_or("-");
        let credits = course.credits.map_or_else(|| "-".to_string(), |c| format!("{c}"));
        let grade = course
            .effective_grade()
            .map_or_else(|| "-".to_string(), |g| format!("{g:.1}"));
        let _ = writeln!(
            out,
            "{code:<10} {:<32} credits {credits:<4} grade {grade}",
            course.name
        );
    }
    out
}

pub fn tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let due = match (&task.due_date, &task.due_time) {
            (Some(date), Some(time)) => format!("{date} {time}"),
            (Some(date), None) => date.clone(),
            _ => "no due date".to_string(),
        };
        let _ = writeln!(
            out,
            "[{:<11}] {:<6} {}  ({due})",
            task.status.to_string(),
            task.priority.to_string(),
            task.title
        );
    }
    out
}

pub fn statistics(stats: &Statistics) -> String {
    let gpa = stats.gpa.map_or_else(|| "n/a".to_string(), |g| format!("{g:.2}"));
    format!(
        "Courses:      {}\n\
         Credits:      {}\n\
         GPA:          {gpa}\n\
         Tasks:        {} to do, {} in progress, {} finished\n\
         Completion:   {:.0}%\n",
        stats.course_count,
        stats.total_credits,
        stats.tasks_todo,
        stats.tasks_in_progress,
        stats.tasks_finished,
        stats.completion_rate()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use unilife_models::{build_schedule, group_by_day, ClassItem, TaskPriority, TaskStatus};

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: Some(id.to_string()),
            code: Some("CS101".to_string()),
            credits: Some(6.0),
            grade: Some(8.5),
            ..Course::new(name)
        }
    }

    #[test]
    fn schedule_lists_days_in_order() {
        let courses = vec![course("c1", "Algorithms")];
        let classes = vec![ClassItem {
            title: "Lecture".to_string(),
            course_id: Some("c1".to_string()),
            date: Some("2024-03-05".to_string()),
            start_time: "09:00 AM".to_string(),
            ..ClassItem::default()
        }];
        let tasks = vec![Task {
            due_date: Some("2024-03-04".to_string()),
            due_time: Some("18:00".to_string()),
            ..Task::new("Problem set")
        }];

        let events = build_schedule(&courses, &classes, &tasks);
        let text = schedule(&group_by_day(&events));

        let monday = text.find("Mon 04 Mar 2024").unwrap();
        let tuesday = text.find("Tue 05 Mar 2024").unwrap();
        assert!(monday < tuesday);
        assert!(text.contains("18:00  due    Problem set  [General]"));
        assert!(text.contains("09:00  class  Lecture  [Algorithms]"));
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(schedule(&BTreeMap::new()), "Nothing scheduled.\n");
        assert_eq!(courses(&[]), "No courses yet.\n");
        assert_eq!(tasks(&[]), "No tasks.\n");
    }

    #[test]
    fn task_lines_show_status_priority_and_due() {
        let task = Task {
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            due_date: Some("2024-03-04".to_string()),
            ..Task::new("Essay")
        };
        let text = tasks(&[task, Task::new("Read")]);
        assert!(text.contains("[In Progress] High   Essay  (2024-03-04)"));
        assert!(text.contains("[To Do      ] Medium Read  (no due date)"));
    }

    #[test]
    fn statistics_block() {
        let stats = Statistics::compute(&[course("c1", "Algorithms")], &[Task::new("Read")]);
        let text = statistics(&stats);
        assert!(text.contains("Courses:      1"));
        assert!(text.contains("GPA:          8.50"));
        assert!(text.contains("Completion:   0%"));
    }
}
