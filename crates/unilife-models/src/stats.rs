//! Aggregate figures for the statistics view.

use crate::course::Course;
use crate::task::{Task, TaskStatus};

/// Summary statistics over a user's courses and tasks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    /// Number of courses.
    pub course_count: usize,
    /// Sum of ECTS credits over all courses (missing credits count as zero).
    pub total_credits: f64,
    /// Mean grade over graded courses, `None` when nothing is graded yet.
    pub gpa: Option<f64>,
    /// Tasks with status `To Do`.
    pub tasks_todo: usize,
    /// Tasks with status `In Progress`.
    pub tasks_in_progress: usize,
    /// Tasks with status `Finished`.
    pub tasks_finished: usize,
}

impl Statistics {
    /// Compute statistics from raw rows.
    pub fn compute(courses: &[Course], tasks: &[Task]) -> Self {
        let total_credits = courses.iter().filter_map(|c| c.credits).sum();

        let grades: Vec<f64> = courses.iter().filter_map(Course::effective_grade).collect();
        #[allow(clippy::cast_precision_loss)]
        let gpa = (!grades.is_empty()).then(|| grades.iter().sum::<f64>() / grades.len() as f64);

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

        Self {
            course_count: courses.len(),
            total_credits,
            gpa,
            tasks_todo: count(TaskStatus::ToDo),
            tasks_in_progress: count(TaskStatus::InProgress),
            tasks_finished: count(TaskStatus::Finished),
        }
    }

    /// Total number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks_todo + self.tasks_in_progress + self.tasks_finished
    }

    /// Percentage of finished tasks (0–100), `0` when there are no tasks.
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_rate(&self) -> f64 {
        match self.task_count() {
            0 => 0.0,
            total => self.tasks_finished as f64 / total as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(name: &str, credits: Option<f64>, grade: Option<f64>) -> Course {
        Course {
            credits,
            grade,
            ..Course::new(name)
        }
    }

    fn with_status(status: TaskStatus) -> Task {
        Task {
            status,
            ..Task::new("t")
        }
    }

    #[test]
    fn gpa_ignores_ungraded_courses() {
        let courses = [
            graded("a", Some(6.0), Some(9.0)),
            graded("b", Some(4.5), Some(0.0)),
            graded("c", None, Some(7.0)),
            graded("d", Some(3.0), None),
        ];
        let stats = Statistics::compute(&courses, &[]);
        assert_eq!(stats.course_count, 4);
        assert!((stats.total_credits - 13.5).abs() < f64::EPSILON);
        assert_eq!(stats.gpa, Some(8.0));
    }

    #[test]
    fn empty_input_has_no_gpa_and_zero_rate() {
        let stats = Statistics::compute(&[], &[]);
        assert_eq!(stats.gpa, None);
        assert_eq!(stats.completion_rate(), 0.0);
    }

    #[test]
    fn counts_tasks_per_status() {
        let tasks = [
            with_status(TaskStatus::ToDo),
            with_status(TaskStatus::InProgress),
            with_status(TaskStatus::Finished),
            with_status(TaskStatus::Finished),
        ];
        let stats = Statistics::compute(&[], &tasks);
        assert_eq!(stats.tasks_todo, 1);
        assert_eq!(stats.tasks_in_progress, 1);
        assert_eq!(stats.tasks_finished, 2);
        assert_eq!(stats.task_count(), 4);
        assert!((stats.completion_rate() - 50.0).abs() < f64::EPSILON);
    }
}
