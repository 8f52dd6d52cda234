//! Typed CRUD helpers for the organizer's tables.
//!
//! Every listing is scoped to the owning user. Saves validate the record
//! first, stamp the owner, then insert (no id yet) or update by id.

use serde::Serialize;
use unilife_models::{ClassItem, Course, Task, TaskStatus, UserId};

use crate::client::DataClient;
use crate::error::SdkError;
use crate::tables::Tables;

impl DataClient {
    // ------------------------------------------------------------------
    // Courses
    // ------------------------------------------------------------------

    /// All courses of `user`.
    pub async fn list_courses(&self, user: &UserId) -> Result<Vec<Course>, SdkError> {
        self.from_table(Tables::COURSES)
            .select("*")
            .eq("user_id", user.as_str())
            .execute()
            .await
    }

    /// Insert or update a course after validating it.
    pub async fn save_course(&self, user: &UserId, course: &Course) -> Result<(), SdkError> {
        course.validate()?;
        let mut row = course.clone();
        row.user_id = Some(user.clone());
        let id = row.id.take();
        self.upsert(Tables::COURSES, id.as_deref(), &row).await
    }

    /// Delete a course by id.
    pub async fn delete_course(&self, id: &str) -> Result<(), SdkError> {
        self.from_table(Tables::COURSES).eq("id", id).delete().await
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// All classes of `user`, earliest date first.
    pub async fn list_classes(&self, user: &UserId) -> Result<Vec<ClassItem>, SdkError> {
        self.from_table(Tables::CLASSES)
            .select("*")
            .eq("user_id", user.as_str())
            .order("date", true)
            .execute()
            .await
    }

    /// Insert or update a class after validating it.
    pub async fn save_class(&self, user: &UserId, class: &ClassItem) -> Result<(), SdkError> {
        class.validate()?;
        let mut row = class.clone();
        row.user_id = Some(user.clone());
        let id = row.id.take();
        self.upsert(Tables::CLASSES, id.as_deref(), &row).await
    }

    /// Delete a class by id.
    pub async fn delete_class(&self, id: &str) -> Result<(), SdkError> {
        self.from_table(Tables::CLASSES).eq("id", id).delete().await
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// All tasks of `user`.
    pub async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, SdkError> {
        self.from_table(Tables::TASKS)
            .select("*")
            .eq("user_id", user.as_str())
            .execute()
            .await
    }

    /// Tasks of `user` that are `To Do` or `In Progress`.
    pub async fn list_open_tasks(&self, user: &UserId) -> Result<Vec<Task>, SdkError> {
        let open: Vec<String> = TaskStatus::OPEN.iter().map(ToString::to_string).collect();
        let open: Vec<&str> = open.iter().map(String::as_str).collect();
        self.from_table(Tables::TASKS)
            .select("*")
            .eq("user_id", user.as_str())
            .in_("status", &open)
            .execute()
            .await
    }

    /// Insert or update a task after validating it.
    pub async fn save_task(&self, user: &UserId, task: &Task) -> Result<(), SdkError> {
        task.validate()?;
        let mut row = task.clone();
        row.user_id = Some(user.clone());
        let id = row.id.take();
        self.upsert(Tables::TASKS, id.as_deref(), &row).await
    }

    /// Move a task to another status.
    pub async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<(), SdkError> {
        #[derive(Serialize)]
        struct StatusPatch {
            status: TaskStatus,
        }

        self.from_table(Tables::TASKS)
            .eq("id", id)
            .update(&StatusPatch { status })
            .await
    }

    /// Delete a task by id.
    pub async fn delete_task(&self, id: &str) -> Result<(), SdkError> {
        self.from_table(Tables::TASKS).eq("id", id).delete().await
    }

    async fn upsert<T: Serialize>(&self, table: &str, id: Option<&str>, row: &T) -> Result<(), SdkError> {
        match id {
            Some(id) => self.from_table(table).eq("id", id).update(row).await,
            None => self.from_table(table).insert(row).await,
        }
    }
}
