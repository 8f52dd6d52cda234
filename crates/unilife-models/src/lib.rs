#![deny(missing_docs)]

//! # unilife Models
//!
//! Core data types for the unilife university organizer.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`user`] | Owner identity (`UserId`) attached to every stored row |
//! | [`course`] | Enrolled courses with credits and grade |
//! | [`class`] | Individual class meetings (in person or online) |
//! | [`task`] | Assignments with priority and progress status |
//! | [`schedule`] | Merged, time-ordered view of classes and open tasks |
//! | [`stats`] | Aggregate figures (credits, GPA, task completion) |

pub mod class;
pub mod course;
pub mod error;
pub mod schedule;
pub mod stats;
pub mod task;
pub mod user;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `unilife_models::Course` directly.
pub use class::*;
pub use course::*;
pub use error::*;
pub use schedule::*;
pub use stats::*;
pub use task::*;
pub use user::*;
