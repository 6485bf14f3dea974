pub mod assignments;
pub mod attendance;
pub mod calendar;
pub mod classes;
pub mod core;
pub mod memorization;
pub mod messages;
pub mod students;
pub mod teachers;
