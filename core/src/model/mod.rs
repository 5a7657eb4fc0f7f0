pub mod attendance;
pub mod day;
pub mod entity;
pub mod import;
pub mod schedule;
pub mod school;
pub mod student;
pub mod time_slot;
