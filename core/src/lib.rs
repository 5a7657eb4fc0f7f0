pub mod ai;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod time;

pub use config::AppConfig;
pub use error::ValidationError;
pub use model::attendance::{AttendanceRecord, AttendanceStatus};
pub use model::day::Day;
pub use model::entity::{Entity, EntityKind};
pub use model::schedule::{DaySchedule, TimetableEntry, WeeklySchedule};
pub use model::school::SchoolState;
pub use model::student::Student;
pub use model::time_slot::TimeSlot;
pub use repository::{FileStateRepository, Snapshot, StateRepository};
pub use service::school_service::SchoolService;
