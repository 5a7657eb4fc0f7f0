pub mod attendance_service;
pub mod dashboard_service;
pub mod export_service;
pub mod import_service;
pub mod report_service;
pub mod schedule_service;
pub mod school_service;

#[cfg(test)]
mod report_test;
#[cfg(test)]
mod school_service_test;
