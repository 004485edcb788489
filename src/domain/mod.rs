// ==========================================
// 教务排课系统 - 领域层
// ==========================================

pub mod offering;
pub mod schedule;
pub mod types;

pub use offering::{Course, CourseOffering, TeacherAssignment};
pub use schedule::{RecurringSlot, RescheduleRecord};
pub use types::{ConflictScope, DayOfWeek, RescheduleStatus, ScopeConstraint};
