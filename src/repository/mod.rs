// ==========================================
// 教务排课系统 - 数据仓储层
// ==========================================

pub mod error;
pub mod offering_repo;
pub mod schedule_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use offering_repo::{OfferingDirectory, SqliteOfferingRepository};
pub use schedule_repo::{
    RecurringHit, RescheduleHit, ScheduleRepository, SqliteScheduleRepository,
};
