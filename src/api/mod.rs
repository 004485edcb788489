// ==========================================
// 教务排课系统 - API 层
// ==========================================

pub mod error;
pub mod schedule_api;
pub mod validator;

pub use error::{ApiError, ApiResult};
pub use schedule_api::{CreateScheduleRequest, RescheduleRequest, ScheduleApi};
