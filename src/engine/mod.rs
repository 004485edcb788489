// ==========================================
// 教务排课系统 - 引擎层
// ==========================================
// 组成: 纯函数核心 + 可用性检查器 + 冲突分类器
// ==========================================

pub mod availability;
pub mod classifier;
pub mod conflict_core;
pub mod error;

pub use availability::{AvailabilityChecker, Conflict};
pub use classifier::{ConflictClassifier, ScheduleCheckRequest};
pub use conflict_core::ConflictCore;
pub use error::{EngineError, EngineResult};
