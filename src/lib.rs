// ==========================================
// 教务排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排课冲突检测与教室/教师/班级可用性引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 冲突检测规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ConflictScope, DayOfWeek, RescheduleStatus, ScopeConstraint};

// 领域实体
pub use domain::{Course, CourseOffering, RecurringSlot, RescheduleRecord, TeacherAssignment};

// 引擎
pub use engine::{
    AvailabilityChecker, Conflict, ConflictClassifier, ConflictCore, ScheduleCheckRequest,
};

// API
pub use api::ScheduleApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "教务排课系统";
