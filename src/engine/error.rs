// ==========================================
// 教务排课系统 - 引擎层错误类型
// ==========================================
// 说明: 冲突是数据（Option<Conflict>），不是错误；
//       引擎错误只覆盖前置条件失败与存储层故障
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 前置条件失败: 引用的开课不存在（区别于排课冲突）
    #[error("开课记录不存在: offering_id={offering_id}")]
    OfferingNotFound { offering_id: String },

    /// 存储层故障直接透传，绝不当作"可用"处理
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
