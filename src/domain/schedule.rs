// ==========================================
// 教务排课系统 - 课表领域实体
// ==========================================
// 职责: 周课表条目与一次性调课记录
// ==========================================

use crate::domain::types::{DayOfWeek, RescheduleStatus};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 周课表条目（每周重复的上课承诺）
///
/// 生命周期: 管理员排课创建；不做原地修改（删除后重建）；停开时删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSlot {
    pub schedule_id: String,         // 课表条目ID (UUID)
    pub offering_id: String,         // 开课ID
    pub day_of_week: DayOfWeek,      // 星期
    pub start_time: NaiveTime,       // 开始时间（闭）
    pub end_time: NaiveTime,         // 结束时间（开）
    pub room_number: Option<String>, // 教室号（可空 = 未分配教室）
    pub building: Option<String>,    // 教学楼（可空）
    pub created_at: String,          // 创建时间
    pub created_by: String,          // 创建人
}

impl RecurringSlot {
    /// 创建新的课表条目（自动生成 UUID 和时间戳）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        offering_id: String,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room_number: Option<String>,
        building: Option<String>,
        created_by: String,
    ) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        Self {
            schedule_id: Uuid::new_v4().to_string(),
            offering_id,
            day_of_week,
            start_time,
            end_time,
            room_number,
            building,
            created_at: now,
            created_by,
        }
    }
}

/// 一次性调课记录
///
/// original_date 为空表示"净新增的一次性课"，非空表示"移动/停上周课表
/// 在该日期的一次课"。取消时翻转 status 而非删除（软生命周期）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRecord {
    pub reschedule_id: String,           // 调课记录ID (UUID)
    pub offering_id: String,             // 开课ID
    pub original_date: Option<NaiveDate>, // 被覆盖的原上课日期（可空）
    pub new_date: NaiveDate,             // 调整后日期
    pub new_start_time: NaiveTime,       // 调整后开始时间
    pub new_end_time: NaiveTime,         // 调整后结束时间
    pub room_number: Option<String>,     // 调整后教室（可空）
    pub reason: Option<String>,          // 调课原因/备注
    pub status: RescheduleStatus,        // 状态 ACTIVE/CANCELLED
    pub created_at: String,              // 创建时间
    pub created_by: String,              // 创建人
}

impl RescheduleRecord {
    /// 创建新的调课记录（状态默认 ACTIVE）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        offering_id: String,
        original_date: Option<NaiveDate>,
        new_date: NaiveDate,
        new_start_time: NaiveTime,
        new_end_time: NaiveTime,
        room_number: Option<String>,
        reason: Option<String>,
        created_by: String,
    ) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        Self {
            reschedule_id: Uuid::new_v4().to_string(),
            offering_id,
            original_date,
            new_date,
            new_start_time,
            new_end_time,
            room_number,
            reason,
            status: RescheduleStatus::Active,
            created_at: now,
            created_by,
        }
    }
}
