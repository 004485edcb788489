// ==========================================
// 教务排课系统 - Conflict Core 纯函数库
// ==========================================
// 职责: 时间区间重叠判定、星期派生、冲突描述格式化
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::types::DayOfWeek;
use chrono::{NaiveDate, NaiveTime};

/// 时间列展示格式
const TIME_FMT: &str = "%H:%M";

// ==========================================
// ConflictCore - 纯函数工具类
// ==========================================
pub struct ConflictCore;

impl ConflictCore {
    /// 判定两个半开时间区间 [s1,e1) 与 [s2,e2) 是否重叠
    ///
    /// # 规则
    /// - 重叠 iff s1 < e2 且 s2 < e1
    /// - 端点相接不算重叠: 一节课 10:00 结束，另一节 10:00 开始，不冲突
    pub fn time_ranges_overlap(
        s1: NaiveTime,
        e1: NaiveTime,
        s2: NaiveTime,
        e2: NaiveTime,
    ) -> bool {
        s1 < e2 && s2 < e1
    }

    /// 从具体日期派生星期（周课表的匹配维度）
    pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
        DayOfWeek::from_date(date)
    }

    /// 周课表冲突描述: "<课程代码> (<开始>-<结束>)"
    pub fn format_slot_detail(course_code: &str, start: NaiveTime, end: NaiveTime) -> String {
        format!(
            "{} ({}-{})",
            course_code,
            start.format(TIME_FMT),
            end.format(TIME_FMT)
        )
    }

    /// 调课冲突描述: "<课程代码> (调课)"
    pub fn format_reschedule_detail(course_code: &str) -> String {
        format!("{} (调课)", course_code)
    }
}
