// ==========================================
// 教务排课系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 星期 (Day Of Week)
// ==========================================
// 周课表的重复维度，由具体日期派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// 从具体日期派生星期
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => DayOfWeek::Mon,
            Weekday::Tue => DayOfWeek::Tue,
            Weekday::Wed => DayOfWeek::Wed,
            Weekday::Thu => DayOfWeek::Thu,
            Weekday::Fri => DayOfWeek::Fri,
            Weekday::Sat => DayOfWeek::Sat,
            Weekday::Sun => DayOfWeek::Sun,
        }
    }

    /// 数据库存储格式
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "MON",
            DayOfWeek::Tue => "TUE",
            DayOfWeek::Wed => "WED",
            DayOfWeek::Thu => "THU",
            DayOfWeek::Fri => "FRI",
            DayOfWeek::Sat => "SAT",
            DayOfWeek::Sun => "SUN",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MON" => Ok(DayOfWeek::Mon),
            "TUE" => Ok(DayOfWeek::Tue),
            "WED" => Ok(DayOfWeek::Wed),
            "THU" => Ok(DayOfWeek::Thu),
            "FRI" => Ok(DayOfWeek::Fri),
            "SAT" => Ok(DayOfWeek::Sat),
            "SUN" => Ok(DayOfWeek::Sun),
            other => Err(format!("无效的星期值: {}", other)),
        }
    }
}

// ==========================================
// 调课记录状态 (Reschedule Status)
// ==========================================
// 软生命周期: 取消时翻转状态而非删除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RescheduleStatus {
    Active,    // 生效中
    Cancelled, // 已取消（不参与任何冲突判定）
}

impl RescheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RescheduleStatus::Active => "ACTIVE",
            RescheduleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RescheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RescheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(RescheduleStatus::Active),
            "CANCELLED" => Ok(RescheduleStatus::Cancelled),
            other => Err(format!("无效的调课状态: {}", other)),
        }
    }
}

// ==========================================
// 冲突维度 (Conflict Scope)
// ==========================================
// 三个相互独立的占用维度: 教室/教师/班级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictScope {
    Room,    // 教室
    Teacher, // 教师
    Batch,   // 班级 (学期+班别)
}

impl ConflictScope {
    /// 用户可见的中文标签
    pub fn label(&self) -> &'static str {
        match self {
            ConflictScope::Room => "教室",
            ConflictScope::Teacher => "教师",
            ConflictScope::Batch => "班级",
        }
    }
}

impl fmt::Display for ConflictScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictScope::Room => write!(f, "ROOM"),
            ConflictScope::Teacher => write!(f, "TEACHER"),
            ConflictScope::Batch => write!(f, "BATCH"),
        }
    }
}

// ==========================================
// 维度约束 (Scope Constraint)
// ==========================================
// 可用性查询的参数化维度: 同一套重叠/改期规则按三个维度各执行一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeConstraint {
    /// 教室维度（可选按教学楼进一步收窄）
    Room {
        room_number: String,
        building: Option<String>,
    },
    /// 教师维度（经 teacher_assignment 关联）
    Teacher { teacher_id: String },
    /// 班级维度（经 course_offering 关联，学期+班别）
    Batch { semester_id: i32, section: String },
}

impl ScopeConstraint {
    /// 所属冲突维度
    pub fn kind(&self) -> ConflictScope {
        match self {
            ScopeConstraint::Room { .. } => ConflictScope::Room,
            ScopeConstraint::Teacher { .. } => ConflictScope::Teacher,
            ScopeConstraint::Batch { .. } => ConflictScope::Batch,
        }
    }
}
