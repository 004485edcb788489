// ==========================================
// 教务排课系统 - 可用性检查器
// ==========================================
// 职责: 判定"教室/教师/班级 X 在日期 D 的时间窗 W 内是否空闲"
// 数据源: 周课表 + 一次性调课记录（经 ScheduleRepository trait）
// ==========================================

use crate::domain::types::{ConflictScope, ScopeConstraint};
use crate::engine::conflict_core::ConflictCore;
use crate::engine::error::EngineResult;
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// 一条已定位的排课冲突
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    /// 冲突维度（教室/教师/班级）
    pub scope: ConflictScope,
    /// 用户可读的冲突来源描述（占用课程与时段，或调课标记）
    pub detail: String,
}

/// 可用性检查器
///
/// 纯读取、无副作用；相同输入在无写入介入时结果恒定
pub struct AvailabilityChecker {
    schedule_repo: Arc<dyn ScheduleRepository>,
}

impl AvailabilityChecker {
    pub fn new(schedule_repo: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule_repo }
    }

    /// 在指定日期、时间窗、维度下查找首个冲突
    ///
    /// # 判定步骤
    /// 1. 教室维度且教室号为空白 → 无教室即无教室冲突，直接可用
    /// 2. 按星期+维度取周课表候选，逐条做半开区间重叠判定；
    ///    命中者若存在该日期的生效调课覆盖则跳过（该次课已被移走），
    ///    否则即为冲突，立即返回（首个冲突短路）
    /// 3. 按日期+维度取生效调课候选（排除 exclude_reschedule_id 自身），
    ///    任一重叠即为冲突
    /// 4. 以上皆无 → 可用
    pub fn find_conflict(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        scope: &ScopeConstraint,
        exclude_reschedule_id: Option<&str>,
    ) -> EngineResult<Option<Conflict>> {
        if let ScopeConstraint::Room { room_number, .. } = scope {
            if room_number.trim().is_empty() {
                debug!("教室号为空白，跳过教室维度检查");
                return Ok(None);
            }
        }

        let day = ConflictCore::day_of_week(date);

        // 周课表
        let slots = self.schedule_repo.find_slots_on_day(day, scope)?;
        for slot in &slots {
            if !ConflictCore::time_ranges_overlap(
                start_time,
                end_time,
                slot.start_time,
                slot.end_time,
            ) {
                continue;
            }
            // 该日期的这次课被生效调课移走/停上，不构成占用
            if self
                .schedule_repo
                .has_reschedule_override(&slot.offering_id, date)?
            {
                debug!(
                    "周课表条目 {} 在 {} 存在调课覆盖，跳过",
                    slot.schedule_id, date
                );
                continue;
            }
            return Ok(Some(Conflict {
                scope: scope.kind(),
                detail: ConflictCore::format_slot_detail(
                    &slot.course_code,
                    slot.start_time,
                    slot.end_time,
                ),
            }));
        }

        // 调课记录
        let reschedules = self.schedule_repo.find_active_reschedules_on_date(
            date,
            scope,
            exclude_reschedule_id,
        )?;
        for r in &reschedules {
            if ConflictCore::time_ranges_overlap(
                start_time,
                end_time,
                r.new_start_time,
                r.new_end_time,
            ) {
                return Ok(Some(Conflict {
                    scope: scope.kind(),
                    detail: ConflictCore::format_reschedule_detail(&r.course_code),
                }));
            }
        }

        Ok(None)
    }

    /// 周课表维度的占用检查（创建每周条目时使用）
    ///
    /// 没有具体日期，日期级的调课覆盖不适用: 每周条目长期占用，
    /// 单次调课移走某一天的课并不释放该周期时段
    pub fn find_recurring_conflict_on_day(
        &self,
        day: crate::domain::types::DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        scope: &ScopeConstraint,
    ) -> EngineResult<Option<Conflict>> {
        if let ScopeConstraint::Room { room_number, .. } = scope {
            if room_number.trim().is_empty() {
                debug!("教室号为空白，跳过教室维度检查");
                return Ok(None);
            }
        }

        let slots = self.schedule_repo.find_slots_on_day(day, scope)?;
        for slot in &slots {
            if ConflictCore::time_ranges_overlap(
                start_time,
                end_time,
                slot.start_time,
                slot.end_time,
            ) {
                return Ok(Some(Conflict {
                    scope: scope.kind(),
                    detail: ConflictCore::format_slot_detail(
                        &slot.course_code,
                        slot.start_time,
                        slot.end_time,
                    ),
                }));
            }
        }
        Ok(None)
    }

    /// 布尔形式: 指定窗口是否空闲
    pub fn is_available(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        scope: &ScopeConstraint,
        exclude_reschedule_id: Option<&str>,
    ) -> EngineResult<bool> {
        Ok(self
            .find_conflict(date, start_time, end_time, scope, exclude_reschedule_id)?
            .is_none())
    }
}
