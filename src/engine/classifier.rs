// ==========================================
// 教务排课系统 - 冲突分类器
// ==========================================
// 职责: 按固定优先级（教室 → 教师 → 班级）依次运行可用性检查，
//       报告首个冲突及其可读原因
// ==========================================

use crate::domain::types::ScopeConstraint;
use crate::engine::availability::{AvailabilityChecker, Conflict};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::offering_repo::OfferingDirectory;
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::debug;

/// 完整排课检查请求
#[derive(Debug, Clone)]
pub struct ScheduleCheckRequest {
    pub offering_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// 教室号（空白 = 未分配教室，跳过教室检查）
    pub room_number: Option<String>,
    /// 教学楼（仅教室维度收窄用）
    pub building: Option<String>,
    /// 教师ID；为空时从开课的在任任课记录解析
    pub teacher_id: Option<String>,
    /// 编辑已有调课记录时传入其自身ID，避免与自己冲突
    pub exclude_reschedule_id: Option<String>,
}

/// 冲突分类器
///
/// 纯读取决策函数: 冲突以数据形式返回（Option<Conflict>），
/// 引擎错误只覆盖前置条件失败与存储层故障
pub struct ConflictClassifier {
    checker: AvailabilityChecker,
    offering_repo: Arc<dyn OfferingDirectory>,
}

impl ConflictClassifier {
    pub fn new(
        schedule_repo: Arc<dyn ScheduleRepository>,
        offering_repo: Arc<dyn OfferingDirectory>,
    ) -> Self {
        Self {
            checker: AvailabilityChecker::new(schedule_repo),
            offering_repo,
        }
    }

    /// 完整排课冲突检查
    ///
    /// # 检查顺序（用户可见的优先级契约，不可变更）
    /// 1. 解析开课记录；不存在 → OfferingNotFound（前置条件失败，非冲突）
    /// 2. 教室维度（教室号空白则跳过）
    /// 3. 教师维度（请求携带或从在任任课解析；两者皆无则跳过）
    /// 4. 班级维度（开课的 学期+班别）
    ///
    /// 即使多个维度同时冲突，也只报告首个命中的维度
    pub fn check_schedule_conflicts(
        &self,
        request: &ScheduleCheckRequest,
    ) -> EngineResult<Option<Conflict>> {
        let offering = self
            .offering_repo
            .find_offering(&request.offering_id)?
            .ok_or_else(|| EngineError::OfferingNotFound {
                offering_id: request.offering_id.clone(),
            })?;

        let exclude = request.exclude_reschedule_id.as_deref();

        // 教室维度
        if let Some(room) = request
            .room_number
            .as_deref()
            .filter(|r| !r.trim().is_empty())
        {
            let scope = ScopeConstraint::Room {
                room_number: room.to_string(),
                building: request.building.clone(),
            };
            if let Some(conflict) = self.checker.find_conflict(
                request.date,
                request.start_time,
                request.end_time,
                &scope,
                exclude,
            )? {
                debug!("教室维度冲突: {}", conflict.detail);
                return Ok(Some(conflict));
            }
        }

        // 教师维度
        let teacher_id = match &request.teacher_id {
            Some(t) => Some(t.clone()),
            None => self
                .offering_repo
                .find_active_teacher_id(&request.offering_id)?,
        };
        if let Some(teacher_id) = teacher_id {
            let scope = ScopeConstraint::Teacher { teacher_id };
            if let Some(conflict) = self.checker.find_conflict(
                request.date,
                request.start_time,
                request.end_time,
                &scope,
                exclude,
            )? {
                debug!("教师维度冲突: {}", conflict.detail);
                return Ok(Some(conflict));
            }
        }

        // 班级维度
        let scope = ScopeConstraint::Batch {
            semester_id: offering.semester_id,
            section: offering.section.clone(),
        };
        if let Some(conflict) = self.checker.find_conflict(
            request.date,
            request.start_time,
            request.end_time,
            &scope,
            exclude,
        )? {
            debug!("班级维度冲突: {}", conflict.detail);
            return Ok(Some(conflict));
        }

        Ok(None)
    }

    /// 独立的教室可用性检查入口
    ///
    /// 供尚不掌握教师/班级维度的基础排课表单使用；
    /// 与完整检查中的教室步骤判定结果严格一致
    pub fn check_room_availability(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room_number: &str,
        building: Option<&str>,
        exclude_reschedule_id: Option<&str>,
    ) -> EngineResult<Option<Conflict>> {
        let scope = ScopeConstraint::Room {
            room_number: room_number.to_string(),
            building: building.map(|b| b.to_string()),
        };
        self.checker.find_conflict(
            date,
            start_time,
            end_time,
            &scope,
            exclude_reschedule_id,
        )
    }
}
