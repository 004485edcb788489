// ==========================================
// 教务排课系统 - 排课业务接口
// ==========================================
// 职责: 管理端"排课/调课"工作流的入口
// 并发: 进程内所有写入经写锁串行化，检查+写入 包裹在
//       BEGIN IMMEDIATE 事务内；教室时段唯一索引为存储层兜底
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::db::open_sqlite_connection;
use crate::domain::schedule::{RecurringSlot, RescheduleRecord};
use crate::domain::types::{DayOfWeek, RescheduleStatus};
use crate::engine::availability::{AvailabilityChecker, Conflict};
use crate::engine::classifier::{ConflictClassifier, ScheduleCheckRequest};
use crate::repository::error::RepositoryError;
use crate::repository::offering_repo::{OfferingDirectory, SqliteOfferingRepository};
use crate::repository::schedule_repo::{ScheduleRepository, SqliteScheduleRepository};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// 请求 DTO
// ==========================================

/// 排课表单: 创建周课表条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub offering_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub created_by: String,
}

/// 调课表单: 创建/编辑一次性调课记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub offering_id: String,
    /// 被覆盖的原上课日期；为空表示净新增的一次性课
    pub original_date: Option<NaiveDate>,
    pub new_date: NaiveDate,
    pub new_start_time: NaiveTime,
    pub new_end_time: NaiveTime,
    pub room_number: Option<String>,
    pub reason: Option<String>,
    pub created_by: String,
}

// ==========================================
// ScheduleApi
// ==========================================

pub struct ScheduleApi {
    conn: Arc<Mutex<Connection>>,
    /// 进程内写串行化: 事务未提交期间，其他写入不得进入共享连接
    write_lock: Mutex<()>,
    schedule_repo: Arc<SqliteScheduleRepository>,
    offering_repo: Arc<SqliteOfferingRepository>,
    checker: AvailabilityChecker,
    classifier: ConflictClassifier,
}

impl ScheduleApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        // 开课表先建: 课表两张表外键引用 course_offering
        let offering_repo = Arc::new(SqliteOfferingRepository::from_connection(Arc::clone(
            &conn,
        ))?);
        let schedule_repo = Arc::new(SqliteScheduleRepository::from_connection(Arc::clone(
            &conn,
        ))?);

        let checker =
            AvailabilityChecker::new(Arc::clone(&schedule_repo) as Arc<dyn ScheduleRepository>);
        let classifier = ConflictClassifier::new(
            Arc::clone(&schedule_repo) as Arc<dyn ScheduleRepository>,
            Arc::clone(&offering_repo) as Arc<dyn OfferingDirectory>,
        );

        Ok(Self {
            conn,
            write_lock: Mutex::new(()),
            schedule_repo,
            offering_repo,
            checker,
            classifier,
        })
    }

    /// 开课仓储（供任课/开课维护流程使用）
    pub fn offering_repo(&self) -> &Arc<SqliteOfferingRepository> {
        &self.offering_repo
    }

    /// 课表仓储
    pub fn schedule_repo(&self) -> &Arc<SqliteScheduleRepository> {
        &self.schedule_repo
    }

    // ==========================================
    // 事务辅助
    // ==========================================

    fn acquire_write_lock(&self) -> ApiResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))
    }

    fn exec_txn_stmt(&self, sql: &str) -> ApiResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        conn.execute_batch(sql)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))
    }

    /// 在 BEGIN IMMEDIATE 事务内执行检查+写入
    ///
    /// 写锁覆盖整个事务区间: 进程内其他写入要么在事务开始前完成，
    /// 要么等到提交/回滚之后，不会落进未提交的事务，也不会嵌套 BEGIN；
    /// IMMEDIATE 立即取得数据库写锁，封死跨进程的检查-写入竞态
    fn with_immediate_txn<T>(&self, f: impl FnOnce() -> ApiResult<T>) -> ApiResult<T> {
        let _write_guard = self.acquire_write_lock()?;
        self.exec_txn_stmt("BEGIN IMMEDIATE")?;
        match f() {
            Ok(v) => {
                self.exec_txn_stmt("COMMIT")?;
                Ok(v)
            }
            Err(e) => {
                let _ = self.exec_txn_stmt("ROLLBACK");
                Err(e)
            }
        }
    }

    // ==========================================
    // 周课表工作流
    // ==========================================

    /// 创建周课表条目
    ///
    /// 教室号非空时先做教室占用检查（周课表维度）；
    /// 冲突以 ScheduleConflict 返回给表单重新渲染，插入被放弃
    pub fn create_recurring_slot(
        &self,
        request: CreateScheduleRequest,
    ) -> ApiResult<RecurringSlot> {
        validator::validate_required_text("offering_id", &request.offering_id)?;
        validator::validate_time_window(request.start_time, request.end_time)?;

        let room_number = validator::normalize_optional_text(request.room_number);
        let building = validator::normalize_optional_text(request.building);

        if self
            .offering_repo
            .find_offering(&request.offering_id)?
            .is_none()
        {
            return Err(ApiError::NotFound(format!(
                "开课记录(offering_id={})不存在",
                request.offering_id
            )));
        }

        self.with_immediate_txn(|| {
            if let Some(room) = &room_number {
                let scope = crate::domain::types::ScopeConstraint::Room {
                    room_number: room.clone(),
                    building: building.clone(),
                };
                if let Some(conflict) = self.checker.find_recurring_conflict_on_day(
                    request.day_of_week,
                    request.start_time,
                    request.end_time,
                    &scope,
                )? {
                    return Err(ApiError::ScheduleConflict {
                        scope: conflict.scope,
                        detail: conflict.detail,
                    });
                }
            }

            let slot = RecurringSlot::new(
                request.offering_id.clone(),
                request.day_of_week,
                request.start_time,
                request.end_time,
                room_number.clone(),
                building.clone(),
                request.created_by.clone(),
            );
            self.schedule_repo.insert_slot(&slot)?;
            info!(
                "创建周课表条目: schedule_id={}, offering_id={}, {} {}-{}",
                slot.schedule_id,
                slot.offering_id,
                slot.day_of_week,
                slot.start_time.format("%H:%M"),
                slot.end_time.format("%H:%M")
            );
            Ok(slot)
        })
    }

    /// 删除周课表条目（停开/重排时删除后重建）
    pub fn delete_recurring_slot(&self, schedule_id: &str) -> ApiResult<()> {
        let _write_guard = self.acquire_write_lock()?;
        let affected = self.schedule_repo.delete_slot(schedule_id)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!(
                "课表条目(schedule_id={})不存在",
                schedule_id
            )));
        }
        info!("删除周课表条目: schedule_id={}", schedule_id);
        Ok(())
    }

    pub fn list_slots_by_offering(&self, offering_id: &str) -> ApiResult<Vec<RecurringSlot>> {
        Ok(self.schedule_repo.list_slots_by_offering(offering_id)?)
    }

    /// 独立教室可用性检查（表单预校验）
    ///
    /// 返回 None 表示可用；Some(Conflict) 描述占用来源
    pub fn check_room_availability(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room_number: &str,
        building: Option<&str>,
    ) -> ApiResult<Option<Conflict>> {
        validator::validate_time_window(start_time, end_time)?;
        Ok(self.classifier.check_room_availability(
            date,
            start_time,
            end_time,
            room_number,
            building,
            None,
        )?)
    }

    // ==========================================
    // 调课工作流
    // ==========================================

    /// 创建一次性调课记录
    ///
    /// 先对目标 日期/时段/教室/教师/班级 做完整冲突检查
    pub fn create_reschedule(&self, request: RescheduleRequest) -> ApiResult<RescheduleRecord> {
        validator::validate_required_text("offering_id", &request.offering_id)?;
        validator::validate_time_window(request.new_start_time, request.new_end_time)?;

        let room_number = validator::normalize_optional_text(request.room_number.clone());

        self.with_immediate_txn(|| {
            self.ensure_no_conflict(&request.offering_id, &request, &room_number, None)?;

            let record = RescheduleRecord::new(
                request.offering_id.clone(),
                request.original_date,
                request.new_date,
                request.new_start_time,
                request.new_end_time,
                room_number.clone(),
                request.reason.clone(),
                request.created_by.clone(),
            );
            self.schedule_repo.insert_reschedule(&record)?;
            info!(
                "创建调课记录: reschedule_id={}, offering_id={}, new_date={}",
                record.reschedule_id, record.offering_id, record.new_date
            );
            Ok(record)
        })
    }

    /// 编辑调课记录
    ///
    /// 冲突判定以库内记录所属的开课为准（编辑不改变记录的归属，
    /// 请求中的 offering_id 不参与判定），并以自身ID做自排除，
    /// 避免与未改动的自己冲突
    pub fn update_reschedule(
        &self,
        reschedule_id: &str,
        request: RescheduleRequest,
    ) -> ApiResult<RescheduleRecord> {
        validator::validate_time_window(request.new_start_time, request.new_end_time)?;

        let existing = self
            .schedule_repo
            .find_reschedule_by_id(reschedule_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("调课记录(reschedule_id={})不存在", reschedule_id))
            })?;
        if existing.status == RescheduleStatus::Cancelled {
            return Err(ApiError::BusinessRuleViolation(format!(
                "调课记录(reschedule_id={})已取消，不可编辑",
                reschedule_id
            )));
        }

        let room_number = validator::normalize_optional_text(request.room_number.clone());

        self.with_immediate_txn(|| {
            self.ensure_no_conflict(
                &existing.offering_id,
                &request,
                &room_number,
                Some(reschedule_id),
            )?;

            let mut record = existing.clone();
            record.original_date = request.original_date;
            record.new_date = request.new_date;
            record.new_start_time = request.new_start_time;
            record.new_end_time = request.new_end_time;
            record.room_number = room_number.clone();
            record.reason = request.reason.clone();
            self.schedule_repo.update_reschedule(&record)?;
            info!(
                "更新调课记录: reschedule_id={}, new_date={}",
                record.reschedule_id, record.new_date
            );
            Ok(record)
        })
    }

    /// 取消调课记录（软生命周期: 状态翻转，不删除）
    pub fn cancel_reschedule(&self, reschedule_id: &str) -> ApiResult<()> {
        let _write_guard = self.acquire_write_lock()?;
        let affected = self.schedule_repo.cancel_reschedule(reschedule_id)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!(
                "调课记录(reschedule_id={})不存在",
                reschedule_id
            )));
        }
        info!("取消调课记录: reschedule_id={}", reschedule_id);
        Ok(())
    }

    pub fn list_reschedules_by_offering(
        &self,
        offering_id: &str,
    ) -> ApiResult<Vec<RescheduleRecord>> {
        Ok(self
            .schedule_repo
            .list_reschedules_by_offering(offering_id)?)
    }

    /// 对调课目标运行完整冲突分类，冲突转为用户可纠正错误
    ///
    /// offering_id 由调用方给出: 新建取请求值，编辑取库内记录值
    fn ensure_no_conflict(
        &self,
        offering_id: &str,
        request: &RescheduleRequest,
        room_number: &Option<String>,
        exclude_reschedule_id: Option<&str>,
    ) -> ApiResult<()> {
        let check = ScheduleCheckRequest {
            offering_id: offering_id.to_string(),
            date: request.new_date,
            start_time: request.new_start_time,
            end_time: request.new_end_time,
            room_number: room_number.clone(),
            building: None,
            teacher_id: None,
            exclude_reschedule_id: exclude_reschedule_id.map(|s| s.to_string()),
        };
        if let Some(conflict) = self.classifier.check_schedule_conflicts(&check)? {
            return Err(ApiError::ScheduleConflict {
                scope: conflict.scope,
                detail: conflict.detail,
            });
        }
        Ok(())
    }
}
