// ==========================================
// 教务排课系统 - 课表仓储
// ==========================================
// 职责: 管理 class_schedule / class_reschedule 两张表
// 说明: 冲突引擎只依赖 ScheduleRepository trait，不依赖具体实现
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::schedule::{RecurringSlot, RescheduleRecord};
use crate::domain::types::{DayOfWeek, RescheduleStatus, ScopeConstraint};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row, ToSql};
use std::sync::{Arc, Mutex};

/// 时间列存储格式
const TIME_FMT: &str = "%H:%M";
/// 日期列存储格式
const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// 查询命中结构
// ==========================================

/// 周课表候选命中（带课程代码，用于生成冲突描述）
#[derive(Debug, Clone)]
pub struct RecurringHit {
    pub schedule_id: String,
    pub offering_id: String,
    pub course_code: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// 调课记录候选命中
#[derive(Debug, Clone)]
pub struct RescheduleHit {
    pub reschedule_id: String,
    pub offering_id: String,
    pub course_code: String,
    pub new_start_time: NaiveTime,
    pub new_end_time: NaiveTime,
}

// ==========================================
// 仓储接口（冲突引擎的依赖边界）
// ==========================================

/// 课表数据访问接口
///
/// 三个查询覆盖可用性判定所需的全部读路径:
/// - 某星期+维度下的周课表候选
/// - 某开课在某日期是否存在生效的调课覆盖
/// - 某日期+维度下的生效调课候选（支持自排除）
pub trait ScheduleRepository: Send + Sync {
    /// 查询指定星期、指定维度下的周课表条目
    fn find_slots_on_day(
        &self,
        day: DayOfWeek,
        scope: &ScopeConstraint,
    ) -> RepositoryResult<Vec<RecurringHit>>;

    /// 某开课在指定日期是否存在生效 (ACTIVE) 的调课覆盖
    fn has_reschedule_override(
        &self,
        offering_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<bool>;

    /// 查询指定日期、指定维度下的生效调课记录
    ///
    /// exclude_reschedule_id 用于编辑保存时排除记录自身
    fn find_active_reschedules_on_date(
        &self,
        date: NaiveDate,
        scope: &ScopeConstraint,
        exclude_reschedule_id: Option<&str>,
    ) -> RepositoryResult<Vec<RescheduleHit>>;
}

// ==========================================
// SQLite 实现
// ==========================================

pub struct SqliteScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScheduleRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    ///
    /// uq_class_schedule_room_slot 是并发排课的存储层兜底:
    /// 同教室、同星期、同起始时间的重复插入会直接失败
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS class_schedule (
              schedule_id TEXT PRIMARY KEY,
              offering_id TEXT NOT NULL,
              day_of_week TEXT NOT NULL,
              start_time TEXT NOT NULL,
              end_time TEXT NOT NULL,
              room_number TEXT,
              building TEXT,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              created_by TEXT NOT NULL,
              FOREIGN KEY (offering_id) REFERENCES course_offering(offering_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_class_schedule_day_room
              ON class_schedule(day_of_week, room_number);
            CREATE INDEX IF NOT EXISTS idx_class_schedule_offering
              ON class_schedule(offering_id);
            CREATE UNIQUE INDEX IF NOT EXISTS uq_class_schedule_room_slot
              ON class_schedule(day_of_week, start_time, room_number)
              WHERE room_number IS NOT NULL;

            CREATE TABLE IF NOT EXISTS class_reschedule (
              reschedule_id TEXT PRIMARY KEY,
              offering_id TEXT NOT NULL,
              original_date TEXT,
              new_date TEXT NOT NULL,
              new_start_time TEXT NOT NULL,
              new_end_time TEXT NOT NULL,
              room_number TEXT,
              reason TEXT,
              status TEXT NOT NULL DEFAULT 'ACTIVE',
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              created_by TEXT NOT NULL,
              FOREIGN KEY (offering_id) REFERENCES course_offering(offering_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_class_reschedule_new_date
              ON class_reschedule(new_date, status);
            CREATE INDEX IF NOT EXISTS idx_class_reschedule_override
              ON class_reschedule(offering_id, original_date, status);
            "#,
        )?;
        Ok(())
    }

    // ==========================================
    // 周课表 CRUD
    // ==========================================

    pub fn insert_slot(&self, slot: &RecurringSlot) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO class_schedule (
                schedule_id, offering_id, day_of_week,
                start_time, end_time, room_number, building,
                created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                slot.schedule_id,
                slot.offering_id,
                slot.day_of_week.as_str(),
                slot.start_time.format(TIME_FMT).to_string(),
                slot.end_time.format(TIME_FMT).to_string(),
                slot.room_number,
                slot.building,
                slot.created_at,
                slot.created_by,
            ],
        )?;
        Ok(())
    }

    pub fn delete_slot(&self, schedule_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM class_schedule WHERE schedule_id = ?1",
            params![schedule_id],
        )?;
        Ok(affected)
    }

    /// 列出某开课的全部周课表条目（按星期+开始时间排序）
    pub fn list_slots_by_offering(
        &self,
        offering_id: &str,
    ) -> RepositoryResult<Vec<RecurringSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT schedule_id, offering_id, day_of_week,
                   start_time, end_time, room_number, building,
                   created_at, created_by
            FROM class_schedule
            WHERE offering_id = ?1
            ORDER BY CASE day_of_week
                       WHEN 'MON' THEN 1 WHEN 'TUE' THEN 2 WHEN 'WED' THEN 3
                       WHEN 'THU' THEN 4 WHEN 'FRI' THEN 5 WHEN 'SAT' THEN 6
                       ELSE 7
                     END ASC, start_time ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![offering_id], map_slot_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    // ==========================================
    // 调课记录 CRUD
    // ==========================================

    pub fn insert_reschedule(&self, record: &RescheduleRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO class_reschedule (
                reschedule_id, offering_id, original_date,
                new_date, new_start_time, new_end_time,
                room_number, reason, status, created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.reschedule_id,
                record.offering_id,
                record.original_date.map(|d| d.format(DATE_FMT).to_string()),
                record.new_date.format(DATE_FMT).to_string(),
                record.new_start_time.format(TIME_FMT).to_string(),
                record.new_end_time.format(TIME_FMT).to_string(),
                record.room_number,
                record.reason,
                record.status.as_str(),
                record.created_at,
                record.created_by,
            ],
        )?;
        Ok(())
    }

    pub fn find_reschedule_by_id(
        &self,
        reschedule_id: &str,
    ) -> RepositoryResult<Option<RescheduleRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT reschedule_id, offering_id, original_date,
                   new_date, new_start_time, new_end_time,
                   room_number, reason, status, created_at, created_by
            FROM class_reschedule
            WHERE reschedule_id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![reschedule_id], map_reschedule_row);
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 更新调课记录的目标日期/时间/教室/原因（编辑保存）
    pub fn update_reschedule(&self, record: &RescheduleRecord) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE class_reschedule SET
                original_date = ?2,
                new_date = ?3,
                new_start_time = ?4,
                new_end_time = ?5,
                room_number = ?6,
                reason = ?7
            WHERE reschedule_id = ?1
            "#,
            params![
                record.reschedule_id,
                record.original_date.map(|d| d.format(DATE_FMT).to_string()),
                record.new_date.format(DATE_FMT).to_string(),
                record.new_start_time.format(TIME_FMT).to_string(),
                record.new_end_time.format(TIME_FMT).to_string(),
                record.room_number,
                record.reason,
            ],
        )?;
        Ok(affected)
    }

    /// 取消调课记录（状态翻转，不删除行）
    pub fn cancel_reschedule(&self, reschedule_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE class_reschedule SET status = 'CANCELLED' WHERE reschedule_id = ?1",
            params![reschedule_id],
        )?;
        Ok(affected)
    }

    pub fn list_reschedules_by_offering(
        &self,
        offering_id: &str,
    ) -> RepositoryResult<Vec<RescheduleRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT reschedule_id, offering_id, original_date,
                   new_date, new_start_time, new_end_time,
                   room_number, reason, status, created_at, created_by
            FROM class_reschedule
            WHERE offering_id = ?1
            ORDER BY new_date ASC, new_start_time ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![offering_id], map_reschedule_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

// ==========================================
// ScheduleRepository trait 实现
// ==========================================

impl ScheduleRepository for SqliteScheduleRepository {
    fn find_slots_on_day(
        &self,
        day: DayOfWeek,
        scope: &ScopeConstraint,
    ) -> RepositoryResult<Vec<RecurringHit>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT cs.schedule_id, cs.offering_id, c.course_code, cs.start_time, cs.end_time
            FROM class_schedule cs
            JOIN course_offering co ON co.offering_id = cs.offering_id
            JOIN course c ON c.course_id = co.course_id
            WHERE cs.day_of_week = ?
            "#,
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(day.as_str().to_string())];
        append_scope_filter(&mut sql, &mut values, scope, "cs", true);

        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(&param_refs[..], |row| {
                Ok(RecurringHit {
                    schedule_id: row.get(0)?,
                    offering_id: row.get(1)?,
                    course_code: row.get(2)?,
                    start_time: parse_time_col(row, 3)?,
                    end_time: parse_time_col(row, 4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    fn has_reschedule_override(
        &self,
        offering_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT 1 FROM class_reschedule
            WHERE offering_id = ?1
              AND original_date = ?2
              AND status = 'ACTIVE'
            LIMIT 1
            "#,
        )?;
        let exists = stmt.exists(params![offering_id, date.format(DATE_FMT).to_string()])?;
        Ok(exists)
    }

    fn find_active_reschedules_on_date(
        &self,
        date: NaiveDate,
        scope: &ScopeConstraint,
        exclude_reschedule_id: Option<&str>,
    ) -> RepositoryResult<Vec<RescheduleHit>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT cr.reschedule_id, cr.offering_id, c.course_code, cr.new_start_time, cr.new_end_time
            FROM class_reschedule cr
            JOIN course_offering co ON co.offering_id = cr.offering_id
            JOIN course c ON c.course_id = co.course_id
            WHERE cr.status = 'ACTIVE'
              AND cr.new_date = ?
            "#,
        );
        let mut values: Vec<Box<dyn ToSql>> =
            vec![Box::new(date.format(DATE_FMT).to_string())];
        // 调课记录没有教学楼列，教室维度只按教室号匹配
        append_scope_filter(&mut sql, &mut values, scope, "cr", false);

        if let Some(exclude_id) = exclude_reschedule_id {
            sql.push_str(" AND cr.reschedule_id <> ?");
            values.push(Box::new(exclude_id.to_string()));
        }

        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(&param_refs[..], |row| {
                Ok(RescheduleHit {
                    reschedule_id: row.get(0)?,
                    offering_id: row.get(1)?,
                    course_code: row.get(2)?,
                    new_start_time: parse_time_col(row, 3)?,
                    new_end_time: parse_time_col(row, 4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

// ==========================================
// SQL 片段与行映射辅助
// ==========================================

/// 按冲突维度追加 WHERE 片段和参数
///
/// 三个维度共用同一条基础查询，只有约束片段不同:
/// - 教室: 按教室号（可选教学楼）直接匹配
/// - 教师: 经 teacher_assignment 关联在任教师
/// - 班级: 经 course_offering 匹配 (学期, 班别)
fn append_scope_filter(
    sql: &mut String,
    values: &mut Vec<Box<dyn ToSql>>,
    scope: &ScopeConstraint,
    alias: &str,
    with_building: bool,
) {
    match scope {
        ScopeConstraint::Room {
            room_number,
            building,
        } => {
            sql.push_str(&format!(" AND {}.room_number = ?", alias));
            values.push(Box::new(room_number.clone()));
            if with_building {
                if let Some(b) = building {
                    sql.push_str(&format!(" AND {}.building = ?", alias));
                    values.push(Box::new(b.clone()));
                }
            }
        }
        ScopeConstraint::Teacher { teacher_id } => {
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM teacher_assignment ta \
                 WHERE ta.offering_id = {}.offering_id AND ta.teacher_id = ? AND ta.active = 1)",
                alias
            ));
            values.push(Box::new(teacher_id.clone()));
        }
        ScopeConstraint::Batch {
            semester_id,
            section,
        } => {
            sql.push_str(" AND co.semester_id = ? AND co.section = ?");
            values.push(Box::new(*semester_id));
            values.push(Box::new(section.clone()));
        }
    }
}

fn parse_time_col(row: &Row<'_>, idx: usize) -> SqliteResult<NaiveTime> {
    let s: String = row.get(idx)?;
    NaiveTime::parse_from_str(&s, TIME_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_date_col(row: &Row<'_>, idx: usize) -> SqliteResult<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_slot_row(row: &Row<'_>) -> SqliteResult<RecurringSlot> {
    let day_raw: String = row.get(2)?;
    let day = day_raw
        .parse::<DayOfWeek>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;
    Ok(RecurringSlot {
        schedule_id: row.get(0)?,
        offering_id: row.get(1)?,
        day_of_week: day,
        start_time: parse_time_col(row, 3)?,
        end_time: parse_time_col(row, 4)?,
        room_number: row.get(5)?,
        building: row.get(6)?,
        created_at: row.get(7)?,
        created_by: row.get(8)?,
    })
}

fn map_reschedule_row(row: &Row<'_>) -> SqliteResult<RescheduleRecord> {
    let original_date: Option<NaiveDate> = match row.get::<_, Option<String>>(2)? {
        Some(_) => Some(parse_date_col(row, 2)?),
        None => None,
    };
    let status_raw: String = row.get(8)?;
    let status = status_raw
        .parse::<RescheduleStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, e.into()))?;
    Ok(RescheduleRecord {
        reschedule_id: row.get(0)?,
        offering_id: row.get(1)?,
        original_date,
        new_date: parse_date_col(row, 3)?,
        new_start_time: parse_time_col(row, 4)?,
        new_end_time: parse_time_col(row, 5)?,
        room_number: row.get(6)?,
        reason: row.get(7)?,
        status,
        created_at: row.get(9)?,
        created_by: row.get(10)?,
    })
}
