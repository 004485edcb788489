// ==========================================
// 教务排课系统 - 开课仓储
// ==========================================
// 职责: 管理 course / course_offering / teacher_assignment 三张表
// 说明: 冲突引擎经 OfferingDirectory trait 解析班级身份与在任教师
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::offering::{Course, CourseOffering, TeacherAssignment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 开课信息查询接口（冲突引擎的依赖边界）
pub trait OfferingDirectory: Send + Sync {
    /// 按开课ID查找开课记录
    fn find_offering(&self, offering_id: &str) -> RepositoryResult<Option<CourseOffering>>;

    /// 查找某开课的在任教师（最多一名，由任课流程保证）
    fn find_active_teacher_id(&self, offering_id: &str) -> RepositoryResult<Option<String>>;
}

pub struct SqliteOfferingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOfferingRepository {
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
    /// uq_teacher_assignment_active 兜底"每个开课最多一名在任教师"
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS course (
              course_id TEXT PRIMARY KEY,
              course_code TEXT NOT NULL UNIQUE,
              course_title TEXT NOT NULL,
              credit REAL
            );

            CREATE TABLE IF NOT EXISTS course_offering (
              offering_id TEXT PRIMARY KEY,
              course_id TEXT NOT NULL,
              semester_id INTEGER NOT NULL,
              section TEXT NOT NULL,
              FOREIGN KEY (course_id) REFERENCES course(course_id) ON DELETE CASCADE,
              UNIQUE(course_id, semester_id, section)
            );

            CREATE INDEX IF NOT EXISTS idx_course_offering_batch
              ON course_offering(semester_id, section);

            CREATE TABLE IF NOT EXISTS teacher_assignment (
              assignment_id TEXT PRIMARY KEY,
              offering_id TEXT NOT NULL,
              teacher_id TEXT NOT NULL,
              active INTEGER NOT NULL DEFAULT 1,
              FOREIGN KEY (offering_id) REFERENCES course_offering(offering_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_teacher_assignment_teacher
              ON teacher_assignment(teacher_id, active);
            CREATE UNIQUE INDEX IF NOT EXISTS uq_teacher_assignment_active
              ON teacher_assignment(offering_id)
              WHERE active = 1;
            "#,
        )?;
        Ok(())
    }

    pub fn insert_course(&self, course: &Course) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course (course_id, course_code, course_title, credit)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                course.course_id,
                course.course_code,
                course.course_title,
                course.credit
            ],
        )?;
        Ok(())
    }

    pub fn insert_offering(&self, offering: &CourseOffering) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course_offering (offering_id, course_id, semester_id, section)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                offering.offering_id,
                offering.course_id,
                offering.semester_id,
                offering.section
            ],
        )?;
        Ok(())
    }

    pub fn insert_assignment(&self, assignment: &TeacherAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO teacher_assignment (assignment_id, offering_id, teacher_id, active)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                assignment.assignment_id,
                assignment.offering_id,
                assignment.teacher_id,
                assignment.active as i32
            ],
        )?;
        Ok(())
    }

    /// 卸任某开课的在任教师（换任课时先卸任再新增）
    pub fn deactivate_assignments(&self, offering_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE teacher_assignment SET active = 0 WHERE offering_id = ?1 AND active = 1",
            params![offering_id],
        )?;
        Ok(affected)
    }

    /// 按课程ID查找课程
    pub fn find_course(&self, course_id: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT course_id, course_code, course_title, credit
                 FROM course WHERE course_id = ?1",
                params![course_id],
                |row| {
                    Ok(Course {
                        course_id: row.get(0)?,
                        course_code: row.get(1)?,
                        course_title: row.get(2)?,
                        credit: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }
}

impl OfferingDirectory for SqliteOfferingRepository {
    fn find_offering(&self, offering_id: &str) -> RepositoryResult<Option<CourseOffering>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT offering_id, course_id, semester_id, section
                 FROM course_offering WHERE offering_id = ?1",
                params![offering_id],
                |row| {
                    Ok(CourseOffering {
                        offering_id: row.get(0)?,
                        course_id: row.get(1)?,
                        semester_id: row.get(2)?,
                        section: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    fn find_active_teacher_id(&self, offering_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT teacher_id FROM teacher_assignment
                 WHERE offering_id = ?1 AND active = 1",
                params![offering_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(result)
    }
}
