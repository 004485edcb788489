// ==========================================
// 教务排课系统 - 开课领域实体
// ==========================================
// 职责: 课程、开课（学期+班别）、教师任课
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 课程主数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,    // 课程ID (UUID)
    pub course_code: String,  // 课程代码（如 CSE-205）
    pub course_title: String, // 课程名称
    pub credit: Option<f64>,  // 学分
}

impl Course {
    pub fn new(course_code: String, course_title: String, credit: Option<f64>) -> Self {
        Self {
            course_id: Uuid::new_v4().to_string(),
            course_code,
            course_title,
            credit,
        }
    }
}

/// 开课记录
///
/// 班级身份 = (semester_id, section)，是班级维度冲突检查的依据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOffering {
    pub offering_id: String, // 开课ID (UUID)
    pub course_id: String,   // 课程ID
    pub semester_id: i32,    // 学期
    pub section: String,     // 班别（如 "A"）
}

impl CourseOffering {
    pub fn new(course_id: String, semester_id: i32, section: String) -> Self {
        Self {
            offering_id: Uuid::new_v4().to_string(),
            course_id,
            semester_id,
            section,
        }
    }
}

/// 教师任课记录
///
/// 引擎假定每个开课最多一名在任教师（由任课流程保证，引擎不强制）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherAssignment {
    pub assignment_id: String, // 任课ID (UUID)
    pub offering_id: String,   // 开课ID
    pub teacher_id: String,    // 教师ID
    pub active: bool,          // 是否在任
}

impl TeacherAssignment {
    pub fn new(offering_id: String, teacher_id: String) -> Self {
        Self {
            assignment_id: Uuid::new_v4().to_string(),
            offering_id,
            teacher_id,
            active: true,
        }
    }
}
