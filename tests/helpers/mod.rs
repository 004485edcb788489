// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时测试数据库、示例开课数据的快捷构造
// ==========================================

use campus_timetable::api::ScheduleApi;
use campus_timetable::domain::types::DayOfWeek;
use campus_timetable::domain::{Course, CourseOffering, RecurringSlot, TeacherAssignment};
use chrono::{NaiveDate, NaiveTime};
use tempfile::NamedTempFile;

/// 创建临时测试数据库上的 ScheduleApi
///
/// 返回的 NamedTempFile 需保持存活，否则数据库文件被回收
pub fn create_test_api() -> (NamedTempFile, ScheduleApi) {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().expect("路径非UTF-8").to_string();
    let api = ScheduleApi::new(&db_path).expect("初始化 ScheduleApi 失败");
    (temp_file, api)
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("非法时间")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("非法日期")
}

/// 2026-03-02 是周一，作为测试的基准日期
pub fn monday() -> NaiveDate {
    date(2026, 3, 2)
}

/// 灌入一条开课记录（课程+开课+任课），返回 offering_id
pub fn seed_offering(
    api: &ScheduleApi,
    course_code: &str,
    semester_id: i32,
    section: &str,
    teacher_id: Option<&str>,
) -> String {
    let course = Course::new(
        course_code.to_string(),
        format!("{} 课程", course_code),
        Some(3.0),
    );
    api.offering_repo()
        .insert_course(&course)
        .expect("插入课程失败");

    let offering = CourseOffering::new(course.course_id.clone(), semester_id, section.to_string());
    api.offering_repo()
        .insert_offering(&offering)
        .expect("插入开课失败");

    if let Some(teacher_id) = teacher_id {
        let assignment =
            TeacherAssignment::new(offering.offering_id.clone(), teacher_id.to_string());
        api.offering_repo()
            .insert_assignment(&assignment)
            .expect("插入任课失败");
    }

    offering.offering_id
}

/// 直接向仓储灌入一条周课表条目（绕过 API 的冲突检查）
pub fn seed_slot(
    api: &ScheduleApi,
    offering_id: &str,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
    room: Option<&str>,
) -> RecurringSlot {
    let slot = RecurringSlot::new(
        offering_id.to_string(),
        day,
        start,
        end,
        room.map(|r| r.to_string()),
        None,
        "test".to_string(),
    );
    api.schedule_repo().insert_slot(&slot).expect("插入课表失败");
    slot
}
