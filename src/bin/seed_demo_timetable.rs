// ==========================================
// 演示数据库初始化工具
// ==========================================
// 用法: seed_demo_timetable [db_path]
// 建表、灌入示例开课与课表，并演示一次冲突检查
// ==========================================

use std::error::Error;

use campus_timetable::api::schedule_api::{CreateScheduleRequest, RescheduleRequest};
use campus_timetable::api::ScheduleApi;
use campus_timetable::domain::types::DayOfWeek;
use campus_timetable::domain::{Course, CourseOffering, TeacherAssignment};
use campus_timetable::logging;
use chrono::{NaiveDate, NaiveTime};

const DEFAULT_DB_PATH: &str = "campus_timetable_demo.sqlite3";

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("非法时间")
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    let api = ScheduleApi::new(&db_path)?;

    // 示例课程与开课
    let course_ds = Course::new("CSE-205".to_string(), "数据结构".to_string(), Some(3.0));
    let course_db = Course::new("CSE-303".to_string(), "数据库系统".to_string(), Some(3.0));
    api.offering_repo().insert_course(&course_ds)?;
    api.offering_repo().insert_course(&course_db)?;

    let offering_ds = CourseOffering::new(course_ds.course_id.clone(), 5, "A".to_string());
    let offering_db = CourseOffering::new(course_db.course_id.clone(), 5, "B".to_string());
    api.offering_repo().insert_offering(&offering_ds)?;
    api.offering_repo().insert_offering(&offering_db)?;

    api.offering_repo().insert_assignment(&TeacherAssignment::new(
        offering_ds.offering_id.clone(),
        "T01".to_string(),
    ))?;
    api.offering_repo().insert_assignment(&TeacherAssignment::new(
        offering_db.offering_id.clone(),
        "T02".to_string(),
    ))?;

    // 周一 09:00-10:00 教室101 排数据结构
    let slot = api.create_recurring_slot(CreateScheduleRequest {
        offering_id: offering_ds.offering_id.clone(),
        day_of_week: DayOfWeek::Mon,
        start_time: time(9, 0),
        end_time: time(10, 0),
        room_number: Some("101".to_string()),
        building: Some("主楼".to_string()),
        created_by: "seed".to_string(),
    })?;
    println!("已排课: {} 周一 09:00-10:00 教室101", slot.schedule_id);

    // 同教室重叠时段应报冲突
    let result = api.create_recurring_slot(CreateScheduleRequest {
        offering_id: offering_db.offering_id.clone(),
        day_of_week: DayOfWeek::Mon,
        start_time: time(9, 30),
        end_time: time(10, 30),
        room_number: Some("101".to_string()),
        building: Some("主楼".to_string()),
        created_by: "seed".to_string(),
    });
    match result {
        Err(e) => println!("预期的冲突演示: {}", e),
        Ok(_) => println!("警告: 未检测到预期冲突"),
    }

    // 冲突详情的 JSON 形式（前端表单按同一结构渲染）
    if let Some(conflict) = api.check_room_availability(
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("非法日期"),
        time(9, 30),
        time(10, 30),
        "101",
        None,
    )? {
        println!("冲突详情: {}", serde_json::to_string_pretty(&conflict)?);
    }

    // 数据库系统改排到教室202，成功
    api.create_recurring_slot(CreateScheduleRequest {
        offering_id: offering_db.offering_id.clone(),
        day_of_week: DayOfWeek::Mon,
        start_time: time(9, 30),
        end_time: time(10, 30),
        room_number: Some("202".to_string()),
        building: Some("主楼".to_string()),
        created_by: "seed".to_string(),
    })?;
    println!("已排课: 数据库系统 周一 09:30-10:30 教室202");

    // 一次性调课: 把 3月2日(周一) 的数据结构课挪到 3月4日 下午
    let reschedule = api.create_reschedule(RescheduleRequest {
        offering_id: offering_ds.offering_id.clone(),
        original_date: NaiveDate::from_ymd_opt(2026, 3, 2),
        new_date: NaiveDate::from_ymd_opt(2026, 3, 4).expect("非法日期"),
        new_start_time: time(14, 0),
        new_end_time: time(15, 0),
        room_number: Some("101".to_string()),
        reason: Some("教师出差".to_string()),
        created_by: "seed".to_string(),
    })?;
    println!("已调课: reschedule_id={}", reschedule.reschedule_id);

    // 调课后原时段在 3月2日 已释放
    let conflict = api.check_room_availability(
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("非法日期"),
        time(9, 0),
        time(10, 0),
        "101",
        None,
    )?;
    match conflict {
        None => println!("3月2日 09:00-10:00 教室101 可用（原课已调走）"),
        Some(c) => println!("仍被占用: {}", c.detail),
    }

    println!("演示数据库已写入: {}", db_path);
    Ok(())
}
