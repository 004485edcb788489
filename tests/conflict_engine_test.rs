// ==========================================
// 冲突引擎集成测试
// ==========================================
// 职责: 验证可用性检查器与冲突分类器在真实 SQLite 上的判定行为
// 场景: 教室/教师/班级三维度、调课覆盖、自排除、优先级顺序
// ==========================================

mod helpers;

use campus_timetable::domain::types::{ConflictScope, DayOfWeek, ScopeConstraint};
use campus_timetable::domain::RescheduleRecord;
use campus_timetable::engine::error::EngineError;
use campus_timetable::engine::{AvailabilityChecker, ConflictClassifier, ScheduleCheckRequest};
use campus_timetable::repository::{OfferingDirectory, ScheduleRepository};
use helpers::{create_test_api, date, monday, seed_offering, seed_slot, time};
use std::sync::Arc;

fn build_engine(
    api: &campus_timetable::api::ScheduleApi,
) -> (AvailabilityChecker, ConflictClassifier) {
    let schedule_repo = Arc::clone(api.schedule_repo()) as Arc<dyn ScheduleRepository>;
    let offering_repo = Arc::clone(api.offering_repo()) as Arc<dyn OfferingDirectory>;
    (
        AvailabilityChecker::new(Arc::clone(&schedule_repo)),
        ConflictClassifier::new(schedule_repo, offering_repo),
    )
}

fn room_scope(room: &str) -> ScopeConstraint {
    ScopeConstraint::Room {
        room_number: room.to_string(),
        building: None,
    }
}

fn check_request(offering_id: &str, room: Option<&str>) -> ScheduleCheckRequest {
    ScheduleCheckRequest {
        offering_id: offering_id.to_string(),
        date: monday(),
        start_time: time(9, 30),
        end_time: time(10, 30),
        room_number: room.map(|r| r.to_string()),
        building: None,
        teacher_id: None,
        exclude_reschedule_id: None,
    }
}

// ==========================================
// 场景A: 教室占用 → 教室冲突，描述含占用课程
// ==========================================
#[test]
fn test_scenario_a_room_conflict() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    let conflict = checker
        .find_conflict(monday(), time(9, 30), time(10, 30), &room_scope("101"), None)
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Room);
    assert!(conflict.detail.contains("CSE-205"));
    assert!(conflict.detail.contains("09:00-10:00"));
}

// ==========================================
// 场景B: 该日期的课已被调走 → 教室释放
// ==========================================
#[test]
fn test_scenario_b_override_frees_room() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    // 3月2日(周一) 的这次课被调到别处
    let record = RescheduleRecord::new(
        offering.clone(),
        Some(monday()),
        date(2026, 3, 4),
        time(14, 0),
        time(15, 0),
        Some("303".to_string()),
        None,
        "test".to_string(),
    );
    api.schedule_repo()
        .insert_reschedule(&record)
        .expect("插入调课失败");

    // 当天原时段可用
    let conflict = checker
        .find_conflict(monday(), time(9, 30), time(10, 30), &room_scope("101"), None)
        .expect("检查失败");
    assert!(conflict.is_none());

    // 覆盖只作用于该日期，下周一仍被占用
    let next_monday = date(2026, 3, 9);
    let conflict = checker
        .find_conflict(next_monday, time(9, 30), time(10, 30), &room_scope("101"), None)
        .expect("检查失败");
    assert!(conflict.is_some());
}

// ==========================================
// 场景C: 教室不同但教师相同 → 教师冲突
// ==========================================
#[test]
fn test_scenario_c_teacher_conflict() {
    let (_tmp, api) = create_test_api();
    let (_, classifier) = build_engine(&api);

    let offering_a = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering_a, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    // 同一教师的另一开课（不同班级避免班级冲突先命中）
    let offering_b = seed_offering(&api, "CSE-303", 6, "B", Some("T01"));
    let conflict = classifier
        .check_schedule_conflicts(&check_request(&offering_b, Some("202")))
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Teacher);
    assert!(conflict.detail.contains("CSE-205"));
}

// ==========================================
// 场景D: 教室与教师都不同但同班级 → 班级冲突
// ==========================================
#[test]
fn test_scenario_d_batch_conflict_only() {
    let (_tmp, api) = create_test_api();
    let (_, classifier) = build_engine(&api);

    let offering_a = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering_a, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    // 同学期同班别、不同教师、不同教室
    let offering_b = seed_offering(&api, "CSE-303", 5, "A", Some("T02"));
    let conflict = classifier
        .check_schedule_conflicts(&check_request(&offering_b, Some("202")))
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Batch);
    assert!(conflict.detail.contains("CSE-205"));
}

// ==========================================
// 场景E: 教室号空白 → 教室维度恒可用
// ==========================================
#[test]
fn test_scenario_e_blank_room_always_available() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    for blank in ["", "   "] {
        let conflict = checker
            .find_conflict(monday(), time(9, 0), time(10, 0), &room_scope(blank), None)
            .expect("检查失败");
        assert!(conflict.is_none(), "空白教室号不应产生教室冲突");
    }
}

// ==========================================
// 边界: 端点相接不冲突
// ==========================================
#[test]
fn test_touching_endpoints_not_conflict() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    // 10:00-11:00 紧接 09:00-10:00，不冲突
    let conflict = checker
        .find_conflict(monday(), time(10, 0), time(11, 0), &room_scope("101"), None)
        .expect("检查失败");
    assert!(conflict.is_none());

    // 08:00-09:00 同理
    let conflict = checker
        .find_conflict(monday(), time(8, 0), time(9, 0), &room_scope("101"), None)
        .expect("检查失败");
    assert!(conflict.is_none());
}

// ==========================================
// 空库可用 + 幂等性
// ==========================================
#[test]
fn test_empty_store_available_and_idempotent() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let first = checker
        .is_available(monday(), time(9, 0), time(10, 0), &room_scope("101"), None)
        .expect("检查失败");
    assert!(first);

    // 无写入介入时重复调用结果一致
    let second = checker
        .is_available(monday(), time(9, 0), time(10, 0), &room_scope("101"), None)
        .expect("检查失败");
    assert_eq!(first, second);
}

// ==========================================
// 调课记录作为冲突来源，描述带调课标记
// ==========================================
#[test]
fn test_reschedule_as_conflict_source() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    let record = RescheduleRecord::new(
        offering,
        None,
        monday(),
        time(9, 0),
        time(10, 0),
        Some("101".to_string()),
        None,
        "test".to_string(),
    );
    api.schedule_repo()
        .insert_reschedule(&record)
        .expect("插入调课失败");

    let conflict = checker
        .find_conflict(monday(), time(9, 30), time(10, 30), &room_scope("101"), None)
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Room);
    assert!(conflict.detail.contains("CSE-205"));
    assert!(conflict.detail.contains("调课"));

    // 已取消的调课记录不再构成占用
    api.schedule_repo()
        .cancel_reschedule(&record.reschedule_id)
        .expect("取消失败");
    let conflict = checker
        .find_conflict(monday(), time(9, 30), time(10, 30), &room_scope("101"), None)
        .expect("检查失败");
    assert!(conflict.is_none());
}

// ==========================================
// 自排除定律: 唯一的冲突来源是自己时判定可用
// ==========================================
#[test]
fn test_self_exclusion_law() {
    let (_tmp, api) = create_test_api();
    let (checker, _) = build_engine(&api);

    let offering = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    let record = RescheduleRecord::new(
        offering,
        None,
        monday(),
        time(9, 0),
        time(10, 0),
        Some("101".to_string()),
        None,
        "test".to_string(),
    );
    api.schedule_repo()
        .insert_reschedule(&record)
        .expect("插入调课失败");

    // 不排除时与自己冲突
    assert!(!checker
        .is_available(monday(), time(9, 0), time(10, 0), &room_scope("101"), None)
        .expect("检查失败"));

    // 排除自身后可用（未改动重新保存的场景）
    assert!(checker
        .is_available(
            monday(),
            time(9, 0),
            time(10, 0),
            &room_scope("101"),
            Some(record.reschedule_id.as_str())
        )
        .expect("检查失败"));
}

// ==========================================
// 优先级顺序: 教室 → 教师 → 班级，首个命中即返回
// ==========================================
#[test]
fn test_priority_order_room_before_teacher_before_batch() {
    let (_tmp, api) = create_test_api();
    let (_, classifier) = build_engine(&api);

    // 已有课: 教室101、教师T01、学期5班别A 全部被 CSE-205 占用
    let offering_a = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering_a, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));

    // 新开课与其同教室+同教师+同班级: 三个维度同时冲突
    let offering_b = seed_offering(&api, "CSE-303", 5, "A", Some("T01"));
    let conflict = classifier
        .check_schedule_conflicts(&check_request(&offering_b, Some("101")))
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Room, "教室维度应最先报告");

    // 换教室后教师维度次之
    let conflict = classifier
        .check_schedule_conflicts(&check_request(&offering_b, Some("202")))
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Teacher);

    // 教室号空白同样跳到教师维度
    let conflict = classifier
        .check_schedule_conflicts(&check_request(&offering_b, None))
        .expect("检查失败")
        .expect("应检出冲突");
    assert_eq!(conflict.scope, ConflictScope::Teacher);
}

// ==========================================
// 前置条件: 开课不存在是独立错误，不是冲突
// ==========================================
#[test]
fn test_offering_not_found_is_precondition_error() {
    let (_tmp, api) = create_test_api();
    let (_, classifier) = build_engine(&api);

    let result = classifier.check_schedule_conflicts(&check_request("不存在的开课", Some("101")));
    assert!(matches!(
        result,
        Err(EngineError::OfferingNotFound { .. })
    ));
}

// ==========================================
// 独立教室检查与完整检查的教室步骤判定一致
// ==========================================
#[test]
fn test_room_availability_parity_with_classifier() {
    let (_tmp, api) = create_test_api();
    let (_, classifier) = build_engine(&api);

    let offering_a = seed_offering(&api, "CSE-205", 5, "A", Some("T01"));
    seed_slot(&api, &offering_a, DayOfWeek::Mon, time(9, 0), time(10, 0), Some("101"));
    let offering_b = seed_offering(&api, "CSE-303", 6, "B", Some("T02"));

    // 冲突场合两者都拒绝
    let standalone = classifier
        .check_room_availability(monday(), time(9, 30), time(10, 30), "101", None, None)
        .expect("检查失败");
    let full = classifier
        .check_schedule_conflicts(&check_request(&offering_b, Some("101")))
        .expect("检查失败");
    assert!(standalone.is_some());
    assert!(full.is_some());
    assert_eq!(full.unwrap().scope, ConflictScope::Room);

    // 可用场合两者都接受
    let standalone = classifier
        .check_room_availability(monday(), time(10, 0), time(11, 0), "101", None, None)
        .expect("检查失败");
    assert!(standalone.is_none());
}
