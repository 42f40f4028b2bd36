//! Problem fixtures shared by unit tests.

use crate::config::SchedulerConfig;
use crate::ga::TimetableProblem;
use crate::models::{Day, Room, RoomKind, Subject, Teacher, TeacherCategory, TimeWindow};

const WEEKDAYS: [Day; 5] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
];

/// Teacher available Monday to Friday, 07:00–22:00.
pub(crate) fn weekday_teacher(id: &str, category: TeacherCategory, max_hours: u32) -> Teacher {
    Teacher::new(id, category)
        .with_name(format!("Teacher {id}"))
        .with_max_hours(max_hours)
        .with_window_on(&WEEKDAYS, TimeWindow::hours(7, 22))
}

/// One top teacher, one lecture room, one 6h subject of 20 students.
pub(crate) fn single_teacher_problem() -> TimetableProblem {
    TimetableProblem::new(
        vec![weekday_teacher("D1", TeacherCategory::Top, 16)],
        vec![Room::lecture("A1", 30)],
        &[Subject::new("S1", 6, 20)],
        SchedulerConfig::default(),
    )
    .unwrap()
}

/// A lone teacher is the only candidate for 12 weekly hours against an
/// 8h ceiling.
pub(crate) fn overloaded_problem() -> TimetableProblem {
    TimetableProblem::new(
        vec![weekday_teacher("D1", TeacherCategory::Top, 8)],
        vec![Room::lecture("A1", 30)],
        &[
            Subject::new("S1", 6, 20).with_eligible_teacher("D1"),
            Subject::new("S2", 6, 20).with_eligible_teacher("D1"),
        ],
        SchedulerConfig::default(),
    )
    .unwrap()
}

/// Far more slots, rooms and teacher hours than demand.
pub(crate) fn slack_problem() -> TimetableProblem {
    let teachers = vec![
        weekday_teacher("D1", TeacherCategory::Top, 20).with_specialty("math"),
        weekday_teacher("D2", TeacherCategory::Second, 24).with_specialty("chemistry"),
        weekday_teacher("D3", TeacherCategory::Hourly, 12).with_specialty("history"),
        weekday_teacher("D4", TeacherCategory::Top, 20).with_specialty("physics"),
    ];
    let rooms = vec![
        Room::lecture("A1", 40),
        Room::lecture("A2", 40),
        Room::lecture("A3", 60),
        Room::lab("L1", 30),
        Room::new("M1", 40, RoomKind::Mixed),
    ];
    let subjects = vec![
        Subject::new("MATH", 4, 30).with_specialty("math"),
        Subject::new("PHYS", 6, 25)
            .with_kind(RoomKind::Mixed)
            .with_specialty("physics"),
        Subject::new("HIST", 5, 50).with_specialty("history"),
        Subject::new("CHEM", 3, 20)
            .with_kind(RoomKind::Lab)
            .with_eligible_teacher("D2")
            .with_eligible_teacher("D3"),
    ];
    TimetableProblem::new(teachers, rooms, &subjects, SchedulerConfig::default()).unwrap()
}
