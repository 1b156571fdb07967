use chrono::NaiveDate;
use coursetrack::db::{self, repository};
use coursetrack::models::{AssignmentType, CourseFolder, NewAssignment, NewCourseFolder, Priority};
use coursetrack::store::{PersistedState, Tracker};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_empty_database_loads_empty_state() {
    let pool = db::connect_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let state = repository::load_state(&pool).await.unwrap();
    assert_eq!(state, PersistedState::default());
}

#[tokio::test]
async fn test_snapshot_round_trip_keeps_order_and_fields() {
    let pool = db::connect_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let now = date(2025, 11, 1);
    let mut tracker = Tracker::new();
    tracker
        .courses
        .add_folder(NewCourseFolder {
            name: "CS 101".to_string(),
            color: Some("green".to_string()),
            semester: Some("Fall".to_string()),
            year: Some(2025),
        })
        .unwrap();
    tracker.assignments.create(
        NewAssignment {
            title: "Quiz 1".to_string(),
            course: "CS 101".to_string(),
            due_date: Some(now),
            kind: AssignmentType::Quiz,
            description: Some("chapters 1-2".to_string()),
        },
        now,
    );
    tracker.assignments.create(
        NewAssignment {
            title: "Essay".to_string(),
            course: "ENG 200".to_string(),
            ..Default::default()
        },
        now,
    );

    let state = tracker.state();
    repository::save_state(&pool, &state).await.unwrap();
    let loaded = repository::load_state(&pool).await.unwrap();
    assert_eq!(loaded, state);

    let quiz = &loaded.assignments[0];
    assert_eq!(quiz.kind, AssignmentType::Quiz);
    assert_eq!(quiz.priority, Priority::High);
    assert_eq!(quiz.due_date, Some(now));
    assert_eq!(loaded.assignments[1].due_date, None);
}

#[tokio::test]
async fn test_save_replaces_previous_snapshot() {
    let pool = db::connect_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let first = PersistedState {
        assignments: vec![],
        course_folders: vec![
            CourseFolder {
                id: "a".to_string(),
                name: "Bio".to_string(),
                color: "blue".to_string(),
                semester: None,
                year: None,
            },
            CourseFolder {
                id: "b".to_string(),
                name: "Chem".to_string(),
                color: "red".to_string(),
                semester: None,
                year: None,
            },
        ],
    };
    repository::save_state(&pool, &first).await.unwrap();

    let second = PersistedState {
        assignments: vec![],
        course_folders: vec![first.course_folders[1].clone()],
    };
    repository::save_state(&pool, &second).await.unwrap();

    let folders = repository::fetch_course_folders(&pool).await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, "b");
}
