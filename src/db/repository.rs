use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use crate::dates::normalize_date;
use crate::models::{Assignment, AssignmentType, CourseFolder, Priority};
use crate::store::PersistedState;

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: String,
    title: String,
    course: String,
    due_date: Option<String>,
    kind: String,
    description: Option<String>,
    priority: String,
    completed: bool,
}

#[derive(Debug, FromRow)]
struct CourseFolderRow {
    id: String,
    name: String,
    color: String,
    semester: Option<String>,
    year: Option<i32>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        let due_date = row.due_date.as_deref().and_then(|text| {
            let parsed = normalize_date(text);
            if parsed.is_none() {
                warn!("assignment {} has unreadable due date {:?}; dropping it", row.id, text);
            }
            parsed
        });
        Assignment {
            due_date,
            kind: AssignmentType::from_label(&row.kind),
            priority: Priority::from_label(&row.priority).unwrap_or(Priority::Low),
            id: row.id,
            title: row.title,
            course: row.course,
            description: row.description,
            completed: row.completed,
        }
    }
}

impl From<CourseFolderRow> for CourseFolder {
    fn from(row: CourseFolderRow) -> Self {
        CourseFolder {
            id: row.id,
            name: row.name,
            color: row.color,
            semester: row.semester,
            year: row.year,
        }
    }
}

pub async fn fetch_assignments(db: &SqlitePool) -> Result<Vec<Assignment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT id, title, course, due_date, kind, description, priority, completed
        FROM assignments
        ORDER BY position ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Assignment::from).collect())
}

pub async fn fetch_course_folders(db: &SqlitePool) -> Result<Vec<CourseFolder>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseFolderRow>(
        r#"
        SELECT id, name, color, semester, year
        FROM course_folders
        ORDER BY position ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(CourseFolder::from).collect())
}

pub async fn load_state(db: &SqlitePool) -> Result<PersistedState, sqlx::Error> {
    Ok(PersistedState {
        assignments: fetch_assignments(db).await?,
        course_folders: fetch_course_folders(db).await?,
    })
}

/// Replace the stored snapshot with `state` in one transaction.
pub async fn save_state(db: &SqlitePool, state: &PersistedState) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM assignments").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM course_folders").execute(&mut *tx).await?;

    for (position, a) in state.assignments.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO assignments
                (id, position, title, course, due_date, kind, description, priority, completed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&a.id)
        .bind(position as i64)
        .bind(&a.title)
        .bind(&a.course)
        .bind(a.due_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(a.kind.as_str())
        .bind(&a.description)
        .bind(a.priority.as_str())
        .bind(a.completed)
        .execute(&mut *tx)
        .await?;
    }

    for (position, f) in state.course_folders.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO course_folders (id, position, name, color, semester, year)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&f.id)
        .bind(position as i64)
        .bind(&f.name)
        .bind(&f.color)
        .bind(&f.semester)
        .bind(f.year)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
