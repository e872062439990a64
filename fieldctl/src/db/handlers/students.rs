//! Database repositories for students and their clinical cases.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::students::{
        CaseCreateDBRequest, CaseDBResponse, CaseStatus, CaseUpdateDBRequest, StudentCreateDBRequest, StudentDBResponse,
        StudentUpdateDBRequest,
    },
};
use crate::types::{CaseId, ImplementerId, SchoolId, StudentId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

const STUDENT_COLUMNS: &str = "id, implementer_id, school_id, name, grade, created_at";
const CASE_COLUMNS: &str = "id, implementer_id, student_id, fellow_id, status, notes, opened_at, closed_at";

/// Filter for listing students
#[derive(Debug, Clone)]
pub struct StudentFilter {
    pub implementer_id: ImplementerId,
    pub school_id: Option<SchoolId>,
    pub skip: i64,
    pub limit: i64,
}

// Database entity models
#[derive(Debug, Clone, FromRow)]
struct Student {
    id: StudentId,
    implementer_id: ImplementerId,
    school_id: SchoolId,
    name: String,
    grade: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct Case {
    id: CaseId,
    implementer_id: ImplementerId,
    student_id: StudentId,
    fellow_id: Uuid,
    status: CaseStatus,
    notes: Option<String>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl From<Student> for StudentDBResponse {
    fn from(row: Student) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            school_id: row.school_id,
            name: row.name,
            grade: row.grade,
            created_at: row.created_at,
        }
    }
}

impl From<Case> for CaseDBResponse {
    fn from(row: Case) -> Self {
        Self {
            id: row.id,
            implementer_id: row.implementer_id,
            student_id: row.student_id,
            fellow_id: row.fellow_id,
            status: row.status,
            notes: row.notes,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
        }
    }
}

pub struct Students<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Students<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Students<'c> {
    type CreateRequest = StudentCreateDBRequest;
    type UpdateRequest = StudentUpdateDBRequest;
    type Response = StudentDBResponse;
    type Id = (ImplementerId, StudentId);
    type Filter = StudentFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO students (id, implementer_id, school_id, name, grade, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {STUDENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.grade)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(StudentDBResponse::from(row))
    }

    async fn get_by_id(&mut self, (implementer_id, id): Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(StudentDBResponse::from))
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE implementer_id = ?");
        if filter.school_id.is_some() {
            sql.push_str(" AND school_id = ?");
        }
        sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Student>(&sql).bind(filter.implementer_id);
        if let Some(school_id) = filter.school_id {
            query = query.bind(school_id);
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(StudentDBResponse::from).collect())
    }

    async fn update(&mut self, (implementer_id, id): Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE students
            SET school_id = COALESCE(?, school_id),
                name = COALESCE(?, name),
                grade = COALESCE(?, grade)
            WHERE id = ? AND implementer_id = ?
            RETURNING {STUDENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(request.school_id)
            .bind(&request.name)
            .bind(&request.grade)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(StudentDBResponse::from(row))
    }

    async fn delete(&mut self, (implementer_id, id): Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Clinical cases, always accessed through their student.
pub struct Cases<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Cases<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    pub async fn create(&mut self, request: &CaseCreateDBRequest) -> Result<CaseDBResponse> {
        let sql = format!(
            r#"
            INSERT INTO cases (id, implementer_id, student_id, fellow_id, status, notes, opened_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {CASE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Case>(&sql)
            .bind(Uuid::new_v4())
            .bind(request.implementer_id)
            .bind(request.student_id)
            .bind(request.fellow_id)
            .bind(CaseStatus::Open)
            .bind(&request.notes)
            .bind(Utc::now())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(CaseDBResponse::from(row))
    }

    pub async fn get_by_id(&mut self, (implementer_id, id): (ImplementerId, CaseId)) -> Result<Option<CaseDBResponse>> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ? AND implementer_id = ?");
        let row = sqlx::query_as::<_, Case>(&sql)
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(CaseDBResponse::from))
    }

    pub async fn list_for_student(&mut self, implementer_id: ImplementerId, student_id: StudentId) -> Result<Vec<CaseDBResponse>> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE implementer_id = ? AND student_id = ? ORDER BY opened_at DESC");
        let rows = sqlx::query_as::<_, Case>(&sql)
            .bind(implementer_id)
            .bind(student_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(CaseDBResponse::from).collect())
    }

    /// Partial update. Moving the status to `closed` stamps `closed_at`;
    /// reopening clears it.
    pub async fn update(&mut self, (implementer_id, id): (ImplementerId, CaseId), request: &CaseUpdateDBRequest) -> Result<CaseDBResponse> {
        let sql = format!(
            r#"
            UPDATE cases
            SET fellow_id = COALESCE(?, fellow_id),
                status = COALESCE(?, status),
                notes = COALESCE(?, notes),
                closed_at = CASE WHEN COALESCE(?, status) = 'closed' THEN COALESCE(closed_at, ?) ELSE NULL END
            WHERE id = ? AND implementer_id = ?
            RETURNING {CASE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Case>(&sql)
            .bind(request.fellow_id)
            .bind(request.status)
            .bind(&request.notes)
            .bind(request.status)
            .bind(Utc::now())
            .bind(id)
            .bind(implementer_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(CaseDBResponse::from(row))
    }

    pub async fn delete(&mut self, (implementer_id, id): (ImplementerId, CaseId)) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cases WHERE id = ? AND implementer_id = ?")
            .bind(id)
            .bind(implementer_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
