//! Implementation for AssignmentRepo using Postgres.
//!
//! Numbers live twice: ordered on the `assignment` row for reads, and one row per number in
//! `assignment_number`, whose `(owner_id, dp_number)` primary key is the uniqueness backstop.


use std::collections::{BTreeSet, HashSet};

use anyhow::Context;
use chrono::{DateTime, Utc};
use dp_number::DpNumber;
use sqlx::{PgPool, migrate::Migrator};
use uuid::Uuid;

use crate::domain::{
    models::{Assignment, NewAssignment, OwnerId, RepoErr},
    ports::AssignmentRepo,
};

/// The sql migrations for the assignment tables
pub static ASSIGNMENT_DB_MIGRATIONS: Migrator = sqlx::migrate!("./migrations");

/// The AssignmentPgRepo struct is a wrapper around sqlx::PgPool
#[derive(Debug, Clone)]
pub struct AssignmentPgRepo {
    /// The underlying sqlx::PgPool
    pool: PgPool,
}

impl AssignmentPgRepo {
    /// Creates a new instance of AssignmentPgRepo
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    owner_id: String,
    title: String,
    description: Option<String>,
    numbers: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = anyhow::Error;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let numbers = row
            .numbers
            .iter()
            .map(|n| n.parse::<DpNumber>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("assignment {} holds a non canonical number", row.id))?;

        Ok(Assignment {
            id: row.id,
            title: row.title,
            description: row.description,
            numbers,
            owner: OwnerId::parse(row.owner_id)?,
            created_at: row.created_at,
        })
    }
}

fn into_assignments(rows: Vec<AssignmentRow>) -> Result<Vec<Assignment>, RepoErr> {
    rows.into_iter()
        .map(|row| Assignment::try_from(row).map_err(RepoErr::from))
        .collect()
}

fn to_text(numbers: &[DpNumber]) -> Vec<String> {
    numbers.iter().map(ToString::to_string).collect()
}

impl From<sqlx::Error> for RepoErr {
    fn from(e: sqlx::Error) -> Self {
        Self::StorageLayerError(e.into())
    }
}

impl AssignmentRepo for AssignmentPgRepo {
    #[tracing::instrument(err, skip(self))]
    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Assignment>, RepoErr> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, owner_id, title, description, numbers, created_at
            FROM assignment
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner.as_ref())
        .fetch_all(&self.pool)
        .await?;

        into_assignments(rows)
    }

    #[tracing::instrument(err, skip(self))]
    async fn find_by_owner_and_numbers(
        &self,
        owner: &OwnerId,
        numbers: &[DpNumber],
    ) -> Result<Vec<Assignment>, RepoErr> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT a.id, a.owner_id, a.title, a.description, a.numbers, a.created_at
            FROM assignment a
            WHERE a.owner_id = $1
              AND EXISTS (
                SELECT 1
                FROM assignment_number n
                WHERE n.assignment_id = a.id
                  AND n.owner_id = $1
                  AND n.dp_number = ANY($2)
              )
            ORDER BY a.created_at DESC, a.id DESC
            "#,
        )
        .bind(owner.as_ref())
        .bind(to_text(numbers))
        .fetch_all(&self.pool)
        .await?;

        into_assignments(rows)
    }

    #[tracing::instrument(err, skip(self))]
    async fn find_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Assignment>, RepoErr> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, owner_id, title, description, numbers, created_at
            FROM assignment
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Assignment::try_from).transpose()?)
    }

    #[tracing::instrument(err, skip(self, assignment), fields(assignment_id = %assignment.id()))]
    async fn insert(
        &self,
        owner: &OwnerId,
        assignment: NewAssignment,
    ) -> Result<Assignment, RepoErr> {
        let numbers = to_text(assignment.numbers());
        let mut transaction = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            INSERT INTO assignment (id, owner_id, title, description, numbers, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, title, description, numbers, created_at
            "#,
        )
        .bind(assignment.id())
        .bind(owner.as_ref())
        .bind(assignment.title())
        .bind(assignment.description())
        .bind(&numbers)
        .bind(assignment.created_at())
        .fetch_one(&mut *transaction)
        .await?;

        // a concurrent insert of the same number blocks here until the other transaction settles.
        // rows go in sorted so overlapping batches lock their index entries in the same order
        let inserted: Vec<String> = sqlx::query_scalar(
            r#"
            INSERT INTO assignment_number (owner_id, dp_number, assignment_id, position)
            SELECT $1, n.dp_number, $2, n.position::INTEGER
            FROM UNNEST($3::TEXT[]) WITH ORDINALITY AS n(dp_number, position)
            ORDER BY n.dp_number
            ON CONFLICT (owner_id, dp_number) DO NOTHING
            RETURNING dp_number
            "#,
        )
        .bind(owner.as_ref())
        .bind(assignment.id())
        .bind(&numbers)
        .fetch_all(&mut *transaction)
        .await?;

        if inserted.len() != numbers.len() {
            transaction.rollback().await?;

            let inserted: HashSet<&str> = inserted.iter().map(String::as_str).collect();
            let taken: BTreeSet<DpNumber> = assignment
                .numbers()
                .iter()
                .filter(|n| !inserted.contains(n.to_string().as_str()))
                .copied()
                .collect();
            tracing::warn!(count = taken.len(), "unique constraint rejected numbers");
            return Err(RepoErr::NumbersTaken(taken.into_iter().collect()));
        }

        transaction.commit().await?;

        Ok(Assignment::try_from(row)?)
    }

    #[tracing::instrument(err, skip(self))]
    async fn delete_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Assignment>, RepoErr> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            DELETE FROM assignment
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, numbers, created_at
            "#,
        )
        .bind(id)
        .bind(owner.as_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Assignment::try_from).transpose()?)
    }
}
