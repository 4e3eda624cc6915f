//! Contains the models for assignments

use std::fmt;

use chrono::{DateTime, Utc};
use dp_number::{DpNumber, InvalidDpNumber, RawToken};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::ingest;

#[cfg(test)]
mod tests;

/// The verified identity of the caller. Every read and write is scoped to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

/// The owner id was empty
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("owner id must not be empty")]
pub struct EmptyOwnerId;

impl OwnerId {
    /// parse an owner id from the identity handed over by authentication
    pub fn parse(value: impl Into<String>) -> Result<Self, EmptyOwnerId> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyOwnerId);
        }
        Ok(OwnerId(value))
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = EmptyOwnerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OwnerId::parse(value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

/// A persisted assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// canonical DP numbers in submission order
    #[schema(value_type = Vec<String>, example = json!(["DP0002", "DP0010"]))]
    pub numbers: Vec<DpNumber>,
    #[serde(rename = "createdBy")]
    #[schema(value_type = String)]
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
}

/// The body of a create assignment request, exactly as the client sent it
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// DP numbers as strings (`"DP12"`, `"12"`) or json numbers
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>, example = json!(["DP12", 7, "dp0003"]))]
    pub numbers: Option<Vec<RawToken>>,
}

/// An assignment which passed every batch-local check and is ready to be handed to storage.
/// It can only be built through [NewAssignment::validate].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    id: Uuid,
    title: String,
    description: Option<String>,
    numbers: Vec<DpNumber>,
    created_at: DateTime<Utc>,
}

impl NewAssignment {
    /// Validate the title, then canonicalize and dedupe-check the numbers.
    /// Nothing here touches storage.
    pub fn validate(request: CreateAssignmentRequest) -> Result<Self, AssignmentErr> {
        let CreateAssignmentRequest {
            title,
            description,
            numbers,
        } = request;

        let title = ingest::validate_title(title.as_deref())?;
        let numbers = ingest::canonicalize_batch(numbers.as_deref())?;

        Ok(NewAssignment {
            id: Uuid::new_v7(Timestamp::now(NoContext)),
            title,
            description: description.filter(|d| !d.trim().is_empty()),
            numbers,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn numbers(&self) -> &[DpNumber] {
        &self.numbers
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// attach the owner, producing the record as it is persisted
    pub fn into_assignment(self, owner: OwnerId) -> Assignment {
        Assignment {
            id: self.id,
            title: self.title,
            description: self.description,
            numbers: self.numbers,
            owner,
            created_at: self.created_at,
        }
    }
}

fn join_numbers(numbers: &[DpNumber]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced by the assignment service
#[derive(Debug, Error)]
pub enum AssignmentErr {
    /// The title was missing or blank
    #[error("Title is required")]
    EmptyTitle,
    /// No DP numbers were submitted
    #[error("At least one DP number is required")]
    EmptyBatch,
    /// A token could not be canonicalized
    #[error("Invalid DP number format: {token:?}")]
    InvalidIdentifierFormat {
        token: String,
        source: InvalidDpNumber,
    },
    /// The batch contains the same number more than once
    #[error("Duplicate DP numbers in request: {}", join_numbers(.0))]
    IntraBatchDuplicate(Vec<DpNumber>),
    /// The owner already holds some of the numbers in another assignment
    #[error("DP numbers already assigned: {}", join_numbers(.0))]
    CrossRecordDuplicate(Vec<DpNumber>),
    /// The assignment does not exist or is not owned by the caller
    #[error("Assignment not found")]
    NotFound,
    /// Storage layer error
    #[error("Storage layer error")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl From<InvalidDpNumber> for AssignmentErr {
    fn from(source: InvalidDpNumber) -> Self {
        AssignmentErr::InvalidIdentifierFormat {
            token: source.token().to_string(),
            source,
        }
    }
}

/// Errors produced by the storage port
#[derive(Debug, Error)]
pub enum RepoErr {
    /// The uniqueness constraint rejected the insert; these numbers are already held by the owner
    #[error("DP numbers already held by owner: {}", join_numbers(.0))]
    NumbersTaken(Vec<DpNumber>),
    /// Storage layer error
    #[error("Storage layer error {0}")]
    StorageLayerError(#[from] anyhow::Error),
}

impl From<RepoErr> for AssignmentErr {
    fn from(err: RepoErr) -> Self {
        match err {
            RepoErr::NumbersTaken(numbers) => AssignmentErr::CrossRecordDuplicate(numbers),
            RepoErr::StorageLayerError(e) => AssignmentErr::StorageUnavailable(e),
        }
    }
}
