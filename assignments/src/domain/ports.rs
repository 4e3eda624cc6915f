//! This module defines the ports the assignment domain requires and exposes

use dp_number::DpNumber;
use uuid::Uuid;

use crate::domain::models::{
    Assignment, AssignmentErr, CreateAssignmentRequest, NewAssignment, OwnerId, RepoErr,
};

/// The storage collaborator. Every call is scoped to an owner.
#[cfg_attr(test, mockall::automock)]
pub trait AssignmentRepo: Send + Sync + 'static {
    /// all assignments of the owner, newest first
    fn find_by_owner(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RepoErr>> + Send;

    /// the assignments of the owner which hold at least one of the input numbers
    fn find_by_owner_and_numbers(
        &self,
        owner: &OwnerId,
        numbers: &[DpNumber],
    ) -> impl Future<Output = Result<Vec<Assignment>, RepoErr>> + Send;

    /// a single assignment, if it exists and belongs to the owner
    fn find_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Assignment>, RepoErr>> + Send;

    /// Atomically persist the assignment together with all of its numbers.
    /// Must fail with [RepoErr::NumbersTaken] rather than persist a number the owner already holds.
    fn insert(
        &self,
        owner: &OwnerId,
        assignment: NewAssignment,
    ) -> impl Future<Output = Result<Assignment, RepoErr>> + Send;

    /// delete the assignment if it belongs to the owner, returning what was deleted
    fn delete_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Assignment>, RepoErr>> + Send;
}

/// The operations the assignment domain exposes to inbound adapters
pub trait AssignmentService: Send + Sync + 'static {
    /// all assignments of the owner, newest first
    fn list_assignments(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<Assignment>, AssignmentErr>> + Send;

    /// validate and persist a new assignment
    fn create_assignment(
        &self,
        owner: &OwnerId,
        request: CreateAssignmentRequest,
    ) -> impl Future<Output = Result<Assignment, AssignmentErr>> + Send;

    /// every number the owner holds, deduplicated and in ascending numeric order
    fn list_all_numbers(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<DpNumber>, AssignmentErr>> + Send;

    /// the assignment if the owner holds it, [AssignmentErr::NotFound] otherwise
    fn get_assignment(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> impl Future<Output = Result<Assignment, AssignmentErr>> + Send;

    /// delete the assignment if the owner holds it, [AssignmentErr::NotFound] otherwise
    fn delete_assignment(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> impl Future<Output = Result<Assignment, AssignmentErr>> + Send;
}
