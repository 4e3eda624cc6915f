//! Contains the service logic for assignments

use std::collections::{BTreeSet, HashSet};

use dp_number::DpNumber;
use uuid::Uuid;

use crate::domain::{
    models::{Assignment, AssignmentErr, CreateAssignmentRequest, NewAssignment, OwnerId},
    ports::{AssignmentRepo, AssignmentService},
};

#[cfg(test)]
mod tests;

/// Implementation of the [AssignmentService] using an [AssignmentRepo]
#[derive(Debug, Clone)]
pub struct AssignmentServiceImpl<R> {
    /// The underlying assignment repository
    repo: R,
}

impl<R> AssignmentServiceImpl<R>
where
    R: AssignmentRepo,
{
    /// Creates a new AssignmentServiceImpl
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// the numbers of the batch which the owner already holds, in ascending order
    async fn held_numbers(
        &self,
        owner: &OwnerId,
        numbers: &[DpNumber],
    ) -> Result<Vec<DpNumber>, AssignmentErr> {
        let requested: HashSet<&DpNumber> = numbers.iter().collect();
        let held: BTreeSet<DpNumber> = self
            .repo
            .find_by_owner_and_numbers(owner, numbers)
            .await?
            .into_iter()
            .flat_map(|assignment| assignment.numbers)
            .filter(|number| requested.contains(number))
            .collect();
        Ok(held.into_iter().collect())
    }
}

impl<R> AssignmentService for AssignmentServiceImpl<R>
where
    R: AssignmentRepo,
{
    #[tracing::instrument(err, skip(self), fields(owner = %owner))]
    async fn list_assignments(&self, owner: &OwnerId) -> Result<Vec<Assignment>, AssignmentErr> {
        Ok(self.repo.find_by_owner(owner).await?)
    }

    #[tracing::instrument(err(level = "warn"), skip(self, request), fields(owner = %owner))]
    async fn create_assignment(
        &self,
        owner: &OwnerId,
        request: CreateAssignmentRequest,
    ) -> Result<Assignment, AssignmentErr> {
        let new_assignment = NewAssignment::validate(request)?;

        let held = self.held_numbers(owner, new_assignment.numbers()).await?;
        if !held.is_empty() {
            return Err(AssignmentErr::CrossRecordDuplicate(held));
        }

        // the pre-check above can race with a concurrent insert, the store has the final word
        let assignment = self.repo.insert(owner, new_assignment).await?;

        tracing::info!(
            assignment_id = %assignment.id,
            numbers = assignment.numbers.len(),
            "created assignment"
        );

        Ok(assignment)
    }

    #[tracing::instrument(err, skip(self), fields(owner = %owner))]
    async fn list_all_numbers(&self, owner: &OwnerId) -> Result<Vec<DpNumber>, AssignmentErr> {
        let numbers: BTreeSet<DpNumber> = self
            .repo
            .find_by_owner(owner)
            .await?
            .into_iter()
            .flat_map(|assignment| assignment.numbers)
            .collect();
        Ok(numbers.into_iter().collect())
    }

    #[tracing::instrument(err(level = "warn"), skip(self), fields(owner = %owner))]
    async fn get_assignment(&self, owner: &OwnerId, id: Uuid) -> Result<Assignment, AssignmentErr> {
        self.repo
            .find_by_owner_and_id(owner, id)
            .await?
            .ok_or(AssignmentErr::NotFound)
    }

    #[tracing::instrument(err(level = "warn"), skip(self), fields(owner = %owner))]
    async fn delete_assignment(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Assignment, AssignmentErr> {
        let deleted = self
            .repo
            .delete_by_owner_and_id(owner, id)
            .await?
            .ok_or(AssignmentErr::NotFound)?;

        tracing::info!(assignment_id = %deleted.id, "deleted assignment");

        Ok(deleted)
    }
}
