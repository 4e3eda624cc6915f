//! An in process [AssignmentRepo] used by tests and local tooling.
//! The whole store sits behind one lock so the uniqueness check and the write of
//! [AssignmentRepo::insert] cannot interleave with another insert.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use dp_number::DpNumber;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{Assignment, NewAssignment, OwnerId, RepoErr},
    ports::AssignmentRepo,
};


/// concrete struct which implements [AssignmentRepo] in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentRepo {
    /// assignments per owner in insertion order
    assignments: Arc<RwLock<HashMap<OwnerId, Vec<Assignment>>>>,
}

impl InMemoryAssignmentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentRepo for InMemoryAssignmentRepo {
    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Assignment>, RepoErr> {
        let guard = self.assignments.read().await;
        Ok(guard
            .get(owner)
            .map(|owned| owned.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_owner_and_numbers(
        &self,
        owner: &OwnerId,
        numbers: &[DpNumber],
    ) -> Result<Vec<Assignment>, RepoErr> {
        let guard = self.assignments.read().await;
        Ok(guard
            .get(owner)
            .map(|owned| {
                owned
                    .iter()
                    .rev()
                    .filter(|a| a.numbers.iter().any(|n| numbers.contains(n)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Assignment>, RepoErr> {
        let guard = self.assignments.read().await;
        Ok(guard
            .get(owner)
            .and_then(|owned| owned.iter().find(|a| a.id == id))
            .cloned())
    }

    async fn insert(
        &self,
        owner: &OwnerId,
        assignment: NewAssignment,
    ) -> Result<Assignment, RepoErr> {
        let mut guard = self.assignments.write().await;
        let owned = guard.entry(owner.clone()).or_default();

        let taken: BTreeSet<DpNumber> = owned
            .iter()
            .flat_map(|a| a.numbers.iter())
            .filter(|n| assignment.numbers().contains(n))
            .copied()
            .collect();
        if !taken.is_empty() {
            return Err(RepoErr::NumbersTaken(taken.into_iter().collect()));
        }

        let assignment = assignment.into_assignment(owner.clone());
        owned.push(assignment.clone());
        Ok(assignment)
    }

    async fn delete_by_owner_and_id(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Assignment>, RepoErr> {
        let mut guard = self.assignments.write().await;
        let Some(owned) = guard.get_mut(owner) else {
            return Ok(None);
        };
        Ok(owned
            .iter()
            .position(|a| a.id == id)
            .map(|index| owned.remove(index)))
    }
}
