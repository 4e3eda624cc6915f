//! This module defines concrete implementations of the [crate::domain::ports::AssignmentRepo] port

#[cfg(any(test, feature = "memory"))]
pub mod memory;

#[cfg(feature = "postgres")]
pub mod pg_assignment_repo;
