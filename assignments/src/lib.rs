//! This crate defines the assignment domain following the hexagonal architecture pattern.
//!
//! The domain owns DP number ingestion and listing, the outbound module provides storage
//! adapters, and the inbound module exposes the domain over http.

pub mod domain;
#[cfg(feature = "inbound")]
pub mod inbound;
pub mod outbound;
