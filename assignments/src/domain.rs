//! This module defines all members of the assignment domain

pub mod ingest;
pub mod models;
pub mod ports;
pub mod service;
