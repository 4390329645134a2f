//! Use-case services over the parcel repository.
//!
//! # Responsibility
//! - Orchestrate repository calls into application-level entry points.
//! - Keep callers decoupled from storage details.

pub mod parcel_service;
