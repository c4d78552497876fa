//! # IO Module
//!
//! Interface layer between HTTP clients and the domain services.
//!
//! Handlers resolve the calling actor from request headers, enforce the
//! admin gate where an operation needs it, translate DTOs into domain
//! commands and map [`LedgerError`](crate::backend::domain::LedgerError)
//! into HTTP status codes. No business rules live here.

pub mod rest;
