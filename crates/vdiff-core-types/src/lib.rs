//! Core types shared across vdiff facilities
//!
//! This crate provides the canonical schema used by both the error handling
//! and the logging facilities:
//!
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
