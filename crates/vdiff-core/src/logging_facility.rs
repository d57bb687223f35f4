//! Structured logs for the boundary operations of vdiff
//!
//! Parsing, construction, refinement and unparsing each log one `start`
//! event and then one `end` or `end_error` event under a stable `op` name.
//! The binary picks an output format once through [`init`]; tests install
//! [`init_test_capture`] instead and assert on the captured fields.
//!
//! ```rust
//! use vdiff_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```
//!
//! Field names are the constants of [`vdiff_core_types::schema`].

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
