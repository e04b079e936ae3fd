//! Conformance harness for the C listener stdio shim.
//!
//! This crate provides:
//! - Fixtures: JSON case sets describing printf/scanf calls and their C output
//! - Runner: executes fixture sets against `clistener-core` in a conversion mode
//! - Verification and report generation (markdown + JSON)
//! - Structured JSONL logging for CLI operations and fixture runs
//! - Typed command-line argument parsing for the `harness printf` command

#![forbid(unsafe_code)]

pub mod cli_args;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
