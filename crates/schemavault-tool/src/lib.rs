//! External changelog tool integration for schemavault.
//!
//! Schema capture and replay are delegated to Liquibase, run as a child
//! process. This crate spawns it, collects its output, and turns a nonzero
//! exit into a [`ToolError`] that still carries everything the tool printed,
//! so operators can read the failure from the HTTP response alone.
//!
//! A single call is a single invocation: nothing here retries.

pub mod error;
pub mod liquibase;
pub mod runner;

pub use error::ToolError;
pub use liquibase::{Invocation, LiquibaseCommand, PASSWORD_ENV};
pub use runner::{ChangelogTool, ProcessRunner, RunOptions, ToolOutput};
