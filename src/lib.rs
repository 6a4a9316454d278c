//! `covassign` library crate.
//!
//! The binary (`covassign`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the assignment engine can be driven from other tools with in-memory tables

pub mod app;
pub mod assign;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
