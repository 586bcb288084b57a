//! CLI command implementations
//!
//! This module contains all command implementations for the kiln CLI.

pub mod info;
pub mod invoke;
pub mod list;
pub mod run;
