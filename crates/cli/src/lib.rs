//! AutoQA CLI
//!
//! Command-line front end for exporting recorded AutoQA runs as
//! Playwright tests.

pub mod commands;
pub mod config;
pub mod output;
