//! Levelr command-line front end
//!
//! Configuration loading, argument parsing, and progress rendering for the
//! `levelr` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod progress;
