//! CLI library components for the outbreak estimator.

#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod logging;
