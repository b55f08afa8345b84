//! Core domain + application logic for the Hermes storage bot.
//!
//! This crate is intentionally framework-agnostic. Discord and S3 live behind
//! ports (traits) implemented in adapter crates.

pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod gate;
pub mod keys;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod presence;
pub mod upload;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result, UploadError};
