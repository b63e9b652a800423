//! Data models: document input, extracted fields, and configuration.

pub mod config;
pub mod document;
pub mod input;
