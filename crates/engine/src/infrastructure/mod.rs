//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod app_settings;
pub mod cache;
pub mod in_memory;
pub mod marketplace;
pub mod ports;
pub mod profanity;
pub mod title_metadata;
pub mod xbox_unity;
