//! Core types and shared functionality for kiosk.
//!
//! This crate provides:
//! - In-memory TTL cache and deterministic cache-key construction
//! - Static reference tables (countries, categories, curated sources)
//! - Configuration structures

pub mod cache;
pub mod catalog;
pub mod config;

pub use cache::{MemoryCache, key};
pub use config::AppConfig;
