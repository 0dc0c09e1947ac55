//! Core business logic module
//!
//! This module contains the domain models, collaborators and the fetch
//! pipeline that ties them together.

pub mod config;
pub mod downloader;
pub mod layout;
pub mod manager;
pub mod manifest;
pub mod models;
pub mod youtube_downloader;

#[cfg(test)]
mod manager_test;

// Re-export commonly used types
pub use config::FetcherConfig;
pub use manager::FetchManager;
