// src/models/mod.rs

//! Domain models for the tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod bulletin;
mod candidate;
mod change;
mod config;

// Re-export all public types
pub use bulletin::{BulletinLink, BulletinSections, SectionKind, classify_heading};
pub use candidate::{IdentificationRecord, ResolvedAddress, SearchCandidate};
pub use change::ChangeEvent;
pub use config::{
    Config, CrawlerConfig, PathsConfig, ResolverConfig, SelfTestConfig, SourceConfig,
};
