//! Service layer for the tracker.
//!
//! This module contains the business logic for:
//! - Bulletin listing pagination (`BulletinIndex`)
//! - Name to address resolution (`EntityResolver`)
//! - Change event collection (`ChangeCollector`)
//!
//! and the HTTP collaborators behind the `BulletinSource` and
//! `SanctionsSearch` traits (`TreasurySite`, `SanctionsSearchClient`).

mod collector;
mod index;
mod resolver;
mod search;
mod treasury;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BulletinLink, BulletinSections, IdentificationRecord, SearchCandidate};

pub use collector::ChangeCollector;
pub use index::BulletinIndex;
pub use resolver::{EntityResolver, extract_addresses};
pub use search::{
    SanctionsSearchClient, build_search_form, hidden_form_fields, parse_identifications,
    parse_search_results,
};
pub use treasury::{TreasurySite, is_bulletin_href, parse_bulletin, parse_listing};

/// Source of the paginated bulletin listing and the bulletin pages.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    /// Links on listing page `page` (0-based); empty when past the end.
    async fn listing_page(&self, page: usize) -> Result<Vec<BulletinLink>>;

    /// Name lists of a single bulletin.
    async fn bulletin(&self, url: &str) -> Result<BulletinSections>;
}

/// Sanctions search service and its detail records.
#[async_trait]
pub trait SanctionsSearch: Send + Sync {
    /// Run a last-name query and return the result rows.
    async fn search(&self, name: &str) -> Result<Vec<SearchCandidate>>;

    /// Identification rows of a candidate's detail record.
    async fn identifications(&self, detail_url: &str) -> Result<Vec<IdentificationRecord>>;
}
