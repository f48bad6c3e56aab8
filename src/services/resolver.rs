// src/services/resolver.rs

//! Name to address resolution.
//!
//! A bulletin name is correlated with search results by case-insensitive
//! substring containment: a candidate is kept when its reported name contains
//! the queried name. Kept candidates' detail records are scanned for
//! identifications of the tracked address type.

use crate::models::{IdentificationRecord, ResolvedAddress};
use crate::services::SanctionsSearch;

/// Resolves bulletin names to tracked addresses via a sanctions search.
pub struct EntityResolver<S> {
    search: S,
    address_type: String,
}

impl<S: SanctionsSearch> EntityResolver<S> {
    pub fn new(search: S, address_type: impl Into<String>) -> Self {
        Self {
            search,
            address_type: address_type.into(),
        }
    }

    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    /// Every tracked address listed for `name`, lower-cased.
    ///
    /// A failed search yields no addresses; a failed detail fetch skips that
    /// candidate only.
    pub async fn resolve(&self, name: &str) -> Vec<ResolvedAddress> {
        let candidates = match self.search.search(name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Search failed for {}: {}", name, e);
                return Vec::new();
            }
        };
        log::info!("Found {} search result(s) for {}", candidates.len(), name);

        let mut addresses = Vec::new();
        for candidate in candidates.iter().filter(|c| c.matches(name)) {
            let Some(detail_url) = candidate.detail_url.as_deref() else {
                log::debug!("No detail record for candidate {}", candidate.name);
                continue;
            };

            let records = match self.search.identifications(detail_url).await {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Failed to fetch detail record {}: {}", detail_url, e);
                    continue;
                }
            };
            log::debug!(
                "{} identification(s) for {} ({})",
                records.len(),
                candidate.name,
                candidate.category
            );

            addresses.extend(extract_addresses(&records, &self.address_type));
        }

        addresses
    }
}

/// Addresses among `records` whose type is exactly `address_type`.
pub fn extract_addresses(records: &[IdentificationRecord], address_type: &str) -> Vec<ResolvedAddress> {
    records
        .iter()
        .filter(|record| record.id_type == address_type)
        .map(|record| ResolvedAddress {
            address: record.id_value.trim().to_lowercase(),
            id_type: record.id_type.clone(),
        })
        .collect()
}
