// src/services/collector.rs

//! Turns bulletins into a chronological list of change events.

use crate::models::{BulletinLink, BulletinSections, ChangeEvent};
use crate::services::{BulletinSource, EntityResolver, SanctionsSearch};
use crate::storage::ExistingNames;

/// Walks bulletins oldest first and emits additions and gated deletions.
pub struct ChangeCollector<'a, B, S> {
    source: &'a B,
    resolver: &'a EntityResolver<S>,
}

impl<'a, B: BulletinSource, S: SanctionsSearch> ChangeCollector<'a, B, S> {
    pub fn new(source: &'a B, resolver: &'a EntityResolver<S>) -> Self {
        Self { source, resolver }
    }

    /// Change events for `bulletins`, ordered by bulletin date.
    ///
    /// Within a bulletin, individuals come first, then entities, then
    /// deletions. Every name that yields an addition joins `existing`, so a
    /// later deletion in the same run is recognised. Deletions of names not in
    /// `existing` are dropped.
    pub async fn collect(
        &self,
        bulletins: &[BulletinLink],
        existing: &mut ExistingNames,
    ) -> Vec<ChangeEvent> {
        // Listing order is newest first; the stable sort keeps that reversed
        // order for bulletins sharing a date.
        let mut ordered: Vec<&BulletinLink> = bulletins.iter().rev().collect();
        ordered.sort_by_key(|bulletin| bulletin.date);

        let mut changes = Vec::new();
        for bulletin in ordered {
            log::info!("Processing: {} ({})", bulletin.url, bulletin.date);
            let sections = self.sections(bulletin).await;

            for name in &sections.individuals_added {
                log::info!("Resolving individual: {}", name);
                self.push_additions(bulletin, name, existing, &mut changes).await;
            }
            for name in &sections.entities_added {
                log::info!("Resolving entity: {}", name);
                self.push_additions(bulletin, name, existing, &mut changes).await;
            }
            for name in &sections.deletions {
                if existing.contains(name) {
                    log::info!("Found deletion: {}", name);
                    changes.push(ChangeEvent::deletion(bulletin.date, name.as_str()));
                } else {
                    log::debug!("Ignoring deletion of untracked name: {}", name);
                }
            }
        }

        changes
    }

    async fn sections(&self, bulletin: &BulletinLink) -> BulletinSections {
        match self.source.bulletin(&bulletin.url).await {
            Ok(sections) => sections,
            Err(e) => {
                log::warn!("Failed to fetch bulletin {}: {}", bulletin.url, e);
                BulletinSections::default()
            }
        }
    }

    async fn push_additions(
        &self,
        bulletin: &BulletinLink,
        name: &str,
        existing: &mut ExistingNames,
        changes: &mut Vec<ChangeEvent>,
    ) {
        let addresses = self.resolver.resolve(name).await;
        if addresses.is_empty() {
            return;
        }

        existing.insert(name);
        for resolved in addresses {
            log::info!("Found addition: {} - {}", name, resolved.address);
            changes.push(ChangeEvent::addition(bulletin.date, name, resolved.address));
        }
    }
}
