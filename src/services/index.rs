// src/services/index.rs

//! Date-bounded walk over the paginated bulletin listing.

use chrono::NaiveDate;

use crate::models::BulletinLink;
use crate::services::BulletinSource;

/// Collects the bulletins published inside a date window.
///
/// The listing is ordered newest first, so the first link older than the
/// window start ends the walk.
pub struct BulletinIndex<'a, B> {
    source: &'a B,
}

impl<'a, B: BulletinSource> BulletinIndex<'a, B> {
    pub fn new(source: &'a B) -> Self {
        Self { source }
    }

    /// Bulletins dated within `start..=end`, in listing order (newest first).
    ///
    /// Stops at an empty page, at the first link older than `start`, or at
    /// the first failed page fetch; whatever was collected is returned.
    pub async fn collect(&self, start: NaiveDate, end: NaiveDate) -> Vec<BulletinLink> {
        let mut collected = Vec::new();
        let mut page = 0;

        loop {
            log::info!("Fetching listing page {}...", page);
            let links = match self.source.listing_page(page).await {
                Ok(links) => links,
                Err(e) => {
                    log::warn!("Failed to fetch listing page {}: {}", page, e);
                    break;
                }
            };

            if links.is_empty() {
                log::info!("No more bulletins found");
                break;
            }

            for link in links {
                if link.date < start {
                    log::info!("Reached start date {}", start);
                    return collected;
                }
                if link.date <= end {
                    collected.push(link);
                }
            }

            page += 1;
        }

        collected
    }
}
