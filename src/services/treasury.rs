// src/services/treasury.rs

//! Bulletin listing and bulletin page scraping.

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{BulletinLink, BulletinSections, SectionKind, SourceConfig, classify_heading};
use crate::services::BulletinSource;
use crate::utils::dates::find_long_date;
use crate::utils::http::Fetcher;
use crate::utils::names::{leading_name, section_name};
use crate::utils::{element_text, parse_selector, resolve_url};

const BULLETIN_PATH: &str = "/recent-actions/";

/// HTTP-backed bulletin source for the sanctions list update pages.
pub struct TreasurySite {
    fetcher: Fetcher,
    base_url: Url,
    listing_url: String,
}

impl TreasurySite {
    pub fn new(fetcher: Fetcher, sources: &SourceConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&sources.base_url)?,
            listing_url: sources.listing_url.clone(),
        })
    }

    /// URL of listing page `page`.
    pub fn page_url(&self, page: usize) -> String {
        format!("{}?page={}", self.listing_url, page)
    }
}

#[async_trait]
impl BulletinSource for TreasurySite {
    async fn listing_page(&self, page: usize) -> Result<Vec<BulletinLink>> {
        let html = self.fetcher.get_text(&self.page_url(page)).await?;
        parse_listing(&html, &self.base_url)
    }

    async fn bulletin(&self, url: &str) -> Result<BulletinSections> {
        let html = self.fetcher.get_text(url).await?;
        parse_bulletin(&html)
    }
}

/// Whether `href` points at a dated bulletin (`/recent-actions/YYYYMMDD`).
pub fn is_bulletin_href(href: &str) -> bool {
    href.find(BULLETIN_PATH).is_some_and(|idx| {
        let rest = &href[idx + BULLETIN_PATH.len()..];
        rest.len() >= 8 && rest.as_bytes()[..8].iter().all(u8::is_ascii_digit)
    })
}

/// Extract bulletin links and publish dates from a listing page.
///
/// Rows without a bulletin link or a parseable date are skipped.
pub fn parse_listing(html: &str, base_url: &Url) -> Result<Vec<BulletinLink>> {
    let document = Html::parse_document(html);
    let row_sel = parse_selector(r#"div[class*="search-result"]"#)?;
    let link_sel = parse_selector("a[href]")?;
    let date_sel = parse_selector(r#"div[class*="margin-top-1"]"#)?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for row in document.select(&row_sel) {
        // Wrappers around other result rows would pair a link with a sibling's date
        if row.select(&row_sel).any(|inner| inner.id() != row.id()) {
            continue;
        }

        let Some(href) = row
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_bulletin_href(href))
        else {
            continue;
        };

        let Some(date_div) = row.select(&date_sel).last() else {
            continue;
        };
        let date_text = element_text(&date_div);
        let Some(date) = find_long_date(&date_text) else {
            log::debug!("Skipping listing row with unparseable date: {:?}", date_text);
            continue;
        };

        let url = resolve_url(base_url, href);
        if seen.insert(url.clone()) {
            links.push(BulletinLink::new(url, date));
        }
    }

    Ok(links)
}

/// Extract the added and deleted names from a bulletin page.
///
/// Headings are looked up inside the main content block, falling back to
/// the whole page when the block has none. A page without the content block
/// yields no names.
pub fn parse_bulletin(html: &str) -> Result<BulletinSections> {
    let document = Html::parse_document(html);
    let container_sel = parse_selector("div.field__item")?;
    let heading_sel = parse_selector("h3, h4")?;
    let flow_sel = parse_selector("h3, h4, p")?;
    let anchor_sel = parse_selector("a")?;

    let mut sections = BulletinSections::default();

    let Some(container) = document.select(&container_sel).next() else {
        return Ok(sections);
    };

    let mut headings: Vec<ElementRef> = container.select(&heading_sel).collect();
    if headings.is_empty() {
        headings = document.select(&heading_sel).collect();
    }

    // Headings and paragraphs in document order
    let flow: Vec<ElementRef> = document.select(&flow_sel).collect();

    for heading in headings {
        let Some(kind) = classify_heading(&element_text(&heading)) else {
            continue;
        };
        let Some(paragraph) = next_paragraph(&flow, &heading) else {
            continue;
        };
        for name in paragraph_names(kind, &paragraph, &anchor_sel) {
            sections.push(kind, name);
        }
    }

    Ok(sections)
}

/// First `p` following `heading` in document order.
fn next_paragraph<'a>(flow: &[ElementRef<'a>], heading: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let position = flow.iter().position(|el| el.id() == heading.id())?;
    flow[position + 1..]
        .iter()
        .find(|el| el.value().name() == "p")
        .copied()
}

/// Names listed in a section paragraph.
///
/// Linked entries give one name per anchor; a plain paragraph gives only its
/// leading name.
fn paragraph_names(kind: SectionKind, paragraph: &ElementRef<'_>, anchor_sel: &Selector) -> Vec<String> {
    let anchors: Vec<ElementRef> = paragraph.select(anchor_sel).collect();

    if anchors.is_empty() {
        return leading_name(&element_text(paragraph))
            .and_then(|text| section_name(kind, &text))
            .into_iter()
            .collect();
    }

    anchors
        .iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .filter_map(|text| section_name(kind, &text))
        .collect()
}
