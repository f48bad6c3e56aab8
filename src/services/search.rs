// src/services/search.rs

//! Sanctions search form client.
//!
//! The search page is an ASP.NET form: the client loads it, echoes back every
//! hidden field (view state, event validation), fills in the last-name query
//! and default filters, then posts it. Result rows link to detail records that
//! carry the identification table.

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{IdentificationRecord, SearchCandidate, SourceConfig};
use crate::services::SanctionsSearch;
use crate::utils::http::Fetcher;
use crate::utils::{element_text, parse_selector, resolve_url};

const FIELD_LAST_NAME: &str = "ctl00$MainContent$txtLastName";
const FIELD_SLIDER: &str = "ctl00$MainContent$Slider1";
const FIELD_SLIDER_BOUND: &str = "ctl00$MainContent$Slider1_Boundcontrol";
const FIELD_SEARCH_BUTTON: &str = "ctl00$MainContent$btnSearch";

/// Filters left at "all" / empty on every query.
const EMPTY_FILTERS: [&str; 7] = [
    "ctl00$MainContent$ddlType",
    "ctl00$MainContent$txtID",
    "ctl00$MainContent$txtAddress",
    "ctl00$MainContent$txtCity",
    "ctl00$MainContent$txtState",
    "ctl00$MainContent$ddlCountry",
    "ctl00$MainContent$ddlList",
];

/// HTTP-backed sanctions search.
pub struct SanctionsSearchClient {
    fetcher: Fetcher,
    search_url: Url,
    similarity: u8,
}

impl SanctionsSearchClient {
    pub fn new(fetcher: Fetcher, sources: &SourceConfig, similarity: u8) -> Result<Self> {
        Ok(Self {
            fetcher,
            search_url: Url::parse(&sources.search_url)?,
            similarity,
        })
    }
}

#[async_trait]
impl SanctionsSearch for SanctionsSearchClient {
    async fn search(&self, name: &str) -> Result<Vec<SearchCandidate>> {
        let form_page = self.fetcher.get_text(self.search_url.as_str()).await?;
        let hidden = hidden_form_fields(&form_page)?;
        let form = build_search_form(hidden, name, self.similarity);

        log::info!("Searching sanctions list for: {}", name);
        let results = self.fetcher.post_form(self.search_url.as_str(), &form).await?;
        log::debug!("Search response for {}: {} bytes", name, results.len());

        parse_search_results(&results, &self.search_url)
    }

    async fn identifications(&self, detail_url: &str) -> Result<Vec<IdentificationRecord>> {
        let html = self.fetcher.get_text(detail_url).await?;
        parse_identifications(&html)
    }
}

/// Hidden `<input>` name/value pairs of a form page.
pub fn hidden_form_fields(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let input_sel = parse_selector(r#"input[type="hidden"]"#)?;

    Ok(document
        .select(&input_sel)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect())
}

/// Complete search form: hidden fields plus the query and default filters.
pub fn build_search_form(
    hidden: Vec<(String, String)>,
    name: &str,
    similarity: u8,
) -> Vec<(String, String)> {
    let mut form = hidden;
    let similarity = similarity.to_string();

    set_field(&mut form, FIELD_LAST_NAME, name);
    for field in EMPTY_FILTERS {
        set_field(&mut form, field, "");
    }
    set_field(&mut form, FIELD_SLIDER, &similarity);
    set_field(&mut form, FIELD_SLIDER_BOUND, &similarity);
    set_field(&mut form, FIELD_SEARCH_BUTTON, "Search");
    form
}

fn set_field(form: &mut Vec<(String, String)>, key: &str, value: &str) {
    match form.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value.to_string(),
        None => form.push((key.to_string(), value.to_string())),
    }
}

/// Parse the result grid of a search response.
///
/// A response without the grid means no results.
pub fn parse_search_results(html: &str, search_url: &Url) -> Result<Vec<SearchCandidate>> {
    let document = Html::parse_document(html);
    let table_sel = parse_selector("table#gvSearchResults")?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("td")?;
    let anchor_sel = parse_selector("a")?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 6 {
            continue;
        }

        let link = cells[0].select(&anchor_sel).next();
        let name = link
            .as_ref()
            .map(element_text)
            .unwrap_or_else(|| element_text(&cells[0]));
        let detail_url = link
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
            .map(|href| resolve_url(search_url, href));

        candidates.push(SearchCandidate {
            name,
            address: element_text(&cells[1]),
            category: element_text(&cells[2]),
            program: element_text(&cells[3]),
            list_type: element_text(&cells[4]),
            score: element_text(&cells[5]),
            detail_url,
        });
    }

    Ok(candidates)
}

/// Parse the identification table of a detail record.
pub fn parse_identifications(html: &str) -> Result<Vec<IdentificationRecord>> {
    let document = Html::parse_document(html);
    let table_sel = parse_selector(
        "div#ctl00_MainContent_pnlIdentification table#ctl00_MainContent_gvIdentification",
    )?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("td")?;

    let Some(table) = document.select(&table_sel).next() else {
        return Ok(Vec::new());
    };

    // First row is the column header
    let records = table
        .select(&row_sel)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&cell_sel).collect();
            if cells.len() < 2 {
                return None;
            }
            let id_type = element_text(&cells[0]);
            let id_value = element_text(&cells[1]);
            if id_type.is_empty() && id_value.is_empty() {
                return None;
            }
            Some(IdentificationRecord { id_type, id_value })
        })
        .collect();

    Ok(records)
}
