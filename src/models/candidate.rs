//! Search service results.

/// One row of a sanctions search result table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCandidate {
    pub name: String,
    pub address: String,
    pub category: String,
    pub program: String,
    pub list_type: String,
    pub score: String,

    /// Absolute URL of the detail record, when the name cell links to one
    pub detail_url: Option<String>,
}

impl SearchCandidate {
    /// Whether this candidate's name contains `query`, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.name.trim().to_lowercase().contains(&query)
    }
}

/// An identification row from a candidate's detail record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationRecord {
    pub id_type: String,
    pub id_value: String,
}

/// An address extracted for a resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// Lower-cased address
    pub address: String,
    pub id_type: String,
}
