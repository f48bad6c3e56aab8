//! Bulletin listing entries and the name lists parsed from a bulletin page.

use chrono::NaiveDate;

/// A bulletin link found on the listing, with its publish date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletinLink {
    /// Absolute URL of the bulletin detail page
    pub url: String,

    /// Publish date shown on the listing
    pub date: NaiveDate,
}

impl BulletinLink {
    pub fn new(url: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            url: url.into(),
            date,
        }
    }
}

/// Names extracted from one bulletin, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulletinSections {
    pub individuals_added: Vec<String>,
    pub entities_added: Vec<String>,
    pub deletions: Vec<String>,
}

impl BulletinSections {
    pub fn is_empty(&self) -> bool {
        self.individuals_added.is_empty()
            && self.entities_added.is_empty()
            && self.deletions.is_empty()
    }

    /// Append a name to the list for `kind`.
    pub fn push(&mut self, kind: SectionKind, name: String) {
        match kind {
            SectionKind::IndividualsAdded => self.individuals_added.push(name),
            SectionKind::EntitiesAdded => self.entities_added.push(name),
            SectionKind::Deletions => self.deletions.push(name),
        }
    }
}

/// Bulletin section a heading introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    IndividualsAdded,
    EntitiesAdded,
    Deletions,
}

impl SectionKind {
    /// Whether names in this section are persons in "LAST, First" form.
    pub fn is_person(self) -> bool {
        !matches!(self, SectionKind::EntitiesAdded)
    }
}

/// Classify a section heading by keyword.
///
/// Checks individuals, then entities, then deletions; the first match wins.
pub fn classify_heading(text: &str) -> Option<SectionKind> {
    let text = text.trim().to_lowercase();
    let added = text.contains("added");

    // "individuals" and "entities" contain "individual" and "entit"
    if added && text.contains("individual") {
        Some(SectionKind::IndividualsAdded)
    } else if added && (text.contains("entity") || text.contains("entities")) {
        Some(SectionKind::EntitiesAdded)
    } else if text.contains("deletion") {
        Some(SectionKind::Deletions)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_added_headings() {
        assert_eq!(
            classify_heading("The following individuals have been added to OFAC's SDN List:"),
            Some(SectionKind::IndividualsAdded)
        );
        assert_eq!(
            classify_heading("The following individual has been ADDED"),
            Some(SectionKind::IndividualsAdded)
        );
        assert_eq!(
            classify_heading("The following entities have been added:"),
            Some(SectionKind::EntitiesAdded)
        );
        assert_eq!(
            classify_heading("The following entity has been added"),
            Some(SectionKind::EntitiesAdded)
        );
    }

    #[test]
    fn classifies_deletions() {
        assert_eq!(
            classify_heading("The following deletions have been made"),
            Some(SectionKind::Deletions)
        );
        assert_eq!(classify_heading("  Deletion:  "), Some(SectionKind::Deletions));
    }

    #[test]
    fn unrelated_or_updated_headings_are_ignored() {
        assert_eq!(classify_heading("Counter Terrorism Designations"), None);
        assert_eq!(classify_heading("The following entities have been updated"), None);
        assert_eq!(classify_heading("Individuals"), None);
    }

    #[test]
    fn individuals_win_over_entities() {
        assert_eq!(
            classify_heading("Individuals and entities added"),
            Some(SectionKind::IndividualsAdded)
        );
    }

    #[test]
    fn push_routes_by_kind() {
        let mut sections = BulletinSections::default();
        assert!(sections.is_empty());
        sections.push(SectionKind::EntitiesAdded, "ACME LTD".into());
        sections.push(SectionKind::Deletions, "DOE, JOHN".into());
        assert_eq!(sections.entities_added, vec!["ACME LTD"]);
        assert_eq!(sections.deletions, vec!["DOE, JOHN"]);
        assert!(sections.individuals_added.is_empty());
    }
}
