// src/utils/names.rs

//! Name normalization for bulletin entries.
//!
//! Bulletin entries look like `DOE, John (a.k.a. DOE, Jack); DOB 01 Jan 1970; ...`
//! for persons and `ACME TRADING LLC, Tower 1, Dubai (...)` for entities. The
//! correlation key is the bare name: aliases in parentheses and anything after
//! a semicolon are dropped.

use regex::Regex;

use crate::models::SectionKind;

/// Strip a trailing parenthetical or semicolon clause and surrounding space.
pub fn clean_name(name: &str) -> String {
    let end = name.find(['(', ';']).unwrap_or(name.len());
    name[..end].trim().to_string()
}

/// Text of a paragraph up to its first `(` or `;`.
pub fn leading_name(text: &str) -> Option<String> {
    let pattern = Regex::new(r"^([^(;]+?)(?:\s*\(|;|$)").ok()?;
    let caps = pattern.captures(text.trim())?;
    let name = caps.get(1)?.as_str().trim();
    let name = name.trim_end_matches(',').trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `LAST, First` from a person entry; `None` without a comma.
pub fn person_name(text: &str) -> Option<String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }
    let name = clean_name(&format!("{}, {}", parts[0], parts[1]));
    (!name.is_empty()).then_some(name)
}

/// Organization name: the entry up to its first comma.
pub fn entity_name(text: &str) -> Option<String> {
    let first = text.split(',').next()?.trim();
    let name = clean_name(first);
    (!name.is_empty()).then_some(name)
}

/// Extract the name from an entry according to its section.
pub fn section_name(kind: SectionKind, text: &str) -> Option<String> {
    if kind.is_person() {
        person_name(text)
    } else {
        entity_name(text)
    }
}
