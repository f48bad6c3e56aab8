//! Change events derived from bulletins.

use std::fmt;

use chrono::NaiveDate;

/// A single addition or deletion, stamped with its bulletin date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Addition {
        date: NaiveDate,
        name: String,
        address: String,
    },
    Deletion {
        date: NaiveDate,
        name: String,
    },
}

impl ChangeEvent {
    pub fn addition(date: NaiveDate, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::Addition {
            date,
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn deletion(date: NaiveDate, name: impl Into<String>) -> Self {
        Self::Deletion {
            date,
            name: name.into(),
        }
    }

    /// Bulletin date the event came from.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Addition { date, .. } | Self::Deletion { date, .. } => *date,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Addition { name, .. } | Self::Deletion { name, .. } => name,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addition {
                date,
                name,
                address,
            } => write!(f, "Addition: {date} - {name} - {address}"),
            Self::Deletion { date, name } => write!(f, "Deletion: {date} - {name}"),
        }
    }
}
