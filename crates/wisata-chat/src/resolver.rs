//! City resolution: which city does this turn talk about?
//!
//! Candidates are matched by case-insensitive substring of the text, first
//! candidate in dataset order wins. A city reused from `last_city` is a
//! fallback and must not rewrite it.

use serde::Serialize;
use wisata_core::text::first_mentioned;

use crate::types::ChatEntry;

/// Where a resolved city came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitySource {
    /// Named in the current utterance.
    Utterance,
    /// Named in an earlier user entry of the history.
    History,
    /// Reused from the conversation's last city.
    LastCity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCity {
    pub name: String,
    pub source: CitySource,
}

impl ResolvedCity {
    fn new(name: impl Into<String>, source: CitySource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Whether this resolution may update `last_city`.
    pub fn is_explicit(&self) -> bool {
        self.source != CitySource::LastCity
    }
}

/// Scan the utterance for a candidate city, else fall back to `last_city`.
pub fn resolve_city(
    utterance: &str,
    candidates: &[String],
    last_city: Option<&str>,
) -> Option<ResolvedCity> {
    if let Some(city) = first_mentioned(utterance, candidates) {
        return Some(ResolvedCity::new(city, CitySource::Utterance));
    }
    last_city
        .filter(|c| !c.is_empty())
        .map(|c| ResolvedCity::new(c, CitySource::LastCity))
}

/// Destination for a transport query.
///
/// Order: the earliest user entry in `history` naming a known destination,
/// then the utterance, then `last_city` if it is itself a known destination.
/// `history` normally already ends with the current utterance; a hit on that
/// entry counts as coming from the utterance.
pub fn resolve_transport_city(
    history: &[ChatEntry],
    utterance: &str,
    destinations: &[String],
    last_city: Option<&str>,
) -> Option<ResolvedCity> {
    let last_user = history
        .iter()
        .rposition(|e| matches!(e, ChatEntry::User(t) if t == utterance));

    for (idx, entry) in history.iter().enumerate() {
        if let ChatEntry::User(text) = entry {
            if let Some(city) = first_mentioned(text, destinations) {
                let source = if Some(idx) == last_user {
                    CitySource::Utterance
                } else {
                    CitySource::History
                };
                return Some(ResolvedCity::new(city, source));
            }
        }
    }

    if let Some(city) = first_mentioned(utterance, destinations) {
        return Some(ResolvedCity::new(city, CitySource::Utterance));
    }

    last_city
        .filter(|c| destinations.iter().any(|d| d.eq_ignore_ascii_case(c)))
        .map(|c| ResolvedCity::new(c, CitySource::LastCity))
}
