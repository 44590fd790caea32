//! Shared chat types.

use serde::{Deserialize, Serialize};
use wisata_data::Table;

/// One entry of the conversation history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "snake_case")]
pub enum ChatEntry {
    User(String),
    Bot(String),
    Table(Table),
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        ChatEntry::User(text.into())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        ChatEntry::Bot(text.into())
    }

    /// Display role: `User`, `Bot` or `Table`.
    pub fn role(&self) -> &'static str {
        match self {
            ChatEntry::User(_) => "User",
            ChatEntry::Bot(_) => "Bot",
            ChatEntry::Table(_) => "Table",
        }
    }

    /// Text content; tables are rendered as fixed-width text.
    pub fn text(&self) -> String {
        match self {
            ChatEntry::User(t) | ChatEntry::Bot(t) => t.clone(),
            ChatEntry::Table(table) => table.to_text(),
        }
    }

    /// `"role: text"`, the line format used as language-model context.
    pub fn context_line(&self) -> String {
        format!("{}: {}", self.role(), self.text())
    }
}

/// Classified purpose of a user utterance. Re-derived every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BundleRecommendation,
    PromoQuery,
    TransportQuery,
    GeneralQuery,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::BundleRecommendation => "bundle_recommendation",
            Intent::PromoQuery => "promo_query",
            Intent::TransportQuery => "transport_query",
            Intent::GeneralQuery => "general_query",
        };
        f.write_str(name)
    }
}

/// What one turn did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub intent: Intent,
    /// City the handler operated on, if any.
    pub city: Option<String>,
    /// Entries appended after the user's own entry.
    pub entries: Vec<ChatEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_roles() {
        assert_eq!(ChatEntry::user("hai").role(), "User");
        assert_eq!(ChatEntry::bot("halo").role(), "Bot");
        assert_eq!(ChatEntry::Table(Table::default()).role(), "Table");
    }

    #[test]
    fn test_context_line() {
        assert_eq!(ChatEntry::user("promo ke Surabaya").context_line(), "User: promo ke Surabaya");
        let table = Table::new(
            vec!["location".to_string()],
            vec![vec!["Bandung".to_string()]],
        );
        assert_eq!(
            ChatEntry::Table(table).context_line(),
            "Table: location\n Bandung"
        );
    }

    #[test]
    fn test_entry_serialization_is_tagged() {
        let json = serde_json::to_value(ChatEntry::bot("halo")).unwrap();
        assert_eq!(json["role"], "bot");
        assert_eq!(json["content"], "halo");

        let back: ChatEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, ChatEntry::bot("halo"));
    }

    #[test]
    fn test_intent_display_matches_serde() {
        for intent in [
            Intent::BundleRecommendation,
            Intent::PromoQuery,
            Intent::TransportQuery,
            Intent::GeneralQuery,
        ] {
            let json = serde_json::to_value(intent).unwrap();
            assert_eq!(json, intent.to_string());
        }
    }
}
