//! City lookup box: description, map link and a short travel summary for a
//! city, independent of the chat routing.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use wisata_core::text::title_case;
use wisata_provider::{Encyclopedia, LanguageModel};

use crate::context::ConversationState;
use crate::error::ChatError;
use crate::response::DESCRIPTION_NOT_FOUND;

const CATEGORY_HEADINGS: [&str; 4] = [
    "tempat terkenal",
    "makanan khas",
    "mall terbaik",
    "restoran rekomendasi",
];

/// Everything the lookup box shows for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityProfile {
    /// Title-cased city name.
    pub name: String,
    pub description: String,
    pub maps_url: String,
    /// Markdown: category headings with bullet links to maps searches.
    pub travel_info: String,
}

/// Google Maps search link for `place` in `city`.
pub fn maps_link(place: &str, city: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(&format!("{place} {city}"))
    )
}

pub fn travel_info_prompt(city: &str) -> String {
    format!(
        "Berikan informasi perjalanan singkat dengan menggunakan bahasa indonesia untuk kota {city} meliputi:\n\
         1. Tiga tempat terkenal\n\
         2. Tiga makanan khas\n\
         3. Tiga mall terbaik\n\
         4. Tiga restoran rekomendasi\n\
         Jawab hanya dalam bentuk bullet point nama saja, tanpa penjelasan."
    )
}

/// Rewrite a raw bullet-list answer into headings plus map-linked bullets.
/// Lines that are neither a category heading nor a bullet are dropped.
pub fn format_travel_info(city: &str, raw: &str) -> String {
    let mut out = format!(
        "**Tentu, berikut informasi perjalanan singkat di {} dalam bentuk bullet point:**\n\n",
        title_case(city)
    );

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        if CATEGORY_HEADINGS.iter().any(|h| lower.contains(h)) {
            out.push_str(&format!("\n**{}**\n", line.trim_matches(':')));
        } else if line.starts_with('-') || line.starts_with('*') {
            let item = line
                .trim_start_matches(|c| matches!(c, '-' | '*' | ' '))
                .trim();
            out.push_str(&format!("- [{item}]({})\n", maps_link(item, city)));
        }
    }
    out
}

pub struct CityExplorer {
    model: Arc<dyn LanguageModel>,
    encyclopedia: Arc<dyn Encyclopedia>,
    description_sentences: usize,
}

impl CityExplorer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        encyclopedia: Arc<dyn Encyclopedia>,
        description_sentences: usize,
    ) -> Self {
        Self {
            model,
            encyclopedia,
            description_sentences,
        }
    }

    /// Look up `city` and make it the conversation's last city.
    ///
    /// A missing description degrades to a fixed notice; a failing travel
    /// summary is an error and leaves `state` untouched.
    pub async fn explore(
        &self,
        state: &mut ConversationState,
        city: &str,
    ) -> Result<CityProfile, ChatError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let description = match self
            .encyclopedia
            .summary(city, self.description_sentences)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(city, error = %e, "city description unavailable");
                DESCRIPTION_NOT_FOUND.to_string()
            }
        };

        let raw = self.model.complete(&travel_info_prompt(city)).await?;
        let travel_info = format_travel_info(city, raw.trim());

        state.set_last_city(city);
        debug!(city, "city explored");

        Ok(CityProfile {
            name: title_case(city),
            description,
            maps_url: maps_link(city, city),
            travel_info,
        })
    }
}
