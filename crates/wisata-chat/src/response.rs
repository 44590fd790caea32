//! Reply templates. User-facing text is Indonesian.

use wisata_core::text::title_case;

use crate::types::ChatEntry;

pub const BUNDLE_NEEDS_CITY: &str =
    "Kota tujuan belum ditentukan. Silakan masukkan kota terlebih dahulu.";
pub const TRANSPORT_NOT_FOUND: &str = "⚠️ Tidak ditemukan data transportasi yang cocok.";
pub const DESCRIPTION_NOT_FOUND: &str = "❗ Deskripsi kota tidak ditemukan.";
pub const NO_PREVIOUS_CONTEXT: &str = "No previous context";

pub fn promo_header(city: &str) -> String {
    format!(
        "🏱 Berikut promo yang tersedia untuk kota **{}**:",
        title_case(city)
    )
}

pub fn no_promo(city: &str) -> String {
    format!(
        "🏱 Tidak ada promo tersedia untuk kota **{}**.",
        title_case(city)
    )
}

/// `location` is already title-cased by the catalog.
pub fn bundle_header(location: &str) -> String {
    format!("**Rekomendasi untuk kota {location}:**")
}

pub fn transport_header(mode: Option<&str>, city: &str) -> String {
    format!(
        "Berikut info {} menuju {}",
        mode.unwrap_or("transportasi"),
        title_case(city)
    )
}

pub fn turn_error(err: &dyn std::fmt::Display) -> String {
    format!("🚨 Kesalahan: {err}")
}

/// Prefix the utterance with the last city of interest, if any.
pub fn enrich_with_city(utterance: &str, last_city: Option<&str>) -> String {
    match last_city {
        Some(city) if !city.is_empty() => format!("Untuk {city}, {utterance}"),
        _ => utterance.to_string(),
    }
}

/// Prompt for the plain language-model fallback: recent history as
/// `"role: text"` lines followed by the question.
pub fn fallback_prompt(question: &str, recent: &[ChatEntry]) -> String {
    let context = if recent.is_empty() {
        NO_PREVIOUS_CONTEXT.to_string()
    } else {
        recent
            .iter()
            .map(ChatEntry::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "Berikan jawaban dalam bahasa Indonesia berdasarkan konteks berikut:\n{context}\nPertanyaan: {question}\nJika konteks menyebutkan kota sebelumnya (misalnya Surabaya), gunakan kota itu sebagai default kecuali pengguna menyebut kota baru."
    )
}
