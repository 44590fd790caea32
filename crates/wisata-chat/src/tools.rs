//! Tools exposed to the language-model agent.
//!
//! Every tool takes one string argument. [`ToolArgument`] decodes it: a JSON
//! object becomes structured fields, a `location: <city>` string becomes a
//! structured location when the city is a known hotel location, anything
//! else is lowercased free text. Lookups try the tool's own key, then the
//! `input` field, then the raw string.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Timelike};
use serde_json::{Map, Value};
use tracing::debug;
use wisata_core::text::{first_mentioned, title_case};
use wisata_data::{Catalog, Table};
use wisata_provider::ToolDef;
use wisata_vector::RetrievalIndex;

use crate::error::ChatError;
use crate::response::bundle_header;

/// Decoded tool argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgument {
    Structured(Map<String, Value>),
    FreeText(String),
}

impl ToolArgument {
    /// Decode `raw`, using `known_locations` for the `location:` convention.
    pub fn parse(raw: &str, known_locations: &[String]) -> Self {
        if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) {
            return ToolArgument::Structured(fields);
        }

        let text = raw.trim().to_lowercase();
        if let Some((_, after)) = text.split_once("location:") {
            if let Some(city) = first_mentioned(after.trim(), known_locations) {
                let mut fields = Map::new();
                fields.insert("location".to_string(), Value::String(city.to_string()));
                return ToolArgument::Structured(fields);
            }
        }
        ToolArgument::FreeText(text)
    }

    /// Value for `key`: the structured key, else the `input` field, else
    /// `raw`. Free text is the `input` field.
    pub fn lookup(&self, key: &str, raw: &str) -> String {
        match self {
            ToolArgument::Structured(fields) => fields
                .get(key)
                .or_else(|| fields.get("input"))
                .map(value_to_string)
                .unwrap_or_else(|| raw.to_string()),
            ToolArgument::FreeText(text) => text.clone(),
        }
    }

    /// Value for `key` with no fallback.
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            ToolArgument::Structured(fields) => fields.get(key).map(value_to_string),
            ToolArgument::FreeText(_) => None,
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shared read-only data the tools query.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub catalog: Arc<Catalog>,
    pub retrieval: Arc<RetrievalIndex>,
    pub top_k: usize,
}

/// A named callable exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Whether the argument is replaced by `location: <last city>` when the
    /// conversation has a last city.
    fn uses_city_context(&self) -> bool {
        true
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError>;

    fn definition(&self) -> ToolDef {
        ToolDef {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "input": { "type": "string", "description": "Argumen tool (nama kota atau teks)" }
                }
            }),
        }
    }
}

fn parse_arg(raw: &str, ctx: &ToolContext) -> ToolArgument {
    ToolArgument::parse(raw, &ctx.catalog.hotel.cities())
}

fn table_or(table: Table, empty: impl FnOnce() -> String) -> String {
    if table.is_empty() {
        empty()
    } else {
        table.to_text()
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

pub struct TransportScheduleTool;

#[async_trait]
impl Tool for TransportScheduleTool {
    fn name(&self) -> &'static str {
        "get_transport_schedule"
    }

    fn description(&self) -> &'static str {
        "Cari jadwal transportasi ke kota tertentu berdasarkan pencarian kemiripan."
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let destination = parse_arg(raw, ctx).lookup("destination", raw);
        let query = format!("transportasi ke {destination}");
        let snippets = ctx.retrieval.search(&query, ctx.top_k).await?;
        if snippets.is_empty() {
            return Ok(format!("🚫 Tidak ada jadwal ke **{destination}**."));
        }
        Ok(snippets.join("\n"))
    }
}

pub struct PromoTool;

#[async_trait]
impl Tool for PromoTool {
    fn name(&self) -> &'static str {
        "get_promo"
    }

    fn description(&self) -> &'static str {
        "Lihat semua promo perjalanan yang tersedia."
    }

    async fn call(&self, _raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        Ok(ctx.catalog.promo.table().to_text())
    }
}

pub struct PromoByCityTool;

#[async_trait]
impl Tool for PromoByCityTool {
    fn name(&self) -> &'static str {
        "get_promo_by_city"
    }

    fn description(&self) -> &'static str {
        "Lihat promo perjalanan untuk kota tertentu."
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let city = parse_arg(raw, ctx).lookup("city", raw);
        Ok(table_or(ctx.catalog.promo.by_city_contains(&city), || {
            format!("🎁 Tidak ada promo tersedia untuk kota **{city}**.")
        }))
    }
}

/// Travel note by hour of day; evenings (18-23h) count as good.
pub fn weather_note(hour: u32) -> &'static str {
    if (18..=23).contains(&hour) {
        "Cuaca mendukung untuk bepergian malam."
    } else {
        "Cuaca mungkin tidak ideal untuk bepergian malam, pertimbangkan waktu lain."
    }
}

pub struct DestinationInfoTool;

impl DestinationInfoTool {
    fn render(location: &str, rows: Table, now: DateTime<Local>) -> String {
        if rows.is_empty() {
            return format!("📍 Tidak ada informasi tentang **{location}**.");
        }
        format!(
            "{}\n\n📅 Catatan Cuaca: {}",
            rows.to_text(),
            weather_note(now.hour())
        )
    }
}

#[async_trait]
impl Tool for DestinationInfoTool {
    fn name(&self) -> &'static str {
        "get_destination_info"
    }

    fn description(&self) -> &'static str {
        "Dapatkan info tempat wisata dan cuaca dari lokasi tertentu."
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let location = parse_arg(raw, ctx).lookup("location", raw);
        let rows = ctx.catalog.destination.by_city_contains(&location);
        Ok(Self::render(&location, rows, Local::now()))
    }
}

pub struct HotelAvailabilityTool;

#[async_trait]
impl Tool for HotelAvailabilityTool {
    fn name(&self) -> &'static str {
        "get_hotel_availability"
    }

    fn description(&self) -> &'static str {
        "Lihat hotel yang tersedia di lokasi tertentu."
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let location = parse_arg(raw, ctx).lookup("location", raw);
        debug!(location = %location, "hotel availability lookup");
        Ok(table_or(ctx.catalog.hotel.by_city_contains(&location), || {
            format!("🏨 Tidak ada hotel tersedia di **{location}**.")
        }))
    }
}

pub struct TranslateTool;

#[async_trait]
impl Tool for TranslateTool {
    fn name(&self) -> &'static str {
        "get_translate_response"
    }

    fn description(&self) -> &'static str {
        "Terjemahkan teks ke bahasa yang diminta."
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let arg = parse_arg(raw, ctx);
        let text = arg.lookup("text", raw);
        let lang = arg.get("lang").unwrap_or_else(|| "id".to_string());
        Ok(match lang.to_lowercase().as_str() {
            "en" => format!("(EN) {text}"),
            "id" => format!("(ID) {text}"),
            _ => format!("(Translated [{lang}]) {text}"),
        })
    }
}

pub struct CurrentDateTool;

#[async_trait]
impl Tool for CurrentDateTool {
    fn name(&self) -> &'static str {
        "get_current_date"
    }

    fn description(&self) -> &'static str {
        "Tampilkan tanggal dan waktu saat ini."
    }

    fn uses_city_context(&self) -> bool {
        false
    }

    async fn call(&self, _raw: &str, _ctx: &ToolContext) -> Result<String, ChatError> {
        Ok(Local::now().format("📅 %A, %d %B %Y %H:%M").to_string())
    }
}

pub struct RecommendationBundleTool;

#[async_trait]
impl Tool for RecommendationBundleTool {
    fn name(&self) -> &'static str {
        "get_recommendation_bundle"
    }

    fn description(&self) -> &'static str {
        "Rekomendasi kendaraan & hotel berdasarkan kota tujuan"
    }

    async fn call(&self, raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let location = parse_arg(raw, ctx).lookup("location", raw);
        let bundle = ctx.catalog.recommendation_bundle(&location);
        let mut parts = vec![bundle_header(&bundle.location)];
        parts.extend(bundle.transport.as_ref().map(Table::to_text));
        parts.extend(bundle.hotel.as_ref().map(Table::to_text));
        Ok(parts.join("\n\n"))
    }
}

pub struct AllModesTool;

#[async_trait]
impl Tool for AllModesTool {
    fn name(&self) -> &'static str {
        "get_all_kendaraan_kota"
    }

    fn description(&self) -> &'static str {
        "Tampilkan semua moda transportasi dan kota tujuannya."
    }

    fn uses_city_context(&self) -> bool {
        false
    }

    async fn call(&self, _raw: &str, ctx: &ToolContext) -> Result<String, ChatError> {
        let Some(grouped) = ctx.catalog.modes_by_destination() else {
            return Ok(
                "⚠️ Dataset transport tidak memiliki kolom 'mode' dan 'destination'.".to_string(),
            );
        };
        let mut lines = vec!["📋 **Daftar semua kendaraan dan kota tujuannya:**".to_string()];
        for group in grouped {
            lines.push(format!(
                "- **{}**: {}",
                title_case(&group.mode),
                group.destinations.join(", ")
            ));
        }
        Ok(lines.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The agent's tool set, looked up by name.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.name()))
            .finish()
    }
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// All nine travel tools.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(TransportScheduleTool),
            Arc::new(PromoTool),
            Arc::new(PromoByCityTool),
            Arc::new(DestinationInfoTool),
            Arc::new(HotelAvailabilityTool),
            Arc::new(TranslateTool),
            Arc::new(CurrentDateTool),
            Arc::new(RecommendationBundleTool),
            Arc::new(AllModesTool),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Run a tool by name, substituting `location: <last_city>` for the
    /// argument of context-aware tools when a last city is known.
    pub async fn invoke(
        &self,
        name: &str,
        raw: &str,
        last_city: Option<&str>,
        ctx: &ToolContext,
    ) -> Result<String, ChatError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ChatError::ToolError(format!("unknown tool: {name}")))?;

        let wrapped;
        let arg = match last_city {
            Some(city) if tool.uses_city_context() && !city.is_empty() => {
                wrapped = format!("location: {city}");
                debug!(tool = name, raw, arg = %wrapped, "tool argument replaced with last city");
                wrapped.as_str()
            }
            _ => raw,
        };
        tool.call(arg, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tool_context;
    use chrono::TimeZone;

    fn hotels() -> Vec<String> {
        vec!["Bandung".to_string(), "Malang".to_string()]
    }

    // ---- ToolArgument ----

    #[test]
    fn test_parse_json_object_is_structured() {
        let arg = ToolArgument::parse(r#"{"destination": "Surabaya"}"#, &hotels());
        assert_eq!(arg.lookup("destination", "raw"), "Surabaya");
    }

    #[test]
    fn test_structured_key_beats_input() {
        let arg = ToolArgument::parse(r#"{"city": "Bali", "input": "bandung"}"#, &hotels());
        assert_eq!(arg.lookup("city", "raw"), "Bali");
        assert_eq!(arg.lookup("location", "raw"), "bandung");
    }

    #[test]
    fn test_structured_falls_back_to_raw() {
        let raw = r#"{"lang": "en"}"#;
        let arg = ToolArgument::parse(raw, &hotels());
        assert_eq!(arg.lookup("text", raw), raw);
    }

    #[test]
    fn test_location_convention_with_known_city() {
        let arg = ToolArgument::parse("location: malang", &hotels());
        assert_eq!(arg.get("location").as_deref(), Some("Malang"));
    }

    #[test]
    fn test_location_convention_with_unknown_city_is_free_text() {
        let arg = ToolArgument::parse("  Location: Medan ", &hotels());
        assert_eq!(arg, ToolArgument::FreeText("location: medan".to_string()));
    }

    #[test]
    fn test_plain_text_is_lowercased_free_text() {
        let arg = ToolArgument::parse(" Surabaya ", &hotels());
        assert_eq!(arg.lookup("destination", " Surabaya "), "surabaya");
        assert!(arg.get("destination").is_none());
    }

    #[test]
    fn test_non_object_json_is_free_text() {
        let arg = ToolArgument::parse("42", &hotels());
        assert_eq!(arg, ToolArgument::FreeText("42".to_string()));
    }

    #[test]
    fn test_non_string_values_stringified() {
        let arg = ToolArgument::parse(r#"{"input": 7}"#, &hotels());
        assert_eq!(arg.lookup("location", ""), "7");
    }

    // ---- tools ----

    #[tokio::test]
    async fn test_promo_by_city_found_and_missing() {
        let ctx = tool_context().await;
        let found = PromoByCityTool.call(r#"{"city": "surabaya"}"#, &ctx).await.unwrap();
        assert!(found.contains("Weekend Getaway"));

        let missing = PromoByCityTool.call("Medan", &ctx).await.unwrap();
        assert_eq!(missing, "🎁 Tidak ada promo tersedia untuk kota **medan**.");
    }

    #[tokio::test]
    async fn test_hotel_availability_uses_location_convention() {
        let ctx = tool_context().await;
        let out = HotelAvailabilityTool
            .call("location: Bandung", &ctx)
            .await
            .unwrap();
        assert!(out.contains("Hotel Braga"));
        assert!(!out.contains("Hotel Tugu"));
    }

    #[tokio::test]
    async fn test_hotel_availability_missing() {
        let ctx = tool_context().await;
        let out = HotelAvailabilityTool.call("Medan", &ctx).await.unwrap();
        assert_eq!(out, "🏨 Tidak ada hotel tersedia di **medan**.");
    }

    #[test]
    fn test_destination_info_render() {
        let evening = Local.with_ymd_and_hms(2025, 5, 1, 19, 0, 0).unwrap();
        let rows = Table::new(vec!["location".into()], vec![vec!["Bandung".into()]]);
        let out = DestinationInfoTool::render("Bandung", rows, evening);
        assert!(out.ends_with("📅 Catatan Cuaca: Cuaca mendukung untuk bepergian malam."));

        let empty = DestinationInfoTool::render("Medan", Table::default(), evening);
        assert_eq!(empty, "📍 Tidak ada informasi tentang **Medan**.");
    }

    #[test]
    fn test_weather_note_bounds() {
        assert_eq!(weather_note(18), "Cuaca mendukung untuk bepergian malam.");
        assert_eq!(weather_note(23), "Cuaca mendukung untuk bepergian malam.");
        assert!(weather_note(17).starts_with("Cuaca mungkin tidak ideal"));
        assert!(weather_note(0).starts_with("Cuaca mungkin tidak ideal"));
    }

    #[tokio::test]
    async fn test_translate_prefixes() {
        let ctx = tool_context().await;
        let en = TranslateTool
            .call(r#"{"text": "hello", "lang": "EN"}"#, &ctx)
            .await
            .unwrap();
        assert_eq!(en, "(EN) hello");
        let default = TranslateTool.call(r#"{"text": "halo"}"#, &ctx).await.unwrap();
        assert_eq!(default, "(ID) halo");
        let other = TranslateTool
            .call(r#"{"text": "halo", "lang": "jp"}"#, &ctx)
            .await
            .unwrap();
        assert_eq!(other, "(Translated [jp]) halo");
    }

    #[tokio::test]
    async fn test_current_date_format() {
        let ctx = tool_context().await;
        let out = CurrentDateTool.call("", &ctx).await.unwrap();
        assert!(out.starts_with("📅 "));
        assert_eq!(out.matches(':').count(), 1);
    }

    #[tokio::test]
    async fn test_bundle_tool_lists_both_tables() {
        let ctx = tool_context().await;
        let out = RecommendationBundleTool.call("bandung", &ctx).await.unwrap();
        assert!(out.starts_with("**Rekomendasi untuk kota Bandung:**"));
        assert!(out.contains("Hotel Braga"));
        assert!(out.contains("bus"));
    }

    #[tokio::test]
    async fn test_all_modes_listing() {
        let ctx = tool_context().await;
        let out = AllModesTool.call("", &ctx).await.unwrap();
        assert_eq!(
            out,
            "📋 **Daftar semua kendaraan dan kota tujuannya:**\n- **Bus**: Bandung\n- **Kereta**: Bandung, Surabaya\n- **Pesawat**: Surabaya"
        );
    }

    #[tokio::test]
    async fn test_transport_schedule_searches_index() {
        let ctx = tool_context().await;
        let out = TransportScheduleTool
            .call(r#"{"destination": "Bandung bus"}"#, &ctx)
            .await
            .unwrap();
        assert!(out.lines().count() <= ctx.top_k);
        assert!(out.lines().next().unwrap().contains("Bandung"));
    }

    // ---- registry ----

    #[test]
    fn test_standard_registry_names() {
        let registry = ToolRegistry::standard();
        assert_eq!(registry.names().len(), 9);
        assert!(registry.get("get_all_kendaraan_kota").is_some());
        assert_eq!(registry.definitions()[0].name, "get_transport_schedule");
    }

    #[test]
    fn test_context_exempt_tools() {
        let registry = ToolRegistry::standard();
        let exempt: Vec<&str> = registry
            .names()
            .into_iter()
            .filter(|n| !registry.get(n).unwrap().uses_city_context())
            .collect();
        assert_eq!(exempt, vec!["get_current_date", "get_all_kendaraan_kota"]);
    }

    #[tokio::test]
    async fn test_invoke_replaces_argument_with_last_city() {
        let ctx = tool_context().await;
        let registry = ToolRegistry::standard();
        let out = registry
            .invoke("get_hotel_availability", r#"{"location": "Bandung"}"#, Some("Malang"), &ctx)
            .await
            .unwrap();
        assert!(out.contains("Hotel Tugu"));
        assert!(!out.contains("Hotel Braga"));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let ctx = tool_context().await;
        let err = ToolRegistry::standard()
            .invoke("book_flight", "", None, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ToolError(_)));
    }
}
