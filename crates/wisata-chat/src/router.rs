//! Dialogue router: one user turn in, history entries out.
//!
//! Each turn appends the user's entry, classifies the utterance and runs
//! exactly one handler. Handler failures never escape a turn; they become a
//! single error entry and the turn still counts as handled.

use std::sync::Arc;

use tracing::{debug, warn};
use wisata_core::config::ChatConfig;
use wisata_core::text::{contains_ignore_case, first_mentioned};
use wisata_data::{Catalog, Table};
use wisata_provider::LanguageModel;

use crate::agent::ToolAgent;
use crate::context::ConversationState;
use crate::error::ChatError;
use crate::intent::{IntentClassifier, RoutingSignals};
use crate::resolver::{resolve_transport_city, ResolvedCity};
use crate::response::{
    bundle_header, enrich_with_city, fallback_prompt, no_promo, promo_header, transport_header,
    turn_error, BUNDLE_NEEDS_CITY, TRANSPORT_NOT_FOUND,
};
use crate::types::{ChatEntry, Intent, TurnOutcome};

pub struct DialogueRouter {
    catalog: Arc<Catalog>,
    classifier: IntentClassifier,
    agent: ToolAgent,
    model: Arc<dyn LanguageModel>,
    config: ChatConfig,
}

impl DialogueRouter {
    pub fn new(
        catalog: Arc<Catalog>,
        classifier: IntentClassifier,
        agent: ToolAgent,
        model: Arc<dyn LanguageModel>,
        config: ChatConfig,
    ) -> Self {
        Self {
            catalog,
            classifier,
            agent,
            model,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validate the utterance without touching any state.
    pub fn validate(&self, utterance: &str) -> Result<(), ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if utterance.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }
        Ok(())
    }

    /// Process one turn against `state`.
    ///
    /// Only validation errors are returned; they leave `state` untouched.
    /// Everything after the user's entry is appended is reported in the
    /// outcome, including error notices.
    pub async fn handle_turn(
        &self,
        state: &mut ConversationState,
        utterance: &str,
    ) -> Result<TurnOutcome, ChatError> {
        self.validate(utterance)?;

        state.push(ChatEntry::user(utterance));
        let start = state.history.len();

        let signals = self.classifier.signals(
            utterance,
            &self.catalog.promo.cities(),
            state.last_city(),
        );
        let intent = self.classifier.classify(&signals);

        let city = match self.dispatch(intent, &signals, state, utterance).await {
            Ok(city) => city,
            Err(e) => {
                warn!(intent = %intent, error = %e, "turn failed");
                state.push(ChatEntry::bot(turn_error(&e)));
                None
            }
        };
        debug!(intent = %intent, city = ?city, "turn handled");

        Ok(TurnOutcome {
            intent,
            city,
            entries: state.history[start..].to_vec(),
        })
    }

    async fn dispatch(
        &self,
        intent: Intent,
        signals: &RoutingSignals,
        state: &mut ConversationState,
        utterance: &str,
    ) -> Result<Option<String>, ChatError> {
        match intent {
            Intent::BundleRecommendation => Ok(self.bundle(state, utterance)),
            Intent::PromoQuery => Ok(self.promo(state, signals.promo_city.as_ref())),
            Intent::TransportQuery => Ok(self.transport(state, utterance)),
            Intent::GeneralQuery => self.general(state, utterance).await,
        }
    }

    fn bundle(&self, state: &mut ConversationState, utterance: &str) -> Option<String> {
        let hotel_cities = self.catalog.hotel.cities();
        let city = match first_mentioned(utterance, &hotel_cities) {
            Some(city) => {
                state.set_last_city(city);
                city.to_string()
            }
            None => {
                let last = state
                    .last_city()
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
                let Some(city) = last else {
                    state.push(ChatEntry::bot(BUNDLE_NEEDS_CITY));
                    return None;
                };
                city
            }
        };

        let bundle = self.catalog.recommendation_bundle(&city);
        state.push(ChatEntry::bot(bundle_header(&bundle.location)));
        for table in [bundle.transport, bundle.hotel].into_iter().flatten() {
            state.push(ChatEntry::Table(table));
        }
        Some(city)
    }

    fn promo(&self, state: &mut ConversationState, city: Option<&ResolvedCity>) -> Option<String> {
        let city = city?;
        let rows = self.catalog.promo.by_city_contains(&city.name);
        if rows.is_empty() {
            state.push(ChatEntry::bot(no_promo(&city.name)));
        } else {
            state.push(ChatEntry::bot(promo_header(&city.name)));
            state.push(ChatEntry::Table(rows));
        }
        Some(city.name.clone())
    }

    fn transport(&self, state: &mut ConversationState, utterance: &str) -> Option<String> {
        match self.transport_rows(state, utterance) {
            Some((city, mode, rows)) => {
                state.push(ChatEntry::bot(transport_header(mode.as_deref(), &city.name)));
                state.push(ChatEntry::Table(rows));
                if city.is_explicit() {
                    state.set_last_city(city.name.clone());
                }
                Some(city.name)
            }
            None => {
                state.push(ChatEntry::bot(TRANSPORT_NOT_FOUND));
                None
            }
        }
    }

    /// Destination, optional mode and the matching rows; `None` when the
    /// city does not resolve or nothing matches.
    fn transport_rows(
        &self,
        state: &ConversationState,
        utterance: &str,
    ) -> Option<(ResolvedCity, Option<String>, Table)> {
        let transport = &self.catalog.transport;
        let city = resolve_transport_city(
            &state.history,
            utterance,
            &transport.cities(),
            state.last_city(),
        )?;
        let mode = self
            .catalog
            .modes()
            .into_iter()
            .find(|m| contains_ignore_case(utterance, m));

        let mut rows = transport.by_city_equals(&city.name);
        if let Some(mode) = &mode {
            rows = rows.filter_equals(wisata_data::catalog::MODE_COLUMN, mode);
        }
        if rows.is_empty() {
            return None;
        }
        Some((city, mode, rows))
    }

    async fn general(
        &self,
        state: &mut ConversationState,
        utterance: &str,
    ) -> Result<Option<String>, ChatError> {
        let last_city = state.last_city().map(str::to_string);
        let prompt = enrich_with_city(utterance, last_city.as_deref());

        let prior = &state.history[..state.history.len().saturating_sub(1)];
        let memory = self.agent.memory(prior);
        let agent_reply = self
            .agent
            .run(&prompt, memory, last_city.as_deref())
            .await;

        let answer = match agent_reply {
            Ok(reply) if self.is_adequate(&reply) => reply,
            Ok(reply) => {
                warn!(reply_len = reply.len(), "agent reply inadequate, using fallback");
                self.fallback(state, &prompt).await?
            }
            Err(e) => {
                warn!(error = %e, "agent failed, using fallback");
                self.fallback(state, &prompt).await?
            }
        };

        state.push(ChatEntry::bot(answer));
        Ok(last_city)
    }

    fn is_adequate(&self, reply: &str) -> bool {
        let marker = self.config.non_knowledge_marker.as_str();
        !reply.trim().is_empty() && (marker.is_empty() || !contains_ignore_case(reply, marker))
    }

    async fn fallback(&self, state: &ConversationState, prompt: &str) -> Result<String, ChatError> {
        let skip = state
            .history
            .len()
            .saturating_sub(self.config.fallback_context_entries);
        let prompt = fallback_prompt(prompt, &state.history[skip..]);
        let answer = self.model.complete(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog, tool_context, ScriptedModel};
    use crate::tools::ToolRegistry;
    use wisata_provider::ProviderError;

    async fn router(model: Arc<ScriptedModel>) -> DialogueRouter {
        router_with(model, ChatConfig::default()).await
    }

    async fn router_with(model: Arc<ScriptedModel>, config: ChatConfig) -> DialogueRouter {
        let agent = ToolAgent::new(
            model.clone(),
            ToolRegistry::standard(),
            tool_context().await,
            3,
            5,
        );
        DialogueRouter::new(
            Arc::new(catalog()),
            IntentClassifier::default(),
            agent,
            model,
            config,
        )
    }

    fn texts(entries: &[ChatEntry]) -> Vec<String> {
        entries.iter().map(ChatEntry::text).collect()
    }

    // ---- validation ----

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let err = router.handle_turn(&mut state, "   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_long_message_rejected() {
        let config = ChatConfig {
            max_message_length: 10,
            ..ChatConfig::default()
        };
        let router = router_with(Arc::new(ScriptedModel::default()), config).await;
        let mut state = ConversationState::new();
        let err = router
            .handle_turn(&mut state, "promo ke Surabaya sekarang")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong(10)));
        assert!(state.history.is_empty());
    }

    // ---- promo ----

    #[tokio::test]
    async fn test_promo_with_rows() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "promo ke Surabaya").await.unwrap();
        assert_eq!(outcome.intent, Intent::PromoQuery);
        assert_eq!(outcome.city.as_deref(), Some("Surabaya"));
        assert_eq!(outcome.entries.len(), 2);
        assert!(matches!(outcome.entries[1], ChatEntry::Table(ref t) if t.len() == 1));
        assert_eq!(state.history.len(), 3);
    }

    #[tokio::test]
    async fn test_promo_falls_back_to_last_city_without_rewriting_it() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        state.set_last_city("Bandung");
        let outcome = router.handle_turn(&mut state, "ada promo?").await.unwrap();
        assert_eq!(outcome.intent, Intent::PromoQuery);
        assert_eq!(
            texts(&outcome.entries),
            vec!["🏱 Tidak ada promo tersedia untuk kota **Bandung**."]
        );
        assert_eq!(state.last_city(), Some("Bandung"));
    }

    // ---- bundle ----

    #[tokio::test]
    async fn test_bundle_without_city_asks_for_one() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let outcome = router
            .handle_turn(&mut state, "rekomendasi hotel dan kendaraan dong")
            .await
            .unwrap();
        assert_eq!(outcome.intent, Intent::BundleRecommendation);
        assert_eq!(texts(&outcome.entries), vec![BUNDLE_NEEDS_CITY]);
        assert!(outcome.city.is_none());
    }

    #[tokio::test]
    async fn test_bundle_explicit_city_updates_last_city() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        state.set_last_city("Surabaya");
        let outcome = router
            .handle_turn(&mut state, "rekomendasi penginapan dan transport di malang")
            .await
            .unwrap();
        assert_eq!(outcome.entries[0].text(), "**Rekomendasi untuk kota Malang:**");
        // Malang has hotels but no transport rows.
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(state.last_city(), Some("Malang"));
    }

    // ---- transport ----

    #[tokio::test]
    async fn test_transport_filters_by_city_and_mode() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let outcome = router
            .handle_turn(&mut state, "harga tiket kereta ke Bandung")
            .await
            .unwrap();
        assert_eq!(outcome.intent, Intent::TransportQuery);
        assert_eq!(outcome.entries[0].text(), "Berikut info kereta menuju Bandung");
        let ChatEntry::Table(table) = &outcome.entries[1] else {
            panic!("expected table");
        };
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "departure"), Some("07:15"));
        assert_eq!(state.last_city(), Some("Bandung"));
    }

    #[tokio::test]
    async fn test_transport_not_found() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "tiket ke Medan").await.unwrap();
        assert_eq!(texts(&outcome.entries), vec![TRANSPORT_NOT_FOUND]);
        assert!(state.last_city().is_none());
    }

    #[tokio::test]
    async fn test_transport_mode_without_rows_is_not_found() {
        let router = router(Arc::new(ScriptedModel::default())).await;
        let mut state = ConversationState::new();
        let outcome = router
            .handle_turn(&mut state, "tiket pesawat ke Bandung")
            .await
            .unwrap();
        assert_eq!(texts(&outcome.entries), vec![TRANSPORT_NOT_FOUND]);
    }

    // ---- general ----

    #[tokio::test]
    async fn test_general_uses_agent_answer() {
        let model = Arc::new(ScriptedModel::texts(&["Baik, terima kasih!"]));
        let router = router(model.clone()).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "Apa kabar?").await.unwrap();
        assert_eq!(outcome.intent, Intent::GeneralQuery);
        assert_eq!(texts(&outcome.entries), vec!["Baik, terima kasih!"]);
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test]
    async fn test_general_enriches_prompt_with_last_city() {
        let model = Arc::new(ScriptedModel::texts(&["Cerah."]));
        let router = router(model.clone()).await;
        let mut state = ConversationState::new();
        state.set_last_city("Malang");
        router.handle_turn(&mut state, "cuacanya gimana?").await.unwrap();
        let req = model.request(0);
        assert_eq!(
            req.messages.last().unwrap().text(),
            "Untuk Malang, cuacanya gimana?"
        );
    }

    #[tokio::test]
    async fn test_non_knowledge_reply_triggers_fallback() {
        let model = Arc::new(ScriptedModel::texts(&["I DON'T KNOW.", "Jawaban cadangan"]));
        let router = router(model.clone()).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "Apa kabar?").await.unwrap();
        assert_eq!(texts(&outcome.entries), vec!["Jawaban cadangan"]);
        assert_eq!(model.request_count(), 2);
        let fallback = model.request(1);
        assert!(fallback.tools.is_empty());
        assert!(fallback.messages[0].text().contains("User: Apa kabar?"));
    }

    #[tokio::test]
    async fn test_agent_error_triggers_fallback() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ProviderError::Timeout),
            Ok(wisata_provider::LlmResponse::from_text("cadangan")),
        ]));
        let router = router(model).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "Apa kabar?").await.unwrap();
        assert_eq!(texts(&outcome.entries), vec!["cadangan"]);
    }

    #[tokio::test]
    async fn test_fallback_failure_becomes_error_entry() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::Timeout),
        ]));
        let router = router(model).await;
        let mut state = ConversationState::new();
        let outcome = router.handle_turn(&mut state, "Apa kabar?").await.unwrap();
        assert_eq!(
            texts(&outcome.entries),
            vec!["🚨 Kesalahan: LLM error: request timed out"]
        );
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn test_agent_memory_excludes_current_utterance() {
        let model = Arc::new(ScriptedModel::texts(&["satu", "dua"]));
        let router = router(model.clone()).await;
        let mut state = ConversationState::new();
        router.handle_turn(&mut state, "Halo").await.unwrap();
        router.handle_turn(&mut state, "Lagi").await.unwrap();
        let req = model.request(1);
        let texts: Vec<String> = req.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["Halo", "satu", "Lagi"]);
    }
}
