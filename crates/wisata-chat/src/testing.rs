//! Fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wisata_core::config::ChatConfig;
use wisata_data::{Catalog, Dataset, DatasetKind};
use wisata_provider::{
    Encyclopedia, LanguageModel, LlmRequest, LlmResponse, ProviderError,
};
use wisata_vector::{HashingEmbedding, RetrievalIndex};

use crate::agent::ToolAgent;
use crate::explorer::CityExplorer;
use crate::intent::IntentClassifier;
use crate::orchestrator::ChatOrchestrator;
use crate::router::DialogueRouter;
use crate::tools::{ToolContext, ToolRegistry};

pub const TRANSPORT: &str = "destination,mode,departure,price\n\
    Surabaya,kereta,08:00,150000\n\
    Bandung,bus,09:30,90000\n\
    Surabaya,pesawat,13:00,900000\n\
    Bandung,kereta,07:15,120000\n";
pub const PROMO: &str = "location,promo,discount\nSurabaya,Weekend Getaway,20%\n";
pub const DESTINATION: &str = "location,attraction,category\nBandung,Kawah Putih,alam\n";
pub const HOTEL: &str = "location,hotel_name,price_per_night\n\
    Bandung,Hotel Braga,450000\n\
    Malang,Hotel Tugu,800000\n";

pub fn catalog() -> Catalog {
    let load = |kind, csv: &str| Dataset::from_reader(kind, csv.as_bytes()).unwrap();
    Catalog {
        transport: load(DatasetKind::Transport, TRANSPORT),
        promo: load(DatasetKind::Promo, PROMO),
        destination: load(DatasetKind::Destination, DESTINATION),
        hotel: load(DatasetKind::Hotel, HOTEL),
    }
}

pub async fn tool_context() -> ToolContext {
    let catalog = Arc::new(catalog());
    let retrieval = RetrievalIndex::build(catalog.documents(), Arc::new(HashingEmbedding::new(256)))
        .await
        .unwrap();
    ToolContext {
        catalog,
        retrieval: Arc::new(retrieval),
        top_k: 5,
    }
}

/// Orchestrator over the fixture catalog with every model call answered
/// by `model`.
pub async fn orchestrator(
    model: Arc<ScriptedModel>,
    description: Option<&str>,
    session_timeout_minutes: u32,
) -> ChatOrchestrator {
    let agent = ToolAgent::new(
        model.clone(),
        ToolRegistry::standard(),
        tool_context().await,
        3,
        5,
    );
    let router = DialogueRouter::new(
        Arc::new(catalog()),
        IntentClassifier::default(),
        agent,
        model.clone(),
        ChatConfig::default(),
    );
    let explorer = CityExplorer::new(
        model,
        Arc::new(FixedEncyclopedia(description.map(String::from))),
        3,
    );
    ChatOrchestrator::new(router, explorer, session_timeout_minutes)
}

/// Language model double answering from a queue and recording requests.
/// An exhausted queue answers with empty text.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(LlmResponse::from_text(*t)))
                .collect(),
        )
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, idx: usize) -> LlmRequest {
        self.requests.lock().unwrap()[idx].clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse::default()))
    }
}

/// Encyclopedia double with a fixed answer.
pub struct FixedEncyclopedia(pub Option<String>);

#[async_trait]
impl Encyclopedia for FixedEncyclopedia {
    async fn summary(&self, title: &str, _sentences: usize) -> Result<String, ProviderError> {
        self.0
            .clone()
            .ok_or_else(|| ProviderError::NotFound(title.to_string()))
    }
}
