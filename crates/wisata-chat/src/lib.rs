//! Conversational interface for the Wisata travel assistant.
//!
//! Routes each user turn to a promo, bundle or transport lookup against the
//! travel datasets, or to the tool-calling language-model agent, and keeps
//! the per-session conversation state (history and last city of interest).

pub mod agent;
pub mod context;
pub mod error;
pub mod explorer;
pub mod intent;
pub mod orchestrator;
pub mod resolver;
pub mod response;
pub mod router;
pub mod tools;
pub mod types;

#[cfg(test)]
mod testing;

pub use agent::ToolAgent;
pub use context::{ClearFlow, ConversationState};
pub use error::ChatError;
pub use explorer::{CityExplorer, CityProfile};
pub use intent::{IntentClassifier, IntentRule, RoutingSignals};
pub use orchestrator::{ChatOrchestrator, ChatReply, SessionSummary};
pub use resolver::{CitySource, ResolvedCity};
pub use router::DialogueRouter;
pub use tools::{Tool, ToolArgument, ToolContext, ToolRegistry};
pub use types::{ChatEntry, Intent, TurnOutcome};
