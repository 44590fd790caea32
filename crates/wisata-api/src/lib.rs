//! Wisata API crate - axum HTTP surface over the chat orchestrator.
//!
//! Exposes chat turns, session management, the history-clear flow and the
//! city lookup box as JSON endpoints. Each session keeps its own isolated
//! conversation state.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
