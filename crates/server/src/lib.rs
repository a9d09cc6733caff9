//! Thin HTTP surface for the persona reply engine. Wires the persisted
//! rules/training/learning-stats snapshot and the default capability
//! adapters into `persona-agent`; everything past request parsing is the
//! orchestrator's job (spec.md §1, "the HTTP transport layer" is
//! explicitly out of the core's scope, but every deployment needs one).

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
