//! Analysis agents (C5). Each submodule is one node in the layered DAG
//! spec.md §4.5 describes; `pipeline.rs` wires them together behind the
//! Agent Runner.

pub mod agreement;
pub mod ambiguity;
pub mod context_analyst;
pub mod context_connection;
pub mod conversation_context_builder;
pub mod conversation_flow;
pub mod deep_learning;
pub mod example_intelligence;
pub mod fake_context_builder;
pub mod first_message;
pub mod knowledge_synthesizer;
pub mod learning_integrator;
pub mod meeting_response;
pub mod meta_validator;
pub mod multi_situation;
pub mod profile_filter;
pub mod rule_interpreter;
pub mod rules_applicator;
pub mod situation_detector;
pub mod style_analyst;
