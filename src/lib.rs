//! Concierge — conversational agent orchestration for the CRM assistant.
//!
//! Drives one multi-turn exchange with an LLM provider: streams assistant
//! text to the caller as it arrives, executes provider-announced tool calls
//! between generation stages, and durably records the finished turn in a
//! conversation store. The provider, the store, the tool set, and the chunk
//! consumer are all trait collaborators supplied by the embedding
//! application.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use concierge::prelude::*;
//!
//! # async fn example() -> concierge::error::Result<()> {
//! let store = Arc::new(InMemoryConversationStore::new());
//! let registry = Arc::new(StaticToolRegistry::new(vec![]));
//! let adapter = Arc::new(OpenAiCompatibleAdapter::new(LlmConfig::from_env()?));
//! let orchestrator = Orchestrator::new(store, registry, adapter);
//!
//! let (sink, mut chunks) = ChannelSink::new(32);
//! let request = TurnRequest::new("What's my pipeline status?")
//!     .with_caller(CallerIdentity::new(uuid::Uuid::new_v4()));
//! let outcome = orchestrator.run(request, &sink).await;
//! # let _ = (outcome, chunks.recv().await);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prelude;
pub mod prompt;
pub mod sink;
pub mod store;
pub mod tools;
pub mod types;
pub mod util;
