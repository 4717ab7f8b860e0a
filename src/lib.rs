//! # Vishing Trainer
//!
//! Core of a voice-phishing training simulator: a scripted scam-call scenario
//! is expressed as a declarative workflow graph with natural-language
//! transition predicates, executed turn-by-turn by a conversational-voice-AI
//! platform, while a session controller tracks the attempt and classifies its
//! outcome from an in-band termination tag.
//!
//! ## Features
//!
//! - **Scenario Workflow Graph**: declarative node/edge tables driving the
//!   persona through five escalating social-engineering stages with paired
//!   persuasion counter-stages and three classified endings
//! - **Termination Tag Protocol**: lenient detection / strict parsing of the
//!   `[END_SCENARIO:...]` marker the persona embeds in its own speech
//! - **Context Injection**: trainee profile fields substituted into persona
//!   prompts, with relationship-appropriate honorifics
//! - **Session Controller**: call lifecycle with an idempotent end latch
//!   reconciling tag, disconnect, hangup, and duration-cap triggers
//! - **Provider Glue**: ElevenLabs agent provisioning and Vapi transient
//!   assistants behind one `VoiceConnector`/`VoiceSession` surface
//!
//! ## Architecture
//!
//! ```text
//! Trainee ⇄ Voice Platform (executes ScenarioGraph) ⇄ LLM persona
//!                  ↓ events
//!           SessionController → SQLite (history)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vishing_trainer::{Config, SessionController};
//! use vishing_trainer::scenario::{ScenarioType, UserContext};
//! use vishing_trainer::storage::SqliteHistory;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let history = Arc::new(SqliteHistory::new(&config.database).await?);
//!     let controller = SessionController::new(config.session.clone(), history);
//!     controller.prepare(ScenarioType::Prosecutor, UserContext::default())?;
//!     // controller.start_call(&connector, setup).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management for the trainer.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Voice platform adapters and the agent provisioning client.
pub mod provider;
/// Scenario graphs, prompts, context injection, and the termination protocol.
pub mod scenario;
/// Training session lifecycle and the session controller.
pub mod session;
/// SQLite storage layer for the session history log.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::SessionController;
