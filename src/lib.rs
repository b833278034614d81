//! Générateur de cours de français en batch, adossé à un backend Ollama local.
//!
//! Le pipeline lit un plan de cours markdown, construit un prompt par élément,
//! interroge le modèle avec cache et retry, puis rend chaque réponse en page
//! HTML stylée par catégorie.
//!
//! # Architecture en couches
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ main.rs            CLI, configuration        │
//! ├─────────────────────────────────────────────┤
//! │ orchestrator/      batches, concurrence,     │
//! │                    rapport d'exécution       │
//! ├─────────────────────────────────────────────┤
//! │ parser, prompts,   plan de cours → items,    │
//! │ html/              items → prompts → pages   │
//! ├─────────────────────────────────────────────┤
//! │ clients/           HTTP Ollama, cache BLAKE3,│
//! │                    retry + backoff, stats    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Chaque couche ne dépend que de celles du dessous; `config`, `error`,
//! `logging` et `models` sont transverses.

pub mod clients;
pub mod config;
pub mod error;
pub mod html;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompts;

pub use clients::{OllamaClient, PromptOptimizer, StatsSnapshot};
pub use config::Config;
pub use error::{GeneratorError, Result};
pub use html::HtmlRenderer;
pub use models::{CourseItem, ItemOutcome, ItemReport, ItemStatus, RunReport};
pub use orchestrator::App;
pub use parser::{OutlineParser, ParseStats};
pub use prompts::PromptTemplates;
