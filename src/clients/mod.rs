//! Couche client — accès au backend de génération.

pub mod ollama_client;

pub use ollama_client::{OllamaClient, PromptOptimizer, StatsSnapshot};
