//! Orchestration du pipeline de génération.
//!
//! [`App`] assemble les couches du crate : parsing du plan, construction des
//! prompts, appels au client Ollama et rendu HTML, le tout par batches
//! concurrents bornés.

pub mod batch;

pub use batch::App;
