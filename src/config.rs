//! Configuration du générateur.
//!
//! Trois couches, appliquées dans l'ordre : valeurs par défaut,
//! fichier `config.toml` (optionnel), variables d'environnement.
//! Les options de ligne de commande sont appliquées en dernier par `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GeneratorError, Result};

/// Configuration complète du générateur
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Adresse de base du backend Ollama
    pub base_url: String,
    /// Identifiant du modèle
    pub model: String,
    /// Longueur maximale de sortie (num_predict)
    pub max_tokens: u32,
    /// Température de génération
    pub temperature: f32,
    /// Nombre de tentatives par requête
    pub retry_count: u32,
    /// Timeout d'une requête, en secondes
    pub timeout_secs: u64,
    /// Nombre d'items traités concurremment par batch
    pub batch_size: usize,
    /// Pause entre deux batches, en secondes
    pub batch_pause_secs: u64,
    /// Répertoire de sortie des cours générés
    pub output_dir: PathBuf,
    /// Ne pas regénérer les cours dont le fichier HTML existe déjà
    pub skip_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma:7b".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            retry_count: 3,
            timeout_secs: 120,
            batch_size: 5,
            batch_pause_secs: 1,
            output_dir: PathBuf::from("output/generated_courses"),
            skip_existing: false,
        }
    }
}

impl Config {
    /// Charge la configuration depuis un fichier TOML.
    ///
    /// Un fichier absent n'est pas une erreur : on repart des valeurs
    /// par défaut. Un fichier présent mais invalide est fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("lecture de {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            GeneratorError::Config(format!("parsing de {}: {}", path.display(), e))
        })
    }

    /// Applique les variables d'environnement par-dessus la configuration.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("OLLAMA_MODEL") {
            self.model = v;
        }
        if let Some(v) = env_parse("OLLAMA_MAX_TOKENS") {
            self.max_tokens = v;
        }
        if let Some(v) = env_parse("OLLAMA_TEMPERATURE") {
            self.temperature = v;
        }
        if let Some(v) = env_parse("GENERATOR_RETRY_COUNT") {
            self.retry_count = v;
        }
        if let Some(v) = env_parse("GENERATOR_TIMEOUT_SECS") {
            self.timeout_secs = v;
        }
        if let Some(v) = env_parse("GENERATOR_BATCH_SIZE") {
            self.batch_size = v;
        }
        if let Ok(v) = std::env::var("GENERATOR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_expectations() {
        let config = Config::default();
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.batch_pause_secs, 1);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.model, Config::default().model);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let parsed: Config = toml::from_str(r#"model = "mistral:7b""#).unwrap();
        assert_eq!(parsed.model, "mistral:7b");
        assert_eq!(parsed.batch_size, 5);
    }
}
