//! Client Ollama : cache, retry et backoff.
//!
//! C'est le cœur du pipeline. Un appel [`OllamaClient::generate`] :
//! 1. calcule une clé de cache (hash BLAKE3 du triplet modèle/prompt/système)
//!    et retourne immédiatement le texte en cas de hit,
//! 2. sinon tente jusqu'à `retry_count` requêtes vers `/api/generate`, avec
//!    un backoff exponentiel (1 s, 2 s, 4 s, ...) entre deux échecs,
//! 3. au premier succès, met le texte en cache et l'accumule aux statistiques.
//!
//! L'épuisement des tentatives est un résultat normal (`Err`), jamais un
//! panic : l'orchestrateur le convertit en échec d'item.
//!
//! Le cache et les compteurs sont partagés entre toutes les tâches d'un batch
//! (`Arc<Mutex<_>>` pour le cache, compteurs atomiques pour les stats).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{GeneratorError, Result};

/// Marqueur d'élision inséré au milieu des prompts tronqués
const ELISION_MARKER: &str = "\n[...]\n";

/// Timeout de la requête de catalogue (courte, hors génération)
const TAGS_TIMEOUT: Duration = Duration::from_secs(10);

/// Corps de la requête `/api/generate`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Réponse de `/api/generate`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    eval_count: Option<u64>,
}

/// Réponse de `/api/tags`
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Compteurs d'utilisation, incrémentés sans verrou
#[derive(Debug, Default)]
struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    cache_hits: AtomicU64,
    total_tokens: AtomicU64,
}

/// Instantané des statistiques du client
#[derive(Clone, Debug, PartialEq)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub cache_hits: u64,
    pub total_tokens: u64,
    pub cache_size: usize,
    /// Pourcentage de requêtes réussies (0.0 si aucune requête)
    pub success_rate: f64,
}

/// Client du backend Ollama
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    retry_count: u32,
    timeout: Duration,
    cache: Arc<Mutex<HashMap<String, String>>>,
    stats: Arc<ClientStats>,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry_count: config.retry_count.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
            cache: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(ClientStats::default()),
        }
    }

    /// Modèle configuré.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Génère du contenu pour un prompt, avec cache et retry.
    ///
    /// Un hit de cache ne compte ni dans les requêtes ni dans le budget de
    /// retry. L'épuisement des tentatives retourne
    /// [`GeneratorError::Generation`] avec l'erreur de la dernière tentative.
    pub async fn generate(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        if prompt.is_empty() {
            return Err(GeneratorError::EmptyPrompt);
        }

        let cache_key = self.cache_key(prompt, system_prompt);
        if let Some(cached) = self.cache_get(&cache_key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!("Résultat trouvé dans le cache");
            return Ok(cached);
        }

        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut last_error = String::new();
        for attempt in 0..self.retry_count {
            match self.request_once(prompt, system_prompt).await {
                Ok(text) => {
                    self.stats.successful_requests.fetch_add(1, Ordering::Relaxed);
                    self.cache_put(cache_key, text.clone());
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Tentative {} échouée: {}", attempt + 1, e);
                    last_error = e.to_string();
                    if attempt + 1 < self.retry_count {
                        // Backoff exponentiel: 1 s, 2 s, 4 s, ...
                        tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
                    }
                }
            }
        }

        self.stats.failed_requests.fetch_add(1, Ordering::Relaxed);
        error!("Échec de génération après {} tentatives", self.retry_count);
        Err(GeneratorError::Generation {
            attempts: self.retry_count,
            last_error,
        })
    }

    /// Une tentative: un POST vers `/api/generate`, borné par le timeout.
    async fn request_once(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            system: system_prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::BadResponse(format!(
                "HTTP {}: {}",
                status,
                crate::logging::truncate_text(&body, 200)
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::BadResponse(format!("corps JSON invalide: {}", e)))?;

        let Some(text) = parsed.response else {
            return Err(GeneratorError::BadResponse(
                "champ 'response' absent".to_string(),
            ));
        };

        if let Some(tokens) = parsed.eval_count {
            self.stats.total_tokens.fetch_add(tokens, Ordering::Relaxed);
        }

        Ok(text.trim().to_string())
    }

    /// Vérifie que le modèle configuré est présent dans le catalogue du
    /// backend (`/api/tags`). Préflight optionnel, jamais requis avant
    /// `generate`.
    pub async fn check_model_availability(&self) -> bool {
        let result = async {
            let response = self
                .http
                .get(format!("{}/api/tags", self.base_url))
                .timeout(TAGS_TIMEOUT)
                .send()
                .await?;

            if !response.status().is_success() {
                return Ok::<bool, reqwest::Error>(false);
            }

            let tags: TagsResponse = response.json().await?;
            Ok(tags.models.iter().any(|m| m.name == self.model))
        }
        .await;

        match result {
            Ok(available) => available,
            Err(e) => {
                error!("Erreur vérification modèle: {}", e);
                false
            }
        }
    }

    /// Test de connexion: une génération triviale doit aboutir.
    pub async fn test_connection(&self) -> bool {
        self.generate("Dis bonjour en français.", None).await.is_ok()
    }

    /// Tronque un prompt trop long en gardant le début (instructions) et la
    /// fin, autour d'un unique marqueur d'élision. Le résultat ne dépasse
    /// jamais `max_length` caractères; un prompt déjà assez court est rendu
    /// tel quel.
    pub fn optimize_prompt(&self, prompt: &str, max_length: usize) -> String {
        truncate_middle(prompt, max_length)
    }

    /// Clé de cache: hash BLAKE3 du triplet (modèle, prompt, système).
    ///
    /// L'absence de prompt système est hachée distinctement d'un prompt
    /// système vide.
    fn cache_key(&self, prompt: &str, system_prompt: Option<&str>) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.model.as_bytes());
        hasher.update(b"\n");
        hasher.update(prompt.as_bytes());
        hasher.update(b"\n");
        match system_prompt {
            Some(system) => {
                hasher.update(&[1]);
                hasher.update(system.as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    fn cache_get(&self, key: &str) -> Option<String> {
        self.cache.lock().get(key).cloned()
    }

    fn cache_put(&self, key: String, value: String) {
        self.cache.lock().insert(key, value);
    }

    /// Vide le cache.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        info!("Cache vidé");
    }

    /// Instantané des statistiques d'utilisation.
    pub fn stats(&self) -> StatsSnapshot {
        let total = self.stats.total_requests.load(Ordering::Relaxed);
        let successful = self.stats.successful_requests.load(Ordering::Relaxed);
        StatsSnapshot {
            total_requests: total,
            successful_requests: successful,
            failed_requests: self.stats.failed_requests.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            total_tokens: self.stats.total_tokens.load(Ordering::Relaxed),
            cache_size: self.cache.lock().len(),
            success_rate: successful as f64 / (total.max(1)) as f64 * 100.0,
        }
    }
}

/// Optimiseur de prompts pour les modèles locaux.
///
/// Travaille sur une estimation du nombre de tokens (≈ 4 caractères par
/// token en français), pas sur un comptage exact.
#[derive(Clone, Copy, Debug)]
pub struct PromptOptimizer {
    max_tokens: usize,
}

/// Longueur minimale (en caractères) sous laquelle on tronque brutalement
/// au lieu de préserver préfixe et suffixe
const HARD_TRUNCATE_FLOOR: usize = 200;

impl PromptOptimizer {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    /// Budget maximal de tokens de cet optimiseur.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Estime le nombre de tokens d'un texte (approximation par caractères).
    pub fn estimate_tokens(text: &str) -> usize {
        text.chars().count() / 4
    }

    /// Réduit un prompt proportionnellement au budget de tokens disponible.
    ///
    /// Les 200 premiers caractères (les instructions) sont toujours
    /// conservés; le reste est élidé au milieu. Sous le plancher de 200
    /// caractères, troncature brutale.
    pub fn optimize_for_model(&self, prompt: &str, available_tokens: usize) -> String {
        let estimated = Self::estimate_tokens(prompt);
        if estimated <= available_tokens {
            return prompt.to_string();
        }

        let chars: Vec<char> = prompt.chars().collect();
        let ratio = available_tokens as f64 / estimated as f64;
        let target_length = (chars.len() as f64 * ratio) as usize;

        if target_length < HARD_TRUNCATE_FLOOR {
            return chars[..target_length].iter().collect();
        }

        let instructions: String = chars[..HARD_TRUNCATE_FLOOR].iter().collect();
        let content: String = chars[HARD_TRUNCATE_FLOOR..].iter().collect();
        let remaining = target_length - HARD_TRUNCATE_FLOOR;

        format!("{}{}", instructions, truncate_middle(&content, remaining))
    }
}

/// Garde un préfixe et un suffixe de `text` autour du marqueur d'élision,
/// chacun de (`max_length` - longueur du marqueur) / 2 caractères. Le
/// résultat ne dépasse jamais `max_length` : sous la longueur du marqueur,
/// troncature brutale du début.
fn truncate_middle(text: &str, max_length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let marker_len = ELISION_MARKER.chars().count();
    if max_length <= marker_len {
        return chars[..max_length].iter().collect();
    }

    let keep = max_length - marker_len;
    let half = keep / 2;

    let prefix: String = chars[..half].iter().collect();
    let suffix: String = chars[chars.len() - half..].iter().collect();
    let truncated = format!("{}{}{}", prefix, ELISION_MARKER, suffix);

    info!(
        "Prompt tronqué de {} à {} caractères",
        chars.len(),
        truncated.chars().count()
    );
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OllamaClient {
        OllamaClient::new(&Config::default())
    }

    #[test]
    fn cache_key_is_stable_for_identical_inputs() {
        let client = test_client();
        let a = client.cache_key("Explique la métaphore", Some("système"));
        let b = client.cache_key("Explique la métaphore", Some("système"));
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_differs_when_any_input_differs() {
        let client = test_client();
        let base = client.cache_key("prompt", Some("système"));
        assert_ne!(base, client.cache_key("prompt!", Some("système")));
        assert_ne!(base, client.cache_key("prompt", Some("autre")));
        assert_ne!(base, client.cache_key("prompt", None));
    }

    #[test]
    fn cache_key_distinguishes_missing_and_empty_system_prompt() {
        let client = test_client();
        assert_ne!(
            client.cache_key("prompt", None),
            client.cache_key("prompt", Some(""))
        );
    }

    #[test]
    fn cache_key_separates_prompt_and_system_boundaries() {
        // "ab" + "c" et "a" + "bc" ne doivent pas produire la même clé
        let client = test_client();
        assert_ne!(
            client.cache_key("ab", Some("c")),
            client.cache_key("a", Some("bc"))
        );
    }

    #[test]
    fn short_prompt_is_returned_unchanged() {
        let client = test_client();
        let prompt = "Explique X en 10 mots";
        assert_eq!(client.optimize_prompt(prompt, 3000), prompt);
    }

    #[test]
    fn long_prompt_is_bounded_and_keeps_both_ends() {
        let client = test_client();
        let prompt: String = "début ".repeat(100) + &"fin ".repeat(100);
        let optimized = client.optimize_prompt(&prompt, 300);

        assert!(optimized.chars().count() <= 300);
        assert!(optimized.starts_with("début "));
        assert!(optimized.ends_with("fin "));
        assert_eq!(optimized.matches("[...]").count(), 1);
    }

    #[test]
    fn tiny_max_length_still_bounds_the_result() {
        let client = test_client();
        // sous la longueur du marqueur, pas de place pour une élision
        let optimized = client.optimize_prompt(&"x".repeat(100), 5);
        assert_eq!(optimized, "xxxxx");

        assert_eq!(client.optimize_prompt(&"x".repeat(100), 0), "");
    }

    #[test]
    fn truncation_is_idempotent() {
        let client = test_client();
        let prompt: String = "x".repeat(1000);
        let once = client.optimize_prompt(&prompt, 300);
        let twice = client.optimize_prompt(&once, 300);
        assert_eq!(once, twice);
    }

    #[test]
    fn estimate_tokens_uses_char_count() {
        assert_eq!(PromptOptimizer::estimate_tokens(""), 0);
        assert_eq!(PromptOptimizer::estimate_tokens(&"a".repeat(400)), 100);
        // les caractères accentués comptent pour un
        assert_eq!(PromptOptimizer::estimate_tokens(&"é".repeat(400)), 100);
    }

    #[test]
    fn optimizer_passes_through_prompts_within_budget() {
        let optimizer = PromptOptimizer::new(4096);
        let prompt = "Un prompt court";
        assert_eq!(optimizer.optimize_for_model(prompt, 100), prompt);
    }

    #[test]
    fn optimizer_keeps_instruction_prefix() {
        let optimizer = PromptOptimizer::new(4096);
        let instructions = "I".repeat(200);
        let prompt = format!("{}{}", instructions, "c".repeat(3800));
        // 4000 caractères ≈ 1000 tokens; budget de 250 tokens → ~1000 caractères
        let optimized = optimizer.optimize_for_model(&prompt, 250);

        assert!(optimized.starts_with(&instructions));
        assert!(optimized.contains("[...]"));
        assert!(optimized.chars().count() < prompt.chars().count());
    }

    #[test]
    fn optimizer_hard_truncates_below_floor() {
        let optimizer = PromptOptimizer::new(4096);
        let prompt = "p".repeat(4000);
        // budget minuscule → cible sous le plancher de 200 caractères
        let optimized = optimizer.optimize_for_model(&prompt, 10);

        assert!(optimized.chars().count() < HARD_TRUNCATE_FLOOR);
        assert!(!optimized.contains("[...]"));
    }

    #[test]
    fn stats_start_at_zero_with_full_success_rate_convention() {
        let client = test_client();
        let stats = client.stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_network_call() {
        let client = test_client();
        let err = client.generate("", None).await.unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyPrompt));
        assert_eq!(client.stats().total_requests, 0);
    }

    #[test]
    fn clear_cache_empties_the_cache() {
        let client = test_client();
        client.cache_put("clé".to_string(), "valeur".to_string());
        assert_eq!(client.stats().cache_size, 1);
        client.clear_cache();
        assert_eq!(client.stats().cache_size, 0);
    }
}
