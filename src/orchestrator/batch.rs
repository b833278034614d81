//! Traitement par batches avec concurrence bornée.
//!
//! Les items sont découpés en batches consécutifs de `batch_size`. Au sein
//! d'un batch, chaque item part dans sa propre tâche tokio, bornée par un
//! sémaphore; le batch suivant ne démarre qu'une fois toutes les tâches du
//! batch courant terminées, après une courte pause. L'échec d'un item
//! n'interrompt jamais les autres : chaque item aboutit à un
//! [`ItemOutcome`] dans l'ordre de soumission.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::OllamaClient;
use crate::config::Config;
use crate::html::{self, HtmlRenderer};
use crate::logging;
use crate::models::{CourseItem, ItemOutcome, ItemReport, ItemStatus, RunReport};
use crate::parser::OutlineParser;
use crate::prompts::PromptTemplates;

/// Application de génération de cours
pub struct App {
    config: Config,
    client: OllamaClient,
    templates: PromptTemplates,
    renderer: Arc<HtmlRenderer>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = OllamaClient::new(&config);
        Self {
            config,
            client,
            templates: PromptTemplates::new(),
            renderer: Arc::new(HtmlRenderer::new()),
        }
    }

    /// Client partagé de l'application.
    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Exécution complète : parse le plan, filtre, traite par batches.
    ///
    /// Un plan illisible est fatal. Les échecs de génération individuels ne
    /// le sont pas : ils apparaissent comme échecs dans le rapport.
    pub async fn run(&self, input: &Path, categories: Option<&[String]>) -> anyhow::Result<RunReport> {
        let parser = OutlineParser::new();
        let items = parser
            .parse_file(input)
            .await
            .with_context(|| format!("lecture du plan {}", input.display()))?;

        let stats = OutlineParser::statistics(&items);
        info!(
            "📋 Plan: {} éléments, {} existants, {} à créer",
            stats.total_items, stats.existing_items, stats.to_create_items
        );

        // seuls les items marqués « (à créer) » sont générés
        let mut items = OutlineParser::filter_by_status(items, ItemStatus::ToCreate);

        if let Some(wanted) = categories {
            items.retain(|item| wanted.iter().any(|c| c == &item.category));
            info!("🔎 Filtre catégories {:?}: {} éléments retenus", wanted, items.len());
        }

        logging::log_startup(self.client.model(), self.config.batch_size);

        if items.is_empty() {
            warn!("Aucun élément à traiter");
            return Ok(RunReport::default());
        }

        logging::log_items_loaded(items.len(), self.config.batch_size);

        let report = self.process_batches(items).await?;
        logging::print_final_stats(&report);

        let stats = self.client.stats();
        info!(
            "📈 Requêtes: {} ({} en cache), tokens générés: {}",
            stats.total_requests, stats.cache_hits, stats.total_tokens
        );

        Ok(report)
    }

    /// Traite les items par batches consécutifs.
    pub async fn process_batches(&self, items: Vec<CourseItem>) -> anyhow::Result<RunReport> {
        let batch_size = self.config.batch_size.max(1);
        let total_batches = items.len().div_ceil(batch_size);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let mut report = RunReport::default();

        let batches: Vec<Vec<CourseItem>> = items
            .chunks(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let batch_num = batch_index + 1;
            let start = batch_index * batch_size + 1;
            let end = start + batch.len() - 1;
            logging::log_batch_start(batch_num, total_batches, start, end);

            let mut handles = Vec::with_capacity(batch.len());
            for item in batch {
                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .context("sémaphore fermé")?;
                let client = self.client.clone();
                let templates = self.templates;
                let renderer = Arc::clone(&self.renderer);
                let output_dir = self.config.output_dir.clone();
                let skip_existing = self.config.skip_existing;
                let identity = (item.category.clone(), item.name.clone());

                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    generate_course(
                        &client,
                        &templates,
                        &renderer,
                        &output_dir,
                        skip_existing,
                        &item,
                    )
                    .await
                });
                handles.push((identity, handle));
            }

            let mut batch_success = 0;
            let batch_total = handles.len();
            for ((category, name), handle) in handles {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        // une tâche qui panique reste un échec d'item, pas du run
                        error!("Tâche interrompue pour {}: {}", name, e);
                        ItemOutcome::Failure(format!("tâche interrompue: {}", e))
                    }
                };

                if matches!(outcome, ItemOutcome::Success(_)) {
                    batch_success += 1;
                }
                report.items.push(ItemReport {
                    category,
                    name,
                    outcome,
                });
            }

            logging::log_batch_complete(batch_num, batch_success, batch_total);

            if batch_num < total_batches {
                tokio::time::sleep(Duration::from_secs(self.config.batch_pause_secs)).await;
            }
        }

        Ok(report)
    }
}

/// Traite un item de bout en bout : prompt, génération, rendu, écriture.
///
/// Toutes les erreurs sont absorbées en [`ItemOutcome::Failure`] : la
/// granularité de l'échec est l'item, jamais le batch.
async fn generate_course(
    client: &OllamaClient,
    templates: &PromptTemplates,
    renderer: &HtmlRenderer,
    output_dir: &Path,
    skip_existing: bool,
    item: &CourseItem,
) -> ItemOutcome {
    let path = html::output_path(output_dir, item);

    if skip_existing && path.exists() {
        info!("⏭️ {} déjà généré, ignoré", item.name);
        return ItemOutcome::Skipped;
    }

    info!("📝 Génération: {} ({})", item.name, item.category);

    let prompt = templates.prompt_for(item);
    let system = templates.system_prompt(&item.category);

    let content = match client.generate(&prompt, Some(system)).await {
        Ok(text) => text,
        Err(e) => {
            error!("❌ {} : {}", item.name, e);
            return ItemOutcome::Failure(e.to_string());
        }
    };

    let page = renderer.render(item, &content);
    match html::write_course(&path, &page).await {
        Ok(()) => {
            info!("✅ {} généré ({} caractères)", item.name, page.chars().count());
            ItemOutcome::Success(path)
        }
        Err(e) => {
            error!("❌ Écriture de {} : {}", item.name, e);
            ItemOutcome::Failure(e.to_string())
        }
    }
}
