//! Initialisation des logs et bannières d'exécution.
//!
//! Les fonctions `log_*` centralisent le format des messages de cycle de vie
//! (démarrage, batches, statistiques finales) pour garder l'orchestrateur
//! lisible.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::RunReport;

/// Initialise le subscriber tracing.
///
/// Le niveau par défaut est `info`, surchargeable via `RUST_LOG`.
/// Idempotent : un second appel (tests) est silencieusement ignoré.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Bannière de démarrage
pub fn log_startup(model: &str, batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Générateur de cours - modèle {}", model);
    info!("📊 Taille de batch: {}", batch_size);
    info!("{}", "=".repeat(60));
}

/// Éléments chargés depuis le plan de cours
pub fn log_items_loaded(total: usize, batch_size: usize) {
    info!("✓ {} éléments à traiter", total);
    info!("📋 Traitement par batches de {}", batch_size);
    info!("💡 Chaque batch se termine avant le suivant");
}

/// Début d'un batch
pub fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 Batch {}/{}", batch_num, total_batches);
    info!("📄 Éléments {}-{}", start, end);
    info!("{}", "=".repeat(60));
}

/// Fin d'un batch
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ Batch {} terminé: {}/{} succès", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// Statistiques finales de l'exécution
pub fn print_final_stats(report: &RunReport) {
    info!("{}", "=".repeat(60));
    info!("📊 Génération terminée");
    info!(
        "Heure de fin: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Succès: {}/{}", report.success_count(), report.total());
    info!("❌ Échecs: {}", report.failure_count());
    if report.skipped_count() > 0 {
        info!("⏭️ Ignorés (déjà générés): {}", report.skipped_count());
    }
    info!("{}", "=".repeat(60));
}

/// Tronque un texte long pour l'affichage dans les logs
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_text_short_passthrough() {
        assert_eq!(truncate_text("bonjour", 10), "bonjour");
    }

    #[test]
    fn truncate_text_long_adds_ellipsis() {
        assert_eq!(truncate_text("bonjour tout le monde", 7), "bonjour...");
    }

    #[test]
    fn truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("éléphant", 3), "élé...");
    }
}
