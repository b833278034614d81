//! Point d'entrée du générateur de cours.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use cours_generator::{logging, App, Config};

/// Générateur de cours de français via un modèle Ollama local
#[derive(Debug, Parser)]
#[command(name = "cours_generator", version, about)]
struct Cli {
    /// Fichier de plan de cours (markdown)
    #[arg(short, long)]
    input: PathBuf,

    /// Répertoire de sortie des pages HTML
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Modèle Ollama à utiliser
    #[arg(short, long)]
    model: Option<String>,

    /// Nombre d'items traités concurremment par batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Nombre de tentatives par requête
    #[arg(short, long)]
    retry: Option<u32>,

    /// Ne traiter que ces catégories (répétable)
    #[arg(short, long)]
    categories: Vec<String>,

    /// Fichier de configuration TOML
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Ignorer les cours dont le fichier HTML existe déjà
    #[arg(long)]
    skip_existing: bool,

    /// Vérifier la disponibilité du modèle puis quitter
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration invalide: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = App::new(config);

    if cli.check {
        return if app.client().check_model_availability().await {
            info!("✅ Modèle {} disponible", app.client().model());
            ExitCode::SUCCESS
        } else {
            error!("❌ Modèle {} indisponible", app.client().model());
            ExitCode::FAILURE
        };
    }

    let categories = (!cli.categories.is_empty()).then_some(cli.categories.as_slice());

    match app.run(&cli.input, categories).await {
        Ok(report) if report.failure_count() == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Exécution interrompue: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Assemble la configuration : défauts → fichier → environnement → CLI.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(&cli.config)?;
    config.apply_env();

    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(retry) = cli.retry {
        config.retry_count = retry;
    }
    if cli.skip_existing {
        config.skip_existing = true;
    }

    Ok(config)
}
