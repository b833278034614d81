//! Types d'erreurs du générateur de cours.
//!
//! La taxonomie distingue trois familles :
//! - les erreurs fatales au démarrage (fichier d'entrée, configuration),
//! - les erreurs de génération (épuisement des tentatives vers le backend),
//!   récupérées item par item par l'orchestrateur,
//! - les erreurs de rendu/écriture, également confinées à un seul item.

use std::path::PathBuf;
use thiserror::Error;

/// Erreur applicative du générateur
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Le fichier d'entrée (plan de cours) est introuvable — fatal au démarrage
    #[error("fichier d'entrée introuvable: {path}")]
    InputNotFound { path: PathBuf },

    /// Échec du parsing du plan de cours — fatal au démarrage
    #[error("échec du parsing de {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Le prompt fourni au client est vide
    #[error("le prompt ne peut pas être vide")]
    EmptyPrompt,

    /// Toutes les tentatives vers le backend ont échoué
    #[error("échec de génération après {attempts} tentatives: {last_error}")]
    Generation { attempts: u32, last_error: String },

    /// Réponse invalide du backend (statut non-2xx, corps malformé, champ manquant)
    #[error("réponse invalide du backend: {0}")]
    BadResponse(String),

    /// Erreur réseau (timeout, connexion refusée)
    #[error("erreur réseau: {0}")]
    Network(#[from] reqwest::Error),

    /// Échec d'écriture d'un artefact HTML
    #[error("échec d'écriture de {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration invalide
    #[error("configuration invalide: {0}")]
    Config(String),
}

/// Alias de résultat pour le générateur
pub type Result<T> = std::result::Result<T, GeneratorError>;
