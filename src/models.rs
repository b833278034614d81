//! Types de données partagés.
//!
//! Un [`CourseItem`] est l'unité de travail du pipeline : un élément du plan
//! de cours, identifié par son couple (catégorie, nom). Les résultats du
//! traitement sont collectés dans un [`RunReport`].

use std::path::PathBuf;

/// Statut d'un élément dans le plan de cours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    /// La fiche existe déjà dans le dépôt de contenu
    Exists,
    /// Marqué « (à créer) » dans le plan
    ToCreate,
    /// Statut non reconnu
    Unknown,
}

/// Un élément de cours à générer
#[derive(Clone, Debug)]
pub struct CourseItem {
    /// Catégorie du plan (auteur, mouvement, notions, ...)
    pub category: String,
    /// Nom lisible (nom de fichier sans extension, underscores remplacés)
    pub name: String,
    /// Nom du fichier markdown d'origine
    pub filename: String,
    /// Statut dans le plan
    pub status: ItemStatus,
    /// URL de référence éventuelle (portrait, source)
    pub url: Option<String>,
}

/// Résultat terminal du traitement d'un item
#[derive(Debug)]
pub enum ItemOutcome {
    /// Cours généré et écrit à cet emplacement
    Success(PathBuf),
    /// Échec (génération ou rendu), avec la raison
    Failure(String),
    /// Fichier de sortie déjà présent, item ignoré
    Skipped,
}

/// Résultat d'un item, rattaché à son élément d'origine
#[derive(Debug)]
pub struct ItemReport {
    pub category: String,
    pub name: String,
    pub outcome: ItemOutcome,
}

/// Rapport complet d'une exécution, dans l'ordre de soumission
#[derive(Debug, Default)]
pub struct RunReport {
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn success_count(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Success(_)))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Failure(_)))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Skipped))
            .count()
    }
}
