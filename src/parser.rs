//! Parser du plan de cours (`francais_all.md`).
//!
//! Le plan est un document semi-structuré : des sections `/categorie/`
//! contenant des lignes d'arborescence (`├──`, `└──`) ou de simples mentions
//! de fichiers `.md`. Chaque fichier devient un [`CourseItem`].
//!
//! Un fichier d'entrée absent ou illisible est fatal : aucune génération ne
//! démarre sans plan.

use std::path::Path;

use regex::Regex;
use tracing::{info, warn};

use crate::error::{GeneratorError, Result};
use crate::models::{CourseItem, ItemStatus};

/// Catégories reconnues dans le plan, avec leur libellé
const CATEGORIES: &[(&str, &str)] = &[
    ("auteur", "Auteurs"),
    ("mouvement", "Mouvements littéraires"),
    ("notions", "Notions littéraires"),
    ("methodes", "Méthodes"),
    ("EAF", "Épreuves anticipées"),
    ("outils", "Outils"),
    ("Seconde", "Classe de Seconde"),
    ("Premiere", "Classe de Première"),
    ("Terminale", "Classe de Terminale"),
];

/// Statistiques sur un plan parsé
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_items: usize,
    pub existing_items: usize,
    pub to_create_items: usize,
    pub categories: usize,
}

/// Parser du plan de cours
pub struct OutlineParser {
    md_file: Regex,
    url: Regex,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineParser {
    pub fn new() -> Self {
        // \w couvre les lettres accentuées en regex Rust
        Self {
            md_file: Regex::new(r"([\w']+\.md)").expect("regexp fichier md invalide"),
            url: Regex::new(r"https?://\S+").expect("regexp url invalide"),
        }
    }

    /// Parse le fichier de plan et retourne les items dans l'ordre du document.
    pub async fn parse_file(&self, path: &Path) -> Result<Vec<CourseItem>> {
        if !path.exists() {
            return Err(GeneratorError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GeneratorError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let items = self.parse_content(&content);
        info!("✓ Plan parsé: {} éléments", items.len());
        Ok(items)
    }

    /// Parse le contenu brut du plan.
    pub fn parse_content(&self, content: &str) -> Vec<CourseItem> {
        let mut items = Vec::new();
        let mut current_category: Option<&str> = None;

        for line in content.lines() {
            let trimmed = line.trim();

            // Changement de section: /auteur/, /mouvement/, ...
            if trimmed.starts_with('/') && trimmed.ends_with('/') && trimmed.len() > 2 {
                let section = trimmed.trim_matches('/');
                current_category = CATEGORIES
                    .iter()
                    .map(|(key, _)| *key)
                    .find(|key| *key == section);
                if current_category.is_none() {
                    warn!("Section inconnue ignorée: {}", section);
                }
                continue;
            }

            let Some(category) = current_category else {
                continue;
            };

            if let Some(item) = self.parse_item_line(trimmed, category) {
                items.push(item);
            }
        }

        items
    }

    /// Parse une ligne d'item (arborescence ou mention directe d'un .md).
    fn parse_item_line(&self, line: &str, category: &str) -> Option<CourseItem> {
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        // Retire les glyphes d'arborescence éventuels
        let clean = line
            .trim_start_matches(['│', '├', '└', '─', ' '])
            .trim();

        let filename = self.md_file.find(clean)?.as_str().to_string();
        let name = filename.trim_end_matches(".md").replace('_', " ");

        let (status, url) = if clean.contains("(à créer)") {
            let url = self.url.find(clean).map(|m| {
                m.as_str()
                    .trim_end_matches(|c: char| c == ')' || c == ',')
                    .to_string()
            });
            (ItemStatus::ToCreate, url)
        } else {
            (ItemStatus::Exists, None)
        };

        Some(CourseItem {
            category: category.to_string(),
            name,
            filename,
            status,
            url,
        })
    }

    /// Statistiques sur une liste d'items parsés.
    pub fn statistics(items: &[CourseItem]) -> ParseStats {
        let mut stats = ParseStats {
            total_items: items.len(),
            ..Default::default()
        };

        let mut seen_categories = Vec::new();
        for item in items {
            match item.status {
                ItemStatus::Exists => stats.existing_items += 1,
                ItemStatus::ToCreate => stats.to_create_items += 1,
                ItemStatus::Unknown => {}
            }
            if !seen_categories.contains(&item.category.as_str()) {
                seen_categories.push(item.category.as_str());
            }
        }
        stats.categories = seen_categories.len();
        stats
    }

    /// Filtre les items par statut.
    pub fn filter_by_status(items: Vec<CourseItem>, status: ItemStatus) -> Vec<CourseItem> {
        items.into_iter().filter(|i| i.status == status).collect()
    }

    /// Libellé lisible d'une catégorie.
    pub fn category_label(category: &str) -> &str {
        CATEGORIES
            .iter()
            .find(|(key, _)| *key == category)
            .map(|(_, label)| *label)
            .unwrap_or(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
/auteur/
├── moliere.md
├── victor_hugo.md (à créer) https://fr.wikipedia.org/wiki/Victor_Hugo
└── racine.md
/mouvement/
romantisme.md (à créer)
/inconnu/
fantome.md
";

    #[test]
    fn parses_sections_and_items_in_order() {
        let parser = OutlineParser::new();
        let items = parser.parse_content(SAMPLE);

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["moliere", "victor hugo", "racine", "romantisme"]);
        assert_eq!(items[0].category, "auteur");
        assert_eq!(items[3].category, "mouvement");
    }

    #[test]
    fn detects_status_and_url() {
        let parser = OutlineParser::new();
        let items = parser.parse_content(SAMPLE);

        assert_eq!(items[0].status, ItemStatus::Exists);
        assert_eq!(items[1].status, ItemStatus::ToCreate);
        assert_eq!(
            items[1].url.as_deref(),
            Some("https://fr.wikipedia.org/wiki/Victor_Hugo")
        );
        assert_eq!(items[3].status, ItemStatus::ToCreate);
        assert_eq!(items[3].url, None);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let parser = OutlineParser::new();
        let items = parser.parse_content(SAMPLE);
        assert!(items.iter().all(|i| i.category != "inconnu"));
    }

    #[test]
    fn statistics_count_by_status() {
        let parser = OutlineParser::new();
        let items = parser.parse_content(SAMPLE);
        let stats = OutlineParser::statistics(&items);

        assert_eq!(
            stats,
            ParseStats {
                total_items: 4,
                existing_items: 2,
                to_create_items: 2,
                categories: 2,
            }
        );
    }

    #[tokio::test]
    async fn missing_input_file_is_fatal() {
        let parser = OutlineParser::new();
        let err = parser
            .parse_file(Path::new("nulle/part/francais_all.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::InputNotFound { .. }));
    }
}
