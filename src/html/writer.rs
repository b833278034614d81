//! Écriture durable des artefacts HTML.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::models::CourseItem;

/// Chemin de sortie d'un cours: `output_dir/categorie/nom.html`.
pub fn output_path(output_dir: &Path, item: &CourseItem) -> PathBuf {
    output_dir
        .join(&item.category)
        .join(format!("{}.html", item.name))
}

/// Écrit un cours sur disque, en créant les répertoires parents manquants.
pub async fn write_course(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GeneratorError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(path, html)
        .await
        .map_err(|e| GeneratorError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Cours écrit: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    fn item() -> CourseItem {
        CourseItem {
            category: "auteur".to_string(),
            name: "moliere".to_string(),
            filename: "moliere.md".to_string(),
            status: ItemStatus::ToCreate,
            url: None,
        }
    }

    #[test]
    fn output_path_nests_by_category() {
        let path = output_path(Path::new("out"), &item());
        assert_eq!(path, Path::new("out/auteur/moliere.html"));
    }

    #[tokio::test]
    async fn write_course_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path(), &item());

        write_course(&path, "<html></html>").await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "<html></html>");
    }
}
