//! Templates de prompts par catégorie.
//!
//! Fonction pure : un [`CourseItem`] entre, un couple (prompt utilisateur,
//! prompt système) sort. Les templates sont calibrés pour des modèles locaux
//! (Gemma 7B, Mistral 7B) : structure imposée, consignes explicites, longueur
//! bornée.

use crate::models::CourseItem;

/// Prompt système commun à toutes les catégories
const SYSTEM_PROMPT: &str = "\
Tu es un assistant spécialisé dans la création de contenu éducatif pour des cours de français.
Tu dois créer du contenu structuré, clair et engageant pour des lycéens français.
Ton style doit être :
- Pédagogique mais pas ennuyeux
- Avec des anecdotes pertinentes
- Structuré et facile à comprendre
- Respectueux du niveau scolaire français
- Avec des exemples concrets

Réponds uniquement avec le contenu demandé, sans préambule ni commentaires.";

/// Générateur de prompts
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptTemplates;

impl PromptTemplates {
    pub fn new() -> Self {
        Self
    }

    /// Prompt système adapté à la catégorie.
    pub fn system_prompt(&self, _category: &str) -> &'static str {
        SYSTEM_PROMPT
    }

    /// Prompt utilisateur adapté à la catégorie de l'item.
    pub fn prompt_for(&self, item: &CourseItem) -> String {
        match item.category.as_str() {
            "auteur" => auteur_prompt(&item.name),
            "mouvement" => mouvement_prompt(&item.name),
            "notions" => notion_prompt(&item.name),
            "methodes" => methode_prompt(&item.name),
            "EAF" => eaf_prompt(&item.name),
            "outils" => outil_prompt(&item.name),
            other => generic_prompt(&item.name, other),
        }
    }
}

fn auteur_prompt(name: &str) -> String {
    format!(
        "Crée un contenu complet sur l'auteur {name} pour un cours de français lycée.

STRUCTURE OBLIGATOIRE :
1. **Présentation express** (2-3 phrases accrocheuses)
2. **Repères clés** (dates importantes, contexte historique)
3. **Œuvres majeures** (5-7 œuvres principales avec année et genre)
4. **Style et thèmes** (caractéristiques littéraires, innovations)
5. **Citations célèbres** (3-4 citations emblématiques)
6. **Anecdotes** (3-4 anecdotes intéressantes mais véridiques)

CONSIGNES :
- Niveau lycée (Seconde à Terminale)
- Ton engageant mais sérieux
- Anecdotes authentiques seulement
- Exemples concrets d'œuvres
- Contextualisation historique
- Maximum 800 mots total

EXEMPLE DE TON : \"Molière, c'est le roi incontesté de la comédie française ! Ce génie du théâtre...\"

Commence directement par le contenu, sans introduction."
    )
}

fn mouvement_prompt(name: &str) -> String {
    format!(
        "Crée un contenu pédagogique sur le mouvement littéraire \"{name}\" pour lycéens.

STRUCTURE OBLIGATOIRE :
1. **Définition** (Qu'est-ce que c'est en 2-3 phrases)
2. **Contexte historique** (Époque, causes, événements)
3. **Caractéristiques** (Thèmes, style, innovations)
4. **Auteurs principaux** (5-6 auteurs représentatifs)
5. **Œuvres emblématiques** (4-5 œuvres clés)
6. **Héritage** (Influence sur la littérature suivante)

CONSIGNES :
- Explications claires et accessibles
- Liens avec l'histoire et la société
- Exemples précis d'œuvres
- Différences avec les autres mouvements
- Maximum 700 mots

EXEMPLE DE TON : \"Le romantisme, c'est la révolution des sentiments dans la littérature...\"

Commence directement par le contenu."
    )
}

fn notion_prompt(name: &str) -> String {
    format!(
        "Explique la notion littéraire \"{name}\" pour des lycéens français.

STRUCTURE OBLIGATOIRE :
1. **Définition simple** (En 1-2 phrases claires)
2. **Explication détaillée** (Comment ça marche, à quoi ça sert)
3. **Types et variantes** (Différentes formes si applicable)
4. **Exemples concrets** (Extraits d'œuvres au programme)
5. **Méthode d'analyse** (Comment repérer et analyser)
6. **Pièges à éviter** (Erreurs fréquentes des élèves)

CONSIGNES :
- Définition précise et compréhensible
- Exemples tirés des œuvres classiques
- Méthode pratique d'application
- Liens avec l'analyse littéraire
- Maximum 600 mots

EXEMPLE DE TON : \"La métaphore, c'est comme un déguisement pour les mots...\"

Commence directement par le contenu."
    )
}

fn methode_prompt(name: &str) -> String {
    format!(
        "Crée un guide méthodologique sur \"{name}\" pour lycéens.

STRUCTURE OBLIGATOIRE :
1. **Objectif** (À quoi sert cette méthode)
2. **Étapes détaillées** (Process étape par étape)
3. **Conseils pratiques** (Astuces pour réussir)
4. **Exemple concret** (Application sur un cas réel)
5. **Critères d'évaluation** (Ce qu'attend le correcteur)
6. **Erreurs à éviter** (Pièges fréquents)

CONSIGNES :
- Instructions claires et applicables
- Exemple d'application concrète
- Conseils pour l'examen
- Méthode progressive
- Maximum 700 mots

EXEMPLE DE TON : \"Le commentaire, c'est comme démonter une horloge pour comprendre comment elle marche...\"

Commence directement par le contenu."
    )
}

fn eaf_prompt(name: &str) -> String {
    format!(
        "Crée un guide pour l'épreuve \"{name}\" du baccalauréat français.

STRUCTURE OBLIGATOIRE :
1. **Présentation de l'épreuve** (Format, durée, coefficient)
2. **Compétences évaluées** (Ce qu'on attend de l'élève)
3. **Méthodologie** (Étapes à suivre)
4. **Conseils stratégiques** (Gestion du temps, priorités)
5. **Exemples types** (Cas concrets d'application)
6. **Préparation** (Comment s'entraîner efficacement)

CONSIGNES :
- Informations officielles et à jour
- Conseils pratiques et applicables
- Exemples d'épreuves réelles
- Stratégies anti-stress
- Maximum 800 mots

EXEMPLE DE TON : \"L'entretien oral, c'est votre moment de briller...\"

Commence directement par le contenu."
    )
}

fn outil_prompt(name: &str) -> String {
    format!(
        "Présente l'outil \"{name}\" pour l'analyse littéraire au lycée.

STRUCTURE OBLIGATOIRE :
1. **Définition** (Qu'est-ce que c'est)
2. **Utilité** (À quoi ça sert concrètement)
3. **Mode d'emploi** (Comment l'utiliser)
4. **Exemples d'application** (Cas pratiques)
5. **Conseils d'utilisation** (Bonnes pratiques)
6. **Compléments** (Autres outils connexes)

CONSIGNES :
- Explication claire et pratique
- Exemples concrets d'utilisation
- Conseils méthodologiques
- Applications dans les exercices
- Maximum 600 mots

EXEMPLE DE TON : \"Le plan dialectique, c'est votre boussole pour structurer votre pensée...\"

Commence directement par le contenu."
    )
}

fn generic_prompt(name: &str, category: &str) -> String {
    format!(
        "Crée un contenu éducatif sur \"{name}\" (catégorie: {category}) pour lycéens.

STRUCTURE OBLIGATOIRE :
1. **Introduction** (Présentation générale)
2. **Développement** (Explication détaillée)
3. **Exemples** (Cas concrets et applications)
4. **Conseils pratiques** (Utilisation en cours/examen)
5. **Synthèse** (Points clés à retenir)

CONSIGNES :
- Adaptation au niveau lycée
- Contenu précis et vérifiable
- Exemples du programme scolaire
- Ton pédagogique et engageant
- Maximum 700 mots

Commence directement par le contenu."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    fn item(category: &str, name: &str) -> CourseItem {
        CourseItem {
            category: category.to_string(),
            name: name.to_string(),
            filename: format!("{}.md", name),
            status: ItemStatus::ToCreate,
            url: None,
        }
    }

    #[test]
    fn each_category_has_its_own_template() {
        let templates = PromptTemplates::new();

        let auteur = templates.prompt_for(&item("auteur", "Victor Hugo"));
        assert!(auteur.contains("l'auteur Victor Hugo"));
        assert!(auteur.contains("Œuvres majeures"));

        let mouvement = templates.prompt_for(&item("mouvement", "Romantisme"));
        assert!(mouvement.contains("mouvement littéraire \"Romantisme\""));

        let notion = templates.prompt_for(&item("notions", "Métaphore"));
        assert!(notion.contains("notion littéraire \"Métaphore\""));
    }

    #[test]
    fn unknown_category_falls_back_to_generic() {
        let templates = PromptTemplates::new();
        let prompt = templates.prompt_for(&item("Seconde", "Grammaire"));
        assert!(prompt.contains("catégorie: Seconde"));
        assert!(prompt.contains("STRUCTURE OBLIGATOIRE"));
    }

    #[test]
    fn system_prompt_is_shared() {
        let templates = PromptTemplates::new();
        assert_eq!(
            templates.system_prompt("auteur"),
            templates.system_prompt("mouvement")
        );
    }
}
