//! Rendu des pages de cours.
//!
//! Le texte généré par le modèle est découpé en sections sur les en-têtes
//! `**Titre**`, puis injecté dans une mise en page fixe par catégorie
//! (sommaire, phrase d'accroche, blocs de sections). Transformation purement
//! textuelle, sans échappement sophistiqué: le contenu vient de notre propre
//! pipeline.

use phf::phf_map;
use regex::Regex;

use crate::models::CourseItem;

/// Feuille de style par catégorie
static CATEGORY_CSS: phf::Map<&'static str, &'static str> = phf_map! {
    "auteur" => "auteur.test1.css",
    "mouvement" => "mouvement.css",
    "notions" => "notions.css",
    "methodes" => "methodes.css",
    "EAF" => "eaf.css",
    "outils" => "outils.css",
    "Seconde" => "seconde.css",
    "Premiere" => "premiere.css",
    "Terminale" => "terminale.css",
};

const DEFAULT_CSS: &str = "generic.css";
const DEFAULT_QUOTE: &str = "Une référence incontournable";
const FONTS_LINK: &str = "https://fonts.googleapis.com/css2?family=Outfit:wght@300;400;500;600;700;800&family=JetBrains+Mono:wght@400;500&family=Playfair+Display:wght@400;500;600;700&display=swap";

/// Sections extraites du texte généré, dans l'ordre d'apparition
#[derive(Debug, Default)]
pub struct Sections(Vec<(String, String)>);

impl Sections {
    /// Première section dont le titre correspond à l'une des clés, sinon "".
    fn get(&self, keys: &[&str]) -> &str {
        for key in keys {
            if let Some((_, body)) = self.0.iter().find(|(title, _)| title == key) {
                return body;
            }
        }
        ""
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Générateur de pages HTML
pub struct HtmlRenderer {
    quote: Regex,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            quote: Regex::new(r#""([^"]+)""#).expect("regexp citation invalide"),
        }
    }

    /// Rend la page complète d'un cours.
    pub fn render(&self, item: &CourseItem, generated_content: &str) -> String {
        let sections = Self::parse_sections(generated_content);

        match item.category.as_str() {
            "auteur" => self.render_auteur(item, &sections),
            "mouvement" => self.render_mouvement(item, &sections),
            "notions" => self.render_notion(item, &sections),
            "methodes" => self.render_methode(item, &sections),
            _ => self.render_generic(item, &sections),
        }
    }

    /// Découpe le texte généré en sections `**Titre**` → corps.
    ///
    /// Les titres sont normalisés en minuscules pour la recherche.
    fn parse_sections(content: &str) -> Sections {
        let mut sections = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let header = line
                .strip_prefix("**")
                .and_then(|rest| rest.strip_suffix("**"))
                // tolère la numérotation "1. **Titre**" des modèles
                .or_else(|| {
                    line.split_once("**")
                        .filter(|(before, _)| {
                            before.trim().trim_end_matches('.').chars().all(|c| c.is_ascii_digit())
                        })
                        .and_then(|(_, rest)| rest.strip_suffix("**"))
                });

            if let Some(title) = header {
                if let Some((name, body)) = current.take() {
                    sections.push((name, body.join("\n").trim().to_string()));
                }
                current = Some((title.trim().to_lowercase(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line.to_string());
            }
        }

        if let Some((name, body)) = current {
            sections.push((name, body.join("\n").trim().to_string()));
        }

        Sections(sections)
    }

    fn render_auteur(&self, item: &CourseItem, sections: &Sections) -> String {
        let name = format_name(&item.name);
        let presentation = sections.get(&["présentation express", "présentation"]);
        let reperes = sections.get(&["repères clés", "repères"]);
        let oeuvres = sections.get(&["œuvres majeures", "oeuvres"]);
        let style = sections.get(&["style et thèmes", "style"]);
        let citations = sections.get(&["citations célèbres", "citations"]);
        let anecdotes = sections.get(&["anecdotes"]);

        let sommaire = render_sommaire(&[
            ("presentation", "📜 Présentation"),
            ("reperes", "🕰️ Repères"),
            ("oeuvres", "📚 Œuvres"),
            ("style", "🎨 Style"),
            ("citations", "✍️ Citations"),
            ("anecdotes", "🎭 Anecdotes"),
            ("nexschool", "🚀 NexSchool"),
        ]);

        let portrait = item
            .url
            .as_deref()
            .unwrap_or("https://via.placeholder.com/300x400?text=Portrait");

        let body = format!(
            r#"        <!-- TITRE PRINCIPAL -->
        <h1>📚 {name}</h1>

        <!-- ZONE SOMMAIRE + IMAGE -->
        <div class="zone-sommaire-et-image">
            <div class="bloc-gauche">
                <nav class="sommaire">
                    {sommaire}
                </nav>
                <div class="phrase-accroche">
                    <em>"{quote}"</em>
                </div>
            </div>

            <div class="zone-image-portrait">
                <img class="portrait-auteur" src="{portrait}" alt="Portrait de {name}" />
            </div>
        </div>

        <!-- SECTIONS -->
{s1}{s2}{s3}{s4}{s5}{s6}{nexschool}"#,
            quote = self.extract_quote(presentation),
            s1 = render_section("presentation", "📜 Présentation express", presentation),
            s2 = render_section("reperes", "🕰️ Repères clés", reperes),
            s3 = render_section("oeuvres", "📚 Œuvres majeures", oeuvres),
            s4 = render_section("style", "🎨 Style & thèmes", style),
            s5 = render_section("citations", "✍️ Citations incontournables", citations),
            s6 = render_section("anecdotes", "🎭 Anecdotes croustillantes", anecdotes),
            nexschool = render_nexschool_section(&name),
        );

        render_page(&name, css_for("auteur"), "auteur.test1", &body)
    }

    fn render_mouvement(&self, item: &CourseItem, sections: &Sections) -> String {
        let name = format_name(&item.name);
        let definition = sections.get(&["définition"]);
        let contexte = sections.get(&["contexte historique", "contexte"]);
        let caracteristiques = sections.get(&["caractéristiques"]);
        let auteurs = sections.get(&["auteurs principaux", "auteurs"]);
        let oeuvres = sections.get(&["œuvres emblématiques", "oeuvres"]);
        let heritage = sections.get(&["héritage"]);

        let sommaire = render_sommaire(&[
            ("definition", "📖 Définition"),
            ("contexte", "🏛️ Contexte"),
            ("caracteristiques", "🎨 Caractéristiques"),
            ("auteurs", "👥 Auteurs"),
            ("oeuvres", "📚 Œuvres"),
            ("heritage", "🌟 Héritage"),
        ]);

        let body = format!(
            r#"        <h1>🎭 {name}</h1>

        <div class="zone-sommaire-et-image">
            <div class="bloc-gauche">
                <nav class="sommaire">
                    {sommaire}
                </nav>
                <div class="phrase-accroche">
                    <em>"{quote}"</em>
                </div>
            </div>
        </div>
{s1}{s2}{s3}{s4}{s5}{s6}"#,
            quote = self.extract_quote(definition),
            s1 = render_section("definition", "📖 Définition", definition),
            s2 = render_section("contexte", "🏛️ Contexte historique", contexte),
            s3 = render_section("caracteristiques", "🎨 Caractéristiques", caracteristiques),
            s4 = render_section("auteurs", "👥 Auteurs principaux", auteurs),
            s5 = render_section("oeuvres", "📚 Œuvres emblématiques", oeuvres),
            s6 = render_section("heritage", "🌟 Héritage", heritage),
        );

        render_page(&name, css_for("mouvement"), "mouvement", &body)
    }

    fn render_notion(&self, item: &CourseItem, sections: &Sections) -> String {
        let name = format_name(&item.name);
        let definition = sections.get(&["définition simple", "définition"]);
        let explication = sections.get(&["explication détaillée", "explication"]);
        let types = sections.get(&["types et variantes", "types"]);
        let exemples = sections.get(&["exemples concrets", "exemples"]);
        let methode = sections.get(&["méthode d'analyse", "méthode"]);
        let pieges = sections.get(&["pièges à éviter", "pièges"]);

        let sommaire = render_sommaire(&[
            ("definition", "📖 Définition"),
            ("explication", "🔍 Explication"),
            ("types", "📝 Types"),
            ("exemples", "💡 Exemples"),
            ("methode", "🎯 Méthode"),
            ("pieges", "⚠️ Pièges"),
        ]);

        let body = format!(
            r#"        <h1>🔍 {name}</h1>

        <div class="zone-sommaire-et-image">
            <div class="bloc-gauche">
                <nav class="sommaire">
                    {sommaire}
                </nav>
                <div class="phrase-accroche">
                    <em>"{quote}"</em>
                </div>
            </div>
        </div>
{s1}{s2}{s3}{s4}{s5}{s6}"#,
            quote = self.extract_quote(definition),
            s1 = render_section("definition", "📖 Définition", definition),
            s2 = render_section("explication", "🔍 Explication détaillée", explication),
            s3 = render_section("types", "📝 Types et variantes", types),
            s4 = render_section("exemples", "💡 Exemples concrets", exemples),
            s5 = render_section("methode", "🎯 Méthode d'analyse", methode),
            s6 = render_section("pieges", "⚠️ Pièges à éviter", pieges),
        );

        render_page(&name, css_for("notions"), "notions", &body)
    }

    fn render_methode(&self, item: &CourseItem, sections: &Sections) -> String {
        let name = format_name(&item.name);
        let objectif = sections.get(&["objectif"]);
        let etapes = sections.get(&["étapes détaillées", "étapes"]);
        let conseils = sections.get(&["conseils pratiques", "conseils"]);
        let exemple = sections.get(&["exemple concret", "exemple"]);
        let criteres = sections.get(&["critères d'évaluation", "critères"]);
        let erreurs = sections.get(&["erreurs à éviter", "erreurs"]);

        let sommaire = render_sommaire(&[
            ("objectif", "🎯 Objectif"),
            ("etapes", "📋 Étapes"),
            ("conseils", "💡 Conseils"),
            ("exemple", "📝 Exemple"),
            ("criteres", "📊 Critères"),
            ("erreurs", "⚠️ Erreurs"),
        ]);

        let body = format!(
            r#"        <h1>🎯 {name}</h1>

        <div class="zone-sommaire-et-image">
            <div class="bloc-gauche">
                <nav class="sommaire">
                    {sommaire}
                </nav>
                <div class="phrase-accroche">
                    <em>"{quote}"</em>
                </div>
            </div>
        </div>
{s1}{s2}{s3}{s4}{s5}{s6}"#,
            quote = self.extract_quote(objectif),
            s1 = render_section("objectif", "🎯 Objectif", objectif),
            s2 = render_section("etapes", "📋 Étapes détaillées", etapes),
            s3 = render_section("conseils", "💡 Conseils pratiques", conseils),
            s4 = render_section("exemple", "📝 Exemple concret", exemple),
            s5 = render_section("criteres", "📊 Critères d'évaluation", criteres),
            s6 = render_section("erreurs", "⚠️ Erreurs à éviter", erreurs),
        );

        render_page(&name, css_for("methodes"), "methodes", &body)
    }

    /// Template générique: toutes les sections trouvées, dans l'ordre.
    fn render_generic(&self, item: &CourseItem, sections: &Sections) -> String {
        let name = format_name(&item.name);

        let entries: Vec<(String, String, &str)> = sections
            .0
            .iter()
            .filter(|(_, body)| !body.trim().is_empty())
            .map(|(title, body)| {
                (
                    title.replace(' ', "_"),
                    format_name(title),
                    body.as_str(),
                )
            })
            .collect();

        let sommaire_items: Vec<(&str, &str)> = entries
            .iter()
            .map(|(id, title, _)| (id.as_str(), title.as_str()))
            .collect();
        let sommaire = render_sommaire(&sommaire_items);

        let sections_html: String = entries
            .iter()
            .map(|(id, title, body)| render_section(id, title, body))
            .collect();

        let first_body = if sections.is_empty() {
            ""
        } else {
            sections.0[0].1.as_str()
        };

        let body = format!(
            r#"        <h1>📚 {name}</h1>

        <div class="zone-sommaire-et-image">
            <div class="bloc-gauche">
                <nav class="sommaire">
                    {sommaire}
                </nav>
                <div class="phrase-accroche">
                    <em>"{quote}"</em>
                </div>
            </div>
        </div>

{sections_html}"#,
            quote = self.extract_quote(first_body),
        );

        render_page(&name, css_for(&item.category), &item.category, &body)
    }

    /// Extrait une phrase d'accroche: citation entre guillemets si présente,
    /// sinon la première phrase (bornée à 60 caractères).
    fn extract_quote(&self, text: &str) -> String {
        if text.is_empty() {
            return DEFAULT_QUOTE.to_string();
        }

        if let Some(captures) = self.quote.captures(text) {
            return captures[1].to_string();
        }

        let first_sentence = text.split('.').next().unwrap_or("").trim();
        if first_sentence.is_empty() {
            return DEFAULT_QUOTE.to_string();
        }

        if first_sentence.chars().count() > 60 {
            let head: String = first_sentence.chars().take(60).collect();
            format!("{}...", head)
        } else {
            first_sentence.to_string()
        }
    }
}

fn css_for(category: &str) -> &'static str {
    CATEGORY_CSS.get(category).copied().unwrap_or(DEFAULT_CSS)
}

/// Enveloppe de page commune (head, fontes, conteneur markdown).
fn render_page(name: &str, css: &str, script: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>NexSkool - {name}</title>
    <link href="{FONTS_LINK}" rel="stylesheet">
    <link rel="stylesheet" href="/css/{css}">
</head>
<body>

<div class="nexskool-markdown">
    <div class="markdown-content">

{body}

    </div>
</div>

<script src="/js/{script}.js"></script>

</body>
</html>"#
    )
}

fn render_sommaire(items: &[(&str, &str)]) -> String {
    items
        .iter()
        .map(|(id, title)| format!(r##"<a href="#{id}">{title}</a>"##))
        .collect::<Vec<_>>()
        .join("\n                    ")
}

fn render_section(id: &str, title: &str, content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    format!(
        r#"
        <div class="section-block" id="{id}">
            <summary>{title}</summary>
            <div class="contenu-section">
                {content}
            </div>
        </div>"#,
        content = format_content(content),
    )
}

fn render_nexschool_section(name: &str) -> String {
    format!(
        r#"
        <div class="section-block" id="nexschool">
            <summary>🚀 Conseil NexSchool</summary>
            <div class="contenu-section">
                <div class="NexSchool">
                    🧠 <strong>Méthode :</strong> Pour retenir {name}, utilisez la méthode des associations visuelles et des anecdotes marquantes !
                </div>

                <div class="alert alert-info">
                    💡 <strong>Astuce de révision :</strong> Créez une fiche avec les points clés et relisez-la régulièrement !
                </div>
            </div>
        </div>"#
    )
}

/// Convertit le texte brut en HTML: listes à puces puis paragraphes.
fn format_content(content: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut list_items: Vec<String> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    let mut flush_paragraph = |paragraph: &mut Vec<String>, blocks: &mut Vec<String>| {
        if !paragraph.is_empty() {
            blocks.push(format!("<p>{}</p>", paragraph.join(" ")));
            paragraph.clear();
        }
    };
    let flush_list = |list_items: &mut Vec<String>, blocks: &mut Vec<String>| {
        if !list_items.is_empty() {
            blocks.push(format!("<ul>{}</ul>", list_items.join("")));
            list_items.clear();
        }
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush_list(&mut list_items, &mut blocks);
            flush_paragraph(&mut paragraph, &mut blocks);
        } else if let Some(entry) = line.strip_prefix("- ") {
            flush_paragraph(&mut paragraph, &mut blocks);
            list_items.push(format!("<li>{}</li>", entry));
        } else {
            flush_list(&mut list_items, &mut blocks);
            paragraph.push(line.to_string());
        }
    }
    flush_list(&mut list_items, &mut blocks);
    flush_paragraph(&mut paragraph, &mut blocks);

    blocks.join("\n\n                ")
}

/// Formate un nom pour l'affichage: underscores en espaces, initiales en
/// majuscules.
fn format_name(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
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
            url: Some("https://example.com/moliere.jpg".to_string()),
        }
    }

    const GENERATED: &str = "\
**Présentation express**
Molière est le maître de la comédie française. Il a révolutionné le théâtre.

**Repères clés**
- 1622: Naissance
- 1673: Mort en scène

**Citations célèbres**
\"Il faut manger pour vivre et non pas vivre pour manger\"
";

    #[test]
    fn parse_sections_splits_on_bold_headers() {
        let sections = HtmlRenderer::parse_sections(GENERATED);
        assert_eq!(sections.0.len(), 3);
        assert_eq!(sections.0[0].0, "présentation express");
        assert!(sections.0[1].1.contains("1622: Naissance"));
    }

    #[test]
    fn parse_sections_tolerates_numbered_headers() {
        let sections = HtmlRenderer::parse_sections("1. **Définition**\nUne figure de style.");
        assert_eq!(sections.0[0].0, "définition");
        assert_eq!(sections.0[0].1, "Une figure de style.");
    }

    #[test]
    fn auteur_page_contains_sections_and_portrait() {
        let renderer = HtmlRenderer::new();
        let html = renderer.render(&item("auteur", "moliere"), GENERATED);

        assert!(html.contains("<h1>📚 Moliere</h1>"));
        assert!(html.contains("https://example.com/moliere.jpg"));
        assert!(html.contains(r#"id="presentation""#));
        assert!(html.contains("Conseil NexSchool"));
        assert!(html.contains("auteur.test1.css"));
        // section absente du contenu généré → absente de la page
        assert!(!html.contains(r#"id="anecdotes""#));
    }

    #[test]
    fn quote_prefers_quoted_text() {
        let renderer = HtmlRenderer::new();
        let quote = renderer.extract_quote("Il disait: \"Le théâtre est la vie\" souvent.");
        assert_eq!(quote, "Le théâtre est la vie");
    }

    #[test]
    fn quote_falls_back_to_first_sentence() {
        let renderer = HtmlRenderer::new();
        assert_eq!(
            renderer.extract_quote("Une phrase courte. Une autre."),
            "Une phrase courte"
        );
        assert_eq!(renderer.extract_quote(""), DEFAULT_QUOTE);
    }

    #[test]
    fn format_content_builds_lists_and_paragraphs() {
        let html = format_content("Un paragraphe.\n\n- premier\n- second");
        assert!(html.contains("<p>Un paragraphe.</p>"));
        assert!(html.contains("<ul><li>premier</li><li>second</li></ul>"));
    }

    #[test]
    fn format_name_title_cases_words() {
        assert_eq!(format_name("victor_hugo"), "Victor Hugo");
        assert_eq!(format_name("éducation"), "Éducation");
    }

    #[test]
    fn generic_template_renders_all_sections_in_order() {
        let renderer = HtmlRenderer::new();
        let html = renderer.render(
            &item("outils", "plan dialectique"),
            "**Introduction**\nPrésentation.\n\n**Synthèse**\nPoints clés.",
        );

        assert!(html.contains("outils.css"));
        let intro = html.find(r#"id="introduction""#).unwrap();
        let synthese = html.find(r#"id="synthèse""#).unwrap();
        assert!(intro < synthese);
    }

    #[test]
    fn unknown_category_uses_default_css() {
        assert_eq!(css_for("divers"), DEFAULT_CSS);
    }
}
