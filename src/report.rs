//! Daily digest document across all profiles, and the JSON export of a run.

use crate::consts::{limits, Profile, Source, PROFILES};
use crate::filter::{matches_any, DateWindow};
use crate::logic::{collect, RunReport};
use crate::network::{escape_html, Article, NewsEngine};
use crate::utils::summarize_words;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// One profile's bucket in the digest, entries tagged with their source.
pub struct DigestSection {
    pub profile: &'static Profile,
    pub entries: Vec<(Source, Article)>,
}

/// Snapshot of yesterday-to-now coverage across every profile.
pub struct Digest {
    pub generated: DateTime<Utc>,
    pub sections: Vec<DigestSection>,
    pub failed_sources: usize,
}

impl Digest {
    pub fn total(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}

/// Fetch every source once and bucket the articles per profile.
///
/// An article that touches two topics lands in both buckets; sections
/// follow registry order, entries follow source order within a section.
pub async fn build_digest(engine: Arc<NewsEngine>, sources: &[Source]) -> Digest {
    let window = DateWindow::last_days(limits::DIGEST_WINDOW_DAYS);
    let outcomes = collect(&engine, sources, window).await;

    let mut pool: Vec<(Source, Article)> = Vec::new();
    let mut failed_sources = 0;
    for outcome in outcomes {
        match outcome.result {
            Ok(articles) => {
                pool.extend(articles.into_iter().map(|article| (outcome.source, article)))
            }
            Err(_) => failed_sources += 1,
        }
    }

    let sections = PROFILES
        .iter()
        .map(|profile| DigestSection {
            profile,
            entries: pool
                .iter()
                .filter(|(_, article)| matches_any(article, profile.keywords))
                .cloned()
                .collect(),
        })
        .collect();

    Digest {
        generated: Utc::now(),
        sections,
        failed_sources,
    }
}

/// Render the digest as a standalone HTML document, sent as an attachment.
pub fn render_digest_document(digest: &Digest) -> String {
    let from = digest.generated - Duration::days(limits::DIGEST_WINDOW_DAYS);

    let mut doc = String::from(
        "<!DOCTYPE html>\n<html lang=\"hr\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Dnevni pregled vijesti</title>\n</head>\n<body>\n",
    );
    doc.push_str("<h1>Dnevni pregled vijesti</h1>\n");
    doc.push_str(&format!(
        "<p>Razdoblje: {} - {} | {} clanaka</p>\n",
        from.format("%d.%m.%Y."),
        digest.generated.format("%d.%m.%Y."),
        digest.total()
    ));

    if digest.failed_sources > 0 {
        doc.push_str(&format!(
            "<p>Nedostupnih izvora: {}</p>\n",
            digest.failed_sources
        ));
    }

    for section in &digest.sections {
        doc.push_str(&format!(
            "<h2>{} {}</h2>\n",
            section.profile.icon,
            escape_html(section.profile.name)
        ));

        if section.entries.is_empty() {
            doc.push_str("<p>Nema clanaka.</p>\n");
            continue;
        }

        doc.push_str("<ul>\n");
        for (source, article) in &section.entries {
            let published = article
                .published
                .map(|p| format!(", {}", p.format("%d.%m.%Y. %H:%M")))
                .unwrap_or_default();

            doc.push_str(&format!(
                "<li><a href=\"{}\">{}</a> ({}{})",
                escape_html(&article.link),
                escape_html(&article.title),
                escape_html(source.name),
                published
            ));
            if !article.summary.is_empty() {
                doc.push_str(&format!(
                    "<br>{}",
                    escape_html(&summarize_words(
                        &article.summary,
                        limits::DIGEST_SUMMARY_WORDS
                    ))
                ));
            }
            doc.push_str("</li>\n");
        }
        doc.push_str("</ul>\n");
    }

    doc.push_str("</body>\n</html>\n");
    doc
}

/// Caption accompanying the digest attachment.
pub fn digest_caption(digest: &Digest) -> String {
    let mut caption = format!(
        "📋 Dnevni pregled vijesti - {} | {} clanaka",
        digest.generated.format("%d.%m.%Y."),
        digest.total()
    );
    if digest.failed_sources > 0 {
        caption.push_str(&format!(" | 🕸 {} izvora nedostupno", digest.failed_sources));
    }
    caption
}

/// One row of the JSON export; failed sources contribute no rows.
#[derive(Serialize)]
pub struct ExportRow<'a> {
    pub source: &'a str,
    pub title: &'a str,
    pub link: &'a str,
    pub summary: &'a str,
    pub published: Option<DateTime<Utc>>,
}

pub fn export_rows(report: &RunReport) -> Vec<ExportRow<'_>> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .ok()
                .map(|articles| (outcome.source.name, articles))
        })
        .flat_map(|(source, articles)| {
            articles.iter().map(move |article| ExportRow {
                source,
                title: &article.title,
                link: &article.link,
                summary: &article.summary,
                published: article.published,
            })
        })
        .collect()
}

pub fn render_export_json(report: &RunReport) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&export_rows(report))
}
