//! Relevance filtering: keyword matching over title and summary, the
//! sport-section exclusion list, and publication date windows.

use crate::network::Article;
use chrono::{DateTime, Duration, Utc};

/// Lowercased text an article is matched against: title and summary,
/// space-joined so a keyword can span neither field boundary.
fn haystack(article: &Article) -> String {
    let mut text = String::with_capacity(article.title.len() + article.summary.len() + 1);
    text.push_str(&article.title);
    text.push(' ');
    text.push_str(&article.summary);
    text.to_lowercase()
}

/// True when the article mentions at least one of the keywords,
/// case-insensitively, as a substring. This is the single matching rule;
/// everything else in the module is built on it.
pub fn matches_any<S: AsRef<str>>(article: &Article, keywords: &[S]) -> bool {
    let hay = haystack(article);
    keywords
        .iter()
        .any(|keyword| hay.contains(keyword.as_ref().to_lowercase().as_str()))
}

/// Keep the articles matching at least one keyword.
///
/// The result is a stable subsequence of the input. An empty keyword set
/// matches nothing.
pub fn by_keywords<S: AsRef<str>>(articles: Vec<Article>, keywords: &[S]) -> Vec<Article> {
    if keywords.is_empty() {
        return Vec::new();
    }

    articles
        .into_iter()
        .filter(|article| matches_any(article, keywords))
        .collect()
}

/// Drop articles that mention any of the excluded words. The inverse of
/// [`by_keywords`]: an empty exclusion list keeps everything.
pub fn drop_excluded<S: AsRef<str>>(articles: Vec<Article>, excluded: &[S]) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| !matches_any(article, excluded))
        .collect()
}

/// Publication cutoff, lower bound only. Articles without a date pass
/// every window; feeds that omit timestamps should not vanish from
/// results. No upper bound either: portals that stamp local time as UTC
/// would otherwise hide their freshest articles.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    since: DateTime<Utc>,
}

impl DateWindow {
    pub fn since(since: DateTime<Utc>) -> Self {
        Self { since }
    }

    /// Window reaching `days` back from now.
    pub fn last_days(days: i64) -> Self {
        Self::since(Utc::now() - Duration::days(days))
    }

    pub fn contains(&self, article: &Article) -> bool {
        article.published.map_or(true, |published| published >= self.since)
    }
}

pub fn within_window(articles: Vec<Article>, window: DateWindow) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| window.contains(article))
        .collect()
}
