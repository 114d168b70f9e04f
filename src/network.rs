//! Feed fetching engine: one HTTP round trip per source, RSS/Atom parsing,
//! and the Telegram HTML rendering of results.

use crate::consts::{headers, limits, Source};
use crate::utils::{clean_text, truncate_text};
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("feed body too large ({0} bytes)")]
    TooLarge(usize),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed feed: {0}")]
    Malformed(#[from] feed_rs::parser::ParseFeedError),
}

/// Per-source failure, carried to the presenter as an "unavailable" notice.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// One article as parsed out of a feed. Immutable once built; `title` and
/// `link` are guaranteed non-empty, `summary` may be empty, `published`
/// may be absent (plenty of feeds omit it).
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

/// Result of parsing one feed document: the valid records in document
/// order, plus how many entries were dropped for missing title/link.
pub struct ParsedFeed {
    pub articles: Vec<Article>,
    pub skipped: usize,
}

/// Parse an RSS/Atom document into article records.
///
/// Entry order is preserved as given by the source. Entries without a
/// non-empty title and link are dropped, not fatal; a document that is
/// not a feed at all yields [`ParseError`].
pub fn parse_feed(raw: &[u8]) -> Result<ParsedFeed, ParseError> {
    let feed = feed_rs::parser::parse(raw)?;

    let mut skipped = 0;
    let articles = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .map(|t| clean_text(&t.content))
                .unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();

            if title.is_empty() || link.is_empty() {
                skipped += 1;
                return None;
            }

            let summary = entry
                .summary
                .map(|s| clean_text(&s.content))
                .or_else(|| entry.content.and_then(|c| c.body.map(|b| clean_text(&b))))
                .unwrap_or_default();
            let published = entry.published.or(entry.updated);

            Some(Article {
                title,
                link,
                summary,
                published,
            })
        })
        .collect();

    Ok(ParsedFeed { articles, skipped })
}

pub struct NewsEngine {
    client: Client,
}

impl NewsEngine {
    pub fn new() -> Arc<Self> {
        let client = Client::builder()
            .user_agent(headers::USER_AGENT)
            .timeout(Duration::from_secs(limits::REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap();

        Arc::new(Self { client })
    }

    /// One network round trip: GET the feed document, raw bytes back.
    ///
    /// Any transport failure and any non-2xx status is a [`FetchError`];
    /// oversized bodies are rejected rather than buffered.
    pub async fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let res = self
            .client
            .get(url)
            .header(ACCEPT, headers::ACCEPT_RSS)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(FetchError::Status(res.status().as_u16()));
        }

        // Content-Length fast path; the realized body is checked again below
        // because plenty of servers stream feeds chunked without a length.
        if let Some(len) = res.content_length() {
            if len as usize > limits::MAX_FEED_BYTES {
                return Err(FetchError::TooLarge(len as usize));
            }
        }

        let bytes = res.bytes().await?;
        if bytes.len() > limits::MAX_FEED_BYTES {
            return Err(FetchError::TooLarge(bytes.len()));
        }

        Ok(bytes.to_vec())
    }

    /// Fetch and parse one source into article records, document order.
    pub async fn fetch_source(&self, source: &Source) -> Result<Vec<Article>, SourceError> {
        let raw = self.fetch_raw(source.url).await?;
        let parsed = parse_feed(&raw)?;

        if parsed.skipped > 0 {
            log::debug!(
                "{}: dropped {} entries without title/link",
                source.name,
                parsed.skipped
            );
        }

        Ok(parsed.articles)
    }
}

// ═══════════════════════════════════════════════════════════════════
// TELEGRAM HTML FORMATTING
// ═══════════════════════════════════════════════════════════════════

/// Render one source's matches: linked title, trimmed summary, time stamp.
pub fn format_results(source_name: &str, articles: &[Article]) -> String {
    let mut output = format!("<b>📰 {}</b>\n", escape_html(source_name));
    for article in articles {
        let title = truncate_text(&article.title, limits::MAX_TITLE_CHARS);
        output.push_str(&format!(
            "\n▪️ <a href=\"{}\"><b>{}</b></a>",
            escape_html(&article.link),
            escape_html(&title)
        ));

        if !article.summary.is_empty() {
            let summary = truncate_text(&article.summary, limits::MAX_SUMMARY_CHARS);
            if summary != title {
                output.push_str(&format!("\n   <i>{}</i>", escape_html(&summary)));
            }
        }

        if let Some(published) = article.published {
            output.push_str(&format!(
                "\n   └ <code>{}</code>",
                published.format("%Y-%m-%d %H:%M")
            ));
        }
        output.push('\n');
    }
    output
}

/// Render a per-source "unavailable" notice.
pub fn format_error(source_name: &str, error: &SourceError) -> String {
    format!("<b>🕸 {}:</b> {}\n", escape_html(source_name), error)
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Test portal</title>
  <item>
    <title>Vlada najavljuje reformu mirovina</title>
    <link>https://example.hr/mirovine-1</link>
    <description>Reforma mirovinskog sustava ide u proceduru.</description>
    <pubDate>Mon, 17 Aug 2026 08:30:00 GMT</pubDate>
  </item>
  <item>
    <title>Najava poreznih promjena</title>
    <link>https://example.hr/porezi-1</link>
    <description>&lt;p&gt;Mijenja se &lt;b&gt;pdv&lt;/b&gt; na usluge.&lt;/p&gt;</description>
  </item>
</channel></rss>"#;

    fn leak_source(name: &str, url: String) -> Source {
        Source {
            name: Box::leak(name.to_string().into_boxed_str()),
            url: Box::leak(url.into_boxed_str()),
            section: crate::consts::Section::Opce,
        }
    }

    #[test]
    fn parse_preserves_document_order() {
        let parsed = parse_feed(VALID_RSS.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 0);

        let titles: Vec<&str> = parsed.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Vlada najavljuje reformu mirovina", "Najava poreznih promjena"]
        );
    }

    #[test]
    fn parse_strips_html_from_summaries() {
        let parsed = parse_feed(VALID_RSS.as_bytes()).unwrap();
        assert_eq!(parsed.articles[1].summary, "Mijenja se pdv na usluge.");
    }

    #[test]
    fn parse_keeps_published_optional() {
        let parsed = parse_feed(VALID_RSS.as_bytes()).unwrap();
        assert!(parsed.articles[0].published.is_some());
        assert!(parsed.articles[1].published.is_none());
    }

    #[test]
    fn parse_drops_entries_without_link_or_title() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item>
    <title>Potpuna vijest</title>
    <link>https://example.hr/ok</link>
  </item>
  <item>
    <title>Vijest bez poveznice</title>
  </item>
  <item>
    <title></title>
    <link>https://example.hr/bez-naslova</link>
  </item>
</channel></rss>"#;

        let parsed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.articles[0].title, "Potpuna vijest");
    }

    #[test]
    fn parse_atom_falls_back_to_updated() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom portal</title>
  <id>urn:uuid:atom-portal</id>
  <updated>2026-08-17T10:00:00Z</updated>
  <entry>
    <title>Energetska tranzicija u brojkama</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.hr/energija"/>
    <updated>2026-08-17T09:00:00Z</updated>
  </entry>
</feed>"#;

        let parsed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert!(parsed.articles[0].published.is_some());
    }

    #[test]
    fn parse_rejects_garbage_document() {
        assert!(parse_feed(b"<not a feed at all").is_err());
    }

    #[tokio::test]
    async fn fetch_source_returns_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&server)
            .await;

        let engine = NewsEngine::new();
        let source = leak_source("Test", format!("{}/feed", server.uri()));

        let articles = engine.fetch_source(&source).await.unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[tokio::test]
    async fn fetch_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let engine = NewsEngine::new();
        let source = leak_source("Mrtav portal", format!("{}/feed", server.uri()));

        match engine.fetch_source(&source).await {
            Err(SourceError::Fetch(FetchError::Status(404))) => {}
            other => panic!("expected Status(404), got {:?}", other.map(|a| a.len())),
        }
    }

    #[tokio::test]
    async fn fetch_rejects_oversized_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![b'x'; limits::MAX_FEED_BYTES + 1]),
            )
            .mount(&server)
            .await;

        let engine = NewsEngine::new();
        let source = leak_source("Preveliki feed", format!("{}/feed", server.uri()));

        match engine.fetch_source(&source).await {
            Err(SourceError::Fetch(FetchError::TooLarge(size))) => {
                assert!(size > limits::MAX_FEED_BYTES);
            }
            other => panic!("expected TooLarge, got {:?}", other.map(|a| a.len())),
        }
    }

    #[tokio::test]
    async fn fetch_surfaces_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nije feed</html>"))
            .mount(&server)
            .await;

        let engine = NewsEngine::new();
        let source = leak_source("Krivi format", format!("{}/feed", server.uri()));

        match engine.fetch_source(&source).await {
            Err(SourceError::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn formatting_escapes_and_links() {
        let articles = vec![Article {
            title: "PDV <i>raste</i>".into(),
            link: "https://example.hr/clanak?a=1&b=2".into(),
            summary: String::new(),
            published: None,
        }];

        let out = format_results("Index & Co", &articles);
        assert!(out.contains("Index &amp; Co"));
        assert!(out.contains("PDV &lt;i&gt;raste&lt;/i&gt;"));
        assert!(out.contains("href=\"https://example.hr/clanak?a=1&amp;b=2\""));
    }
}
