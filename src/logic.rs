//! Business logic layer - query resolution and the fetch pipeline

use crate::consts::{sources_in_section, Profile, Section, Source, EXCLUDED_WORDS};
use crate::filter::{by_keywords, drop_excluded, within_window, DateWindow};
use crate::network::{escape_html, format_error, format_results, Article, NewsEngine, SourceError};
use futures::future::join_all;
use std::mem;
use std::sync::Arc;

/// What to look for - a named keyword profile or ad-hoc keywords
#[derive(Debug, Clone)]
pub enum Query {
    /// One of the curated profiles from the registry
    Profile(&'static Profile),
    /// Keywords the user typed themselves
    Keywords(Vec<String>),
}

impl Query {
    /// The keyword set this query matches against.
    pub fn keywords(&self) -> Vec<&str> {
        match self {
            Query::Profile(profile) => profile.keywords.to_vec(),
            Query::Keywords(list) => list.iter().map(String::as_str).collect(),
        }
    }

    /// Get display name for this query
    pub fn display_name(&self) -> String {
        match self {
            Query::Profile(profile) => format!("{} {}", profile.icon, profile.name),
            Query::Keywords(list) => list.join(", "),
        }
    }
}

/// One source's slice of a run: its surviving articles, or the failure
/// that made it unavailable. An empty article list is a valid outcome,
/// not an error.
pub struct SourceOutcome {
    pub source: Source,
    pub result: Result<Vec<Article>, SourceError>,
}

/// Aggregated result of one run, outcomes in registry order.
pub struct RunReport {
    pub query_name: String,
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn matches(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Fetch every source concurrently and screen the results by date window
/// and the exclusion list. Outcomes land in the same order as `sources`
/// no matter which fetch finishes first.
pub async fn collect(
    engine: &NewsEngine,
    sources: &[Source],
    window: DateWindow,
) -> Vec<SourceOutcome> {
    let fetches = sources.iter().map(|source| async move {
        let result = engine.fetch_source(source).await.map(|articles| {
            let fresh = within_window(articles, window);
            drop_excluded(fresh, EXCLUDED_WORDS)
        });

        if let Err(e) = &result {
            log::error!("Failed to fetch {}: {}", source.name, e);
        }

        SourceOutcome {
            source: *source,
            result,
        }
    });

    join_all(fetches).await
}

/// Run a query end to end: fetch, screen, match keywords, aggregate.
/// A failed source never aborts the run; it is carried in the report.
pub async fn run(
    engine: Arc<NewsEngine>,
    sources: &[Source],
    query: &Query,
    window: DateWindow,
) -> RunReport {
    log::info!(
        "Query '{}' across {} sources",
        query.display_name(),
        sources.len()
    );

    let keywords = query.keywords();
    let mut outcomes = collect(&engine, sources, window).await;
    for outcome in &mut outcomes {
        if let Ok(articles) = &mut outcome.result {
            *articles = by_keywords(mem::take(articles), &keywords);
        }
    }

    let report = RunReport {
        query_name: query.display_name(),
        outcomes,
    };

    log::info!(
        "Query '{}': {} hits | {} sources up | {} down",
        report.query_name,
        report.matches(),
        report.success_count(),
        report.error_count()
    );

    report
}

/// Assemble the Telegram HTML response for a run.
pub fn build_response(report: &RunReport) -> String {
    let mut output = format!("<b>🔎 {}</b>\n\n", escape_html(&report.query_name));

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(articles) if articles.is_empty() => {}
            Ok(articles) => {
                output.push_str(&format_results(outcome.source.name, articles));
                output.push('\n');
            }
            Err(e) => {
                output.push_str(&format_error(outcome.source.name, e));
                output.push('\n');
            }
        }
    }

    if report.matches() == 0 {
        output.push_str("Nema clanaka koji zadovoljavaju zadane kriterije.\n");
    }

    output.push_str(&build_summary(report));
    output
}

/// Build summary line
pub fn build_summary(report: &RunReport) -> String {
    format!(
        "\n───────────────────\n📰 {} clanaka | 👁 {} izvora | 🕸 {} nedostupno",
        report.matches(),
        report.success_count(),
        report.error_count()
    )
}

/// Build help message
pub fn build_help_message() -> &'static str {
    r#"🗞 *KLIPING - pregled hrvatskih vijesti*

*Profili:*
/porezi - 💶 porezi i proracun
/mirovine - 🪙 mirovine i socijala
/klima - 🌱 klima i energija
/potpore - 🏛 subvencije i potpore

Profil se moze suziti na izvore:
`/porezi N1, Lider`

*Pretraga:*
`/trazi pdv, trosarina` - vlastite kljucne rijeci

*Pregled:*
/pregled - dnevni pregled kao HTML dokument
/izvoz porezi - rezultati kao JSON datoteka
/izvori - popis pracenih izvora
/profili - profili i njihove rijeci

*System:*
/start, /help - Info

_Rust 🦀_"#
}

/// Build the /izvori listing, grouped by section.
pub fn build_sources_message() -> String {
    let mut output = String::from("<b>🗞 Praceni izvori</b>\n");
    for section in [Section::Opce, Section::Biznis] {
        output.push_str(&format!("\n<b>{}</b>\n", section));
        for source in sources_in_section(section) {
            output.push_str(&format!(
                "▪️ <a href=\"{}\">{}</a>\n",
                escape_html(source.url),
                escape_html(source.name)
            ));
        }
    }
    output
}

/// Build the /profili listing with each profile's keyword list.
pub fn build_profiles_message() -> String {
    let mut output = String::from("<b>🗂 Profili pracenja</b>\n");
    for profile in crate::consts::PROFILES {
        output.push_str(&format!(
            "\n<b>{} {}</b> - /{}\n   <i>{}</i>\n",
            profile.icon,
            escape_html(profile.name),
            profile.slug,
            escape_html(&profile.keywords.join(", "))
        ));
    }
    output
}

/// Command routing
pub mod routes {
    use super::Query;
    use crate::consts::{find_profile, find_source, Source, SOURCES};
    use crate::utils::parse_list;

    /// Map free-form query text to a query: a profile slug if it names
    /// one, otherwise a comma separated keyword list.
    pub fn resolve_query(text: &str) -> Option<Query> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(profile) = find_profile(text) {
            return Some(Query::Profile(profile));
        }

        // Ad-hoc keywords are lowercased at the boundary, like the
        // registry profiles store theirs.
        let keywords = parse_list(&text.to_lowercase());
        if keywords.is_empty() {
            None
        } else {
            Some(Query::Keywords(keywords))
        }
    }

    /// Resolve a comma separated source restriction. Empty text selects
    /// the whole registry; results keep the order the user typed them in.
    /// An unknown name is returned as the error, never silently dropped.
    pub fn resolve_sources(text: &str) -> Result<Vec<Source>, String> {
        let names = parse_list(text);
        if names.is_empty() {
            return Ok(SOURCES.to_vec());
        }

        let mut picked = Vec::with_capacity(names.len());
        for name in &names {
            match find_source(name) {
                Some(source) => picked.push(*source),
                None => return Err(name.clone()),
            }
        }
        Ok(picked)
    }
}
