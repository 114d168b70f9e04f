//! Static configuration: feed sources, keyword profiles, limits.
//! All strings are &'static str so the registries cost no heap at runtime.

use std::fmt;

/// Display grouping for the source registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// General daily news desks
    Opce,
    /// Business and economy desks
    Biznis,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Opce => write!(f, "🗞 Opce vijesti"),
            Section::Biznis => write!(f, "📈 Biznis i ekonomija"),
        }
    }
}

/// News source definition with static lifetime
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub name: &'static str,
    pub url: &'static str,
    pub section: Section,
}

impl Source {
    const fn new(name: &'static str, url: &'static str, section: Section) -> Self {
        Self { name, url, section }
    }
}

/// Topical keyword profile. Keywords are lowercase substrings; inflected
/// Croatian forms are caught by the substring match, not listed out.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub name: &'static str,
    /// Command word that selects the profile
    pub slug: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
}

impl Profile {
    const fn new(
        name: &'static str,
        slug: &'static str,
        icon: &'static str,
        keywords: &'static [&'static str],
    ) -> Self {
        Self { name, slug, icon, keywords }
    }
}

/// Static source registry - compile-time constant, zero heap allocation
pub static SOURCES: &[Source] = &[
    // ═══════════════════════════════════════════════════════════════════
    // OPCE VIJESTI
    // ═══════════════════════════════════════════════════════════════════
    Source::new("N1", "https://n1info.hr/feed/", Section::Opce),
    Source::new(
        "Index Vijesti",
        "https://www.index.hr/rss/vijesti",
        Section::Opce,
    ),
    Source::new("Jutarnji", "http://www.jutarnji.hr/rss", Section::Opce),
    Source::new("Vecernji", "https://www.vecernji.hr/rss", Section::Opce),
    Source::new("Tportal", "https://www.tportal.hr/rss", Section::Opce),
    Source::new(
        "24sata",
        "https://www.24sata.hr/feeds/news.xml",
        Section::Opce,
    ),
    Source::new(
        "Slobodna Vijesti",
        "https://slobodnadalmacija.hr/feed/category/119",
        Section::Opce,
    ),
    Source::new("HRT Vijesti", "https://vijesti.hrt.hr/rss", Section::Opce),

    // ═══════════════════════════════════════════════════════════════════
    // BIZNIS / EKONOMIJA
    // ═══════════════════════════════════════════════════════════════════
    Source::new(
        "Index Novac",
        "https://www.index.hr/rss/vijesti-novac",
        Section::Biznis,
    ),
    Source::new("Poslovni", "https://www.poslovni.hr/feed", Section::Biznis),
    Source::new("Lider", "https://lidermedia.hr/rss", Section::Biznis),
    Source::new(
        "Slobodna Biznis",
        "https://slobodnadalmacija.hr/feed/category/244",
        Section::Biznis,
    ),
];

/// Static profile registry for presscut-style topic tracking
pub static PROFILES: &[Profile] = &[
    Profile::new(
        "Porezi i proracun",
        "porezi",
        "💶",
        &[
            "porezna reforma",
            "porez na dohodak",
            "porez na dobit",
            "pdv",
            "proracun",
            "fiskalna politika",
            "porezni prihodi",
            "porezno rasterecenje",
            "porezne olaksice",
            "trosarine",
            "doprinosi",
            "proracunski deficit",
            "proracunski prihodi",
            "javne financije",
            "fiskalna pravila",
        ],
    ),
    Profile::new(
        "Mirovine i socijalna politika",
        "mirovine",
        "🪙",
        &[
            "mirovinska reforma",
            "mirovinski sustav",
            "socijalna pomoc",
            "djecji doplatak",
            "minimalna placa",
            "zaposljavanje",
        ],
    ),
    Profile::new(
        "Klimatske politike i energija",
        "klima",
        "🌱",
        &[
            "klimatska politika",
            "co2",
            "porez na ugljik",
            "ugljicni porez",
            "obnovljivi izvori",
            "energija",
            "energetska tranzicija",
            "odrzivi razvoj",
            "zelena tranzicija",
            "eu ets",
            "niskougljicni rast",
            "niskoemisijski rast",
            "klimatska neutralnost",
        ],
    ),
    Profile::new(
        "Subvencije i drzavne potpore",
        "potpore",
        "🏛",
        &[
            "subvencije",
            "drzavne potpore",
            "potpore poduzecima",
            "nacionalni plan oporavka",
            "europski fondovi",
            "eu fondovi",
        ],
    ),
];

/// Words that kick an article out regardless of keyword hits.
/// Sportske rubrike znaju pokupiti "proracun kluba" i slicno.
pub static EXCLUDED_WORDS: &[&str] = &["sport", "nogomet", "rukomet"];

/// Lookup source by name (case-insensitive match)
#[inline]
pub fn find_source(name: &str) -> Option<&'static Source> {
    SOURCES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Lookup profile by command slug or full name (case-insensitive match)
#[inline]
pub fn find_profile(key: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| {
        p.slug.eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key)
    })
}

/// All sources in a section, registry order
#[inline]
pub fn sources_in_section(section: Section) -> impl Iterator<Item = &'static Source> {
    SOURCES.iter().filter(move |s| s.section == section)
}

/// HTTP headers; a few portals reject default client agents
pub mod headers {
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    pub const ACCEPT_RSS: &str =
        "application/rss+xml,application/xml,text/xml;q=0.9,*/*;q=0.8";
}

/// Limits and thresholds
pub mod limits {
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
    /// Hard cap on a feed body; full-content feeds stay far below this.
    pub const MAX_FEED_BYTES: usize = 10 * 1024 * 1024;
    pub const MAX_TITLE_CHARS: usize = 150;
    pub const MAX_SUMMARY_CHARS: usize = 200;
    /// Telegram rejects messages over 4096 chars; keep headroom for tags.
    pub const MESSAGE_CHUNK_BYTES: usize = 4000;
    /// Interactive queries look this many days back.
    pub const DEFAULT_WINDOW_DAYS: i64 = 2;
    /// The daily digest covers yesterday and today.
    pub const DIGEST_WINDOW_DAYS: i64 = 1;
    /// Word cap for summaries in the daily digest document.
    pub const DIGEST_SUMMARY_WORDS: usize = 80;
}
