//! Text helpers shared by the parser, the presenter and the digest.

use scraper::Html;

/// Strip markup from feed text and collapse whitespace.
///
/// Portals ship summaries as HTML fragments (`<p>`, `<img>`, entity-encoded
/// diacritics); keyword matching and Telegram rendering both want plain text,
/// so the strip happens once, at parse time.
pub fn clean_text(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let plain = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");

    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect::<String>() + "..."
}

/// Trim a summary to at most `limit` words, marking the cut.
pub fn summarize_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    words[..limit].join(" ") + " …"
}

/// Split comma-separated user input into trimmed, non-empty items.
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_text_strips_tags_and_entities() {
        let raw = "<p>Vlada najavljuje <b>poreznu</b> reformu</p>";
        assert_eq!(clean_text(raw), "Vlada najavljuje poreznu reformu");

        // entity-encoded diacritics come out as real characters
        assert_eq!(clean_text("pla&#263;a &amp; porez"), "plaća & porez");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \n\n  b\t c  "), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn clean_text_keeps_plain_text_intact() {
        assert_eq!(clean_text("obicna recenica"), "obicna recenica");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_text("kratko", 10), "kratko");
        assert_eq!(truncate_text("dugacak naslov", 7), "dugacak...");
        // multi-byte chars count as one
        assert_eq!(truncate_text("ćććć", 2), "ćć...");
    }

    #[test]
    fn summarize_cuts_at_word_limit() {
        assert_eq!(summarize_words("jedan dva tri", 5), "jedan dva tri");
        assert_eq!(summarize_words("jedan dva tri cetiri", 2), "jedan dva …");
    }

    #[test]
    fn parse_list_splits_and_trims() {
        assert_eq!(
            parse_list(" n1 , index vijesti ,, "),
            vec!["n1".to_string(), "index vijesti".to_string()]
        );
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }
}
