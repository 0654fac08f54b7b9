//! Corpus text cleaning.

use std::sync::LazyLock;

use regex::Regex;

static URLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http\S+|www\S+").expect("URL pattern is valid")
});

static EMAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+@\S+").expect("email pattern is valid")
});

static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9\s.,!?;:]").expect("symbol pattern is valid")
});

/// Cleans raw page text into a summarizable corpus.
///
/// Removes URLs and email addresses, strips symbols outside a small
/// alphanumeric-plus-punctuation set, and collapses all whitespace runs
/// to single spaces. Idempotent: cleaning already-clean text is a no-op.
pub fn clean_text(corpus: &str) -> String {
    let text = URLS.replace_all(corpus, "");
    let text = EMAILS.replace_all(&text, "");
    let text = SYMBOLS.replace_all(&text, "");
    // stripping symbols can splice characters into new url-like tokens
    let text = URLS.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_passes_plain_text_through() {
        assert_eq!(
            clean_text("Rust is a systems language."),
            "Rust is a systems language."
        );
    }

    #[test]
    fn test_clean_strips_symbols() {
        assert_eq!(
            clean_text("Price: $100 (50% off) & free* [shipping]"),
            "Price: 100 50 off free shipping"
        );
    }

    #[test]
    fn test_clean_keeps_sentence_punctuation() {
        assert_eq!(
            clean_text("Wait, really?! Yes; indeed: true."),
            "Wait, really?! Yes; indeed: true."
        );
    }

    #[test]
    fn test_clean_removes_urls() {
        assert_eq!(
            clean_text("see https://example.com/page for details"),
            "see for details"
        );
        assert_eq!(clean_text("visit www.example.com today"), "visit today");
    }

    #[test]
    fn test_clean_removes_emails() {
        assert_eq!(clean_text("contact admin@example.com now"), "contact now");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(
            clean_text("Hello   world.\n\nGoodbye\tworld."),
            "Hello world. Goodbye world."
        );
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n\t  "), "");
    }

    #[test]
    fn test_clean_url_only_corpus_becomes_empty() {
        assert_eq!(clean_text("https://a.example https://b.example"), "");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            "Plain sentence, nothing fancy.",
            "Mixed: https://example.com and admin@example.com and $ymbol$!",
            "w#ww.hidden-url.com should not survive two passes",
            "ht*tp://broken.example either",
            "  spaced\n\nout\ttext  ",
        ];
        for input in inputs {
            let once = clean_text(input);
            let twice = clean_text(&once);
            assert_eq!(once, twice, "clean_text not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_clean_multiline_corpus() {
        assert_eq!(
            clean_text("Hello world.\nGoodbye world."),
            "Hello world. Goodbye world."
        );
    }
}
