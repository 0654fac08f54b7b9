//! HTML extraction: paragraph text and the page's first usable image.

use scraper::{Html, Selector};
use url::Url;

use crate::outcome::PageText;

/// Default maximum bytes of paragraph text kept per page.
pub const DEFAULT_MAX_BYTES: usize = 100_000;

/// Extracts paragraph text and the first image URL from raw HTML.
///
/// Paragraph text is the inner text of every `<p>` element, one paragraph
/// per line. Returns `None` when the page has no non-empty paragraphs;
/// such pages carry no usable prose for the corpus.
pub fn extract_page(html: &str, url: &str, max_bytes: usize) -> Option<PageText> {
    let document = Html::parse_document(html);

    let text = paragraph_text(&document);
    if text.is_empty() {
        return None;
    }

    let mut page = PageText::new(url, truncate_to_limit(&text, max_bytes));
    if let Some(image) = first_image_url(&document, url) {
        page = page.with_image(image);
    }
    Some(page)
}

/// Joins the inner text of every `<p>` element, one per line.
fn paragraph_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
        .collect();

    paragraphs.join("\n")
}

/// Returns the first `<img>` source as an absolute URL.
///
/// Relative sources are resolved against the page URL. Inline `data:`
/// images are skipped; they are not addressable.
fn first_image_url(document: &Html, base_url: &str) -> Option<String> {
    let selector = Selector::parse("img").ok()?;

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .find_map(|src| absolutize(src, base_url))
}

fn absolutize(src: &str, base_url: &str) -> Option<String> {
    match Url::parse(src) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(_) => Url::parse(base_url)
            .ok()?
            .join(src)
            .ok()
            .map(|u| u.to_string()),
    }
}

/// Truncates at the byte limit, stepping back to a char boundary.
fn truncate_to_limit(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_owned();
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    text[..end].to_owned()
}
