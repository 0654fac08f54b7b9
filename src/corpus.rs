//! Corpus assembly from batch outcomes.

use std::collections::HashSet;

use crate::outcome::BatchResult;

/// Joins the text of every successful fetch into one corpus string.
///
/// Pages appear in outcome order, separated by single newlines. Failed
/// fetches contribute nothing. The result feeds the cleaning step; it is
/// not kept afterwards.
pub fn joined_text(batch: &BatchResult) -> String {
    batch
        .successes()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collects the distinct page images from successful fetches, first seen
/// first, preserving outcome order.
pub fn page_images(batch: &BatchResult) -> Vec<String> {
    let mut seen = HashSet::new();
    batch
        .successes()
        .filter_map(|page| page.image.clone())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{BatchStatus, FetchFailure, FetchOutcome, PageText};

    fn batch(outcomes: Vec<FetchOutcome>) -> BatchResult {
        BatchResult {
            outcomes,
            status: BatchStatus::Completed,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_joined_text_skips_failures() {
        let batch = batch(vec![
            FetchOutcome::Success(PageText::new("https://a.example", "Hello world.")),
            FetchOutcome::Failure {
                target: "https://b.example".to_string(),
                cause: FetchFailure::HttpStatus(500),
            },
            FetchOutcome::Success(PageText::new("https://c.example", "Goodbye world.")),
        ]);
        assert_eq!(joined_text(&batch), "Hello world.\nGoodbye world.");
    }

    #[test]
    fn test_joined_text_empty_batch() {
        assert_eq!(joined_text(&batch(vec![])), "");
    }

    #[test]
    fn test_joined_text_all_failures() {
        let batch = batch(vec![FetchOutcome::Failure {
            target: "https://a.example".to_string(),
            cause: FetchFailure::NoContent,
        }]);
        assert_eq!(joined_text(&batch), "");
    }

    #[test]
    fn test_page_images_dedupes_preserving_order() {
        let batch = batch(vec![
            FetchOutcome::Success(
                PageText::new("https://a.example", "a").with_image("https://img.example/1.png"),
            ),
            FetchOutcome::Success(PageText::new("https://b.example", "b")),
            FetchOutcome::Success(
                PageText::new("https://c.example", "c").with_image("https://img.example/2.png"),
            ),
            FetchOutcome::Success(
                PageText::new("https://d.example", "d").with_image("https://img.example/1.png"),
            ),
        ]);
        assert_eq!(
            page_images(&batch),
            vec!["https://img.example/1.png", "https://img.example/2.png"]
        );
    }

    #[test]
    fn test_page_images_empty_when_no_images() {
        let batch = batch(vec![FetchOutcome::Success(PageText::new(
            "https://a.example",
            "a",
        ))]);
        assert!(page_images(&batch).is_empty());
    }
}
