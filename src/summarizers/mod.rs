//! Summarizer implementations.

mod extractive;
mod gemini;

pub use extractive::ExtractiveSummarizer;
pub use gemini::GeminiSummarizer;
