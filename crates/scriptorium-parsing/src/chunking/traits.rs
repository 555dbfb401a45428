//! Token counter capability shared by every `TokenCounter` backend.

/// Counts tokens for a given model's tokenizer.
pub trait TokenCounter: Send + Sync {
    /// The model or encoding name this counter was built for.
    fn name(&self) -> &str;

    /// Maximum context length the associated model supports.
    fn max_tokens(&self) -> usize;

    /// Token count for a single piece of text.
    fn count(&self, text: &str) -> usize;

    /// Token counts for a batch of texts, in input order.
    fn count_batch(&self, texts: &[&str]) -> Vec<usize>;
}
