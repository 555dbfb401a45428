//! Token-budgeted batching and truncation for the embedding service (spec §4.9).

use super::tiktoken_counter::TiktokenCounter;
use super::traits::TokenCounter;

/// A document submitted for embedding, identified by a string id the
/// producing handler chose (snippet sha, or stringified enrichment id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Splits a document list into batches that respect a total-token ceiling,
/// and truncates individual documents to a per-document ceiling.
pub trait TokenBudget: Send + Sync {
    /// Split `docs` into batches whose total token weight never exceeds the
    /// budget's per-batch ceiling. A single document that alone exceeds the
    /// ceiling still occupies its own one-document batch.
    fn batches(&self, docs: &[Document]) -> Vec<Vec<Document>>;

    /// Truncate `text` to the budget's per-document token ceiling.
    fn truncate(&self, text: &str) -> String;
}

/// `TokenBudget` backed by `tiktoken-rs`, reusing `TiktokenCounter`.
pub struct TiktokenBudget {
    counter: TiktokenCounter,
    max_tokens_per_batch: usize,
    max_tokens_per_doc: usize,
}

impl TiktokenBudget {
    /// # Errors
    /// Returns an error if the underlying tiktoken encoder fails to load.
    pub fn new(
        model_name: &str,
        max_tokens_per_batch: usize,
        max_tokens_per_doc: usize,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            counter: TiktokenCounter::new(model_name, max_tokens_per_doc)?,
            max_tokens_per_batch: max_tokens_per_batch.max(1),
            max_tokens_per_doc: max_tokens_per_doc.max(1),
        })
    }
}

impl TokenBudget for TiktokenBudget {
    fn batches(&self, docs: &[Document]) -> Vec<Vec<Document>> {
        let mut batches = Vec::new();
        let mut current: Vec<Document> = Vec::new();
        let mut current_tokens = 0usize;

        for doc in docs {
            let truncated_text = self.truncate(&doc.text);
            let tokens = self.counter.count(&truncated_text);
            let doc = Document {
                id: doc.id.clone(),
                text: truncated_text,
            };

            if !current.is_empty() && current_tokens + tokens > self.max_tokens_per_batch {
                batches.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            current_tokens += tokens;
            current.push(doc);
        }

        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    fn truncate(&self, text: &str) -> String {
        if self.counter.count(text) <= self.max_tokens_per_doc {
            return text.to_string();
        }
        // Binary-search the largest character prefix whose token count fits.
        let chars: Vec<char> = text.chars().collect();
        let (mut lo, mut hi) = (0usize, chars.len());
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            let candidate: String = chars[..mid].iter().collect();
            if self.counter.count(&candidate) <= self.max_tokens_per_doc {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        chars[..lo].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> TiktokenBudget {
        TiktokenBudget::new("gpt-4", 20, 10).unwrap()
    }

    #[test]
    fn truncate_respects_ceiling() {
        let budget = budget();
        let long = "word ".repeat(50);
        let truncated = budget.truncate(&long);
        assert!(budget.counter.count(&truncated) <= 10);
    }

    #[test]
    fn truncate_is_noop_under_ceiling() {
        let budget = budget();
        assert_eq!(budget.truncate("short"), "short");
    }

    #[test]
    fn batches_never_exceed_budget() {
        let budget = TiktokenBudget::new("gpt-4", 5, 100).unwrap();
        let docs = vec![
            Document { id: "1".into(), text: "one".into() },
            Document { id: "2".into(), text: "two".into() },
            Document { id: "3".into(), text: "three".into() },
        ];
        let batches = budget.batches(&docs);
        for batch in &batches {
            let total: usize = batch.iter().map(|d| budget.counter.count(&d.text)).sum();
            assert!(total <= 5 || batch.len() == 1);
        }
        let total_docs: usize = batches.iter().map(std::vec::Vec::len).sum();
        assert_eq!(total_docs, 3);
    }

    #[test]
    fn single_oversized_doc_gets_its_own_batch() {
        let budget = budget();
        let docs = vec![Document {
            id: "big".into(),
            text: "word ".repeat(50),
        }];
        let batches = budget.batches(&docs);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }
}
