//! Tantivy-backed `Bm25Store`
//!
//! One tantivy index per process, with a single text field (`body`) and a
//! raw (untokenized) `doc_id` field used both as the stored key and as the
//! term deleted/looked-up on re-index. Tantivy's own BM25 scorer backs
//! `search`.

use crate::error::{VectorDataError, VectorDataResult};
use crate::storage::traits::{Bm25Store, VectorMatch};
use async_trait::async_trait;
use std::sync::Mutex;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, Term, doc};

pub struct TantivyBm25Store {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    doc_id_field: Field,
    body_field: Field,
}

impl TantivyBm25Store {
    /// Opens (or creates) a tantivy index rooted at `path`.
    pub fn open(path: &std::path::Path) -> VectorDataResult<Self> {
        let mut schema_builder = Schema::builder();
        let doc_id_field = schema_builder.add_text_field("doc_id", STRING | STORED);
        let body_field = schema_builder.add_text_field("body", TEXT);
        let schema = schema_builder.build();

        std::fs::create_dir_all(path)
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;
        let dir = MmapDirectory::open(path)
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;
        let index = Index::open_or_create(dir, schema)
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;

        let writer = index
            .writer(50_000_000)
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;
        let reader = index
            .reader()
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            doc_id_field,
            body_field,
        })
    }
}

#[async_trait]
impl Bm25Store for TantivyBm25Store {
    async fn index(&self, id: &str, text: &str) -> VectorDataResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| VectorDataError::Storage("tantivy writer poisoned".to_string()))?;
        writer.delete_term(Term::from_field_text(self.doc_id_field, id));
        writer
            .add_document(doc!(
                self.doc_id_field => id,
                self.body_field => text,
            ))
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        writer
            .commit()
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        self.reader
            .reload()
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> VectorDataResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| VectorDataError::Storage("tantivy writer poisoned".to_string()))?;
        writer.delete_term(Term::from_field_text(self.doc_id_field, id));
        writer
            .commit()
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        self.reader
            .reload()
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> VectorDataResult<Vec<VectorMatch>> {
        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(&self.index, vec![self.body_field]);
        let parsed = parser
            .parse_query(query)
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;

        let hits = searcher
            .search(&parsed, &TopDocs::with_limit(limit))
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;

        let mut matches = Vec::with_capacity(hits.len());
        for (score, addr) in hits {
            let retrieved = searcher
                .doc::<tantivy::TantivyDocument>(addr)
                .map_err(|e| VectorDataError::Storage(e.to_string()))?;
            if let Some(id) = retrieved
                .get_first(self.doc_id_field)
                .and_then(|v| v.as_str())
            {
                matches.push(VectorMatch {
                    id: id.to_string(),
                    score,
                });
            }
        }
        Ok(matches)
    }
}
