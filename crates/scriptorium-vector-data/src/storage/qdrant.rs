//! Qdrant-backed `EmbeddingStore`
//!
//! Keeps code and text embeddings in separate collections (named
//! `{collection_name}_code` / `{collection_name}_text`) since the two
//! embedding spaces are never compared against each other. Document ids are
//! stored in the point payload under `doc_id`; Qdrant still wants a native
//! point id, so the id string is hashed into a UUID v5 deterministically —
//! re-saving the same `doc_id` always lands on the same point.

use crate::error::{VectorDataError, VectorDataResult};
use crate::storage::traits::{Embedding, EmbeddingKind, EmbeddingStore, VectorMatch};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CollectionExistsRequest, CreateCollection, DeletePoints, Distance, GetPoints, PointId,
    PointStruct, PointsIdsList, PointsSelector, SearchPoints, UpsertPoints, Value, VectorParams,
    VectorsConfig, points_selector::PointsSelectorOneOf, vectors_config::Config as VectorsConfigInner,
};
use qdrant_client::{Payload, Qdrant};
use scriptorium_config::VectorStorageConfig;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Fixed namespace so the same `doc_id` always maps to the same Qdrant
/// point id across process restarts.
const POINT_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0xa8, 0xf5, 0xc3, 0xe2, 0x7b, 0x9d, 0x4f, 0x2a, 0x9e, 0x1c, 0x3d, 0x5a, 0x7b, 0x9f, 0x1e, 0x3c,
]);

fn point_id_for(doc_id: &str) -> PointId {
    let uuid = Uuid::new_v5(&POINT_ID_NAMESPACE, doc_id.as_bytes());
    PointId::from(uuid.to_string())
}

/// Qdrant-backed embedding store. One client, two collections (code/text).
pub struct QdrantEmbeddingStore {
    client: Qdrant,
    collection_name: String,
    vector_dimension: usize,
}

impl QdrantEmbeddingStore {
    pub fn new(config: &VectorStorageConfig) -> VectorDataResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);
        if let Ok(api_key) = std::env::var("QDRANT_API_KEY") {
            builder = builder.api_key(api_key);
        }
        let client = builder
            .build()
            .map_err(|e| VectorDataError::StorageUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            collection_name: config.collection_name.clone(),
            vector_dimension: config.vector_dimension,
        })
    }

    fn collection_for(&self, kind: EmbeddingKind) -> String {
        format!("{}_{}", self.collection_name, kind.as_str())
    }

    async fn ensure_collection(&self, kind: EmbeddingKind) -> VectorDataResult<()> {
        let name = self.collection_for(kind);
        let exists = self
            .client
            .collection_exists(CollectionExistsRequest {
                collection_name: name.clone(),
            })
            .await
            .map_err(|e| VectorDataError::CollectionError(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let vectors_config = VectorsConfig {
            config: Some(VectorsConfigInner::Params(VectorParams {
                size: self.vector_dimension as u64,
                distance: Distance::Cosine as i32,
                ..Default::default()
            })),
        };

        let result = self
            .client
            .create_collection(CreateCollection {
                collection_name: name.clone(),
                vectors_config: Some(vectors_config),
                ..Default::default()
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("already exists") => Ok(()),
            Err(e) => Err(VectorDataError::CollectionError(e.to_string())),
        }
    }
}

#[async_trait]
impl EmbeddingStore for QdrantEmbeddingStore {
    async fn has_embedding(&self, id: &str, kind: EmbeddingKind) -> VectorDataResult<bool> {
        Ok(self.has_embeddings(&[id.to_string()], kind).await?[id])
    }

    async fn has_embeddings(
        &self,
        ids: &[String],
        kind: EmbeddingKind,
    ) -> VectorDataResult<HashMap<String, bool>> {
        let collection_name = self.collection_for(kind);
        let exists = self
            .client
            .collection_exists(CollectionExistsRequest { collection_name })
            .await
            .map_err(|e| VectorDataError::CollectionError(e.to_string()))?;

        let mut found = HashMap::with_capacity(ids.len());
        if !exists {
            for id in ids {
                found.insert(id.clone(), false);
            }
            return Ok(found);
        }

        // Qdrant has no batched "contains point id" primitive; point
        // presence is checked via retrieve-by-id, one round trip per id.
        for id in ids {
            let point_id = point_id_for(id);
            let resp = self
                .client
                .get_points(GetPoints {
                    collection_name: self.collection_for(kind),
                    ids: vec![point_id],
                    with_payload: Some(false.into()),
                    with_vectors: Some(false.into()),
                    ..Default::default()
                })
                .await
                .map_err(|e| VectorDataError::Storage(e.to_string()))?;
            found.insert(id.clone(), !resp.result.is_empty());
        }
        Ok(found)
    }

    async fn save_all(&self, embeddings: Vec<Embedding>) -> VectorDataResult<()> {
        let mut by_kind: HashMap<EmbeddingKind, Vec<Embedding>> = HashMap::new();
        for embedding in embeddings {
            by_kind.entry(embedding.kind).or_default().push(embedding);
        }

        for (kind, group) in by_kind {
            self.ensure_collection(kind).await?;

            let points = group
                .into_iter()
                .map(|embedding| {
                    let mut payload = HashMap::new();
                    payload.insert("doc_id".to_string(), Value::from(embedding.id.clone()));
                    PointStruct::new(
                        point_id_for(&embedding.id),
                        embedding.vector,
                        Payload::from(payload),
                    )
                })
                .collect();

            self.client
                .upsert_points(UpsertPoints {
                    collection_name: self.collection_for(kind),
                    points,
                    ..Default::default()
                })
                .await
                .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    async fn search(
        &self,
        kind: EmbeddingKind,
        query: &[f32],
        limit: usize,
        ids: Option<&[String]>,
    ) -> VectorDataResult<Vec<VectorMatch>> {
        if query.len() != self.vector_dimension {
            return Err(VectorDataError::VectorDimensionMismatch(format!(
                "query has {} dims, store expects {}",
                query.len(),
                self.vector_dimension
            )));
        }

        let candidate_set: Option<HashSet<&str>> =
            ids.map(|ids| ids.iter().map(String::as_str).collect());

        let response = self
            .client
            .search_points(SearchPoints {
                collection_name: self.collection_for(kind),
                vector: query.to_vec(),
                limit: if candidate_set.is_some() {
                    // Over-fetch so filtering by candidate ids still leaves `limit` results.
                    (limit * 4).max(limit) as u64
                } else {
                    limit as u64
                },
                with_payload: Some(true.into()),
                ..Default::default()
            })
            .await
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;

        let mut matches = Vec::new();
        for point in response.result {
            let Some(doc_id) = point
                .payload
                .get("doc_id")
                .and_then(|v| v.as_str().map(str::to_string))
            else {
                continue;
            };
            if let Some(set) = &candidate_set {
                if !set.contains(doc_id.as_str()) {
                    continue;
                }
            }
            matches.push(VectorMatch {
                id: doc_id,
                score: point.score,
            });
            if matches.len() >= limit {
                break;
            }
        }
        Ok(matches)
    }

    async fn delete_by(&self, ids: &[String], kind: EmbeddingKind) -> VectorDataResult<()> {
        let point_ids: Vec<PointId> = ids.iter().map(|id| point_id_for(id)).collect();
        self.client
            .delete_points(DeletePoints {
                collection_name: self.collection_for(kind),
                points: Some(PointsSelector {
                    points_selector_one_of: Some(PointsSelectorOneOf::Points(PointsIdsList {
                        ids: point_ids,
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| VectorDataError::Storage(e.to_string()))?;
        Ok(())
    }
}
