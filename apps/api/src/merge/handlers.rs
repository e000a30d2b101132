use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{document_text, DocumentKind, ExtractedProfileData};
use crate::merge::{merge_profile, MergeResult};
use crate::state::AppState;
use crate::storage::store_cv;

/// Multipart field carrying the CV file.
const CV_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct CvUploadResponse {
    pub cv_key: String,
    pub merge: MergeResult,
}

struct CvUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/candidates/:candidate_id/profile/merge
pub async fn handle_merge_profile(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<MergeResult>, AppError> {
    let data = ExtractedProfileData::from_value(payload)?;
    let result = merge_profile(
        state.store.as_ref(),
        candidate_id,
        &data,
        state.config.merge_timeout,
    )
    .await?;
    Ok(Json(result))
}

/// POST /api/v1/candidates/:candidate_id/cv
pub async fn handle_cv_upload(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CvUploadResponse>, AppError> {
    let upload = read_cv_field(&mut multipart, state.config.max_cv_bytes).await?;
    let kind = DocumentKind::detect(
        upload.content_type.as_deref(),
        upload.file_name.as_deref(),
        &upload.bytes,
    )?;

    let Some(guard) = state.merge_lock.try_acquire(candidate_id).await? else {
        return Err(AppError::Conflict(format!(
            "A CV import is already running for candidate {candidate_id}"
        )));
    };
    let outcome = import_cv(&state, candidate_id, kind, upload.bytes).await;
    guard.release().await;

    outcome.map(Json)
}

async fn import_cv(
    state: &AppState,
    candidate_id: Uuid,
    kind: DocumentKind,
    bytes: Bytes,
) -> Result<CvUploadResponse, AppError> {
    let cv_key = store_cv(
        &state.s3,
        &state.config.s3_bucket,
        candidate_id,
        kind,
        bytes.clone(),
    )
    .await?;

    let text = document_text(kind, bytes).await?;
    let payload = state.extractor.extract(&text).await?;
    let data = ExtractedProfileData::from_value(payload)?;
    info!(
        %candidate_id,
        records = data.record_count(),
        "CV extracted, merging into profile"
    );

    let merge = merge_profile(
        state.store.as_ref(),
        candidate_id,
        &data,
        state.config.merge_timeout,
    )
    .await?;
    Ok(CvUploadResponse { cv_key, merge })
}

async fn read_cv_field(multipart: &mut Multipart, max_bytes: usize) -> Result<CvUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(CV_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read CV upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("CV upload is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "CV upload exceeds {max_bytes} bytes"
            )));
        }
        return Ok(CvUpload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "Multipart field '{CV_FIELD}' is required"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;

    use crate::config::Config;
    use crate::extraction::{CvExtractor, ExtractionError};
    use crate::merge::MergeLock;
    use crate::models::BasicInfo;
    use crate::store::memory::MemoryStore;

    struct FixedExtractor(Value);

    #[async_trait]
    impl CvExtractor for FixedExtractor {
        async fn extract(&self, _document_text: &str) -> Result<Value, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/profiles".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            s3_bucket: "cvs".to_string(),
            s3_endpoint: "http://127.0.0.1:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            merge_timeout: Duration::from_secs(120),
            merge_lock_ttl: Duration::from_secs(180),
            max_cv_bytes: 1024,
            db_max_connections: 1,
        }
    }

    fn test_state(store: MemoryStore) -> AppState {
        let config = test_config();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let redis = redis::Client::open(config.redis_url.as_str()).unwrap();
        AppState {
            store: Arc::new(store),
            extractor: Arc::new(FixedExtractor(json!({}))),
            merge_lock: MergeLock::new(redis, config.merge_lock_ttl),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            config,
        }
    }

    #[tokio::test]
    async fn test_merge_endpoint_returns_result() {
        let id = Uuid::new_v4();
        let store = MemoryStore::with_candidate(id, BasicInfo::default());
        let state = test_state(store.clone());

        let body = json!({
            "basic_info": { "bio": "hello" },
            "work_experiences": [
                { "title": "Developer", "company": "Beta Inc" },
                { "title": "Developer", "company": "BETA INC" }
            ]
        });
        let Json(result) = handle_merge_profile(State(state), Path(id), Json(body))
            .await
            .unwrap();

        assert!(result.basic_info_updated);
        assert_eq!(result.new_work_experiences, 1);
        assert_eq!(result.skipped_duplicates.work_experiences, 1);
        assert_eq!(store.snapshot().work_experiences.len(), 1);
        assert_eq!(store.units_begun(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_unprocessable_without_store_access() {
        let store = MemoryStore::new();
        let state = test_state(store.clone());
        let err = handle_merge_profile(
            State(state),
            Path(Uuid::new_v4()),
            Json(json!("not a record")),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(store.units_begun(), 0);
    }

    #[tokio::test]
    async fn test_unknown_candidate_is_not_found() {
        let state = test_state(MemoryStore::new());
        let err = handle_merge_profile(State(state), Path(Uuid::new_v4()), Json(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
