use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::extraction::CvExtractor;
use crate::merge::MergeLock;
use crate::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Profile store. Postgres in production, in-memory in tests.
    pub store: Arc<dyn ProfileStore>,
    /// Structures CV text into an extraction payload. Default: LlmCvExtractor.
    pub extractor: Arc<dyn CvExtractor>,
    pub merge_lock: MergeLock,
    pub s3: S3Client,
    pub config: Config,
}
