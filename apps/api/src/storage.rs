use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::DocumentKind;

pub fn cv_object_key(candidate_id: Uuid, upload_id: Uuid, kind: DocumentKind) -> String {
    format!("cvs/{candidate_id}/{upload_id}.{}", kind.extension())
}

/// Stores the original CV bytes and returns the object key.
pub async fn store_cv(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    candidate_id: Uuid,
    kind: DocumentKind,
    bytes: Bytes,
) -> Result<String, AppError> {
    let key = cv_object_key(candidate_id, Uuid::new_v4(), kind);
    let size = bytes.len();

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .content_type(kind.content_type())
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Failed to store CV {key}: {e}")))?;

    info!(%candidate_id, key = %key, size, "Stored uploaded CV");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_object_key_layout() {
        let candidate = Uuid::nil();
        let upload = Uuid::from_u128(0xff);
        assert_eq!(
            cv_object_key(candidate, upload, DocumentKind::Pdf),
            "cvs/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-0000000000ff.pdf"
        );
        assert!(cv_object_key(candidate, upload, DocumentKind::PlainText).ends_with(".txt"));
    }
}
