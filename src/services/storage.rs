use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::Settings;
use crate::db::types::ReportSlot;

/// S3-backed document store for chapter and report uploads. Optional: when no
/// credentials are configured the API rejects uploads instead of failing at
/// startup.
#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
}

/// Object key for a chapter upload. The UUID segment keeps superseded
/// uploads addressable for the audit trail.
pub(crate) fn chapter_key(proposal_id: &str, chapter_number: i32, filename: &str) -> String {
    format!("theses/{proposal_id}/chapters/{chapter_number}/{}_{filename}", Uuid::new_v4())
}

pub(crate) fn report_key(proposal_id: &str, slot: ReportSlot, filename: &str) -> String {
    format!("theses/{proposal_id}/report/{}/{}_{filename}", slot.as_str(), Uuid::new_v4())
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if settings.s3().access_key.is_empty() || settings.s3().secret_key.is_empty() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "thesisdesk-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let client = Client::new(&config);

        Ok(Some(Self { client, bucket: settings.s3().bucket.clone() }))
    }

    pub(crate) async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    pub(crate) async fn upload_bytes(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<(i64, String)> {
        let size = bytes.len() as i64;
        let hash = Sha256::digest(&bytes);
        let hash_hex = hex::encode(hash);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        Ok((size, hash_hex))
    }
}

#[cfg(test)]
mod tests {
    use super::{chapter_key, report_key};
    use crate::db::types::ReportSlot;

    #[test]
    fn chapter_keys_are_scoped_and_unique() {
        let a = chapter_key("p-1", 3, "draft.pdf");
        let b = chapter_key("p-1", 3, "draft.pdf");
        assert!(a.starts_with("theses/p-1/chapters/3/"));
        assert!(a.ends_with("_draft.pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn report_keys_embed_the_slot() {
        let key = report_key("p-1", ReportSlot::ApprovalSheet, "sheet.pdf");
        assert!(key.starts_with("theses/p-1/report/approval_sheet/"));
        assert!(key.ends_with("_sheet.pdf"));
    }
}
