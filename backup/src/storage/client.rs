use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Body, Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use super::types::{as_gb, DiskSpace, UploadLink, UploadReceipt};
use crate::config::StorageConfig;
use crate::constants::http::CONNECT_TIMEOUT;
use crate::errors::{BackupError, ConfigError, Result};

/// Client for the remote disk REST API
pub struct DiskClient {
    client: Client,
    api_base: String,
    authorization: String,
    request_timeout: Duration,
}

impl DiskClient {
    pub fn new(storage: &StorageConfig, token: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "storage".to_string(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base: storage.api_base.trim_end_matches('/').to_string(),
            authorization: format!("{} {}", storage.auth_scheme, token),
            // Applies to the metadata calls only; part transfers may take long
            request_timeout: Duration::from_secs(storage.request_timeout_seconds),
        })
    }

    /// Query total and used space of the disk.
    pub async fn get_disk_space(&self) -> Result<DiskSpace> {
        let response = self
            .client
            .get(&self.api_base)
            .header(AUTHORIZATION, &self.authorization)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| BackupError::QuotaQuery {
                reason: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackupError::QuotaQuery {
                reason: format!("status {}: {}", status, error_text),
            });
        }

        let space: DiskSpace = response.json().await.map_err(|e| BackupError::QuotaQuery {
            reason: format!("failed to parse quota response: {}", e),
        })?;

        info!("Total space: {:.2} GB", as_gb(space.total_space));
        info!("Used space: {:.2} GB", as_gb(space.used_space));
        info!("Free space: {:.2} GB", as_gb(space.free_space()));

        Ok(space)
    }

    /// Ask for a pre-signed upload target for `remote_path`, overwriting any
    /// existing file there.
    pub async fn get_upload_link(&self, remote_path: &str) -> Result<UploadLink> {
        let url = format!("{}/resources/upload", self.api_base);
        let link_error = |reason: String| BackupError::UploadLink {
            path: remote_path.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.authorization)
            .query(&[("path", remote_path), ("overwrite", "true")])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| link_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(link_error(format!("status {}: {}", status, error_text)));
        }

        let link: UploadLink = response
            .json()
            .await
            .map_err(|e| link_error(format!("failed to parse upload link: {}", e)))?;

        if link.href.is_empty() {
            return Err(link_error("response carried an empty href".to_string()));
        }

        Ok(link)
    }

    /// Stream `file` to a pre-signed target. Only `201 Created` counts as done.
    pub async fn upload_file(&self, link: &UploadLink, file: &Path) -> Result<u64> {
        let upload_error = |reason: String| BackupError::Upload {
            file: file.display().to_string(),
            reason,
        };

        let handle = fs::File::open(file)
            .await
            .map_err(|e| upload_error(format!("failed to open: {}", e)))?;
        let size = handle
            .metadata()
            .await
            .map_err(|e| upload_error(format!("failed to stat: {}", e)))?
            .len();

        info!("Uploading {} ({} bytes)...", file.display(), size);
        debug!("Upload target: {}", link.href);

        let response = self
            .client
            .put(&link.href)
            .header(CONTENT_LENGTH, size)
            .body(Body::from(handle))
            .send()
            .await
            .map_err(|e| upload_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(upload_error(format!("status {}: {}", status, error_text)));
        }

        Ok(size)
    }

    /// Upload `file` into `remote_dir` if the disk has at least as much free
    /// space as the file's size. No link request or transfer happens when it
    /// does not.
    pub async fn upload_with_capacity_check(
        &self,
        file: &Path,
        remote_dir: &str,
    ) -> Result<UploadReceipt> {
        let space = self.get_disk_space().await?;

        let size = fs::metadata(file)
            .await
            .map_err(|e| BackupError::io(format!("failed to stat {}", file.display()), e))?
            .len();

        if !space.has_room_for(size) {
            return Err(BackupError::InsufficientSpace {
                file: file.display().to_string(),
                required: size,
                available: space.free_space(),
            });
        }

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| BackupError::Upload {
                file: file.display().to_string(),
                reason: "path has no file name".to_string(),
            })?;
        let remote_path = remote_path_for(remote_dir, &file_name);

        let link = self.get_upload_link(&remote_path).await?;
        info!("Upload started: {} -> {}", file.display(), remote_path);

        let size_bytes = self.upload_file(&link, file).await?;
        info!("Uploaded {} to {}", file.display(), remote_path);

        Ok(UploadReceipt {
            remote_path,
            size_bytes,
        })
    }
}

/// Join a remote directory and a file name with exactly one separator.
pub fn remote_path_for(remote_dir: &str, file_name: &str) -> String {
    format!("{}/{}", remote_dir.trim_end_matches('/'), file_name)
}
