//! Mock remote disk API for testing uploads
//!
//! Serves the quota endpoint, the upload-link endpoint and the pre-signed
//! upload targets, so tests can count exactly which calls were made.

use serde_json::json;
use wiremock::{
    matchers::{method, path, path_regex, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

pub const TOKEN: &str = "test-token";

pub struct MockDisk {
    pub server: MockServer,
    pub base_url: String,
}

impl MockDisk {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Value for `storage.api_base`
    pub fn api_base(&self) -> String {
        format!("{}/v1/disk", self.base_url)
    }

    pub async fn mock_quota(&self, total_space: u64, used_space: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/disk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_space": total_space,
                "used_space": used_space,
                "trash_size": 0,
                "is_paid": false
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_quota_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/v1/disk"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": "UnauthorizedError",
                "description": "Unauthorized"
            })))
            .mount(&self.server)
            .await;
    }

    /// Upload-link endpoint answering with `/upload/<file name>` targets
    pub async fn mock_upload_link(&self) {
        let base_url = self.base_url.clone();

        Mock::given(method("GET"))
            .and(path("/v1/disk/resources/upload"))
            .and(query_param("overwrite", "true"))
            .respond_with(move |req: &Request| {
                let remote_path = req
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "path")
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_default();
                let file_name = remote_path.rsplit('/').next().unwrap_or_default();

                ResponseTemplate::new(200).set_body_json(json!({
                    "operation_id": "op-1",
                    "href": format!("{}/upload/{}", base_url, file_name),
                    "method": "PUT",
                    "templated": false
                }))
            })
            .mount(&self.server)
            .await;
    }

    pub async fn mock_upload_link_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/v1/disk/resources/upload"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": "DiskResourceAlreadyExistsError"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_upload(&self, status: u16) {
        Mock::given(method("PUT"))
            .and(path_regex(r"^/upload/.+$"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Standard happy-path setup: plenty of space, links and uploads succeed
    pub async fn mock_healthy(&self) {
        self.mock_quota(10 * 1024 * 1024 * 1024, 1024).await;
        self.mock_upload_link().await;
        self.mock_upload(201).await;
    }

    pub async fn requests_to(&self, http_method: &str, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .collect()
    }

    pub async fn quota_requests(&self) -> usize {
        self.requests_to("GET", "/v1/disk").await.len()
    }

    pub async fn link_requests(&self) -> Vec<Request> {
        self.requests_to("GET", "/v1/disk/resources/upload").await
    }

    /// Requests that reached an upload target, in arrival order
    pub async fn uploads(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == "PUT" && r.url.path().starts_with("/upload/"))
            .collect()
    }

    pub async fn uploaded_names(&self) -> Vec<String> {
        self.uploads()
            .await
            .iter()
            .map(|r| r.url.path().trim_start_matches("/upload/").to_string())
            .collect()
    }
}
