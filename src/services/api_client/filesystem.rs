use reqwest::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::*;

/// File metadata read from the headers of a HEAD request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub size: Option<u64>,
    pub content_type: Option<String>,
    pub last_modified: Option<String>,
}

/// `/v3/fs/<name><path>` with `path` always starting at "/"
fn fs_path(name: &str, path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        format!("/v3/fs/{}", segment(name))
    } else if path.starts_with('/') {
        format!("/v3/fs/{}{}", segment(name), path)
    } else {
        format!("/v3/fs/{}/{}", segment(name), path)
    }
}

impl CoreClient {
    /// Filesystems the Core exposes (e.g. `disk`, `mem`)
    pub async fn filesystems(&self) -> ApiResult<Value> {
        self.get_value("/v3/fs").await
    }

    pub async fn list_files(&self, name: &str, path: &str) -> ApiResult<Value> {
        self.get_value(&fs_path(name, path)).await
    }

    pub async fn download_file(&self, name: &str, path: &str) -> ApiResult<Vec<u8>> {
        let response = self
            .send(self.request(Method::GET, &fs_path(name, path)))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Upload as multipart form data under the field `file`
    pub async fn upload_file(
        &self,
        name: &str,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ApiResult<Value> {
        let size = contents.len();
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));

        let response = self
            .send(self.request(Method::POST, &fs_path(name, path)).multipart(form))
            .await?;

        log::info!("Uploaded {file_name} ({size} bytes) to {name}:{path}");
        read_value(response).await
    }

    pub async fn delete_file(&self, name: &str, path: &str) -> ApiResult<Value> {
        self.delete_value(&fs_path(name, path)).await
    }

    pub async fn file_info(&self, name: &str, path: &str) -> ApiResult<FileInfo> {
        let response = self
            .send(self.request(Method::HEAD, &fs_path(name, path)))
            .await?;

        let headers = response.headers();
        let header = |key: HeaderName| {
            headers
                .get(key)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(FileInfo {
            size: header(CONTENT_LENGTH).and_then(|v| v.parse().ok()),
            content_type: header(CONTENT_TYPE),
            last_modified: header(LAST_MODIFIED),
        })
    }
}
