use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AdminError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlValidation {
    pub valid: bool,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRequest {
    pub urls: Vec<String>,
    pub update_main_csv: bool,
    pub create_backup: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractionStarted {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_urls: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractionStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub processed_urls: usize,
    #[serde(default)]
    pub total_urls: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub last_extraction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractedFile {
    pub filename: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<ExtractedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilePreview {
    #[serde(default)]
    pub total_rows: usize,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, Option<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractionStatistics {
    #[serde(default)]
    pub total_files: usize,
    #[serde(default)]
    pub total_incidents: usize,
    #[serde(default)]
    pub recent_extractions: usize,
    #[serde(default)]
    pub file_sizes: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin JSON client for the extraction backend.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base: Url,
    http: reqwest::Client,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Result<Self, AdminError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|_| AdminError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdminError> {
        self.base
            .join(path)
            .map_err(|_| AdminError::InvalidBaseUrl(format!("{}{path}", self.base)))
    }

    fn file_endpoint(&self, prefix: &str, filename: &str) -> Result<Url, AdminError> {
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|()| AdminError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(filename);
        Ok(url)
    }

    pub async fn validate_url(&self, url: &str) -> Result<UrlValidation, AdminError> {
        let body = serde_json::json!({ "url": url.trim() });
        let response = self
            .http
            .post(self.endpoint("api/validate-url")?)
            .json(&body)
            .send()
            .await?;
        // a negative verdict arrives as a 200 carrying `error` alongside `valid`
        read_body(response).await
    }

    /// Starts a backend extraction run for the non-blank URLs in `urls`.
    pub async fn start_extraction(
        &self,
        urls: &[String],
        update_main_csv: bool,
        create_backup: bool,
    ) -> Result<ExtractionStarted, AdminError> {
        let urls = clean_urls(urls);
        if urls.is_empty() {
            return Err(AdminError::NoUrls);
        }

        tracing::info!(count = urls.len(), "requesting extraction");
        let request = ExtractionRequest {
            urls,
            update_main_csv,
            create_backup,
        };
        let response = self
            .http
            .post(self.endpoint("api/extract")?)
            .json(&request)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn status(&self) -> Result<ExtractionStatus, AdminError> {
        let response = self.http.get(self.endpoint("api/status")?).send().await?;
        read_json(response).await
    }

    pub async fn files(&self) -> Result<Vec<ExtractedFile>, AdminError> {
        let response = self.http.get(self.endpoint("api/files")?).send().await?;
        let list: FileList = read_json(response).await?;
        Ok(list.files)
    }

    pub async fn preview(&self, filename: &str) -> Result<FilePreview, AdminError> {
        let response = self
            .http
            .get(self.file_endpoint("api/preview/", filename)?)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn statistics(&self) -> Result<ExtractionStatistics, AdminError> {
        let response = self
            .http
            .get(self.endpoint("api/statistics")?)
            .send()
            .await?;
        read_json(response).await
    }

    pub fn download_url(&self, filename: &str) -> Result<Url, AdminError> {
        self.file_endpoint("api/download/", filename)
    }

    /// Saves an extracted file into `dest_dir`, returning the written path.
    pub async fn download(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf, AdminError> {
        let response = self.http.get(self.download_url(filename)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, &response.bytes().await?));
        }

        let bytes = response.bytes().await?;
        let name = Path::new(filename)
            .file_name()
            .map_or_else(|| PathBuf::from("download.csv"), PathBuf::from);
        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "extracted file saved");
        Ok(path)
    }
}

/// Trims entries and drops blanks, keeping order.
pub fn clean_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AdminError> {
    let bytes = success_bytes(response).await?;

    // a 200 can still carry an {error} body
    if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(&bytes) {
        return Err(AdminError::Api(error));
    }

    decode(&bytes)
}

/// Like [`read_json`] for payloads where `error` is an ordinary field.
async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AdminError> {
    let bytes = success_bytes(response).await?;
    decode(&bytes)
}

async fn success_bytes(response: reqwest::Response) -> Result<Vec<u8>, AdminError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let error = error_from_response(status, &bytes);
        tracing::warn!(%status, %error, "backend call failed");
        return Err(error);
    }
    Ok(bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AdminError> {
    serde_json::from_slice(bytes).map_err(|e| AdminError::Api(format!("unexpected response: {e}")))
}

fn error_from_response(status: StatusCode, body: &[u8]) -> AdminError {
    serde_json::from_slice::<ErrorBody>(body)
        .map_or(AdminError::Status(status.as_u16()), |body| {
            AdminError::Api(body.error)
        })
}
