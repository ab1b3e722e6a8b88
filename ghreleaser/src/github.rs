use async_trait::async_trait;
use octocrab::models::repos::Release;
use octocrab::{FromResponse, Octocrab};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ReleaserError, Result};
use crate::publisher::{token_from_env, CreatedRelease, ReleaseApi, ReleaseSpec, UploadedAsset};

pub struct GitHubClient {
    octocrab: Octocrab,
    http_client: Client,
    token: String,
}

/// Request body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_commitish: Option<&'a str>,
    draft: bool,
    prerelease: bool,
}

impl<'a> From<&'a ReleaseSpec> for CreateReleaseRequest<'a> {
    fn from(spec: &'a ReleaseSpec) -> Self {
        Self {
            tag_name: &spec.tag,
            name: non_empty(&spec.name),
            body: non_empty(&spec.message),
            target_commitish: non_empty(&spec.commitish),
            draft: spec.draft,
            prerelease: spec.prerelease,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    browser_download_url: String,
}

impl GitHubClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| ReleaserError::Config(format!("Failed to build GitHub client: {e}")))?;

        let http_client = Client::builder()
            .user_agent(concat!("ghreleaser/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ReleaserError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http_client,
            token,
        })
    }

    /// Build a client from the token in `token_env`
    pub fn from_env(token_env: &str, timeout: Duration) -> Result<Self> {
        let token = token_from_env(token_env)?;
        Self::new(token, timeout)
    }
}

#[async_trait]
impl ReleaseApi for GitHubClient {
    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        spec: &ReleaseSpec,
    ) -> Result<CreatedRelease> {
        let creation_error = |e: octocrab::Error| ReleaserError::ReleaseCreation(e.to_string());

        // Empty name, body and commitish are left for GitHub to default
        let request = CreateReleaseRequest::from(spec);
        let route = format!("/repos/{owner}/{repo}/releases");

        let response = self
            .octocrab
            ._post(route.as_str(), Some(&request))
            .await
            .map_err(creation_error)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let error_text = self
                .octocrab
                .body_to_string(response)
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReleaserError::ReleaseCreation(format!(
                "{status} - {error_text}"
            )));
        }

        let release = Release::from_response(response)
            .await
            .map_err(creation_error)?;

        Ok(CreatedRelease {
            id: release.id.0,
            html_url: release.html_url.to_string(),
            upload_url: release.upload_url.to_string(),
        })
    }

    async fn upload_asset(
        &self,
        release: &CreatedRelease,
        asset_name: &str,
        asset_path: &Path,
    ) -> Result<UploadedAsset> {
        let upload_error = |reason: String| ReleaserError::AssetUpload {
            asset: asset_name.to_string(),
            reason,
        };

        let file_content = tokio::fs::read(asset_path)
            .await
            .map_err(|e| upload_error(format!("failed to read {}: {e}", asset_path.display())))?;

        let response = self
            .http_client
            .post(upload_endpoint(&release.upload_url))
            .query(&[("name", asset_name)])
            .header(ACCEPT, "application/vnd.github+json")
            .header(CONTENT_TYPE, get_content_type(asset_path))
            .bearer_auth(&self.token)
            .body(file_content)
            .send()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(upload_error(format!("{status} - {error_text}")));
        }

        let asset: AssetResponse = response
            .json()
            .await
            .map_err(|e| upload_error(format!("unreadable upload response: {e}")))?;

        Ok(UploadedAsset {
            name: asset_name.to_string(),
            download_url: asset.browser_download_url,
        })
    }
}

/// Strip the `{?name,label}` URI template GitHub appends to upload URLs
fn upload_endpoint(upload_url: &str) -> &str {
    match upload_url.find('{') {
        Some(idx) => &upload_url[..idx],
        None => upload_url,
    }
}

/// Determine content type for an asset
pub fn get_content_type(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match extension {
        "gz" | "tgz" => "application/gzip",
        "zip" => "application/zip",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
