use std::path::Path;

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::error::{ReleaserError, Result};
use crate::utils::relative_name;

/// Metadata of the release to create
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSpec {
    pub tag: String,
    pub name: String,
    pub message: String,
    pub commitish: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Handle to a release that exists remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRelease {
    pub id: u64,
    pub html_url: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub name: String,
    pub download_url: String,
}

/// Remote side of publishing: one release record, then its assets
#[async_trait]
pub trait ReleaseApi {
    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        spec: &ReleaseSpec,
    ) -> Result<CreatedRelease>;

    async fn upload_asset(
        &self,
        release: &CreatedRelease,
        asset_name: &str,
        asset_path: &Path,
    ) -> Result<UploadedAsset>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub release: CreatedRelease,
    pub assets: Vec<UploadedAsset>,
}

/// Create the release, then upload every file under `output_dir` as an asset.
///
/// Assets are named by their path relative to `output_dir`. Uploading stops at
/// the first failure.
pub async fn publish<A>(
    api: &A,
    owner: &str,
    repo: &str,
    spec: &ReleaseSpec,
    output_dir: &Path,
) -> Result<PublishReport>
where
    A: ReleaseApi + Sync + ?Sized,
{
    tracing::info!("Creating release {} in {}/{}", spec.tag, owner, repo);
    let release = api.create_release(owner, repo, spec).await?;
    tracing::info!("Created release {}", release.html_url);

    let mut assets = Vec::new();
    let walker = WalkDir::new(output_dir).sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let asset_name = relative_name(entry.path(), output_dir);
        tracing::info!("Uploading {}", asset_name);

        let asset = api.upload_asset(&release, &asset_name, entry.path()).await?;
        tracing::info!("Uploaded {} to {}", asset.name, asset.download_url);
        assets.push(asset);
    }

    Ok(PublishReport { release, assets })
}

/// Read the API token from `var`, treating absence as fatal
pub fn token_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ReleaserError::Config(format!(
            "{var} environment variable not set"
        ))),
    }
}
