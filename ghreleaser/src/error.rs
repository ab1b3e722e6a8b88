use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaserError {
    #[error("Build failed for {target}: {reason}")]
    Compile { target: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Release creation failed: {0}")]
    ReleaseCreation(String),

    #[error("Asset upload failed for {asset}: {reason}")]
    AssetUpload { asset: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReleaserError {
    /// Configuration errors halt the run instead of being recorded per phase
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReleaserError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, ReleaserError>;
