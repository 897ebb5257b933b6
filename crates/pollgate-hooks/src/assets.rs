//! Hosted UI payloads loaded from disk.

use std::path::Path;

use crate::error::{HookError, Result};

/// Stylesheet and logo uploaded to the hosted UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiAssets {
    pub css: String,
    pub logo: Vec<u8>,
}

impl UiAssets {
    pub async fn load(css_path: &Path, logo_path: &Path) -> Result<Self> {
        Ok(Self {
            css: load_stylesheet(css_path).await?,
            logo: load_logo(logo_path).await?,
        })
    }
}

pub async fn load_stylesheet(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| HookError::Asset {
            path: path.display().to_string(),
            source,
        })
}

pub async fn load_logo(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| HookError::Asset {
        path: path.display().to_string(),
        source,
    })
}
