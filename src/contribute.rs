use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub site_name: String,
    pub site_url: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide a site name.")]
    MissingName,
    #[error("Please enter a valid site URL (https://...).")]
    InvalidUrl,
    #[error("Please select a category.")]
    MissingCategory,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a data directory for the contribution store")]
    NoDataDir,
    #[error("contribution store {path} is unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("contribution store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize contributions: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Submission {
    /// Build a submission from raw form input, trimming every field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        site_name: &str,
        site_url: &str,
        category: &str,
        description: &str,
        owner: &str,
        email: &str,
        notes: &str,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            site_name: site_name.trim().to_string(),
            site_url: site_url.trim().to_string(),
            category: category.trim().to_string(),
            description: description.trim().to_string(),
            owner: owner.trim().to_string(),
            email: email.trim().to_string(),
            notes: notes.trim().to_string(),
            submitted_at,
        }
    }

    /// Checks run in form order; the first failure is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.site_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !is_http_url(&self.site_url) {
            return Err(ValidationError::InvalidUrl);
        }
        if self.category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if !self.email.is_empty() && !is_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Absolute http(s) URL; relative input is not accepted here.
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub fn is_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
        .is_match(value)
}

/// JSON array of submissions kept on local disk.
pub struct ContributionStore {
    path: PathBuf,
}

impl ContributionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Submission>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Append a submission; returns the number of stored submissions.
    pub fn append(&self, submission: &Submission) -> Result<usize, StorageError> {
        let mut all = self.load()?;
        all.push(submission.clone());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&all)?;
        std::fs::write(&self.path, content).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), count = all.len(), "stored contribution");
        Ok(all.len())
    }
}

/// POST the submission as JSON to a form relay.
pub fn relay(endpoint: &str, submission: &Submission) -> anyhow::Result<()> {
    let response = reqwest::blocking::Client::new()
        .post(endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(submission)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("relay responded with HTTP {}", status.as_u16());
    }
    tracing::info!(endpoint, "relayed contribution");
    Ok(())
}
