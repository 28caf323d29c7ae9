// Profile module
// Typed profile record and the loader that reads it fresh from disk on every pass


use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::RagError;
use crate::config::Config;

/// Overrides the record's email when set
pub const EMAIL_ENV: &str = "PROFILE_EMAIL";
/// Overrides the record's phone number when set
pub const PHONE_ENV: &str = "PROFILE_PHONE";

/// Structured facts about the portfolio owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub education: Option<Education>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub social: SocialLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    #[serde(alias = "university")]
    pub institution: String,
    pub duration: String,
    pub gpa: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<String>,
    #[serde(alias = "frameworks")]
    pub frontend: Vec<String>,
    #[serde(alias = "cloud")]
    pub backend: Vec<String>,
    #[serde(alias = "data")]
    pub ai_ml: Vec<String>,
    pub tools: Vec<String>,
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profile record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse profile record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid profile record: {0}")]
    Invalid(String),
}

impl From<ProfileError> for RagError {
    #[inline]
    fn from(error: ProfileError) -> Self {
        Self::Config(error.to_string())
    }
}

impl ProfileRecord {
    /// First word of the name, used when chunk prose refers back to the owner
    #[inline]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Replace sensitive fields with values from the environment lookup when present
    #[inline]
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(email) = non_empty(EMAIL_ENV) {
            self.email = Some(email);
        }
        if let Some(phone) = non_empty(PHONE_ENV) {
            self.phone = Some(phone);
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::Invalid("name cannot be empty".to_string()));
        }
        if let Some(index) = self
            .experience
            .iter()
            .position(|exp| exp.role.trim().is_empty() || exp.company.trim().is_empty())
        {
            return Err(ProfileError::Invalid(format!(
                "experience entry {} needs both a role and a company",
                index
            )));
        }
        if let Some(index) = self
            .projects
            .iter()
            .position(|project| project.name.trim().is_empty())
        {
            return Err(ProfileError::Invalid(format!(
                "project entry {} has an empty name",
                index
            )));
        }
        Ok(())
    }
}

/// Reads the profile record from a JSON file; nothing is cached between loads
#[derive(Debug, Clone)]
pub struct ProfileSource {
    path: PathBuf,
}

impl ProfileSource {
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.profile_path())
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, applying overrides from the process environment
    #[inline]
    pub fn load(&self) -> Result<ProfileRecord, ProfileError> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Load the record, resolving sensitive overrides through `lookup`
    #[inline]
    pub fn load_with<F>(&self, lookup: F) -> Result<ProfileRecord, ProfileError>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Reading profile record from {}", self.path.display());

        let content = fs::read_to_string(&self.path).map_err(|source| ProfileError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut record: ProfileRecord =
            serde_json::from_str(&content).map_err(|source| ProfileError::Parse {
                path: self.path.clone(),
                source,
            })?;

        record.validate()?;
        record.apply_overrides(lookup);

        Ok(record)
    }
}
