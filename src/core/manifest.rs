//! core::manifest
//!
//! Snapshot of every resource discovered in one Spacelift account.
//!
//! # Design
//!
//! A manifest is built once per discovery pass and never mutated afterwards.
//! Filtering produces a new manifest. The JSON form written by `export` is
//! read back unchanged by `generate` and the `state` commands.
//!
//! # Example
//!
//! ```no_run
//! use spacebridge::core::manifest::Manifest;
//! use std::path::Path;
//!
//! let manifest = Manifest::load(Path::new("manifest.json")).unwrap();
//! println!("{}", manifest.summary());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{AwsIntegration, AzureIntegration, Context, Policy, Space, Stack};

/// Errors from reading or writing manifest files.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write manifest file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// All resources discovered from one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Base URL of the account the manifest was discovered from.
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub spaces: Vec<Space>,
    #[serde(default)]
    pub stacks: Vec<Stack>,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub aws_integrations: Vec<AwsIntegration>,
    #[serde(default)]
    pub azure_integrations: Vec<AzureIntegration>,
}

impl Manifest {
    /// Create an empty manifest for an account.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let data = fs::read_to_string(path).map_err(|source| ManifestError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ManifestError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ManifestError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ManifestError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of write-only context values that must be re-entered by hand.
    pub fn secrets_count(&self) -> usize {
        self.contexts.iter().map(|c| c.secrets().count()).sum()
    }

    /// Resource counts for display.
    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary {
            spaces: self.spaces.iter().filter(|s| !s.is_root()).count(),
            stacks: self.stacks.len(),
            contexts: self.contexts.len(),
            policies: self.policies.len(),
            aws_integrations: self.aws_integrations.len(),
            azure_integrations: self.azure_integrations.len(),
            secrets: self.secrets_count(),
        }
    }

    /// True when the manifest carries nothing a generator could emit.
    pub fn has_no_workload(&self) -> bool {
        self.stacks.is_empty() && self.contexts.is_empty() && self.policies.is_empty()
    }
}

/// Resource counts of a manifest. Root is not counted as a space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub spaces: usize,
    pub stacks: usize,
    pub contexts: usize,
    pub policies: usize,
    pub aws_integrations: usize,
    pub azure_integrations: usize,
    pub secrets: usize,
}

impl fmt::Display for ManifestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Spaces:             {}", self.spaces)?;
        writeln!(f, "  Stacks:             {}", self.stacks)?;
        writeln!(f, "  Contexts:           {}", self.contexts)?;
        writeln!(f, "  Policies:           {}", self.policies)?;
        writeln!(f, "  AWS Integrations:   {}", self.aws_integrations)?;
        write!(f, "  Azure Integrations: {}", self.azure_integrations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Manifest {
        serde_json::from_value(serde_json::json!({
            "sourceUrl": "https://acme.app.spacelift.io",
            "spaces": [
                {"id": "root", "name": "root"},
                {"id": "infra-01H", "name": "infra", "parentSpace": "root"}
            ],
            "stacks": [{
                "id": "vpc", "name": "vpc", "space": "infra-01H",
                "vendorType": "StackConfigVendorTerraform",
                "managesStateFile": true,
                "attachedContexts": [{"id": "a1", "contextId": "aws", "priority": 0}],
                "attachedAwsIntegrations": [{"id": "i1", "integrationId": "role", "read": true, "write": true}]
            }],
            "contexts": [{
                "id": "aws", "name": "aws", "space": "root",
                "config": [{"id": "TOKEN", "type": "ENVIRONMENT_VARIABLE", "writeOnly": true}]
            }],
            "policies": [],
            "awsIntegrations": [{"id": "role", "name": "role", "roleArn": "arn:aws:iam::1:role/x", "space": "root"}],
            "azureIntegrations": []
        }))
        .unwrap()
    }

    #[test]
    fn summary_skips_root_space() {
        let summary = sample().summary();
        assert_eq!(summary.spaces, 1);
        assert_eq!(summary.stacks, 1);
        assert_eq!(summary.secrets, 1);
        assert_eq!(summary.aws_integrations, 1);
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("manifest.json");
        let manifest = sample();

        manifest.save(&path).unwrap();
        let loaded = Manifest::load(&path).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn top_level_keys_are_camel_case() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        for key in [
            "sourceUrl",
            "spaces",
            "stacks",
            "contexts",
            "policies",
            "awsIntegrations",
            "azureIntegrations",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ManifestError::ReadError { .. }));
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::ParseError { .. }));
    }

    #[test]
    fn empty_manifest_has_no_workload() {
        assert!(Manifest::new("https://x").has_no_workload());
        assert!(!sample().has_no_workload());
    }
}
