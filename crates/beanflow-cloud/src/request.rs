//! Request and response values for remote calls

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of an object in object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Request to register a new application version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {
    /// Application the version belongs to (must already exist)
    pub application_name: String,

    /// Label identifying the version
    pub version_label: String,

    /// Optional human readable description
    pub description: Option<String>,

    /// Uploaded archive the version points at
    pub source: ObjectLocation,
}

/// Identifiers assigned by the deployment service to a registered version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub application_name: String,
    pub version_label: String,

    /// Remote resource identifier (e.g. an ARN), if reported
    pub version_id: Option<String>,

    /// Processing status, if reported
    pub status: Option<String>,
}

/// Request to point an environment at a registered version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub application_name: String,
    pub environment_name: String,
    pub version_label: String,
}

/// Identifiers reported back after an environment update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub environment_name: String,
    pub environment_id: Option<String>,
    pub version_label: Option<String>,
    pub status: Option<String>,
}
