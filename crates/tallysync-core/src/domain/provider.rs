//! Integration providers
//!
//! A provider is a third-party account type the system can connect to on
//! behalf of an administrator. Today that is an email inbox or a Google
//! Drive folder; the enum is the single place to add more.

use serde::{Deserialize, Serialize};

/// Third-party integration provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Monitored email inbox
    Email,
    /// Watched Google Drive folder
    Drive,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Email, Provider::Drive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Drive => "drive",
        }
    }

    /// Parse a provider identifier from a callback marker or API payload
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "drive" => Some(Self::Drive),
            _ => None,
        }
    }

    /// Human-readable name used in notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Drive => "Google Drive",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
