/// Shared types used across the codebase

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// 24-hex-character document identifier.
///
/// Layout follows the familiar document-id shape: 4 bytes of big-endian
/// creation seconds followed by 8 random bytes. Identifiers sort roughly by
/// creation time, which keeps index inserts mostly append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: {0}")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    /// True if `s` has the exact 24-hex shape of an object id.
    pub fn is_valid(s: &str) -> bool {
        s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Account roles. Stored with the Indonesian names used by the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "guru", alias = "teacher")]
    Guru,
    #[serde(rename = "siswa", alias = "student")]
    Siswa,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Guru => "guru",
            Role::Siswa => "siswa",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "guru" | "teacher" => Ok(Role::Guru),
            "siswa" | "student" => Ok(Role::Siswa),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status shared by accounts, students and teachers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordStatus::Active),
            "inactive" => Ok(RecordStatus::Inactive),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// The 7 Kebiasaan Anak Indonesia Hebat. Closed set; order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kebiasaan {
    #[serde(rename = "Religius")]
    Religius,
    #[serde(rename = "Nasionalis")]
    Nasionalis,
    #[serde(rename = "Mandiri")]
    Mandiri,
    #[serde(rename = "Gotong Royong")]
    GotongRoyong,
    #[serde(rename = "Integritas")]
    Integritas,
    #[serde(rename = "Kreatif")]
    Kreatif,
    #[serde(rename = "Bernalar Kritis")]
    BernalarKritis,
}

impl Kebiasaan {
    pub const ALL: [Kebiasaan; 7] = [
        Kebiasaan::Religius,
        Kebiasaan::Nasionalis,
        Kebiasaan::Mandiri,
        Kebiasaan::GotongRoyong,
        Kebiasaan::Integritas,
        Kebiasaan::Kreatif,
        Kebiasaan::BernalarKritis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kebiasaan::Religius => "Religius",
            Kebiasaan::Nasionalis => "Nasionalis",
            Kebiasaan::Mandiri => "Mandiri",
            Kebiasaan::GotongRoyong => "Gotong Royong",
            Kebiasaan::Integritas => "Integritas",
            Kebiasaan::Kreatif => "Kreatif",
            Kebiasaan::BernalarKritis => "Bernalar Kritis",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.as_str()).collect()
    }
}

impl FromStr for Kebiasaan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown kebiasaan: {}", s))
    }
}

impl fmt::Display for Kebiasaan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
