//! Module: tag
//! Responsibility: turn one field's raw tag text into a closed capability set.
//! Does not own: type resolution or flag derivation.
//!
//! Invariants:
//! - Keys compare case-insensitively and are stored lower-cased.
//! - Every key appears at most once per tag.
//! - Unrecognised keys are rejected, never carried through.

mod lexer;

#[cfg(test)]
mod tests;

pub use lexer::{Lexer, Token};

use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// TagError
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TagError {
    #[error("duplicate annotation {key}")]
    Duplicate { key: String },

    #[error("invalid annotation value {value} for {key}, expecting `name:\"value\"` format")]
    InvalidValue { key: String, value: String },

    #[error("annotation value {token} has no name")]
    MissingKey { token: String },

    #[error("annotation {key} does not take a value")]
    UnexpectedValue { key: CapabilityKey },

    #[error("unknown index type {value}")]
    UnknownIndexKind { value: String },

    #[error("unknown annotation {key}")]
    UnknownKey { key: String },

    #[error("unterminated annotation value for {key}")]
    UnterminatedValue { key: String },
}

///
/// CapabilityKey
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CapabilityKey {
    Date,
    Id,
    Index,
    NameInDb,
    Transient,
    Unique,
}

impl CapabilityKey {
    pub const ALL: [Self; 6] = [
        Self::Date,
        Self::Id,
        Self::Index,
        Self::NameInDb,
        Self::Transient,
        Self::Unique,
    ];

    /// Canonical (lower-cased) key text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Id => "id",
            Self::Index => "index",
            Self::NameInDb => "nameindb",
            Self::Transient => "transient",
            Self::Unique => "unique",
        }
    }

    /// Look up an already lower-cased key.
    #[must_use]
    pub fn from_lowercase(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum IndexKind {
    #[default]
    Default,
    Value,
    Hash,
    Hash64,
}

impl IndexKind {
    /// Parse the `index:"…"` parameter; matching is case-insensitive.
    pub fn parse(value: &str) -> Result<Self, TagError> {
        match value.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Default),
            "value" => Ok(Self::Value),
            "hash" => Ok(Self::Hash),
            "hash64" => Ok(Self::Hash64),
            _ => Err(TagError::UnknownIndexKind {
                value: value.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Value => "value",
            Self::Hash => "hash",
            Self::Hash64 => "hash64",
        }
    }
}

///
/// Capability
/// One recognised annotation with its typed parameter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Capability {
    Date,
    Id,
    Index(IndexKind),
    NameInDb(String),
    Transient,
    Unique,
}

impl Capability {
    #[must_use]
    pub const fn key(&self) -> CapabilityKey {
        match self {
            Self::Date => CapabilityKey::Date,
            Self::Id => CapabilityKey::Id,
            Self::Index(_) => CapabilityKey::Index,
            Self::NameInDb(_) => CapabilityKey::NameInDb,
            Self::Transient => CapabilityKey::Transient,
            Self::Unique => CapabilityKey::Unique,
        }
    }

    /// The associated value as written in the tag, if the capability has one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Index(IndexKind::Default) => None,
            Self::Index(kind) => Some(kind.as_str()),
            Self::NameInDb(name) => Some(name),
            _ => None,
        }
    }

    // Build a capability from one lexed token whose key is already lower-cased.
    fn from_token(key: &str, value: Option<&str>) -> Result<Self, TagError> {
        let Some(key) = CapabilityKey::from_lowercase(key) else {
            return Err(TagError::UnknownKey {
                key: key.to_string(),
            });
        };

        let cap = match key {
            CapabilityKey::Index => Self::Index(IndexKind::parse(value.unwrap_or_default())?),
            CapabilityKey::NameInDb => Self::NameInDb(value.unwrap_or_default().to_string()),
            _ if value.is_some() => return Err(TagError::UnexpectedValue { key }),
            CapabilityKey::Date => Self::Date,
            CapabilityKey::Id => Self::Id,
            CapabilityKey::Transient => Self::Transient,
            CapabilityKey::Unique => Self::Unique,
        };

        Ok(cap)
    }
}

///
/// Capabilities
///
/// The parsed capability set of one property, in tag order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Capabilities(Vec<Capability>);

impl Capabilities {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse raw tag text (already stripped of host-language delimiters).
    pub fn parse(text: &str) -> Result<Self, TagError> {
        let mut caps = Self::new();

        for token in Lexer::new(text) {
            let token = token?;
            let key = token.key.to_lowercase();
            let cap = Capability::from_token(&key, token.value)?;

            if caps.contains(cap.key()) {
                return Err(TagError::Duplicate { key });
            }
            caps.0.push(cap);
        }

        Ok(caps)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capability> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, key: CapabilityKey) -> Option<&Capability> {
        self.0.iter().find(|cap| cap.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: CapabilityKey) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn is_id(&self) -> bool {
        self.contains(CapabilityKey::Id)
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.contains(CapabilityKey::Transient)
    }

    #[must_use]
    pub fn is_date(&self) -> bool {
        self.contains(CapabilityKey::Date)
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.contains(CapabilityKey::Unique)
    }

    #[must_use]
    pub fn index(&self) -> Option<IndexKind> {
        match self.get(CapabilityKey::Index) {
            Some(Capability::Index(kind)) => Some(*kind),
            _ => None,
        }
    }

    /// The `nameindb` override exactly as written (possibly empty).
    #[must_use]
    pub fn name_in_db(&self) -> Option<&str> {
        match self.get(CapabilityKey::NameInDb) {
            Some(Capability::NameInDb(name)) => Some(name),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Capabilities {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Serialized as the key -> optional value mapping templates consume.
impl Serialize for Capabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for cap in &self.0 {
            map.serialize_entry(cap.key().as_str(), &cap.value())?;
        }

        map.end()
    }
}
