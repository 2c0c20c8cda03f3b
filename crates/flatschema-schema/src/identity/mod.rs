//! Module: identity
//! Responsibility: numeric IDs and UIDs for entities and properties, and
//! their reconciliation against the persisted model snapshot.
//! Does not own: snapshot file I/O.
//!
//! Invariants:
//! - A UID recorded for a name is reused verbatim on every later run.
//! - Entity numeric IDs fit in 24 bits.
//! - No two entities share a numeric ID, and no UID is issued twice
//!   (retired entries included).

mod assign;


pub use assign::IdAssigner;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error as ThisError;

///
/// Constants
///

/// Entity numeric IDs are 24-bit.
pub const MAX_ENTITY_ID: u32 = 0x00FF_FFFF;

/// Decimal scale reserving room for property sub-identifiers below an entity UID.
pub const UID_SCALE: u64 = 10_000;

/// Shift taking the high-order 24 bits of the 64-bit entity hash.
pub const ENTITY_ID_SHIFT: u32 = 40;

///
/// IdentityError
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum IdentityError {
    #[error("entity {entity} is declared more than once")]
    DuplicateEntity { entity: String },

    #[error("entity {entity} numeric ID {id} collides with entity {other}")]
    EntityIdCollision {
        entity: String,
        id: u32,
        other: String,
    },

    #[error("no free entity numeric ID left after {last}")]
    EntityIdExhausted { last: u32 },

    #[error("UID {uid} of {owner} collides with {other}")]
    UidCollision {
        uid: u64,
        owner: String,
        other: String,
    },

    #[error("property {property} of entity {entity} has no room for a UID below entity UID {entity_uid}")]
    UidOverflow {
        entity: String,
        property: String,
        entity_uid: u64,
    },
}

///
/// IdUid
///
/// A numeric ID paired with its UID. Persisted as `"id:uid"`.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct IdUid {
    pub id: u32,
    pub uid: u64,
}

impl IdUid {
    #[must_use]
    pub const fn new(id: u32, uid: u64) -> Self {
        Self { id, uid }
    }
}

impl Display for IdUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.uid)
    }
}

///
/// IdUidParseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("invalid id:uid pair '{0}'")]
pub struct IdUidParseError(pub String);

impl FromStr for IdUid {
    type Err = IdUidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdUidParseError(s.to_string());
        let (id, uid) = s.split_once(':').ok_or_else(invalid)?;

        Ok(Self {
            id: id.parse().map_err(|_| invalid())?,
            uid: uid.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<IdUid> for String {
    fn from(value: IdUid) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for IdUid {
    type Error = IdUidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

///
/// IdStrategy
///
/// How a brand-new entity gets its numeric ID. Identifiers already recorded
/// in the snapshot are reused regardless of strategy.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// High 24 bits of the entity hash; collisions fail the run.
    #[default]
    Hashed,

    /// Next integer after the highest entity ID ever issued.
    Sequential,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hashed" => Ok(Self::Hashed),
            "sequential" => Ok(Self::Sequential),
            _ => Err(format!("unknown id strategy '{s}'")),
        }
    }
}

/// Entity numeric ID taken from the high-order 24 bits of the raw hash.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub const fn hashed_entity_id(hash: u64) -> u32 {
    (hash >> ENTITY_ID_SHIFT) as u32
}

/// Entity UID: the raw hash scaled down to leave room for property UIDs.
#[must_use]
pub const fn entity_uid(hash: u64) -> u64 {
    hash / UID_SCALE
}

/// Property UID derived from its entity UID; `None` on u64 overflow.
#[must_use]
pub fn property_uid(entity_uid: u64, property_id: u32) -> Option<u64> {
    entity_uid
        .checked_mul(UID_SCALE)?
        .checked_add(u64::from(property_id))
}
