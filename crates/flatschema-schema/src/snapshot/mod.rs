//! Module: snapshot
//! Responsibility: the durable cross-run record of every identifier issued.
//! Does not own: reading or writing the snapshot file.
//!
//! Invariants (checked by `ModelSnapshot::validate`):
//! - Entity names are unique; property names are unique per entity.
//! - Entity numeric IDs are unique and within 24 bits.
//! - Every UID (entities and properties, retired included) is unique.
//! - Property numeric IDs are unique per entity, retired included.
//! - No property ID exceeds its entity's `last_property_id`.


use crate::identity::{IdUid, MAX_ENTITY_ID};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

///
/// SnapshotError
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SnapshotError {
    #[error("entity {entity} is recorded more than once")]
    DuplicateEntity { entity: String },

    #[error("entity numeric ID {id} is recorded for both {first} and {second}")]
    DuplicateEntityId {
        id: u32,
        first: String,
        second: String,
    },

    #[error("property {property} is recorded more than once on entity {entity}")]
    DuplicateProperty { entity: String, property: String },

    #[error("property ID {id} is recorded for both {first} and {second} on entity {entity}")]
    DuplicatePropertyId {
        entity: String,
        id: u32,
        first: String,
        second: String,
    },

    #[error("UID {uid} is recorded for both {first} and {second}")]
    DuplicateUid {
        uid: u64,
        first: String,
        second: String,
    },

    #[error("entity {entity} numeric ID {id} exceeds 24 bits")]
    EntityIdOutOfRange { entity: String, id: u32 },

    #[error("lastEntityId {last} is lower than entity {entity} ID {id}")]
    LastEntityIdBehind { entity: String, id: u32, last: u32 },

    #[error("entity {entity} has properties but no lastPropertyId")]
    MissingLastPropertyId { entity: String },

    #[error("property {property} ID {id} exceeds lastPropertyId {last} of entity {entity}")]
    PropertyIdBeyondLast {
        entity: String,
        property: String,
        id: u32,
        last: u32,
    },

    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

///
/// SnapshotProperty
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SnapshotProperty {
    pub id: IdUid,
    pub name: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub retired: bool,
}

///
/// SnapshotEntity
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SnapshotEntity {
    pub id: IdUid,
    pub name: String,

    /// Declaration unit (source file) the entity was last generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub retired: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_property_id: Option<IdUid>,

    #[serde(default)]
    pub properties: Vec<SnapshotProperty>,
}

impl SnapshotEntity {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SnapshotProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

///
/// ModelSnapshot
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ModelSnapshot {
    pub version: u32,

    /// Highest entity ID ever issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_entity_id: Option<IdUid>,

    #[serde(default)]
    pub entities: Vec<SnapshotEntity>,
}

impl Default for ModelSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSnapshot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            last_entity_id: None,
            entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&SnapshotEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live (non-retired) entities.
    pub fn live_entities(&self) -> impl Iterator<Item = &SnapshotEntity> {
        self.entities.iter().filter(|e| !e.retired)
    }

    /// Check the snapshot for internal consistency.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut names = BTreeSet::new();
        let mut entity_ids: BTreeMap<u32, &str> = BTreeMap::new();
        let mut uids: BTreeMap<u64, String> = BTreeMap::new();

        for entity in &self.entities {
            if !names.insert(entity.name.as_str()) {
                return Err(SnapshotError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }

            if entity.id.id > MAX_ENTITY_ID {
                return Err(SnapshotError::EntityIdOutOfRange {
                    entity: entity.name.clone(),
                    id: entity.id.id,
                });
            }

            if let Some(first) = entity_ids.insert(entity.id.id, &entity.name) {
                return Err(SnapshotError::DuplicateEntityId {
                    id: entity.id.id,
                    first: first.to_string(),
                    second: entity.name.clone(),
                });
            }

            if let Some(last) = self.last_entity_id
                && entity.id.id > last.id
            {
                return Err(SnapshotError::LastEntityIdBehind {
                    entity: entity.name.clone(),
                    id: entity.id.id,
                    last: last.id,
                });
            }

            insert_uid(&mut uids, entity.id.uid, format!("entity {}", entity.name))?;
            validate_properties(entity, &mut uids)?;
        }

        Ok(())
    }
}

// Property-level checks for one recorded entity.
fn validate_properties(
    entity: &SnapshotEntity,
    uids: &mut BTreeMap<u64, String>,
) -> Result<(), SnapshotError> {
    if entity.properties.is_empty() {
        return Ok(());
    }

    let Some(last) = entity.last_property_id else {
        return Err(SnapshotError::MissingLastPropertyId {
            entity: entity.name.clone(),
        });
    };

    let mut names = BTreeSet::new();
    let mut ids: BTreeMap<u32, &str> = BTreeMap::new();
    for property in &entity.properties {
        if !names.insert(property.name.as_str()) {
            return Err(SnapshotError::DuplicateProperty {
                entity: entity.name.clone(),
                property: property.name.clone(),
            });
        }

        if let Some(first) = ids.insert(property.id.id, &property.name) {
            return Err(SnapshotError::DuplicatePropertyId {
                entity: entity.name.clone(),
                id: property.id.id,
                first: first.to_string(),
                second: property.name.clone(),
            });
        }

        if property.id.id > last.id {
            return Err(SnapshotError::PropertyIdBeyondLast {
                entity: entity.name.clone(),
                property: property.name.clone(),
                id: property.id.id,
                last: last.id,
            });
        }

        insert_uid(
            uids,
            property.id.uid,
            format!("property {}.{}", entity.name, property.name),
        )?;
    }

    Ok(())
}

fn insert_uid(
    uids: &mut BTreeMap<u64, String>,
    uid: u64,
    owner: String,
) -> Result<(), SnapshotError> {
    if let Some(first) = uids.get(&uid) {
        return Err(SnapshotError::DuplicateUid {
            uid,
            first: first.clone(),
            second: owner,
        });
    }
    uids.insert(uid, owner);

    Ok(())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}
