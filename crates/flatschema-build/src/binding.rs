//! Module: binding
//! Responsibility: the finalized model in the shape handed to code emission.
//! Every value a template needs is precomputed; nothing is looked up later.

use flatschema_schema::{
    identity::IdUid,
    node::{Entity, Model, Property},
    types::{StorageType, WireType},
};
use serde::Serialize;

///
/// Binding
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub namespace: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub entities: Vec<BindingEntity>,
}

impl Binding {
    #[must_use]
    pub fn new(model: &Model, source: Option<String>) -> Self {
        Self {
            namespace: model.namespace.clone(),
            source,
            entities: model.entities.iter().map(BindingEntity::from).collect(),
        }
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&BindingEntity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

///
/// BindingEntity
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingEntity {
    pub name: String,
    pub id: u32,
    pub uid: u64,
    pub id_property: String,

    /// Live property with the highest numeric ID.
    pub last_property: String,

    /// Highest property ID ever issued; may belong to a retired property.
    pub last_property_id: IdUid,
    pub properties: Vec<BindingProperty>,
}

impl From<&Entity> for BindingEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            id: entity.id.id,
            uid: entity.id.uid,
            id_property: entity.id_property().name().to_string(),
            last_property: entity.last_property().name().to_string(),
            last_property_id: entity.last_property_id,
            properties: entity.properties.iter().map(BindingProperty::from).collect(),
        }
    }
}

///
/// BindingProperty
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProperty {
    pub name: String,
    pub name_in_db: String,
    pub source_type: String,
    pub id: u32,
    pub uid: u64,
    pub storage_type: StorageType,
    pub wire_type: WireType,
    pub is_offset: bool,
    pub flags: Vec<String>,

    /// Table slot, equal to the property's numeric ID.
    pub slot: u32,
    pub vtable_offset: u16,
}

impl From<&Property> for BindingProperty {
    fn from(property: &Property) -> Self {
        let def = &property.def;

        Self {
            name: def.name.clone(),
            name_in_db: def.storage_name.clone(),
            source_type: def.source_type.clone(),
            id: property.id.id,
            uid: property.id.uid,
            storage_type: def.storage_type(),
            wire_type: def.wire_type(),
            is_offset: def.wire_type().is_offset(),
            flags: def.flags.iter().map(|f| f.as_str().to_string()).collect(),
            slot: property.id.id,
            vtable_offset: property.vtable_offset,
        }
    }
}

///
/// TESTS
///
