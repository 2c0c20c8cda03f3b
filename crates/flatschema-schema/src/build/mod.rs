//! Module: build
//! Responsibility: drive declarations through tag parsing and type mapping,
//! enforce entity-level invariants, then hand the result to identifier
//! assignment.
//!
//! Processing is fail-fast: the first error ends the run and nothing of the
//! partially built model escapes.

#[cfg(test)]
mod tests;

use crate::{
    Error,
    identity::{IdAssigner, IdStrategy},
    node::{EntityDef, Model, PropertyDef, PropertyFlags},
    snapshot::ModelSnapshot,
    tag::Capabilities,
    types::resolve_type,
};
use thiserror::Error as ThisError;

///
/// EntityError
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum EntityError {
    #[error("struct {entity} has multiple ID properties - {first} and {second}")]
    DuplicateId {
        entity: String,
        first: String,
        second: String,
    },

    #[error("storage name {name} is used by both {first} and {second} in entity {entity}")]
    DuplicateStorageName {
        entity: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("nameInDb annotation value must not be empty on property {property}, entity {entity}")]
    EmptyStorageName { entity: String, property: String },

    #[error("field annotated `id` is missing on entity {entity}")]
    MissingId { entity: String },

    #[error("there are no properties in the entity {entity}")]
    NoProperties { entity: String },
}

///
/// FieldDecl
/// One field as discovered in source: name, type text and raw tag text.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub source_type: String,
    pub tag: String,
    pub index: usize,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, source_type: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            tag: tag.into(),
            index: 0,
        }
    }
}

///
/// Declaration
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

impl Declaration {
    /// Build a declaration, numbering fields in the given order.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| FieldDecl { index, ..field })
            .collect();

        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Turn one declaration into a validated, not yet identified entity.
pub fn build_entity(decl: &Declaration) -> Result<EntityDef, Error> {
    let entity = decl.name.as_str();
    let mut properties: Vec<PropertyDef> = Vec::with_capacity(decl.fields.len());
    let mut id_index = None;

    for field in &decl.fields {
        let caps = Capabilities::parse(&field.tag)
            .map_err(|e| Error::property(entity, &field.name, e))?;

        // transient fields never reach type mapping or flag derivation
        if caps.is_transient() {
            tracing::debug!(entity, property = %field.name, "skipping transient field");
            continue;
        }

        let mapping = resolve_type(&field.source_type, &caps)
            .map_err(|e| Error::property(entity, &field.name, e))?;

        let storage_name = match caps.name_in_db() {
            Some("") => {
                return Err(EntityError::EmptyStorageName {
                    entity: entity.to_string(),
                    property: field.name.clone(),
                }
                .into());
            }
            Some(name) => name.to_string(),
            None => field.name.clone(),
        };

        if let Some(other) = properties.iter().find(|p| p.storage_name == storage_name) {
            return Err(EntityError::DuplicateStorageName {
                entity: entity.to_string(),
                name: storage_name,
                first: other.name.clone(),
                second: field.name.clone(),
            }
            .into());
        }

        if caps.is_id() {
            if let Some(first) = id_index.map(|i: usize| &properties[i]) {
                return Err(EntityError::DuplicateId {
                    entity: entity.to_string(),
                    first: first.name.clone(),
                    second: field.name.clone(),
                }
                .into());
            }
            id_index = Some(properties.len());
        }

        let flags = PropertyFlags::from_capabilities(&caps);
        tracing::debug!(
            entity,
            property = %field.name,
            storage = %mapping.storage,
            wire = %mapping.wire,
            "resolved property"
        );

        properties.push(PropertyDef {
            name: field.name.clone(),
            storage_name,
            source_type: field.source_type.clone(),
            capabilities: caps,
            mapping,
            flags,
        });
    }

    if properties.is_empty() {
        return Err(EntityError::NoProperties {
            entity: entity.to_string(),
        }
        .into());
    }

    let Some(id_index) = id_index else {
        return Err(EntityError::MissingId {
            entity: entity.to_string(),
        }
        .into());
    };

    Ok(EntityDef {
        name: decl.name.clone(),
        properties,
        id_index,
    })
}

///
/// DeriveOptions
///

#[derive(Clone, Debug, Default)]
pub struct DeriveOptions {
    pub strategy: IdStrategy,

    /// Declaration unit; entities recorded under it but not declared any more are retired.
    pub source: Option<String>,
}

/// Build and identify every declaration against the previous snapshot.
///
/// Returns the finalized model and the merged snapshot to persist. The
/// previous snapshot is validated first; on any error nothing is returned.
pub fn derive_model(
    namespace: &str,
    decls: &[Declaration],
    previous: &ModelSnapshot,
    options: &DeriveOptions,
) -> Result<(Model, ModelSnapshot), Error> {
    previous.validate()?;

    let defs = decls
        .iter()
        .map(build_entity)
        .collect::<Result<Vec<_>, _>>()?;

    let mut assigner = IdAssigner::new(previous, namespace, options.strategy);
    if let Some(source) = &options.source {
        assigner = assigner.with_source(source.clone());
    }

    let entities = defs
        .into_iter()
        .map(|def| assigner.assign(def))
        .collect::<Result<Vec<_>, _>>()?;

    let model = Model {
        namespace: namespace.to_string(),
        entities,
    };
    tracing::info!(namespace, entities = model.entities.len(), "derived model");

    Ok((model, assigner.finish()))
}
