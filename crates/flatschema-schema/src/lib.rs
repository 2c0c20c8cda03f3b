//! Schema derivation for table-encoded records: annotation parsing, type
//! mapping, stable identifier assignment and vtable layout.

pub mod build;
pub mod hash;
pub mod identity;
pub mod layout;
pub mod node;
pub mod snapshot;
pub mod tag;
pub mod types;

use crate::{
    build::EntityError, identity::IdentityError, layout::LayoutError, snapshot::SnapshotError,
    tag::TagError, types::TypeError,
};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind,
        build::{
            Declaration, DeriveOptions, EntityError, FieldDecl, build_entity, derive_model,
        },
        identity::{IdAssigner, IdStrategy, IdUid},
        node::*,
        snapshot::ModelSnapshot,
        tag::{Capabilities, Capability, CapabilityKey, IndexKind},
        types::{StorageType, WireType},
    };
}

///
/// PropertyError
/// Field-level failures; always reported wrapped in `Error::Property`.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum PropertyError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

///
/// Error
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("{source} on property {property}, entity {entity}")]
    Property {
        entity: String,
        property: String,
        source: PropertyError,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl Error {
    pub(crate) fn property(
        entity: &str,
        property: &str,
        source: impl Into<PropertyError>,
    ) -> Self {
        Self::Property {
            entity: entity.to_string(),
            property: property.to_string(),
            source: source.into(),
        }
    }

    /// Coarse classification of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Entity(_) | Self::Identity(IdentityError::DuplicateEntity { .. }) => {
                ErrorKind::EntityShape
            }
            Self::Identity(_) => ErrorKind::IdentifierCollision,
            Self::Property { source, .. } => match source {
                PropertyError::Layout(_) => ErrorKind::LayoutOverflow,
                PropertyError::Tag(_) => ErrorKind::TagFormat,
                PropertyError::Type(_) => ErrorKind::TypeResolution,
            },
            Self::Snapshot(_) => ErrorKind::Snapshot,
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    EntityShape,
    IdentifierCollision,
    LayoutOverflow,
    Snapshot,
    TagFormat,
    TypeResolution,
}
