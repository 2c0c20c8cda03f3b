use crate::{
    identity::IdUid,
    tag::{Capabilities, IndexKind},
    types::{StorageType, TypeMapping, WireType},
};
use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

///
/// PropertyFlag
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PropertyFlag {
    Id,
    Indexed,
    IndexValue,
    IndexHash,
    IndexHash64,
    Unique,
}

impl PropertyFlag {
    /// Flag name as emitted into generated code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Indexed => "INDEXED",
            Self::IndexValue => "INDEX_VALUE",
            Self::IndexHash => "INDEX_HASH",
            Self::IndexHash64 => "INDEX_HASH64",
            Self::Unique => "UNIQUE",
        }
    }
}

impl Display for PropertyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// PropertyFlags
/// Derived from capabilities only; there is no other way to set a flag.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertyFlags(BTreeSet<PropertyFlag>);

impl PropertyFlags {
    #[must_use]
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        let mut flags = BTreeSet::new();

        if caps.is_id() {
            flags.insert(PropertyFlag::Id);
        }

        if let Some(kind) = caps.index() {
            flags.insert(PropertyFlag::Indexed);
            match kind {
                IndexKind::Default => {}
                IndexKind::Value => {
                    flags.insert(PropertyFlag::IndexValue);
                }
                IndexKind::Hash => {
                    flags.insert(PropertyFlag::IndexHash);
                }
                IndexKind::Hash64 => {
                    flags.insert(PropertyFlag::IndexHash64);
                }
            }
        }

        if caps.is_unique() {
            flags.insert(PropertyFlag::Unique);
        }

        Self(flags)
    }

    #[must_use]
    pub fn contains(&self, flag: PropertyFlag) -> bool {
        self.0.contains(&flag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PropertyFlag> + '_ {
        self.0.iter().copied()
    }
}

///
/// PropertyDef
/// A resolved field declaration, before identifiers are assigned.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub storage_name: String,
    pub source_type: String,
    pub capabilities: Capabilities,
    pub mapping: TypeMapping,
    pub flags: PropertyFlags,
}

impl PropertyDef {
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        self.mapping.storage
    }

    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        self.mapping.wire
    }

    #[must_use]
    pub fn is_id(&self) -> bool {
        self.flags.contains(PropertyFlag::Id)
    }
}

///
/// Property
/// One fully identified column of an entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub def: PropertyDef,
    pub id: IdUid,
    pub vtable_offset: u16,
}

impl Property {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub fn storage_name(&self) -> &str {
        &self.def.storage_name
    }
}

///
/// TESTS
///
