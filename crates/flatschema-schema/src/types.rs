use crate::tag::Capabilities;
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// TypeError
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TypeError {
    #[error("invalid underlying type ({storage}) for date field")]
    DateRequiresLong { storage: StorageType },

    #[error("invalid underlying type ({storage}) for id field")]
    IdRequiresLong { storage: StorageType },

    #[error("unknown type {type_name}")]
    Unknown { type_name: String },
}

///
/// StorageType
/// Column type recorded in the schema model.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum StorageType {
    Bool,
    Byte,
    ByteVector,
    Date,
    Double,
    Float,
    Int,
    Long,
    Short,
    String,
}

///
/// WireType
/// Primitive slot encoding used by the table-based record format.
/// `UOffsetT` marks values stored out of line behind a 32-bit offset.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum WireType {
    Bool,
    Byte,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint16,
    Uint32,
    Uint64,
    UOffsetT,
}

impl WireType {
    /// Whether the slot holds an offset to out-of-line data.
    #[must_use]
    pub const fn is_offset(self) -> bool {
        matches!(self, Self::UOffsetT)
    }
}

///
/// TypeMapping
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TypeMapping {
    pub storage: StorageType,
    pub wire: WireType,
}

impl TypeMapping {
    const fn new(storage: StorageType, wire: WireType) -> Self {
        Self { storage, wire }
    }
}

// Source type names are matched after whitespace has been stripped.
// `i8` widens to Short while `u8` stays a Byte; the asymmetry is part of the
// persisted model and must not be "fixed".
const TYPE_TABLE: &[(&str, TypeMapping)] = &[
    ("String", TypeMapping::new(StorageType::String, WireType::UOffsetT)),
    ("i64", TypeMapping::new(StorageType::Long, WireType::Int64)),
    ("u64", TypeMapping::new(StorageType::Long, WireType::Uint64)),
    ("i32", TypeMapping::new(StorageType::Int, WireType::Int32)),
    ("u32", TypeMapping::new(StorageType::Int, WireType::Uint32)),
    ("char", TypeMapping::new(StorageType::Int, WireType::Uint32)),
    ("i8", TypeMapping::new(StorageType::Short, WireType::Int8)),
    ("u8", TypeMapping::new(StorageType::Byte, WireType::Byte)),
    ("i16", TypeMapping::new(StorageType::Short, WireType::Int16)),
    ("u16", TypeMapping::new(StorageType::Short, WireType::Uint16)),
    ("f32", TypeMapping::new(StorageType::Float, WireType::Float32)),
    ("f64", TypeMapping::new(StorageType::Double, WireType::Float64)),
    ("Vec<u8>", TypeMapping::new(StorageType::ByteVector, WireType::UOffsetT)),
    ("bool", TypeMapping::new(StorageType::Bool, WireType::Bool)),
];

/// Look up the fixed storage/wire pair for a source type name.
pub fn map_type(type_name: &str) -> Result<TypeMapping, TypeError> {
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, mapping)| *mapping)
        .ok_or_else(|| TypeError::Unknown {
            type_name: type_name.to_string(),
        })
}

/// Resolve a field type and apply the capabilities that reinterpret it.
///
/// `date` turns a Long into a Date on the same wire encoding; `id` must sit
/// on a Long. Any other combination is an error.
pub fn resolve_type(type_name: &str, caps: &Capabilities) -> Result<TypeMapping, TypeError> {
    let mut mapping = map_type(type_name)?;

    if caps.is_date() {
        if mapping.storage != StorageType::Long {
            return Err(TypeError::DateRequiresLong {
                storage: mapping.storage,
            });
        }
        mapping.storage = StorageType::Date;
    }

    if caps.is_id() && mapping.storage != StorageType::Long {
        return Err(TypeError::IdRequiresLong {
            storage: mapping.storage,
        });
    }

    Ok(mapping)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(text: &str) -> Capabilities {
        Capabilities::parse(text).expect("tag should parse")
    }

    #[test]
    fn maps_every_supported_type() {
        let cases = [
            ("String", StorageType::String, WireType::UOffsetT),
            ("i64", StorageType::Long, WireType::Int64),
            ("u64", StorageType::Long, WireType::Uint64),
            ("i32", StorageType::Int, WireType::Int32),
            ("u32", StorageType::Int, WireType::Uint32),
            ("char", StorageType::Int, WireType::Uint32),
            ("i8", StorageType::Short, WireType::Int8),
            ("u8", StorageType::Byte, WireType::Byte),
            ("i16", StorageType::Short, WireType::Int16),
            ("u16", StorageType::Short, WireType::Uint16),
            ("f32", StorageType::Float, WireType::Float32),
            ("f64", StorageType::Double, WireType::Float64),
            ("Vec<u8>", StorageType::ByteVector, WireType::UOffsetT),
            ("bool", StorageType::Bool, WireType::Bool),
        ];

        for (name, storage, wire) in cases {
            let mapping = map_type(name).expect("type should map");
            assert_eq!(mapping, TypeMapping { storage, wire }, "mapping for {name}");
            assert_eq!(map_type(name), Ok(mapping), "mapping for {name} must be stable");
        }
    }

    #[test]
    fn signed_and_unsigned_bytes_are_asymmetric() {
        assert_eq!(map_type("i8").unwrap().storage, StorageType::Short);
        assert_eq!(map_type("u8").unwrap().storage, StorageType::Byte);
    }

    #[test]
    fn unknown_type_names_the_type() {
        let err = map_type("usize").unwrap_err();
        assert_eq!(err.to_string(), "unknown type usize");
        assert!(map_type("Vec<u16>").is_err());
    }

    #[test]
    fn date_reclassifies_long_and_keeps_wire() {
        let mapping = resolve_type("u64", &caps("date")).expect("date on u64");
        assert_eq!(mapping.storage, StorageType::Date);
        assert_eq!(mapping.wire, WireType::Uint64);

        let mapping = resolve_type("i64", &caps("date")).expect("date on i64");
        assert_eq!(mapping.wire, WireType::Int64);
    }

    #[test]
    fn date_on_text_is_a_mismatch() {
        let err = resolve_type("String", &caps("date")).unwrap_err();
        assert_eq!(
            err,
            TypeError::DateRequiresLong {
                storage: StorageType::String
            }
        );
        assert_eq!(err.to_string(), "invalid underlying type (String) for date field");
    }

    #[test]
    fn id_requires_long_storage() {
        assert!(resolve_type("u64", &caps("id")).is_ok());

        let err = resolve_type("u32", &caps("id")).unwrap_err();
        assert!(matches!(err, TypeError::IdRequiresLong { storage: StorageType::Int }));

        let err = resolve_type("u64", &caps("id date")).unwrap_err();
        assert!(matches!(err, TypeError::IdRequiresLong { storage: StorageType::Date }));
    }

    #[test]
    fn offset_wire_types() {
        assert!(WireType::UOffsetT.is_offset());
        assert!(!WireType::Uint64.is_offset());
    }
}
