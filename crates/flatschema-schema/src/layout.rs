//! Module: layout
//! Responsibility: vtable slot offsets for the table-based record encoding.
//!
//! A record's vtable starts with a 4-byte header (vtable size + object size,
//! both u16), followed by one 2-byte slot per property addressed by its
//! numeric ID. Offsets are u16 in the encoding; anything wider is fatal.

use thiserror::Error as ThisError;

/// Bytes of vtable header preceding the first field slot.
pub const VTABLE_HEADER_BYTES: u32 = 4;

/// Width of one field slot.
pub const VTABLE_SLOT_BYTES: u32 = 2;

/// Largest property numeric ID whose slot offset still fits in a u16.
pub const MAX_PROPERTY_ID: u32 = (u16::MAX as u32 - VTABLE_HEADER_BYTES) / VTABLE_SLOT_BYTES;

///
/// LayoutError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum LayoutError {
    #[error("can't calculate vtable offset: property ID {id} is too large (max {MAX_PROPERTY_ID})")]
    Overflow { id: u32 },
}

/// Vtable offset for the property with the given numeric ID: `4 + 2 * id`.
pub fn vtable_offset(id: u32) -> Result<u16, LayoutError> {
    id.checked_mul(VTABLE_SLOT_BYTES)
        .and_then(|slot| slot.checked_add(VTABLE_HEADER_BYTES))
        .and_then(|offset| u16::try_from(offset).ok())
        .ok_or(LayoutError::Overflow { id })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_slots_follow_the_header() {
        assert_eq!(vtable_offset(0), Ok(4));
        assert_eq!(vtable_offset(1), Ok(6));
        assert_eq!(vtable_offset(2), Ok(8));
    }

    #[test]
    fn largest_id_fits_and_next_overflows() {
        assert_eq!(vtable_offset(MAX_PROPERTY_ID), Ok(u16::MAX - 1));
        assert_eq!(
            vtable_offset(MAX_PROPERTY_ID + 1),
            Err(LayoutError::Overflow {
                id: MAX_PROPERTY_ID + 1
            })
        );
    }

    #[test]
    fn huge_ids_do_not_wrap() {
        assert!(vtable_offset(u32::MAX).is_err());
        assert!(vtable_offset(u32::MAX / 2 + 1).is_err());
    }

    proptest! {
        #[test]
        fn offset_is_header_plus_two_per_id(id in 0..=MAX_PROPERTY_ID) {
            let offset = vtable_offset(id).expect("id within range");
            prop_assert_eq!(u32::from(offset), 4 + 2 * id);
        }

        #[test]
        fn out_of_range_ids_fail(id in (MAX_PROPERTY_ID + 1)..=u32::MAX) {
            prop_assert!(vtable_offset(id).is_err());
        }
    }
}
