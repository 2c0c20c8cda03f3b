use crate::{
    identity::IdUid,
    node::{Property, PropertyDef},
};

///
/// EntityDef
///
/// One validated declaration: non-empty properties in declaration order with
/// exactly one identifier property. Transient fields are already gone.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityDef {
    pub name: String,
    pub properties: Vec<PropertyDef>,
    pub id_index: usize,
}

impl EntityDef {
    #[must_use]
    pub fn id_property(&self) -> &PropertyDef {
        &self.properties[self.id_index]
    }
}

///
/// Entity
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entity {
    pub name: String,
    pub id: IdUid,
    pub properties: Vec<Property>,
    pub id_index: usize,

    /// Highest property ID ever issued for this entity, retired ones included.
    pub last_property_id: IdUid,
}

impl Entity {
    #[must_use]
    pub fn id_property(&self) -> &Property {
        &self.properties[self.id_index]
    }

    /// The live property with the highest numeric ID.
    #[must_use]
    pub fn last_property(&self) -> &Property {
        self.properties
            .iter()
            .max_by_key(|p| p.id.id)
            .unwrap_or_else(|| self.id_property())
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }
}
