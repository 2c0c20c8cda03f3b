mod entity;
mod model;
mod property;

pub use entity::{Entity, EntityDef};
pub use model::Model;
pub use property::{Property, PropertyDef, PropertyFlag, PropertyFlags};
