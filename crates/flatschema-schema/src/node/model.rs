use crate::node::Entity;

///
/// Model
/// The finalized schema for one run, entities in declaration order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Model {
    pub namespace: String,
    pub entities: Vec<Entity>,
}

impl Model {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
