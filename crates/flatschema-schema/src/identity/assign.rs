use crate::{
    Error,
    build::EntityError,
    hash::entity_hash,
    identity::{
        IdStrategy, IdUid, IdentityError, MAX_ENTITY_ID, entity_uid, hashed_entity_id,
        property_uid,
    },
    layout::vtable_offset,
    node::{Entity, EntityDef, Property},
    snapshot::{ModelSnapshot, SnapshotEntity, SnapshotProperty},
};
use std::collections::{BTreeMap, BTreeSet};

///
/// IdAssigner
///
/// Gives every entity and property its numeric ID and UID for one run.
///
/// Names found in the snapshot keep their recorded identifiers; new names
/// are minted (hash-derived UIDs, numeric IDs per `IdStrategy`) and checked
/// against every identifier ever recorded. The working copy of the snapshot
/// becomes the merged snapshot returned by `finish`.
///

pub struct IdAssigner<'a> {
    namespace: &'a str,
    strategy: IdStrategy,
    source: Option<String>,
    snapshot: ModelSnapshot,
    entity_ids: BTreeMap<u32, String>,
    uids: BTreeMap<u64, String>,
    seen: BTreeSet<String>,
}

impl<'a> IdAssigner<'a> {
    #[must_use]
    pub fn new(snapshot: &ModelSnapshot, namespace: &'a str, strategy: IdStrategy) -> Self {
        let mut entity_ids = BTreeMap::new();
        let mut uids = BTreeMap::new();

        for entity in &snapshot.entities {
            entity_ids.insert(entity.id.id, entity.name.clone());
            uids.insert(entity.id.uid, entity_owner(&entity.name));
            for property in &entity.properties {
                uids.insert(property.id.uid, property_owner(&entity.name, &property.name));
            }
        }

        Self {
            namespace,
            strategy,
            source: None,
            snapshot: snapshot.clone(),
            entity_ids,
            uids,
            seen: BTreeSet::new(),
        }
    }

    /// Scope retirement to entities recorded from this declaration unit.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Identify one entity and compute its property layouts.
    pub fn assign(&mut self, def: EntityDef) -> Result<Entity, Error> {
        if def.properties.is_empty() {
            return Err(EntityError::NoProperties { entity: def.name }.into());
        }
        if !self.seen.insert(def.name.clone()) {
            return Err(IdentityError::DuplicateEntity { entity: def.name }.into());
        }

        let pos = self.snapshot.entities.iter().position(|e| e.name == def.name);
        let (id, ids) = match pos {
            Some(pos) => self.reuse_entity(pos, &def)?,
            None => self.mint_entity(&def)?,
        };

        let last_property_id = self
            .snapshot
            .entity(&def.name)
            .and_then(|e| e.last_property_id)
            .or_else(|| ids.last().copied())
            .ok_or_else(|| EntityError::NoProperties {
                entity: def.name.clone(),
            })?;

        let mut properties = Vec::with_capacity(def.properties.len());
        for (prop, prop_id) in def.properties.into_iter().zip(ids) {
            let offset = vtable_offset(prop_id.id)
                .map_err(|e| Error::property(&def.name, &prop.name, e))?;
            properties.push(Property {
                def: prop,
                id: prop_id,
                vtable_offset: offset,
            });
        }

        Ok(Entity {
            name: def.name,
            id,
            properties,
            id_index: def.id_index,
            last_property_id,
        })
    }

    /// Retire entities of this unit that were not assigned and return the merged snapshot.
    #[must_use]
    pub fn finish(mut self) -> ModelSnapshot {
        for entity in &mut self.snapshot.entities {
            if entity.retired || entity.source != self.source || self.seen.contains(&entity.name) {
                continue;
            }

            tracing::warn!(entity = %entity.name, id = %entity.id, "retiring entity");
            entity.retired = true;
        }

        self.snapshot
    }

    // Reuse a recorded entity; recorded properties keep their identifiers,
    // new ones continue after the entity's last property ID.
    fn reuse_entity(
        &mut self,
        pos: usize,
        def: &EntityDef,
    ) -> Result<(IdUid, Vec<IdUid>), Error> {
        let record = &mut self.snapshot.entities[pos];
        if record.retired {
            tracing::info!(entity = %record.name, id = %record.id, "reviving retired entity");
            record.retired = false;
        }
        record.source.clone_from(&self.source);

        let mut next_id = record.last_property_id.map_or(0, |last| last.id.saturating_add(1));
        let mut ids = Vec::with_capacity(def.properties.len());

        for prop in &def.properties {
            if let Some(existing) = record.properties.iter_mut().find(|p| p.name == prop.name) {
                if existing.retired {
                    tracing::info!(entity = %def.name, property = %prop.name, "reviving retired property");
                    existing.retired = false;
                }
                tracing::debug!(entity = %def.name, property = %prop.name, id = %existing.id, "reusing property id");
                ids.push(existing.id);
                continue;
            }

            let id = next_id;
            next_id = next_id.saturating_add(1);
            let uid = property_uid(record.id.uid, id).ok_or_else(|| IdentityError::UidOverflow {
                entity: def.name.clone(),
                property: prop.name.clone(),
                entity_uid: record.id.uid,
            })?;
            claim_uid(&mut self.uids, uid, property_owner(&def.name, &prop.name))?;

            let id_uid = IdUid::new(id, uid);
            tracing::debug!(entity = %def.name, property = %prop.name, id = %id_uid, "minted property id");
            record.properties.push(SnapshotProperty {
                id: id_uid,
                name: prop.name.clone(),
                retired: false,
            });
            record.last_property_id = Some(id_uid);
            ids.push(id_uid);
        }

        for existing in &mut record.properties {
            if !existing.retired && !def.properties.iter().any(|p| p.name == existing.name) {
                tracing::warn!(entity = %def.name, property = %existing.name, "retiring property");
                existing.retired = true;
            }
        }

        tracing::debug!(entity = %def.name, id = %record.id, "reusing entity id");

        Ok((record.id, ids))
    }

    // Mint identifiers for an entity the snapshot has never seen.
    fn mint_entity(&mut self, def: &EntityDef) -> Result<(IdUid, Vec<IdUid>), Error> {
        let hash = entity_hash(self.namespace, &def.name);
        let id = match self.strategy {
            IdStrategy::Hashed => hashed_entity_id(hash),
            IdStrategy::Sequential => self.next_sequential_id()?,
        };

        if let Some(other) = self.entity_ids.get(&id) {
            return Err(IdentityError::EntityIdCollision {
                entity: def.name.clone(),
                id,
                other: other.clone(),
            }
            .into());
        }

        let uid = entity_uid(hash);
        claim_uid(&mut self.uids, uid, entity_owner(&def.name))?;

        let mut ids = Vec::with_capacity(def.properties.len());
        let mut properties = Vec::with_capacity(def.properties.len());
        for (index, prop) in def.properties.iter().enumerate() {
            let prop_id = u32::try_from(index).unwrap_or(u32::MAX);
            let prop_uid =
                property_uid(uid, prop_id).ok_or_else(|| IdentityError::UidOverflow {
                    entity: def.name.clone(),
                    property: prop.name.clone(),
                    entity_uid: uid,
                })?;
            claim_uid(&mut self.uids, prop_uid, property_owner(&def.name, &prop.name))?;

            let id_uid = IdUid::new(prop_id, prop_uid);
            ids.push(id_uid);
            properties.push(SnapshotProperty {
                id: id_uid,
                name: prop.name.clone(),
                retired: false,
            });
        }

        let id = IdUid::new(id, uid);
        tracing::debug!(entity = %def.name, id = %id, properties = ids.len(), "minted entity id");

        self.entity_ids.insert(id.id, def.name.clone());
        if self.snapshot.last_entity_id.is_none_or(|last| last.id < id.id) {
            self.snapshot.last_entity_id = Some(id);
        }
        self.snapshot.entities.push(SnapshotEntity {
            id,
            name: def.name.clone(),
            source: self.source.clone(),
            retired: false,
            last_property_id: ids.last().copied(),
            properties,
        });

        Ok((id, ids))
    }

    // One past the highest entity ID ever issued (recorded or in `lastEntityId`).
    fn next_sequential_id(&self) -> Result<u32, IdentityError> {
        let recorded = self.entity_ids.keys().next_back().copied();
        let last = self.snapshot.last_entity_id.map(|l| l.id).max(recorded);

        let next = last.map_or(1, |last| last + 1);
        if next > MAX_ENTITY_ID {
            return Err(IdentityError::EntityIdExhausted {
                last: last.unwrap_or_default(),
            });
        }

        Ok(next)
    }
}

fn entity_owner(entity: &str) -> String {
    format!("entity {entity}")
}

fn property_owner(entity: &str, property: &str) -> String {
    format!("property {entity}.{property}")
}

fn claim_uid(
    uids: &mut BTreeMap<u64, String>,
    uid: u64,
    owner: String,
) -> Result<(), IdentityError> {
    if let Some(other) = uids.get(&uid) {
        return Err(IdentityError::UidCollision {
            uid,
            owner,
            other: other.clone(),
        });
    }
    uids.insert(uid, owner);

    Ok(())
}
