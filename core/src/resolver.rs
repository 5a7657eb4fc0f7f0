//! Cross-reference lookup. Slots point at their counterpart by short code or
//! by name; neither is unique, so every lookup goes through here and the
//! first match in collection order wins.

use crate::model::entity::{Entity, EntityKind};

fn matches(entity: &Entity, code: &str) -> bool {
    entity.short_code.as_deref() == Some(code) || entity.name == code
}

pub fn position(entities: &[Entity], code: &str, kind: EntityKind) -> Option<usize> {
    entities
        .iter()
        .position(|e| e.kind == kind && matches(e, code))
}

pub fn resolve<'a>(entities: &'a [Entity], code: &str, kind: EntityKind) -> Option<&'a Entity> {
    position(entities, code, kind).map(|idx| &entities[idx])
}
