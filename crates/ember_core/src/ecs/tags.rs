//! # Tags and Groups
//!
//! Entity metadata kept by the registry beside the component pools.
//!
//! - A tag names at most one entity, and an entity holds at most one tag.
//! - A group names any number of entities, and an entity can be in any
//!   number of groups.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Bidirectional tag ↔ entity map.
#[derive(Debug, Default)]
pub(crate) struct TagIndex {
    entity_by_tag: HashMap<String, Entity>,
    tag_by_entity: HashMap<Entity, String>,
}

impl TagIndex {
    /// Binds `tag` to `entity`.
    ///
    /// Re-tagging the same entity with the same tag is a no-op. If the entity
    /// already had a different tag, that tag is released.
    pub(crate) fn insert(&mut self, entity: Entity, tag: &str) -> EcsResult<()> {
        if let Some(&owner) = self.entity_by_tag.get(tag) {
            if owner == entity {
                return Ok(());
            }
            return Err(EcsError::DuplicateTag {
                tag: tag.to_owned(),
                owner,
                entity,
            });
        }

        if let Some(previous) = self.tag_by_entity.insert(entity, tag.to_owned()) {
            self.entity_by_tag.remove(&previous);
        }
        self.entity_by_tag.insert(tag.to_owned(), entity);
        Ok(())
    }

    pub(crate) fn has(&self, entity: Entity, tag: &str) -> bool {
        self.entity_by_tag.get(tag) == Some(&entity)
    }

    pub(crate) fn entity(&self, tag: &str) -> Option<Entity> {
        self.entity_by_tag.get(tag).copied()
    }

    pub(crate) fn tag(&self, entity: Entity) -> Option<&str> {
        self.tag_by_entity.get(&entity).map(String::as_str)
    }

    pub(crate) fn remove(&mut self, entity: Entity) -> Option<String> {
        let tag = self.tag_by_entity.remove(&entity)?;
        self.entity_by_tag.remove(&tag);
        Some(tag)
    }

    pub(crate) fn len(&self) -> usize {
        self.entity_by_tag.len()
    }
}

/// Many-to-many group ↔ entity membership.
#[derive(Debug, Default)]
pub(crate) struct GroupIndex {
    entities_by_group: BTreeMap<String, BTreeSet<Entity>>,
    groups_by_entity: HashMap<Entity, BTreeSet<String>>,
}

impl GroupIndex {
    /// Adds `entity` to `group`. Returns `false` if it was already a member.
    pub(crate) fn insert(&mut self, entity: Entity, group: &str) -> bool {
        let added = self
            .entities_by_group
            .entry(group.to_owned())
            .or_default()
            .insert(entity);
        self.groups_by_entity
            .entry(entity)
            .or_default()
            .insert(group.to_owned());
        added
    }

    pub(crate) fn contains(&self, entity: Entity, group: &str) -> bool {
        self.groups_by_entity
            .get(&entity)
            .is_some_and(|groups| groups.contains(group))
    }

    pub(crate) fn members(&self, group: &str) -> Vec<Entity> {
        self.entities_by_group
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn groups(&self, entity: Entity) -> Vec<&str> {
        self.groups_by_entity
            .get(&entity)
            .map(|groups| groups.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Removes `entity` from `group`, pruning empty sets on both sides.
    pub(crate) fn remove(&mut self, entity: Entity, group: &str) -> bool {
        let Some(groups) = self.groups_by_entity.get_mut(&entity) else {
            return false;
        };
        if !groups.remove(group) {
            return false;
        }
        if groups.is_empty() {
            self.groups_by_entity.remove(&entity);
        }
        self.drop_member(group, entity);
        true
    }

    /// Removes `entity` from every group it belongs to.
    pub(crate) fn remove_all(&mut self, entity: Entity) -> usize {
        let Some(groups) = self.groups_by_entity.remove(&entity) else {
            return 0;
        };
        for group in &groups {
            self.drop_member(group, entity);
        }
        groups.len()
    }

    fn drop_member(&mut self, group: &str, entity: Entity) {
        if let Some(members) = self.entities_by_group.get_mut(group) {
            members.remove(&entity);
            if members.is_empty() {
                self.entities_by_group.remove(group);
            }
        }
    }

    pub(crate) fn group_count(&self) -> usize {
        self.entities_by_group.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u32) -> Entity {
        Entity::new(id, 0)
    }

    #[test]
    fn test_tag_conflict_and_noop() {
        let mut tags = TagIndex::default();
        tags.insert(e(1), "player").unwrap();
        assert!(tags.insert(e(1), "player").is_ok());
        assert!(matches!(
            tags.insert(e(2), "player"),
            Err(EcsError::DuplicateTag { .. })
        ));
        assert_eq!(tags.entity("player"), Some(e(1)));
    }

    #[test]
    fn test_retag_releases_previous_tag() {
        let mut tags = TagIndex::default();
        tags.insert(e(1), "player").unwrap();
        tags.insert(e(1), "hero").unwrap();
        assert_eq!(tags.entity("player"), None);
        assert_eq!(tags.tag(e(1)), Some("hero"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_tag_remove_frees_name() {
        let mut tags = TagIndex::default();
        tags.insert(e(1), "player").unwrap();
        assert_eq!(tags.remove(e(1)).as_deref(), Some("player"));
        tags.insert(e(2), "player").unwrap();
        assert!(tags.has(e(2), "player"));
    }

    #[test]
    fn test_group_membership_is_idempotent() {
        let mut groups = GroupIndex::default();
        assert!(groups.insert(e(3), "enemies"));
        assert!(!groups.insert(e(3), "enemies"));
        groups.insert(e(1), "enemies");
        groups.insert(e(3), "obstacles");
        assert_eq!(groups.members("enemies"), vec![e(1), e(3)]);
        assert_eq!(groups.groups(e(3)), vec!["enemies", "obstacles"]);
        assert!(groups.members("missing").is_empty());
    }

    #[test]
    fn test_group_remove_prunes() {
        let mut groups = GroupIndex::default();
        groups.insert(e(1), "enemies");
        groups.insert(e(1), "tanks");
        assert!(groups.remove(e(1), "tanks"));
        assert_eq!(groups.group_count(), 1);
        assert_eq!(groups.remove_all(e(1)), 1);
        assert_eq!(groups.group_count(), 0);
        assert!(!groups.contains(e(1), "enemies"));
    }
}
