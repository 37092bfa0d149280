use crate::entity::EntityId;

/// A named collection of sprite entities.
///
/// Groups tie sprites to the layers that update and draw them, and
/// they name the section a sprite serializes under. Membership is
/// duplicate-free and keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    name: String,
    members: Vec<EntityId>,
}

impl Group {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// The group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member; re-adding an existing member is a no-op.
    pub fn add_member(&mut self, id: EntityId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// Drop a member if present.
    pub fn remove_member(&mut self, id: EntityId) {
        self.members.retain(|m| *m != id);
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Whether the entity belongs to this group.
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_duplicate_free_and_ordered() {
        let mut group = Group::new("soldiers");
        group.add_member(EntityId(3));
        group.add_member(EntityId(1));
        group.add_member(EntityId(3));
        assert_eq!(group.members(), &[EntityId(3), EntityId(1)]);
    }

    #[test]
    fn remove_member() {
        let mut group = Group::new("soldiers");
        group.add_member(EntityId(1));
        group.add_member(EntityId(2));
        group.remove_member(EntityId(1));
        assert_eq!(group.members(), &[EntityId(2)]);
        assert!(!group.contains(EntityId(1)));
    }
}
