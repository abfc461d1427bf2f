//! Capability contract implemented by everything that can occupy a cell.

use std::{any::Any, fmt};

use crate::{Direction, EntityId};

/// Outcome an entity reports when it is pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Refuse to budge; the whole chain halts.
    Stay,
    /// Step one cell in the push direction, pushing whatever is in the way.
    Move,
    /// Disappear from the world, freeing the cell for the pusher.
    Vanish,
    /// Disappear together with the pusher; the freed cell stays empty.
    Consume,
    /// Game-specific reaction that resolves like one of the base outcomes.
    Custom(Effect),
}

impl Action {
    /// Builds a custom action tagged for game code.
    #[must_use]
    pub const fn custom(tag: &'static str, resolves_as: Resolution) -> Self {
        Self::Custom(Effect::new(tag, resolves_as))
    }

    /// Base outcome the world applies for this action.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        match self {
            Self::Stay => Resolution::Stay,
            Self::Move => Resolution::Move,
            Self::Vanish => Resolution::Vanish,
            Self::Consume => Resolution::Consume,
            Self::Custom(effect) => effect.resolves_as(),
        }
    }
}

/// The four outcomes the world knows how to carry out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Nothing moved.
    Stay,
    /// The entity advanced one cell.
    Move,
    /// The entity was removed on its own.
    Vanish,
    /// The entity was removed, along with its pusher when there was one.
    Consume,
}

impl Resolution {
    /// Reports whether the pushed entity got out of the way.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Stay)
    }
}

/// Payload of [`Action::Custom`]: a tag for game code plus the base outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Effect {
    tag: &'static str,
    resolves_as: Resolution,
}

impl Effect {
    /// Creates a new effect.
    #[must_use]
    pub const fn new(tag: &'static str, resolves_as: Resolution) -> Self {
        Self { tag, resolves_as }
    }

    /// Tag identifying the effect to game code.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Base outcome carried out by the world.
    #[must_use]
    pub const fn resolves_as(&self) -> Resolution {
        self.resolves_as
    }
}

/// Who is doing the pushing.
#[derive(Clone, Copy)]
pub enum Pusher<'a> {
    /// Direct player control rather than another entity.
    Environment,
    /// Another entity earlier in the push chain.
    Entity {
        /// Identifier of the pushing entity.
        id: EntityId,
        /// Read-only view of the pushing entity.
        entity: &'a (dyn Entity + 'static),
    },
}

impl<'a> Pusher<'a> {
    /// Reports whether the push came straight from the player.
    #[must_use]
    pub const fn is_environment(&self) -> bool {
        matches!(self, Self::Environment)
    }

    /// Identifier of the pushing entity, if any.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        match self {
            Self::Environment => None,
            Self::Entity { id, .. } => Some(*id),
        }
    }

    /// The pushing entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&'a (dyn Entity + 'static)> {
        match self {
            Self::Environment => None,
            Self::Entity { entity, .. } => Some(*entity),
        }
    }

    /// Reports whether the pusher is an entity of concrete type `T`.
    #[must_use]
    pub fn is<T: Entity>(&self) -> bool {
        self.entity().is_some_and(|entity| entity.is::<T>())
    }
}

impl fmt::Debug for Pusher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment"),
            Self::Entity { id, entity } => f
                .debug_struct("Entity")
                .field("id", id)
                .field("name", &entity.name())
                .finish(),
        }
    }
}

/// Name and facing shared by every entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    name: String,
    direction: Direction,
}

impl Profile {
    /// Creates a profile facing right, the default orientation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::facing(name, Direction::Right)
    }

    /// Creates a profile facing the provided direction.
    #[must_use]
    pub fn facing(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current facing.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Turns to face `direction`.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

/// Upcast helper so trait objects can be downcast to their concrete type.
pub trait AsAny: Any {
    /// Returns `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as mutable [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Anything that can occupy a grid cell.
///
/// Entities never learn their own location; the world is authoritative.
/// [`Entity::on_push`] is the only hook the world calls, and it receives no
/// world handle, so reactions cannot re-enter placement while a chain is
/// being resolved. Side effects that need the world are expressed as
/// [`Action::Custom`] and carried out by game code afterwards.
pub trait Entity: AsAny + fmt::Debug {
    /// Name and facing.
    fn profile(&self) -> &Profile;

    /// Mutable name and facing.
    fn profile_mut(&mut self) -> &mut Profile;

    /// Whether the default reaction moves the entity.
    fn is_pushable(&self) -> bool {
        false
    }

    /// Whether the entity's facing is visible and worth rotating.
    fn is_orientable(&self) -> bool {
        false
    }

    /// Decides what happens when the entity is pushed one step.
    fn on_push(&mut self, direction: Direction, pusher: Pusher<'_>) -> Action {
        let _ = (direction, pusher);
        if self.is_pushable() {
            Action::Move
        } else {
            Action::Stay
        }
    }

    /// Display name.
    fn name(&self) -> &str {
        self.profile().name()
    }

    /// Current facing.
    fn direction(&self) -> Direction {
        self.profile().direction()
    }

    /// Turns the entity to face `direction`.
    fn set_direction(&mut self, direction: Direction) {
        self.profile_mut().set_direction(direction);
    }
}

impl<'a> dyn Entity + 'a {
    /// Reports whether the entity is of concrete type `T`.
    #[must_use]
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to the concrete type `T`.
    #[must_use]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcasts to the concrete type `T`.
    #[must_use]
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Crate {
        profile: Profile,
    }

    impl Entity for Crate {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn profile_mut(&mut self) -> &mut Profile {
            &mut self.profile
        }

        fn is_pushable(&self) -> bool {
            true
        }
    }

    #[derive(Debug)]
    struct Pillar {
        profile: Profile,
    }

    impl Entity for Pillar {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn profile_mut(&mut self) -> &mut Profile {
            &mut self.profile
        }
    }

    #[test]
    fn default_reaction_follows_pushable_flag() {
        let mut crate_ = Crate {
            profile: Profile::new("Crate"),
        };
        let mut pillar = Pillar {
            profile: Profile::new("Pillar"),
        };

        assert_eq!(
            crate_.on_push(Direction::Left, Pusher::Environment),
            Action::Move
        );
        assert_eq!(
            pillar.on_push(Direction::Left, Pusher::Environment),
            Action::Stay
        );
    }

    #[test]
    fn custom_actions_resolve_to_their_base_outcome() {
        let action = Action::custom("score", Resolution::Consume);
        assert_eq!(action.resolution(), Resolution::Consume);
        match action {
            Action::Custom(effect) => assert_eq!(effect.tag(), "score"),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn pusher_type_checks_see_through_trait_objects() {
        let pillar = Pillar {
            profile: Profile::new("Pillar"),
        };
        let pusher = Pusher::Entity {
            id: EntityId::new(3),
            entity: &pillar,
        };

        assert!(pusher.is::<Pillar>());
        assert!(!pusher.is::<Crate>());
        assert_eq!(pusher.id(), Some(EntityId::new(3)));
        assert!(!Pusher::Environment.is::<Pillar>());
    }

    #[test]
    fn profile_defaults_to_facing_right() {
        let mut crate_ = Crate {
            profile: Profile::new("Crate"),
        };
        assert_eq!(crate_.direction(), Direction::Right);
        crate_.set_direction(Direction::Up);
        assert_eq!(crate_.direction(), Direction::Up);
        assert_eq!(crate_.name(), "Crate");
    }
}
