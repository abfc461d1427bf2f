//! Inhabitants of the planet.

use subjunctive_core::{Action, Direction, Entity, Profile, Pusher, Resolution};

/// Effect tag reported when a receptor absorbs a recycle crate.
pub const FUEL: &str = "fuel";
/// Effect tag reported when a full receptor absorbs one more crate.
pub const CHARGED: &str = "charged";
/// Effect tag reported when a neutralizer cancels out a hazard.
pub const NEUTRALIZED: &str = "neutralized";
/// Effect tag reported when anything else touches a hazard.
pub const HAZARD: &str = "hazard";

/// Fuel a receptor holds before the next crate charges it.
pub const MAX_FUEL: u8 = 4;

macro_rules! profile_accessors {
    () => {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn profile_mut(&mut self) -> &mut Profile {
            &mut self.profile
        }
    };
}

/// The player-controlled cursor.
#[derive(Debug)]
pub struct Cursor {
    profile: Profile,
}

impl Cursor {
    /// Creates a cursor with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            profile: Profile::new(name),
        }
    }
}

impl Entity for Cursor {
    profile_accessors!();

    fn is_pushable(&self) -> bool {
        true
    }

    fn is_orientable(&self) -> bool {
        true
    }
}

/// Crate of recyclables that feeds receptors.
#[derive(Debug)]
pub struct Recycle {
    profile: Profile,
}

impl Recycle {
    /// Creates a recycle crate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: Profile::new("Recycle"),
        }
    }
}

impl Default for Recycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Recycle {
    profile_accessors!();

    fn is_pushable(&self) -> bool {
        true
    }
}

/// Stationary collector that fills up as recycle crates are pushed into it.
#[derive(Debug)]
pub struct Receptor {
    profile: Profile,
    fuel: u8,
}

impl Receptor {
    /// Creates an empty receptor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: Profile::new("Receptor"),
            fuel: 0,
        }
    }

    /// Fuel absorbed so far, between zero and [`MAX_FUEL`].
    #[must_use]
    pub const fn fuel(&self) -> u8 {
        self.fuel
    }
}

impl Default for Receptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Receptor {
    profile_accessors!();

    fn on_push(&mut self, _direction: Direction, pusher: Pusher<'_>) -> Action {
        if !pusher.is::<Recycle>() {
            return Action::Stay;
        }
        if self.fuel < MAX_FUEL {
            self.fuel += 1;
            Action::custom(FUEL, Resolution::Consume)
        } else {
            Action::custom(CHARGED, Resolution::Consume)
        }
    }
}

/// Toxic waste. Only a neutralizer may touch it.
#[derive(Debug)]
pub struct Hazard {
    profile: Profile,
}

impl Hazard {
    /// Creates a hazard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: Profile::new("Hazard"),
        }
    }
}

impl Default for Hazard {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Hazard {
    profile_accessors!();

    fn on_push(&mut self, _direction: Direction, pusher: Pusher<'_>) -> Action {
        if pusher.is::<Neutralizer>() {
            Action::custom(NEUTRALIZED, Resolution::Consume)
        } else {
            Action::custom(HAZARD, Resolution::Stay)
        }
    }
}

/// Left behind by a fully charged receptor; clears one hazard.
#[derive(Debug)]
pub struct Neutralizer {
    profile: Profile,
}

impl Neutralizer {
    /// Creates a neutralizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: Profile::new("Neutralizer"),
        }
    }
}

impl Default for Neutralizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Neutralizer {
    profile_accessors!();

    fn is_pushable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use subjunctive_core::EntityId;

    use super::*;

    fn pushed_by<'a>(entity: &'a (dyn Entity + 'static)) -> Pusher<'a> {
        Pusher::Entity {
            id: EntityId::new(0),
            entity,
        }
    }

    #[test]
    fn receptor_fills_then_charges() {
        let mut receptor = Receptor::new();
        let recycle = Recycle::new();
        for expected in 1..=MAX_FUEL {
            assert_eq!(
                receptor.on_push(Direction::Up, pushed_by(&recycle)),
                Action::custom(FUEL, Resolution::Consume)
            );
            assert_eq!(receptor.fuel(), expected);
        }
        assert_eq!(
            receptor.on_push(Direction::Up, pushed_by(&recycle)),
            Action::custom(CHARGED, Resolution::Consume)
        );
        assert_eq!(receptor.fuel(), MAX_FUEL);
    }

    #[test]
    fn receptor_ignores_everything_but_recycle() {
        let mut receptor = Receptor::new();
        let cursor = Cursor::new("Pilot");
        assert_eq!(
            receptor.on_push(Direction::Left, pushed_by(&cursor)),
            Action::Stay
        );
        assert_eq!(receptor.on_push(Direction::Left, Pusher::Environment), Action::Stay);
        assert_eq!(receptor.fuel(), 0);
    }

    #[test]
    fn hazard_is_only_safe_for_neutralizers() {
        let mut hazard = Hazard::new();
        let neutralizer = Neutralizer::new();
        let recycle = Recycle::new();
        assert_eq!(
            hazard
                .on_push(Direction::Down, pushed_by(&neutralizer))
                .resolution(),
            Resolution::Consume
        );
        assert_eq!(
            hazard.on_push(Direction::Down, pushed_by(&recycle)),
            Action::custom(HAZARD, Resolution::Stay)
        );
    }
}
