//! Push-chain resolution.

use log::debug;
use subjunctive_core::{Action, Direction, EntityId, Event, Location, Pusher, Resolution};

use crate::{World, WorldError};

/// What one link of a chain reports back to whoever pushed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    /// The pushed entity held its ground.
    Blocked,
    /// The pushed entity left its cell; the pusher may advance into it.
    Cleared(Resolution),
    /// The pushed entity left its cell and takes the pusher with it.
    Absorbed,
}

impl World {
    /// Pushes `entity` one step in `direction` under direct player control.
    ///
    /// The entity turns to face `direction` whether or not it moves. Each
    /// entity in the way is asked to react, deepest first, and occupancy only
    /// changes once a link has succeeded, so a chain that ends in
    /// [`Resolution::Stay`] leaves every cell as it was. Events are appended
    /// to `out_events` in resolution order.
    ///
    /// Fails with [`WorldError::NotFound`] when the entity is not placed.
    pub fn push(
        &mut self,
        entity: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<Resolution, WorldError> {
        let _ = self.locate(entity)?;
        if let Some(subject) = self.registry.get_mut(entity) {
            subject.set_direction(direction);
        }

        let resolution = match self.resolve_link(entity, direction, None, out_events)? {
            Link::Blocked => Resolution::Stay,
            Link::Cleared(resolution) => resolution,
            Link::Absorbed => Resolution::Consume,
        };
        debug!("push of {entity} {direction} resolved as {resolution:?}");
        Ok(resolution)
    }

    fn resolve_link(
        &mut self,
        entity: EntityId,
        direction: Direction,
        pusher: Option<EntityId>,
        out_events: &mut Vec<Event>,
    ) -> Result<Link, WorldError> {
        let at = self.locate(entity)?;
        let action = self.react(entity, direction, pusher)?;
        if let Action::Custom(effect) = action {
            out_events.push(Event::Effect {
                entity,
                pusher,
                at,
                tag: effect.tag(),
            });
        }

        match action.resolution() {
            Resolution::Stay => {
                out_events.push(Event::Blocked { entity, at });
                Ok(Link::Blocked)
            }
            Resolution::Vanish => {
                let at = self.remove(entity)?;
                out_events.push(Event::Vanished { entity, at });
                Ok(Link::Cleared(Resolution::Vanish))
            }
            Resolution::Consume => {
                let at = self.remove(entity)?;
                out_events.push(Event::Consumed { entity, at });
                if pusher.is_some() {
                    Ok(Link::Absorbed)
                } else {
                    Ok(Link::Cleared(Resolution::Consume))
                }
            }
            Resolution::Move => self.advance(entity, at, direction, out_events),
        }
    }

    fn advance(
        &mut self,
        entity: EntityId,
        from: Location,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<Link, WorldError> {
        let target = match from.adjacent(direction) {
            Ok(target) => target,
            Err(edge) => {
                debug!("{entity} blocked by the edge: {edge}");
                out_events.push(Event::Blocked { entity, at: from });
                return Ok(Link::Blocked);
            }
        };

        if let Some(next) = self.occupancy.occupant(target) {
            match self.resolve_link(next, direction, Some(entity), out_events)? {
                Link::Blocked => {
                    out_events.push(Event::Blocked { entity, at: from });
                    return Ok(Link::Blocked);
                }
                Link::Cleared(_) => {}
                Link::Absorbed => {
                    let at = self.remove(entity)?;
                    out_events.push(Event::Consumed { entity, at });
                    return Ok(Link::Cleared(Resolution::Consume));
                }
            }
        }

        let _ = self.remove(entity)?;
        self.place(entity, target)?;
        out_events.push(Event::Moved {
            entity,
            from,
            to: target,
        });
        Ok(Link::Cleared(Resolution::Move))
    }

    fn react(
        &mut self,
        entity: EntityId,
        direction: Direction,
        pusher: Option<EntityId>,
    ) -> Result<Action, WorldError> {
        if let Some(id) = pusher {
            if !self.registry.contains(id) {
                return Err(WorldError::UnknownEntity(id));
            }
        }

        let mut subject = self
            .registry
            .take(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        let action = {
            let pusher = pusher
                .and_then(|id| {
                    self.registry
                        .get(id)
                        .map(|entity| Pusher::Entity { id, entity })
                })
                .unwrap_or(Pusher::Environment);
            subject.on_push(direction, pusher)
        };
        self.registry.restore(entity, subject);
        Ok(action)
    }
}
