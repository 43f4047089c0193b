//! Forwarding of world events to the host engine's fire-and-forget services.

use glam::Vec3;
use snare_core::{CreatureId, Event, ItemStack, TrapId};

/// Engine services the trap drives but never waits on.
pub trait HostEffects {
    /// Plays a sound at a world position.
    fn play_sound_at(&mut self, asset: &str, position: Vec3);

    /// Advertises the trap to creature AI.
    fn add_poi(&mut self, trap: TrapId);

    /// Withdraws the trap from creature AI.
    fn remove_poi(&mut self, trap: TrapId);

    /// Marks the trap's cached mesh as stale.
    fn invalidate_mesh(&mut self, trap: TrapId);

    /// Removes `quantity` units from the stack the player is holding.
    fn consume_held(&mut self, player: CreatureId, quantity: u32);

    /// Hands a stack to the player, dropping it at their feet if it does not fit.
    fn give_item(&mut self, player: CreatureId, stack: ItemStack);
}

/// Routes every side-effect event in `events` to `effects`.
pub fn dispatch<E: HostEffects + ?Sized>(events: &[Event], effects: &mut E) {
    for event in events {
        match event {
            Event::SoundRequested { asset, position } => effects.play_sound_at(asset, *position),
            Event::PoiAdded { trap } => effects.add_poi(*trap),
            Event::PoiRemoved { trap } => effects.remove_poi(*trap),
            Event::MeshInvalidated { trap } => effects.invalidate_mesh(*trap),
            Event::BaitPlaced { player, bait, .. } => effects.consume_held(*player, bait.quantity),
            Event::BaitReturned { player, bait, .. } => effects.give_item(*player, bait.clone()),
            _ => {}
        }
    }
}
