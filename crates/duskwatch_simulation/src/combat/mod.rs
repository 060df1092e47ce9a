//! Боевая подсистема: урон, броня, knockback, снаряды
//!
//! Схема данных: AI и снаряды пишут события, combat разрешает их в
//! мутации пулов. Снаряды летят в SimulationSet::Projectiles, разрешение
//! урона и knockback — в SimulationSet::Resolve, строго после решений AI.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod cooldown;
pub mod damage;
pub mod knockback;
pub mod projectile;


pub use cooldown::{AttackCooldown, AttackTimers};
pub use damage::{
    absorb_damage, AbsorbOutcome, DamageApplied, DamageInflicted, EntityDied, LootDropRequest,
};
pub use knockback::Knockback;
pub use projectile::{Projectile, ProjectileFired, PROJECTILE_LIFETIME};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageInflicted>()
            .add_event::<DamageApplied>()
            .add_event::<EntityDied>()
            .add_event::<LootDropRequest>()
            .add_event::<ProjectileFired>();

        app.register_type::<AttackTimers>()
            .register_type::<Knockback>()
            .register_type::<Projectile>();

        app.add_systems(
            FixedUpdate,
            (projectile::spawn_projectiles, projectile::fly_projectiles)
                .chain()
                .in_set(SimulationSet::Projectiles),
        );

        app.add_systems(
            FixedUpdate,
            (damage::apply_damage, damage::handle_death, knockback::apply_knockback)
                .chain()
                .in_set(SimulationSet::Resolve),
        );
    }
}
