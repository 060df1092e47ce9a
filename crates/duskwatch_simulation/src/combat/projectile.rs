//! Снаряды агентов
//!
//! Прямолинейный полёт с момента выстрела: без наведения и гравитации.
//! Попадание в цель конвертируется в `DamageInflicted` без knockback;
//! препятствие или истечение срока жизни деспавнит снаряд.

use bevy::prelude::*;

use crate::components::{BodyRadius, Target};
use crate::logger;
use crate::world::ObstacleMap;

use super::damage::DamageInflicted;

/// Срок жизни снаряда (секунды); страховка от улетевших в пустоту
pub const PROJECTILE_LIFETIME: f32 = 5.0;

/// Запрос на выстрел (пишет ai::fsm, читает spawn-система)
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileFired {
    pub shooter: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
    pub damage: f32,
    pub speed: f32,
    pub penetrates: bool,
    pub penetrate_max: u32,
    pub penetrate_damage_scale: f32,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub damage: f32,
    pub speed: f32,
    pub direction: Vec2,
    /// Оставшееся время жизни (секунды)
    pub lifetime: f32,

    // --- Пробитие ---
    /// false → деспавн после первого попадания
    pub penetrates: bool,
    /// Максимум целей насквозь
    pub penetrate_max: u32,
    /// Множитель урона после каждого пробития
    pub penetrate_damage_scale: f32,
    /// Уже пробитых целей
    pub pierced: u32,
    /// Последняя поражённая цель: защита от повторного попадания
    /// при пролёте сквозь неё
    pub last_hit: Option<Entity>,
}

impl Projectile {
    pub fn new(damage: f32, speed: f32, direction: Vec2) -> Self {
        Self {
            damage,
            speed,
            direction,
            lifetime: PROJECTILE_LIFETIME,
            penetrates: false,
            penetrate_max: 0,
            penetrate_damage_scale: 0.7,
            pierced: 0,
            last_hit: None,
        }
    }

    pub fn penetrating(mut self, max: u32, damage_scale: f32) -> Self {
        self.penetrates = true;
        self.penetrate_max = max;
        self.penetrate_damage_scale = damage_scale;
        self
    }
}

pub fn spawn_projectiles(mut commands: Commands, mut events: EventReader<ProjectileFired>) {
    for event in events.read() {
        let mut projectile = Projectile::new(event.damage, event.speed, event.direction);
        if event.penetrates {
            projectile = projectile.penetrating(event.penetrate_max, event.penetrate_damage_scale);
        }
        commands.spawn((
            Transform::from_translation(event.origin.extend(0.0)),
            projectile,
        ));
    }
}

/// Полёт, коллизии, срок жизни
pub fn fly_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile), Without<Target>>,
    targets: Query<(Entity, &Transform, &BodyRadius), With<Target>>,
    map: Res<ObstacleMap>,
    mut damage_events: EventWriter<DamageInflicted>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let target = targets.iter().next();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        let position = transform.translation.truncate();
        let step = projectile.speed * dt;

        // Снаряд — точка: probe с нулевым радиусом
        if map.probe(position, 0.0, projectile.direction, step).is_some() {
            commands.entity(entity).despawn();
            continue;
        }

        let next = position + projectile.direction * step;
        transform.translation.x = next.x;
        transform.translation.y = next.y;

        let Some((target_entity, target_transform, target_radius)) = target else {
            continue;
        };
        if projectile.last_hit == Some(target_entity) {
            continue;
        }
        if next.distance(target_transform.translation.truncate()) <= target_radius.0 {
            damage_events.write(DamageInflicted {
                target: target_entity,
                amount: projectile.damage,
                is_real: false,
                knockback_distance: 0.0,
                knockback_speed: 0.0,
                source_position: position,
            });
            logger::log(&format!(
                "🎯 Projectile {:?} hit target for {}",
                entity, projectile.damage
            ));

            if !projectile.penetrates || projectile.pierced + 1 >= projectile.penetrate_max {
                commands.entity(entity).despawn();
                continue;
            }
            projectile.pierced += 1;
            projectile.damage *= projectile.penetrate_damage_scale;
            projectile.last_hit = Some(target_entity);
        }
    }
}
