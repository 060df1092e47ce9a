//! State machine враждебного агента
//!
//! Idle → Chase → MeleeAttack / RangedAttack, плюс вытесняющие
//! Knockback и Dead. Решения пересчитываются каждый тик из текущей
//! дистанции — «залипших» состояний нет, гистерезис даёт сглаживание
//! направления, а не sticky-состояния.
//!
//! Порядок систем внутри тика: transitions → steering → attacks.

use bevy::prelude::*;

use crate::combat::cooldown::AttackTimers;
use crate::combat::damage::DamageInflicted;
use crate::combat::knockback::Knockback;
use crate::combat::projectile::ProjectileFired;
use crate::components::{Agent, AgentProfile, AvoidanceProfile, BodyRadius, Heading, Health, Target};
use crate::logger;
use crate::steering::stuck::update_stuck;
use crate::steering::{approach_angle, steer, SteeringState};
use crate::world::ObstacleMap;
use crate::DeterministicRng;

use super::perception::{classify, effective, RangeBucket};

/// Состояние агента
///
/// Приоритет вытеснения: Dead > Knockback > дистанционные зоны.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum AgentState {
    #[default]
    Idle,
    Chase,
    MeleeAttack,
    RangedAttack,
    /// Принудительный отлёт от удара; управление забирает combat::knockback
    Knockback,
    Dead,
}

/// Пересчёт состояний из health, knockback-статуса и дистанции до цели
pub fn agent_transitions(
    mut agents: Query<(
        Entity,
        &Agent,
        &Transform,
        &BodyRadius,
        &AgentProfile,
        &Health,
        Option<&Knockback>,
        &mut AgentState,
    )>,
    targets: Query<(&Transform, &BodyRadius), With<Target>>,
) {
    let target = targets.iter().next();

    for (entity, agent, transform, radius, profile, health, knockback, mut state) in
        agents.iter_mut()
    {
        if *state == AgentState::Dead {
            continue;
        }
        if !health.is_alive() {
            set_state(&mut state, AgentState::Dead, entity);
            continue;
        }
        if knockback.is_some() {
            set_state(&mut state, AgentState::Knockback, entity);
            continue;
        }
        // Манекен воспринимает, но не действует
        if agent.is_dummy {
            set_state(&mut state, AgentState::Idle, entity);
            continue;
        }
        // Цели нет — решение не меняем, тик пропускаем
        let Some((target_transform, target_radius)) = target else {
            continue;
        };

        let distance = transform
            .translation
            .truncate()
            .distance(target_transform.translation.truncate());
        let next = match classify(distance, profile, radius.0, target_radius.0) {
            RangeBucket::Melee => AgentState::MeleeAttack,
            RangeBucket::RangedBand => AgentState::RangedAttack,
            RangeBucket::Chase => AgentState::Chase,
            RangeBucket::Idle => AgentState::Idle,
        };
        set_state(&mut state, next, entity);
    }
}

fn set_state(state: &mut Mut<AgentState>, next: AgentState, entity: Entity) {
    if **state != next {
        logger::log(&format!("🧠 Agent {:?}: {:?} -> {:?}", entity, **state, next));
        **state = next;
    }
}

/// Движение и ориентация
///
/// Направление считается во всех состояниях в радиусе обнаружения
/// (непрерывность сглаживания и stuck-детекции), но смещение применяется
/// только в Chase и в RangedAttack за пределами stop range.
pub fn agent_steering(
    mut agents: Query<
        (
            &mut Transform,
            &BodyRadius,
            &AgentProfile,
            &AvoidanceProfile,
            &AgentState,
            &mut SteeringState,
            &mut Heading,
        ),
        (With<Agent>, Without<Target>),
    >,
    targets: Query<(&Transform, &BodyRadius), With<Target>>,
    map: Res<ObstacleMap>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let Some((target_transform, target_radius)) = targets.iter().next() else {
        return;
    };
    let target_position = target_transform.translation.truncate();

    for (mut transform, radius, profile, avoidance, state, mut steering, mut heading) in
        agents.iter_mut()
    {
        match state {
            AgentState::Idle => {
                // Вне радиуса обнаружения застревание не копится
                steering.stuck_timer = 0.0;
                continue;
            }
            AgentState::Knockback | AgentState::Dead => continue,
            AgentState::Chase | AgentState::MeleeAttack | AgentState::RangedAttack => {}
        }

        let position = transform.translation.truncate();
        let to_target = target_position - position;
        let distance = to_target.length();
        let desired = to_target.normalize_or_zero();
        if desired == Vec2::ZERO {
            continue;
        }

        let move_direction = if avoidance.enabled {
            steering.tick_escape_cooldown(dt);
            update_stuck(&mut steering, avoidance, position, dt, &mut rng.rng);
            steer(&mut steering, avoidance, &map, position, radius.0, desired, dt)
        } else {
            desired
        };

        let moving = match state {
            AgentState::Chase => true,
            AgentState::RangedAttack => {
                !profile.hold_position_when_ranged
                    && distance > effective(profile.ranged_stop_range, radius.0, target_radius.0)
            }
            _ => false,
        };
        if moving && move_direction != Vec2::ZERO {
            let step = move_direction * profile.move_speed * dt;
            transform.translation += step.extend(0.0);
        }

        // При стрельбе доворачиваемся на саму цель, иначе — по ходу движения
        let (face, face_direction) = if *state == AgentState::RangedAttack {
            (profile.face_target_when_ranged, desired)
        } else {
            (profile.face_target, move_direction)
        };
        if face {
            heading.0 = approach_angle(heading.0, face_direction, profile.rotation_speed * dt);
        }
    }
}

/// Исполнение атак по готовности кулдаунов
///
/// Таймеры тикают всегда, независимо от состояния — перезарядка идёт
/// и во время погони. После атаки одного типа кулдаун другого
/// поднимается до пола (анти-чередование на границе зон).
pub fn agent_attacks(
    mut agents: Query<(
        Entity,
        &Agent,
        &Transform,
        &AgentProfile,
        &AgentState,
        &mut AttackTimers,
    )>,
    targets: Query<(Entity, &Transform), With<Target>>,
    mut damage_events: EventWriter<DamageInflicted>,
    mut projectile_events: EventWriter<ProjectileFired>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let target = targets.iter().next();

    for (entity, agent, transform, profile, state, mut timers) in agents.iter_mut() {
        timers.tick(dt);
        if agent.is_dummy {
            continue;
        }
        let Some((target_entity, target_transform)) = target else {
            continue;
        };
        let position = transform.translation.truncate();

        match state {
            AgentState::MeleeAttack if timers.melee.ready() => {
                damage_events.write(DamageInflicted {
                    target: target_entity,
                    amount: profile.melee_damage,
                    is_real: false,
                    knockback_distance: 0.0,
                    knockback_speed: 0.0,
                    source_position: position,
                });
                timers.melee.restart();
                timers.ranged.floor_remaining(profile.cross_cooldown_fraction);
                logger::log(&format!(
                    "🗡️ Agent {:?} melee hit for {}",
                    entity, profile.melee_damage
                ));
            }
            AgentState::RangedAttack if timers.ranged.ready() => {
                let aim = target_transform.translation.truncate() - position;
                let direction = aim.normalize_or_zero();
                if direction == Vec2::ZERO {
                    continue;
                }
                projectile_events.write(ProjectileFired {
                    shooter: entity,
                    origin: position,
                    direction,
                    damage: profile.ranged_damage,
                    speed: profile.projectile_speed,
                    penetrates: profile.projectile_penetrates,
                    penetrate_max: profile.projectile_penetrate_max,
                    penetrate_damage_scale: profile.projectile_penetrate_scale,
                });
                timers.ranged.restart();
                timers.melee.floor_remaining(profile.cross_cooldown_fraction);
                logger::log(&format!("🏹 Agent {:?} fired projectile", entity));
            }
            _ => {}
        }
    }
}
