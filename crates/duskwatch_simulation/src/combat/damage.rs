//! Применение урона: armor mitigation, смерть, запуск knockback
//!
//! Единственная точка мутации health/armor — событие `DamageInflicted`.
//! Внешний код (и projectile-система) только пишет события.

use bevy::prelude::*;

use crate::ai::AgentState;
use crate::components::{Agent, Armor, Health};
use crate::logger;

use super::knockback::Knockback;

/// Запрос на нанесение урона
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageInflicted {
    pub target: Entity,
    pub amount: f32,
    /// true → урон идёт в health напрямую, минуя броню
    pub is_real: bool,
    /// 0.0 → без отбрасывания
    pub knockback_distance: f32,
    pub knockback_speed: f32,
    /// Откуда пришёл удар; задаёт направление отбрасывания
    pub source_position: Vec2,
}

/// Факт применения урона (для внешних слоёв: UI, звук, статистика)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageApplied {
    pub target: Entity,
    pub result: AbsorbOutcome,
}

/// Сущность умерла в этом тике
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
    pub position: Vec2,
}

/// Запрос внешнему слою на дроп лута с погибшего агента
#[derive(Event, Debug, Clone, Copy)]
pub struct LootDropRequest {
    pub entity: Entity,
    pub position: Vec2,
}

/// Как именно был поглощён урон
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum AbsorbOutcome {
    /// is_real: броня проигнорирована
    Real,
    /// Брони нет или она на нуле — весь урон в health
    Direct,
    /// Броня поглотила урон целиком
    ArmorAbsorbed,
    /// Броня пробита, перелив ушёл в health
    ArmorBroken { overflow: f32 },
}

/// Чистая функция поглощения: броня гасит `reduce_percentage` урона,
/// остаток списывается с брони, нехватка переливается в health
pub fn absorb_damage(
    health: &mut Health,
    armor: Option<&mut Armor>,
    amount: f32,
    is_real: bool,
) -> AbsorbOutcome {
    if is_real {
        health.take_damage(amount);
        return AbsorbOutcome::Real;
    }

    if let Some(armor) = armor {
        if armor.current > 0.0 {
            let damage_to_armor = amount * (1.0 - armor.reduce_percentage);
            if armor.current >= damage_to_armor {
                armor.current -= damage_to_armor;
                return AbsorbOutcome::ArmorAbsorbed;
            }
            let overflow = damage_to_armor - armor.current;
            armor.current = 0.0;
            health.take_damage(overflow);
            return AbsorbOutcome::ArmorBroken { overflow };
        }
    }

    health.take_damage(amount);
    AbsorbOutcome::Direct
}

/// Обработка `DamageInflicted`: мутация пулов, события смерти, knockback
pub fn apply_damage(
    mut events: EventReader<DamageInflicted>,
    mut targets: Query<(&mut Health, Option<&mut Armor>, &Transform, Option<&Agent>)>,
    mut commands: Commands,
    mut applied_events: EventWriter<DamageApplied>,
    mut died_events: EventWriter<EntityDied>,
) {
    for event in events.read() {
        let Ok((mut health, armor, transform, agent)) = targets.get_mut(event.target) else {
            // Цель уже деспавнута — событие устарело
            continue;
        };
        // Манекен: визуализацию попадания делает внешний слой, пулы не трогаем
        if agent.is_some_and(|a| a.is_dummy) {
            continue;
        }

        let was_alive = health.is_alive();
        let result = absorb_damage(
            &mut health,
            armor.map(Mut::into_inner),
            event.amount,
            event.is_real,
        );
        applied_events.write(DamageApplied {
            target: event.target,
            result,
        });

        let position = transform.translation.truncate();
        if was_alive && !health.is_alive() {
            died_events.write(EntityDied {
                entity: event.target,
                position,
            });
            continue;
        }

        // Knockback ставится только живым: труп не двигаем, даже если
        // смертельный удар был в прошлом тике
        if event.knockback_distance > 0.0 && health.is_alive() {
            let direction = (position - event.source_position).normalize_or_zero();
            // Источник совпал с целью — направление не определено, отбрасывания нет
            if direction != Vec2::ZERO {
                commands.entity(event.target).insert(Knockback {
                    direction,
                    distance: event.knockback_distance,
                    speed: event.knockback_speed,
                    origin: position,
                });
            }
        }
    }
}

/// Реакция на смерть: терминальное состояние, снятие knockback, лут
pub fn handle_death(
    mut died_events: EventReader<EntityDied>,
    agents: Query<&Agent>,
    mut states: Query<&mut AgentState>,
    mut commands: Commands,
    mut loot_events: EventWriter<LootDropRequest>,
) {
    for event in died_events.read() {
        if let Ok(mut state) = states.get_mut(event.entity) {
            *state = AgentState::Dead;
        }
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.remove::<Knockback>();
        }
        if agents.get(event.entity).is_ok() {
            loot_events.write(LootDropRequest {
                entity: event.entity,
                position: event.position,
            });
            logger::log_info(&format!("⚰️ Agent {:?} died at {:?}", event.entity, event.position));
        } else {
            logger::log_info(&format!("💀 Target {:?} died", event.entity));
        }
    }
}
