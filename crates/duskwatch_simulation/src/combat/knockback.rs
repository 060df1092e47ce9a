//! Принудительный отлёт от удара
//!
//! Пока компонент висит на entity, state machine вытеснен в Knockback
//! и обычное движение не работает. Отлёт идёт с фиксированной скоростью
//! до набора дистанции от точки старта; препятствие на пути обрывает
//! отлёт сразу, без смещения в этом тике.

use bevy::prelude::*;

use crate::components::BodyRadius;
use crate::logger;
use crate::world::ObstacleMap;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Knockback {
    /// Единичный вектор от источника удара к цели
    pub direction: Vec2,
    /// Полная дистанция отлёта (метры)
    pub distance: f32,
    /// Скорость отлёта (м/с)
    pub speed: f32,
    /// Позиция в момент удара; дистанция меряется от неё
    pub origin: Vec2,
}

pub fn apply_knockback(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Transform, &BodyRadius, &Knockback)>,
    map: Res<ObstacleMap>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, radius, knockback) in query.iter_mut() {
        let position = transform.translation.truncate();
        let travelled = position.distance(knockback.origin);
        let remaining = (knockback.distance - travelled).max(0.0);
        // Последний шаг укорачиваем до остатка: f32-накопление иначе
        // оставляет компонент висеть лишний тик
        let step = (knockback.speed * dt).min(remaining);

        if map.probe(position, radius.0, knockback.direction, step).is_some() {
            // Стена по курсу — обрыв без добора оставшейся дистанции
            commands.entity(entity).remove::<Knockback>();
            logger::log(&format!("💥 Knockback of {:?} stopped by obstacle", entity));
            continue;
        }

        let next = position + knockback.direction * step;
        transform.translation.x = next.x;
        transform.translation.y = next.y;

        if step >= remaining {
            commands.entity(entity).remove::<Knockback>();
        }
    }
}
