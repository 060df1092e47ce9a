//! Geometry Query Service
//!
//! Статическая коллизионная геометрия уровня + swept-circle probe.
//! Чистая функция мира: без side effects, реентерабельна, детерминирована.
//! «Нет попадания» — это не ошибка, поэтому `Option`, а не `Result`.

use bevy::prelude::*;

/// Статическое препятствие уровня
#[derive(Debug, Clone, Copy)]
pub enum Obstacle {
    /// Колонна, бочка
    Circle { center: Vec2, radius: f32 },
    /// Стена, ящик (axis-aligned)
    Aabb { min: Vec2, max: Vec2 },
}

/// Результат probe: дистанция до контакта и нормаль поверхности
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub distance: f32,
    pub normal: Vec2,
}

/// Коллизионный слой уровня
///
/// Заполняется при загрузке сцены внешним кодом; симуляция только читает.
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleMap {
    obstacles: Vec<Obstacle>,
}

impl ObstacleMap {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Прямоугольная комната из четырёх стен толщиной `wall`
    pub fn room(min: Vec2, max: Vec2, wall: f32) -> Self {
        Self::new(vec![
            Obstacle::Aabb { min: Vec2::new(min.x - wall, min.y - wall), max: Vec2::new(max.x + wall, min.y) },
            Obstacle::Aabb { min: Vec2::new(min.x - wall, max.y), max: Vec2::new(max.x + wall, max.y + wall) },
            Obstacle::Aabb { min: Vec2::new(min.x - wall, min.y), max: Vec2::new(min.x, max.y) },
            Obstacle::Aabb { min: Vec2::new(max.x, min.y), max: Vec2::new(max.x + wall, max.y) },
        ])
    }

    /// Swept-circle cast: окружность радиуса `radius` из `origin` вдоль
    /// `direction` на `max_distance`. `radius == 0` вырождается в ray cast.
    ///
    /// Возвращает ближайший контакт. Нулевое направление → `None`
    /// (трактуем как «препятствий нет»).
    pub fn probe(
        &self,
        origin: Vec2,
        radius: f32,
        direction: Vec2,
        max_distance: f32,
    ) -> Option<ProbeHit> {
        let len = direction.length();
        if len < 1e-6 || max_distance <= 0.0 {
            return None;
        }
        let dir = direction / len;

        let mut best: Option<ProbeHit> = None;
        for obstacle in &self.obstacles {
            let hit = match *obstacle {
                Obstacle::Circle { center, radius: r } => {
                    sweep_vs_circle(origin, radius, dir, max_distance, center, r)
                }
                Obstacle::Aabb { min, max } => {
                    sweep_vs_aabb(origin, radius, dir, max_distance, min, max)
                }
            };
            if let Some(hit) = hit {
                if best.map_or(true, |b| hit.distance < b.distance) {
                    best = Some(hit);
                }
            }
        }
        best
    }
}

/// Swept circle vs circle = ray vs окружность, раздутая на радиус кружка
fn sweep_vs_circle(
    origin: Vec2,
    radius: f32,
    dir: Vec2,
    max_distance: f32,
    center: Vec2,
    obstacle_radius: f32,
) -> Option<ProbeHit> {
    let inflated = obstacle_radius + radius;
    let m = origin - center;
    let c0 = m.length_squared() - inflated * inflated;

    if c0 <= 0.0 {
        // Уже в контакте
        let normal = if m.length_squared() > 1e-12 { m.normalize() } else { -dir };
        return Some(ProbeHit { distance: 0.0, normal });
    }

    let b = m.dot(dir);
    let disc = b * b - c0;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t < 0.0 || t > max_distance {
        return None;
    }
    let contact = origin + dir * t;
    Some(ProbeHit {
        distance: t,
        normal: (contact - center) / inflated,
    })
}

/// Swept circle vs AABB = ray vs бокс, раздутый по Минковскому
/// (углы аппроксимируем квадратно — для steering-оценок достаточно)
fn sweep_vs_aabb(
    origin: Vec2,
    radius: f32,
    dir: Vec2,
    max_distance: f32,
    min: Vec2,
    max: Vec2,
) -> Option<ProbeHit> {
    let min = min - Vec2::splat(radius);
    let max = max + Vec2::splat(radius);

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = if axis == 0 {
            (origin.x, dir.x, min.x, max.x)
        } else {
            (origin.y, dir.y, min.y, max.y)
        };

        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let mut t1 = (lo - o) / d;
        let mut t2 = (hi - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_enter {
            t_enter = t1;
            // Нормаль смотрит против направления входа по этой оси
            normal = if axis == 0 {
                Vec2::new(-d.signum(), 0.0)
            } else {
                Vec2::new(0.0, -d.signum())
            };
        }
        t_exit = t_exit.min(t2);
    }

    if t_exit < t_enter {
        return None;
    }
    if t_enter < 0.0 {
        // Старт внутри раздутого бокса
        if t_exit > 0.0 {
            return Some(ProbeHit { distance: 0.0, normal: -dir });
        }
        return None;
    }
    if t_enter > max_distance {
        return None;
    }
    Some(ProbeHit { distance: t_enter, normal })
}
