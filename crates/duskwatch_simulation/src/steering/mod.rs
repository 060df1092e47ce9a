//! Context steering — локальный реактивный обход препятствий
//!
//! Алгоритм на тик:
//! 1. Активный escape bias (stuck recovery) → повернуть желаемое направление
//!    и вернуть сразу, без ранжирования.
//! 2. Probe вперёд по желаемому направлению.
//! 3. Веер из N кандидатов в конусе ±cone_angle; каждому — score по
//!    чистоте пути и выравниванию на цель; берём лучшего.
//! 4. Лобовой hit → подмешать wall-slide направление 50/50.
//! 5. Lerp желаемое → лучшее на avoidance_strength (допускаем overshoot),
//!    нормализовать.
//! 6. SmoothDamp к предыдущему сглаженному направлению.
//!
//! Глобального pathfinding нет: O(N) probe за тик, устойчивость в
//! захламлённых комнатах вместо оптимальности.

use bevy::prelude::*;

use crate::components::AvoidanceProfile;
use crate::world::ObstacleMap;

pub mod stuck;


// Score-константы ранжирования кандидатов
const SCORE_CLEAR: f32 = 100.0;
const SCORE_DISTANCE_WEIGHT: f32 = 60.0;
const SCORE_NEAR_PENALTY: f32 = 30.0;
const NEAR_FRACTION: f32 = 0.3;
const SCORE_ALIGNMENT_WEIGHT: f32 = 25.0;
const WALL_SLIDE_BLEND: f32 = 0.5;

/// Переходное состояние steering одного агента
///
/// Живёт между тиками; при выключенном avoidance не обновляется.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SteeringState {
    /// Сглаженное направление (хранится ненормализованным, SmoothDamp)
    pub smoothed_dir: Vec2,
    /// Скоростной член SmoothDamp
    pub smooth_velocity: Vec2,
    /// Накопленное время без прогресса (секунды)
    pub stuck_timer: f32,
    /// Подряд идущие stuck-эпизоды
    pub consecutive_stuck: u32,
    /// Активный escape-угол (радианы, 0 = нет bias)
    pub escape_angle: f32,
    /// Остаток действия escape bias (секунды)
    pub escape_cooldown: f32,
    /// Позиция последней stuck-проверки
    pub last_stuck_position: Vec2,
}

impl Default for SteeringState {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl SteeringState {
    pub fn at(position: Vec2) -> Self {
        Self {
            smoothed_dir: Vec2::X,
            smooth_velocity: Vec2::ZERO,
            stuck_timer: 0.0,
            consecutive_stuck: 0,
            escape_angle: 0.0,
            escape_cooldown: 0.0,
            last_stuck_position: position,
        }
    }

    pub fn tick_escape_cooldown(&mut self, dt: f32) {
        if self.escape_cooldown > 0.0 {
            self.escape_cooldown = (self.escape_cooldown - dt).max(0.0);
        }
    }
}

/// Направление движения на этот тик
///
/// `desired` — единичный вектор на цель; возвращается сглаженное
/// направление с учётом препятствий и активного escape bias.
pub fn steer(
    state: &mut SteeringState,
    profile: &AvoidanceProfile,
    map: &ObstacleMap,
    position: Vec2,
    body_radius: f32,
    desired: Vec2,
    dt: f32,
) -> Vec2 {
    // Escape bias активен — поворачиваем цель и пропускаем ранжирование
    if state.escape_angle != 0.0 && state.escape_cooldown > 0.0 {
        let biased = Vec2::from_angle(state.escape_angle).rotate(desired);
        return smooth(state, profile, biased, dt);
    }

    let forward_hit = map.probe(position, body_radius, desired, profile.lookahead);

    let mut best_direction = desired;
    let mut best_score = f32::MIN;
    let count = profile.probe_count.max(2);
    for i in 0..count {
        let t = i as f32 / (count - 1) as f32;
        let angle = -profile.cone_angle + t * 2.0 * profile.cone_angle;
        let candidate = Vec2::from_angle(angle).rotate(desired);
        let score = evaluate_direction(map, position, body_radius, candidate, desired, profile.lookahead);
        if score > best_score {
            best_score = score;
            best_direction = candidate;
        }
    }

    if let Some(hit) = forward_hit {
        if profile.wall_sliding {
            let slide = wall_slide_direction(desired, hit.normal);
            if slide != Vec2::ZERO {
                best_direction = best_direction.lerp(slide, WALL_SLIDE_BLEND).normalize_or_zero();
            }
        }
    }

    // strength > 1.0 — сознательный overshoot в сторону обхода
    let blended = desired
        .lerp(best_direction, profile.avoidance_strength)
        .normalize_or_zero();
    smooth(state, profile, blended, dt)
}

/// Score кандидата: чистый путь = 100, иначе доля lookahead × 60 со штрафом
/// за близкий контакт; плюс бонус выравнивания на цель
fn evaluate_direction(
    map: &ObstacleMap,
    position: Vec2,
    body_radius: f32,
    candidate: Vec2,
    desired: Vec2,
    lookahead: f32,
) -> f32 {
    let mut score = match map.probe(position, body_radius, candidate, lookahead) {
        None => SCORE_CLEAR,
        Some(hit) => {
            let mut s = hit.distance / lookahead * SCORE_DISTANCE_WEIGHT;
            if hit.distance < lookahead * NEAR_FRACTION {
                s -= SCORE_NEAR_PENALTY;
            }
            s
        }
    };
    score += (candidate.normalize_or_zero().dot(desired.normalize_or_zero()) + 1.0)
        * SCORE_ALIGNMENT_WEIGHT;
    score
}

/// Скольжение вдоль стены: проекция desired на плоскость контакта,
/// с разворотом если уводит от цели
fn wall_slide_direction(desired: Vec2, wall_normal: Vec2) -> Vec2 {
    let mut slide = desired - desired.dot(wall_normal) * wall_normal;
    if slide.length_squared() < 1e-8 {
        return Vec2::ZERO;
    }
    if slide.normalize().dot(desired) < -0.5 {
        slide = -slide;
    }
    slide.normalize()
}

fn smooth(state: &mut SteeringState, profile: &AvoidanceProfile, target_dir: Vec2, dt: f32) -> Vec2 {
    state.smoothed_dir = smooth_damp(
        state.smoothed_dir,
        target_dir,
        &mut state.smooth_velocity,
        profile.smoothing_time,
        dt,
    );
    state.smoothed_dir.normalize_or_zero()
}

/// Критически демпфированная пружина к `target` (аналог Vector2.SmoothDamp)
///
/// `velocity` — внутренний скоростной член, хранится между тиками.
pub fn smooth_damp(
    current: Vec2,
    target: Vec2,
    velocity: &mut Vec2,
    smooth_time: f32,
    dt: f32,
) -> Vec2 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    // Аппроксимация e^-x, устойчива при больших шагах
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    target + (change + temp) * exp
}

/// Плавный доворот угла к направлению `toward` (лерп по кратчайшей дуге)
pub fn approach_angle(current: f32, toward: Vec2, t: f32) -> f32 {
    if toward.length_squared() < 1e-6 {
        return current;
    }
    let target = toward.y.atan2(toward.x);
    let mut delta = (target - current) % std::f32::consts::TAU;
    if delta > std::f32::consts::PI {
        delta -= std::f32::consts::TAU;
    } else if delta < -std::f32::consts::PI {
        delta += std::f32::consts::TAU;
    }
    current + delta * t.clamp(0.0, 1.0)
}
