//! Профили поведения агентов
//!
//! Вся настройка агента — плоский набор числовых/булевых параметров,
//! задаётся при спавне. Один параметризованный Agent вместо отдельных
//! классов melee/ranged: capability flags `has_melee` / `has_ranged`
//! включают соответствующие ветки state machine.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Боевой профиль агента (дистанции, урон, кулдауны)
///
/// Дистанции номинальные; сравнение с целью всегда идёт через
/// effective range = nominal + радиусы обеих сторон (ai::perception).
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AgentProfile {
    pub max_health: f32,
    pub move_speed: f32,
    pub body_radius: f32,

    /// Радиус обнаружения цели (метры)
    pub detect_range: f32,

    // --- Melee ---
    pub has_melee: bool,
    pub melee_range: f32,
    pub melee_damage: f32,
    /// Интервал между ударами (секунды)
    pub melee_cooldown: f32,

    // --- Ranged ---
    pub has_ranged: bool,
    /// Ближняя граница зоны стрельбы (внутри неё агент идёт в melee/chase)
    pub ranged_min_range: f32,
    /// Дальняя граница зоны стрельбы
    pub ranged_max_range: f32,
    pub ranged_cooldown: f32,
    pub ranged_damage: f32,
    pub projectile_speed: f32,
    /// Дистанция удержания при стрельбе в движении
    pub ranged_stop_range: f32,
    /// Снаряды проходят цели насквозь
    pub projectile_penetrates: bool,
    /// Максимум целей насквозь
    pub projectile_penetrate_max: u32,
    /// Множитель урона снаряда после каждого пробития
    pub projectile_penetrate_scale: f32,
    /// Разворачиваться к цели во время стрельбы
    pub face_target_when_ranged: bool,
    /// Стоять на месте во время стрельбы (иначе — держать stop range)
    pub hold_position_when_ranged: bool,

    // --- Ориентация ---
    pub face_target: bool,
    /// Скорость доворота heading (1/сек, лерп по углу)
    pub rotation_speed: f32,

    /// После атаки одного типа остаток кулдауна другого типа поднимается
    /// минимум до `cooldown × cross_cooldown_fraction` — агент не может
    /// мгновенно чередовать melee и ranged
    pub cross_cooldown_fraction: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::melee()
    }
}

impl AgentProfile {
    /// Рядовой melee-агент
    pub fn melee() -> Self {
        Self {
            max_health: 50.0,
            move_speed: 1.5,
            body_radius: 0.3,
            detect_range: 2.5,
            has_melee: true,
            melee_range: 0.35,
            melee_damage: 10.0,
            melee_cooldown: 1.0,
            has_ranged: false,
            ranged_min_range: 0.0,
            ranged_max_range: 0.0,
            ranged_cooldown: 2.0,
            ranged_damage: 0.0,
            projectile_speed: 0.0,
            ranged_stop_range: 0.0,
            projectile_penetrates: false,
            projectile_penetrate_max: 0,
            projectile_penetrate_scale: 0.7,
            face_target_when_ranged: true,
            hold_position_when_ranged: true,
            face_target: true,
            rotation_speed: 5.0,
            cross_cooldown_fraction: 0.5,
        }
    }

    /// Гибридный агент: melee вблизи, стрельба в диапазоне min..max
    pub fn ranged() -> Self {
        Self {
            max_health: 1000.0,
            move_speed: 2.0,
            body_radius: 0.3,
            detect_range: 8.0,
            has_melee: true,
            melee_range: 0.5,
            melee_damage: 20.0,
            melee_cooldown: 1.0,
            has_ranged: true,
            ranged_min_range: 3.0,
            ranged_max_range: 8.0,
            ranged_cooldown: 2.0,
            ranged_damage: 25.0,
            projectile_speed: 12.0,
            ranged_stop_range: 4.0,
            projectile_penetrates: false,
            projectile_penetrate_max: 0,
            projectile_penetrate_scale: 0.7,
            face_target_when_ranged: true,
            hold_position_when_ranged: true,
            face_target: true,
            rotation_speed: 5.0,
            cross_cooldown_fraction: 0.5,
        }
    }
}

/// Профиль локального обхода препятствий (context steering + stuck recovery)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AvoidanceProfile {
    /// false → двигаемся напрямую к цели, SteeringState не обновляется
    pub enabled: bool,

    /// Дальность probe вперёд и по конусу (метры)
    pub lookahead: f32,
    /// Полуугол конуса кандидатов (радианы)
    pub cone_angle: f32,
    /// Количество candidate-направлений (нечётное — центр конуса попадает в цель)
    pub probe_count: u32,
    /// Вес смещения к лучшему кандидату; > 1.0 допустим (overshoot)
    pub avoidance_strength: f32,
    /// Подмешивать wall-slide направление при лобовом hit
    pub wall_sliding: bool,
    /// Время сглаживания направления (SmoothDamp, секунды)
    pub smoothing_time: f32,

    // --- Stuck recovery ---
    /// Минимальное смещение за интервал, ниже которого копится stuck timer
    pub stuck_threshold: f32,
    /// Время «стояния» до впрыска escape bias (секунды)
    pub stuck_time_threshold: f32,
    /// Диапазон базового escape-угла (радианы); множится на счётчик застреваний
    pub escape_angle_min: f32,
    pub escape_angle_max: f32,
}

impl Default for AvoidanceProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            lookahead: 1.5,
            cone_angle: 90f32.to_radians(),
            probe_count: 13,
            avoidance_strength: 1.5,
            wall_sliding: true,
            smoothing_time: 0.15,
            stuck_threshold: 0.03,
            stuck_time_threshold: 0.3,
            escape_angle_min: 90f32.to_radians(),
            escape_angle_max: 150f32.to_radians(),
        }
    }
}
