//! Дистанционная классификация цели
//!
//! Все пороги профиля номинальные («от поверхности»); сравнение идёт
//! по effective range = nominal + радиусы обеих сторон, чтобы крупные
//! тела не ломали пороги срабатывания.

use crate::components::AgentProfile;

/// Номинальная дистанция → дистанция между центрами
#[inline]
pub fn effective(nominal: f32, agent_radius: f32, target_radius: f32) -> f32 {
    nominal + agent_radius + target_radius
}

/// Дистанционная зона цели относительно агента
///
/// Приоритет при пересечении зон: Melee > RangedBand > Chase > Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBucket {
    /// Цель в пределах удара
    Melee,
    /// Цель в кольце стрельбы [min, max]
    RangedBand,
    /// Цель обнаружена, но вне атакующих зон
    Chase,
    /// Цель вне радиуса обнаружения
    Idle,
}

/// Классификация по дистанции центров с учётом capability-флагов профиля
pub fn classify(
    distance: f32,
    profile: &AgentProfile,
    agent_radius: f32,
    target_radius: f32,
) -> RangeBucket {
    if distance > effective(profile.detect_range, agent_radius, target_radius) {
        return RangeBucket::Idle;
    }
    if profile.has_melee && distance <= effective(profile.melee_range, agent_radius, target_radius) {
        return RangeBucket::Melee;
    }
    if profile.has_ranged
        && distance >= effective(profile.ranged_min_range, agent_radius, target_radius)
        && distance <= effective(profile.ranged_max_range, agent_radius, target_radius)
    {
        return RangeBucket::RangedBand;
    }
    RangeBucket::Chase
}
