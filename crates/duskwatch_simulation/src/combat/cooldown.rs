//! Кулдауны атак
//!
//! Таймеры тикают каждый тик независимо от состояния агента.
//! Свежезаспавненный агент не готов атаковать: первый удар происходит
//! через полный интервал.

use bevy::prelude::*;

/// Обратный отсчёт одной атаки
#[derive(Debug, Clone, Copy, Reflect)]
pub struct AttackCooldown {
    /// Остаток до готовности (секунды)
    pub remaining: f32,
    /// Полный интервал между атаками (секунды)
    pub interval: f32,
}

impl AttackCooldown {
    pub fn new(interval: f32) -> Self {
        Self {
            remaining: interval,
            interval,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn restart(&mut self) {
        self.remaining = self.interval;
    }

    /// Поднимает остаток минимум до `interval × fraction`
    ///
    /// Вызывается после атаки ДРУГОГО типа: гибридный агент на границе
    /// зон не может мгновенно чередовать удар и выстрел.
    pub fn floor_remaining(&mut self, fraction: f32) {
        self.remaining = self.remaining.max(self.interval * fraction);
    }
}

/// Пара кулдаунов агента
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AttackTimers {
    pub melee: AttackCooldown,
    pub ranged: AttackCooldown,
}

impl Default for AttackTimers {
    fn default() -> Self {
        Self {
            melee: AttackCooldown::new(1.0),
            ranged: AttackCooldown::new(2.0),
        }
    }
}

impl AttackTimers {
    pub fn from_profile(profile: &crate::components::AgentProfile) -> Self {
        Self {
            melee: AttackCooldown::new(profile.melee_cooldown),
            ranged: AttackCooldown::new(profile.ranged_cooldown),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.melee.tick(dt);
        self.ranged.tick(dt);
    }
}
