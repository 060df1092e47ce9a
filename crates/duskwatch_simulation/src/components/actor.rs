//! Базовые компоненты акторов: Agent, Target, Health, Armor

use bevy::prelude::*;

/// Враждебный агент под управлением симуляции
///
/// `is_dummy` — тренировочный манекен: воспринимает цель, но не двигается,
/// не атакует и не теряет health/armor от входящего урона.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Agent {
    pub is_dummy: bool,
}

/// Маркер цели (игрок или другая damageable сущность)
///
/// Entity принадлежит внешнему коду; симуляция читает только позицию и радиус,
/// а health/armor мутирует исключительно через `DamageInflicted`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Target;

/// Здоровье актора
///
/// Инвариант: 0.0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Броня с частичным поглощением урона
///
/// Инвариант: 0.0 ≤ current ≤ max.
/// `reduce_percentage` — доля входящего урона, которую броня гасит полностью;
/// остаток (`amount × (1 − reduce_percentage)`) списывается с брони,
/// а её нехватка переливается в health. Формула применяется в combat::damage.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Armor {
    pub current: f32,
    pub max: f32,
    pub reduce_percentage: f32,
}

impl Default for Armor {
    fn default() -> Self {
        Self::new(100.0, 0.5)
    }
}

impl Armor {
    pub fn new(max: f32, reduce_percentage: f32) -> Self {
        Self {
            current: max,
            max,
            reduce_percentage,
        }
    }

    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Радиус коллизии (метры)
///
/// Участвует в effective-range расчётах и swept-circle probe.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BodyRadius(pub f32);

impl Default for BodyRadius {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Ориентация актора (радианы, против часовой от +X)
///
/// Визуальный поворот спрайта делает внешний слой; симуляция хранит
/// сглаженный heading для face-target поведения.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Heading(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(50.0);
        assert_eq!(health.current, 50.0);

        health.take_damage(30.0);
        assert_eq!(health.current, 20.0);
        assert!(health.is_alive());

        health.take_damage(100.0); // Clamp к нулю
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_clamped() {
        let mut health = Health::new(50.0);
        health.take_damage(20.0);
        health.heal(100.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_armor_restore_clamped() {
        let mut armor = Armor::new(100.0, 0.5);
        armor.current = 90.0;
        armor.restore(50.0);
        assert_eq!(armor.current, 100.0);
    }
}
