//! Duskwatch Simulation — headless-ядро поведения враждебных агентов
//!
//! Детерминированная симуляция на fixed timestep 60 Hz: context steering
//! с обходом препятствий, stuck recovery, state machine боя
//! (melee / ranged / knockback) и разрешение урона с бронёй.
//!
//! Ядро не знает о рендере и вводе: внешний слой (клиент) заполняет
//! `ObstacleMap`, спавнит агентов и цель, читает события
//! (`DamageInflicted`, `EntityDied`, `LootDropRequest`) и позиции.
//!
//! Архитектура: ECS (bevy), один FixedUpdate-тик =
//! Decide (AI) → Projectiles (полёт снарядов) → Resolve (урон, knockback).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod steering;
pub mod world;

pub use ai::{AgentAiPlugin, AgentState};
pub use combat::{CombatPlugin, DamageInflicted, EntityDied, Knockback, LootDropRequest};
pub use components::{
    Agent, AgentProfile, Armor, AvoidanceProfile, BodyRadius, Heading, Health, Target,
};
pub use steering::SteeringState;
pub use world::{Obstacle, ObstacleMap, ProbeHit};

/// Фазы одного FixedUpdate-тика, выполняются строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Решения AI: состояния, движение, запросы атак
    Decide,
    /// Полёт и коллизии снарядов
    Projectiles,
    /// Разрешение урона, смертей и knockback
    Resolve,
}

/// Детерминированный RNG симуляции
///
/// Один поток случайности на мир; одинаковый seed + одинаковые входы
/// дают бит-в-бит одинаковый прогон.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<DeterministicRng>()
            .init_resource::<ObstacleMap>();

        app.register_type::<Agent>()
            .register_type::<Target>()
            .register_type::<Health>()
            .register_type::<Armor>()
            .register_type::<BodyRadius>()
            .register_type::<Heading>()
            .register_type::<AgentProfile>()
            .register_type::<AvoidanceProfile>()
            .register_type::<SteeringState>();

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Decide,
                SimulationSet::Projectiles,
                SimulationSet::Resolve,
            )
                .chain(),
        );

        app.add_plugins((AgentAiPlugin, CombatPlugin));
    }
}

/// Headless-приложение для прогонов и тестов
pub fn create_headless_app(seed: u64) -> App {
    logger::init_logger();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(DeterministicRng::new(seed));
    app
}

/// Прогон одного fixed-тика вручную (тесты и пошаговые прогоны)
///
/// Ручной `run_schedule(FixedUpdate)` обходит Main-расписание, где Bevy
/// сам свопает буферы событий, поэтому свопаем здесь — иначе буферы
/// растут без ограничения на долгих прогонах.
pub fn advance_fixed(app: &mut App) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
    update_events(app.world_mut());
}

fn update_events(world: &mut World) {
    world.resource_mut::<Events<DamageInflicted>>().update();
    world.resource_mut::<Events<combat::DamageApplied>>().update();
    world.resource_mut::<Events<EntityDied>>().update();
    world.resource_mut::<Events<LootDropRequest>>().update();
    world.resource_mut::<Events<combat::ProjectileFired>>().update();
}

/// Полный набор компонентов враждебного агента
pub fn agent_bundle(position: Vec2, profile: AgentProfile) -> impl Bundle {
    (
        Transform::from_translation(position.extend(0.0)),
        Agent { is_dummy: false },
        Health::new(profile.max_health),
        BodyRadius(profile.body_radius),
        Heading::default(),
        AgentState::default(),
        SteeringState::at(position),
        combat::AttackTimers::from_profile(&profile),
        AvoidanceProfile::default(),
        profile,
    )
}

/// Цель симуляции (игрок со стороны внешнего слоя)
pub fn target_bundle(position: Vec2, max_health: f32, body_radius: f32) -> impl Bundle {
    (
        Transform::from_translation(position.extend(0.0)),
        Target,
        Health::new(max_health),
        BodyRadius(body_radius),
    )
}
