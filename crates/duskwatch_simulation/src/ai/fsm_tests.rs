//! Интеграционные тесты state machine на headless App

use bevy::prelude::*;

use crate::combat::cooldown::AttackTimers;
use crate::combat::damage::DamageInflicted;
use crate::combat::knockback::Knockback;
use crate::combat::projectile::ProjectileFired;
use crate::components::{AgentProfile, Health};
use crate::{advance_fixed, agent_bundle, create_headless_app, target_bundle};

use super::AgentState;

/// Melee-профиль с detect 8.0 для дистанционных сценариев
fn scout_profile() -> AgentProfile {
    AgentProfile {
        detect_range: 8.0,
        ..AgentProfile::melee()
    }
}

fn spawn_target(app: &mut App) -> Entity {
    app.world_mut().spawn(target_bundle(Vec2::ZERO, 100.0, 0.2)).id()
}

fn agent_state(app: &mut App, entity: Entity) -> AgentState {
    *app.world().get::<AgentState>(entity).unwrap()
}

#[test]
fn test_target_beyond_detect_range_is_ignored() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    // Радиусы 0.3 + 0.2 → effective detect = 8.5
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(10.0, 0.0), scout_profile()))
        .id();

    advance_fixed(&mut app);

    assert_eq!(agent_state(&mut app, agent), AgentState::Idle);
    // И агент не сдвинулся
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position.truncate(), Vec2::new(10.0, 0.0));
}

#[test]
fn test_target_inside_detect_range_triggers_chase() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(8.4, 0.0), scout_profile()))
        .id();

    advance_fixed(&mut app);

    assert_eq!(agent_state(&mut app, agent), AgentState::Chase);
}

#[test]
fn test_chase_closes_distance() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(5.0, 0.0), scout_profile()))
        .id();

    for _ in 0..60 {
        advance_fixed(&mut app);
    }

    let position = app.world().get::<Transform>(agent).unwrap().translation;
    // За секунду при скорости 1.5 дистанция сокращается заметно
    assert!(position.x < 4.0, "did not close in: {}", position.x);
    assert!(position.x > 0.0, "overshot the target: {}", position.x);
}

#[test]
fn test_melee_range_stops_and_attacks_after_cooldown() {
    let mut app = create_headless_app(1);
    let target = spawn_target(&mut app);
    // Дистанция 0.8 < effective melee 0.35 + 0.3 + 0.2 = 0.85
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(0.8, 0.0), scout_profile()))
        .id();

    advance_fixed(&mut app);
    assert_eq!(agent_state(&mut app, agent), AgentState::MeleeAttack);

    // Свежий агент не готов бить: полный кулдаун 1.0с
    let before = app.world().get::<Health>(target).unwrap().current;
    assert_eq!(before, 100.0);

    for _ in 0..65 {
        advance_fixed(&mut app);
    }
    let after = app.world().get::<Health>(target).unwrap().current;
    assert_eq!(after, 90.0, "exactly one melee hit expected");

    // Позиция не изменилась: в melee-зоне агент стоит
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position.truncate(), Vec2::new(0.8, 0.0));
}

#[test]
fn test_ranged_band_fires_projectile() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    // ranged(): кольцо 3..8, радиусы дают effective 3.5..8.5
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(5.0, 0.0), AgentProfile::ranged()))
        .id();

    advance_fixed(&mut app);
    assert_eq!(agent_state(&mut app, agent), AgentState::RangedAttack);

    // Форсируем готовность и ловим выстрел
    app.world_mut()
        .get_mut::<AttackTimers>(agent)
        .unwrap()
        .ranged
        .remaining = 0.0;
    advance_fixed(&mut app);

    let events = app.world().resource::<Events<ProjectileFired>>();
    let mut cursor = events.get_cursor();
    let fired: Vec<_> = cursor.read(events).collect();
    assert_eq!(fired.len(), 1);
    assert!((fired[0].direction - (-Vec2::X)).length() < 1e-4, "aims at target");
    assert_eq!(fired[0].damage, 25.0);
}

#[test]
fn test_cross_cooldown_floors_other_attack() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(0.8, 0.0), AgentProfile::ranged()))
        .id();

    // Оба кулдауна готовы; агент в melee-зоне
    {
        let mut timers = app.world_mut().get_mut::<AttackTimers>(agent).unwrap();
        timers.melee.remaining = 0.0;
        timers.ranged.remaining = 0.0;
    }
    advance_fixed(&mut app);

    let timers = app.world().get::<AttackTimers>(agent).unwrap();
    // Melee ушёл в полный рестарт, ranged поднят до пола 0.5 × 2.0
    assert!(timers.melee.remaining > 0.9);
    assert!(
        timers.ranged.remaining >= 0.9,
        "ranged must be floored after melee: {}",
        timers.ranged.remaining
    );
}

#[test]
fn test_knockback_preempts_combat_states() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(0.8, 0.0), scout_profile()))
        .id();

    advance_fixed(&mut app);
    assert_eq!(agent_state(&mut app, agent), AgentState::MeleeAttack);

    app.world_mut().entity_mut(agent).insert(Knockback {
        direction: Vec2::X,
        distance: 1.0,
        speed: 10.0,
        origin: Vec2::new(0.8, 0.0),
    });
    advance_fixed(&mut app);

    assert_eq!(agent_state(&mut app, agent), AgentState::Knockback);

    // Отлёт закончился — агент возвращается к обычным решениям
    for _ in 0..10 {
        advance_fixed(&mut app);
    }
    assert_ne!(agent_state(&mut app, agent), AgentState::Knockback);
}

#[test]
fn test_dead_state_is_terminal() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(2.0, 0.0), scout_profile()))
        .id();

    app.world_mut().get_mut::<Health>(agent).unwrap().current = 0.0;
    advance_fixed(&mut app);
    assert_eq!(agent_state(&mut app, agent), AgentState::Dead);

    // Лечение постфактум не оживляет
    app.world_mut().get_mut::<Health>(agent).unwrap().current = 50.0;
    advance_fixed(&mut app);
    assert_eq!(agent_state(&mut app, agent), AgentState::Dead);

    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position.truncate(), Vec2::new(2.0, 0.0));
}

#[test]
fn test_dummy_perceives_but_never_acts() {
    let mut app = create_headless_app(1);
    let target = spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(0.8, 0.0), scout_profile()))
        .id();
    app.world_mut()
        .get_mut::<crate::components::Agent>(agent)
        .unwrap()
        .is_dummy = true;

    for _ in 0..120 {
        advance_fixed(&mut app);
    }

    assert_eq!(agent_state(&mut app, agent), AgentState::Idle);
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position.truncate(), Vec2::new(0.8, 0.0));
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 100.0);
}

#[test]
fn test_missing_target_freezes_decisions() {
    let mut app = create_headless_app(1);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(1.0, 0.0), scout_profile()))
        .id();

    for _ in 0..10 {
        advance_fixed(&mut app);
    }

    assert_eq!(agent_state(&mut app, agent), AgentState::Idle);
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position.truncate(), Vec2::new(1.0, 0.0));
}

#[test]
fn test_melee_attack_event_has_no_knockback() {
    let mut app = create_headless_app(1);
    spawn_target(&mut app);
    let agent = app
        .world_mut()
        .spawn(agent_bundle(Vec2::new(0.8, 0.0), scout_profile()))
        .id();

    app.world_mut()
        .get_mut::<AttackTimers>(agent)
        .unwrap()
        .melee
        .remaining = 0.0;
    advance_fixed(&mut app);

    let events = app.world().resource::<Events<DamageInflicted>>();
    let mut cursor = events.get_cursor();
    let inflicted: Vec<_> = cursor.read(events).collect();
    assert_eq!(inflicted.len(), 1);
    assert_eq!(inflicted[0].amount, 10.0);
    assert!(!inflicted[0].is_real);
    assert_eq!(inflicted[0].knockback_distance, 0.0);
}
