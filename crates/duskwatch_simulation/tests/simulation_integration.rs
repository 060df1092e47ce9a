//! Интеграционный прогон симуляции
//!
//! Комната с препятствиями, цель, несколько агентов: длинный прогон
//! без паники, инварианты пулов, сходимость melee-агента к цели
//! в обход колонны.

use bevy::prelude::*;
use duskwatch_simulation::*;

fn build_room_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);

    let mut map = ObstacleMap::room(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 0.5);
    map.push(Obstacle::Circle {
        center: Vec2::new(2.5, 0.0),
        radius: 0.6,
    });
    app.insert_resource(map);
    app
}

fn check_invariants(app: &mut App, tick: usize) {
    let mut pools = app.world_mut().query::<(&Health, Option<&Armor>)>();
    for (health, armor) in pools.iter(app.world()) {
        assert!(
            health.current >= 0.0 && health.current <= health.max,
            "tick {}: health out of range: {:?}",
            tick,
            health
        );
        if let Some(armor) = armor {
            assert!(
                armor.current >= 0.0 && armor.current <= armor.max,
                "tick {}: armor out of range: {:?}",
                tick,
                armor
            );
        }
    }
}

#[test]
fn test_long_run_keeps_invariants() {
    let mut app = build_room_app(42);

    let target = app
        .world_mut()
        .spawn(target_bundle(Vec2::ZERO, 200.0, 0.2))
        .id();
    app.world_mut()
        .entity_mut(target)
        .insert(Armor::new(100.0, 0.5));

    app.world_mut()
        .spawn(agent_bundle(Vec2::new(7.0, 0.5), AgentProfile::ranged()));
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(-6.0, 6.0), AgentProfile::melee()));
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(6.0, -7.0), AgentProfile::melee()));

    // 20 секунд симуляции
    for tick in 0..1200 {
        advance_fixed(&mut app);
        if tick % 100 == 0 {
            check_invariants(&mut app, tick);
        }
    }
    check_invariants(&mut app, 1200);

    // Все агенты остались в комнате
    let mut agents = app.world_mut().query_filtered::<&Transform, With<Agent>>();
    for transform in agents.iter(app.world()) {
        let p = transform.translation;
        assert!(
            p.x.abs() <= 10.0 && p.y.abs() <= 10.0,
            "agent escaped the room: {:?}",
            p
        );
    }
}

#[test]
fn test_melee_agent_navigates_around_pillar() {
    let mut app = build_room_app(7);

    app.world_mut().spawn(target_bundle(Vec2::ZERO, 1000.0, 0.2));
    // Колонна (2.5, 0) r=0.6 точно между агентом и целью
    let agent = app
        .world_mut()
        .spawn(agent_bundle(
            Vec2::new(5.0, 0.0),
            AgentProfile {
                detect_range: 8.0,
                ..AgentProfile::melee()
            },
        ))
        .id();

    // 15 секунд: хватает и на обход, и на пару stuck-эпизодов при неудаче
    let mut reached = false;
    for _ in 0..900 {
        advance_fixed(&mut app);
        let position = app.world().get::<Transform>(agent).unwrap().translation;
        if position.truncate().length() < 1.0 {
            reached = true;
            break;
        }
    }

    assert!(reached, "agent never reached the target around the pillar");
}

#[test]
fn test_ranged_agent_keeps_firing_from_band() {
    let mut app = build_room_app(3);

    let target = app
        .world_mut()
        .spawn(target_bundle(Vec2::new(-5.0, 0.0), 1000.0, 0.2))
        .id();
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(0.0, 0.0), AgentProfile::ranged()));

    // 10 секунд при кулдауне 2.0 → минимум 3 попадания по стоячей цели
    for _ in 0..600 {
        advance_fixed(&mut app);
    }

    let health = app.world().get::<Health>(target).unwrap();
    let hits = (1000.0 - health.current) / 25.0;
    assert!(hits >= 3.0, "only {} ranged hits landed", hits);
}
