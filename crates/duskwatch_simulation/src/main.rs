//! Headless-прогон симуляции Duskwatch
//!
//! Комната с колоннами, цель в центре, пара агентов по углам.
//! Тикаем вручную: прогон воспроизводим бит-в-бит при одном seed.

use bevy::prelude::*;
use duskwatch_simulation::{
    advance_fixed, agent_bundle, create_headless_app, target_bundle, AgentProfile, AgentState,
    Obstacle, ObstacleMap,
};

fn main() {
    let seed = 42;
    println!("Starting Duskwatch headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    let mut map = ObstacleMap::room(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 0.5);
    map.push(Obstacle::Circle {
        center: Vec2::new(3.0, 0.0),
        radius: 0.6,
    });
    map.push(Obstacle::Aabb {
        min: Vec2::new(-4.0, 2.0),
        max: Vec2::new(-2.0, 3.0),
    });
    app.insert_resource(map);

    app.world_mut().spawn(target_bundle(Vec2::ZERO, 100.0, 0.2));
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(7.0, 1.0), AgentProfile::ranged()));
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(-6.0, 6.0), AgentProfile::melee()));
    app.world_mut()
        .spawn(agent_bundle(Vec2::new(6.0, -7.0), AgentProfile::melee()));

    // 20 секунд симуляции
    for tick in 0..1200 {
        advance_fixed(&mut app);

        if tick % 120 == 0 {
            let mut agents = app.world_mut().query::<(&Transform, &AgentState)>();
            print!("Tick {:4}:", tick);
            for (transform, state) in agents.iter(app.world()) {
                let p = transform.translation;
                print!("  [{:?} at ({:.1}, {:.1})]", state, p.x, p.y);
            }
            println!();
        }
    }

    println!("Simulation complete: 1200 ticks");
}
