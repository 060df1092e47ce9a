//! AI враждебных агентов: perception + state machine
//!
//! Решения принимаются в FixedUpdate до разрешения боевых эффектов
//! (SimulationSet::Decide), строго в порядке transitions → steering → attacks.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod fsm;
pub mod perception;

#[cfg(test)]
mod fsm_tests;

pub use fsm::AgentState;
pub use perception::{classify, effective, RangeBucket};

pub struct AgentAiPlugin;

impl Plugin for AgentAiPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AgentState>();

        app.add_systems(
            FixedUpdate,
            (fsm::agent_transitions, fsm::agent_steering, fsm::agent_attacks)
                .chain()
                .in_set(SimulationSet::Decide),
        );
    }
}
