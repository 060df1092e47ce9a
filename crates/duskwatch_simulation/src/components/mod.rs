//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (Agent, Target, Health, Armor, BodyRadius, Heading)
//! - profile: конфигурация поведения (AgentProfile, AvoidanceProfile)

pub mod actor;
pub mod profile;

// Re-exports для удобного импорта
pub use actor::*;
pub use profile::*;
