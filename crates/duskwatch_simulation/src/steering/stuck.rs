//! Stuck recovery: эвристика выхода из локальных тупиков
//!
//! Смещение меньше порога → копим stuck timer; по превышению времени
//! впрыскиваем случайный escape-угол со случайным знаком, эскалируя
//! амплитуду и длительность с каждым подряд идущим эпизодом.
//! При возобновлении движения таймер гасится быстрее, чем копился
//! (×3), чтобы короткие остановки не накапливали ложные эпизоды.

use bevy::prelude::*;
use rand::Rng;

use crate::components::AvoidanceProfile;
use crate::logger;

use super::SteeringState;

/// Множитель амплитуды не растёт после третьего эпизода
pub const STUCK_ESCALATION_CAP: u32 = 3;
/// Базовая длительность escape bias (секунды)
pub const ESCAPE_COOLDOWN_BASE: f32 = 0.5;
/// Прибавка длительности за каждый эпизод
pub const ESCAPE_COOLDOWN_PER_EPISODE: f32 = 0.3;
/// Во сколько раз быстрее таймер гасится при движении
pub const STUCK_DECAY_FACTOR: f32 = 3.0;
/// Остаточный таймер, ниже которого bias снимается
pub const STUCK_CLEAR_THRESHOLD: f32 = 0.2;

/// Один тик stuck-детектора
///
/// Вызывается только когда агент в состоянии, предполагающем движение.
pub fn update_stuck<R: Rng>(
    state: &mut SteeringState,
    profile: &AvoidanceProfile,
    position: Vec2,
    dt: f32,
    rng: &mut R,
) {
    let moved = position.distance(state.last_stuck_position);

    if moved < profile.stuck_threshold {
        state.stuck_timer += dt;
        if state.stuck_timer > profile.stuck_time_threshold {
            state.consecutive_stuck += 1;
            let base = rng.gen_range(profile.escape_angle_min..profile.escape_angle_max);
            let scale = state.consecutive_stuck.min(STUCK_ESCALATION_CAP) as f32;
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            state.escape_angle = base * scale * sign;
            state.escape_cooldown =
                ESCAPE_COOLDOWN_BASE + state.consecutive_stuck as f32 * ESCAPE_COOLDOWN_PER_EPISODE;
            state.stuck_timer = 0.0;
            state.last_stuck_position = position;
            logger::log(&format!(
                "🔄 Stuck episode #{}: escape {:.0}° for {:.1}s",
                state.consecutive_stuck,
                state.escape_angle.to_degrees(),
                state.escape_cooldown,
            ));
        }
    } else {
        state.consecutive_stuck = 0;
        // Быстрый спад вместо мгновенного сброса — короткие рывки
        // не должны стирать накопленное застревание целиком
        state.stuck_timer = (state.stuck_timer - dt * STUCK_DECAY_FACTOR).max(0.0);
        if state.stuck_timer <= STUCK_CLEAR_THRESHOLD {
            state.escape_angle = 0.0;
        }
        state.last_stuck_position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run_episode(
        state: &mut SteeringState,
        profile: &AvoidanceProfile,
        position: Vec2,
        rng: &mut ChaCha8Rng,
    ) {
        // 0.4с без движения при пороге 0.3с гарантирует срабатывание
        for _ in 0..4 {
            update_stuck(state, profile, position, 0.1, rng);
        }
    }

    #[test]
    fn test_no_bias_while_moving() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let profile = AvoidanceProfile::default();
        let mut state = SteeringState::at(Vec2::ZERO);

        for i in 0..50 {
            let position = Vec2::new(i as f32 * 0.1, 0.0);
            update_stuck(&mut state, &profile, position, 0.1, &mut rng);
        }
        assert_eq!(state.escape_angle, 0.0);
        assert_eq!(state.consecutive_stuck, 0);
    }

    #[test]
    fn test_stationary_agent_gets_escape_bias() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let profile = AvoidanceProfile::default();
        let mut state = SteeringState::at(Vec2::ZERO);

        run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);

        assert_eq!(state.consecutive_stuck, 1);
        let magnitude = state.escape_angle.abs();
        assert!(magnitude >= profile.escape_angle_min && magnitude <= profile.escape_angle_max);
        assert!((state.escape_cooldown - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_escalation_grows_angle_and_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let profile = AvoidanceProfile::default();
        let mut state = SteeringState::at(Vec2::ZERO);

        run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);
        let first_angle = state.escape_angle.abs();
        let first_cooldown = state.escape_cooldown;

        run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);
        run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);

        // Третий эпизод: минимум 3×min > максимум 1×max — рост гарантирован
        assert_eq!(state.consecutive_stuck, 3);
        assert!(state.escape_angle.abs() > first_angle);
        assert!(state.escape_cooldown > first_cooldown);
        assert!((state.escape_cooldown - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_escalation_magnitude_capped() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let profile = AvoidanceProfile::default();
        let mut state = SteeringState::at(Vec2::ZERO);

        for _ in 0..5 {
            run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);
        }

        assert_eq!(state.consecutive_stuck, 5);
        // Амплитуда остаётся в пределах 3× базового диапазона
        assert!(state.escape_angle.abs() <= profile.escape_angle_max * STUCK_ESCALATION_CAP as f32);
        // Длительность продолжает расти без кэпа
        assert!((state.escape_cooldown - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_movement_decays_timer_and_clears_bias() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let profile = AvoidanceProfile::default();
        let mut state = SteeringState::at(Vec2::ZERO);

        run_episode(&mut state, &profile, Vec2::ZERO, &mut rng);
        assert!(state.escape_angle != 0.0);

        // Полшага накопления, затем движение: спад ×3
        update_stuck(&mut state, &profile, Vec2::ZERO, 0.25, &mut rng);
        assert!(state.stuck_timer > 0.2);

        let mut position = Vec2::ZERO;
        for _ in 0..3 {
            position += Vec2::X; // крупный шаг, заведомо выше порога
            update_stuck(&mut state, &profile, position, 0.05, &mut rng);
        }

        assert_eq!(state.consecutive_stuck, 0);
        assert!(state.stuck_timer <= STUCK_CLEAR_THRESHOLD);
        assert_eq!(state.escape_angle, 0.0);
    }
}
