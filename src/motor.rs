//! Player-style motor driving an actor's velocity.
//!
//! Each fixed tick the motor turns input, gravity and wall contact into a
//! velocity, the actor moves by `velocity * dt` through its collision
//! resolver, and the motor then reacts to the resulting [`CollisionStatus`].

use bevy::prelude::*;

use crate::collision::CollisionStatus;
use crate::config::ControllerConfig;
use crate::intent::{DirectionalInput, JumpRequest};
use crate::raycast::sign;

/// Critically damped approach of `current` towards `target`.
///
/// `velocity` is the smoothing state and must be kept between calls. The
/// result never overshoots `target`.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if delta > 0.0 { (output - target) / delta } else { 0.0 };
    }

    output
}

/// Velocity state of a player-controlled actor.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(ControllerConfig, DirectionalInput, JumpRequest)]
pub struct ActorMotor {
    /// Current velocity (units/second).
    pub velocity: Vec2,
    velocity_x_smoothing: f32,
    wall_sliding: bool,
    wall_direction_x: f32,
    time_to_wall_unstick: f32,
}

impl ActorMotor {
    /// Whether the actor slid along a wall last tick.
    pub fn is_wall_sliding(&self) -> bool {
        self.wall_sliding
    }

    /// Side of the wall the actor last checked against (-1 = left).
    pub fn wall_direction(&self) -> f32 {
        self.wall_direction_x
    }

    /// Displacement for a tick of length `delta`.
    pub fn displacement(&self, delta: f32) -> Vec2 {
        self.velocity * delta
    }

    /// Smooth horizontal velocity towards the input and apply gravity.
    pub fn calculate_velocity(
        &mut self,
        config: &ControllerConfig,
        status: &CollisionStatus,
        input: Vec2,
        delta: f32,
    ) {
        let target_x = input.x * config.walking.move_speed;
        let smooth_time = if status.is_grounded() {
            config.walking.acceleration_time_grounded
        } else {
            config.walking.acceleration_time_airborne
        };

        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            delta,
        );
        self.velocity.y += config.jumping.gravity() * delta;
    }

    /// Cap the fall speed against a wall and keep the actor stuck to it for a
    /// short while when pushing away.
    pub fn handle_wall_sliding(
        &mut self,
        config: &ControllerConfig,
        status: &CollisionStatus,
        input: Vec2,
        delta: f32,
    ) {
        let walls = &config.wall_jumping;
        self.wall_direction_x = if status.left { -1.0 } else { 1.0 };
        self.wall_sliding = false;

        if !status.touches_wall() || status.is_grounded() || self.velocity.y >= 0.0 {
            return;
        }

        self.wall_sliding = true;
        self.velocity.y = self.velocity.y.max(-walls.wall_slide_speed_max);

        if self.time_to_wall_unstick > 0.0 {
            self.velocity_x_smoothing = 0.0;
            self.velocity.x = 0.0;
            if input.x != self.wall_direction_x && input.x != 0.0 {
                self.time_to_wall_unstick -= delta;
            } else {
                self.time_to_wall_unstick = walls.wall_stick_time;
            }
        } else {
            self.time_to_wall_unstick = walls.wall_stick_time;
        }
    }

    /// React to a jump press.
    pub fn on_jump_pressed(&mut self, config: &ControllerConfig, status: &CollisionStatus, input: Vec2) {
        if self.wall_sliding {
            let walls = &config.wall_jumping;
            let jump = if input.x == self.wall_direction_x {
                walls.climb
            } else if input.x == 0.0 {
                walls.hop
            } else {
                walls.leap
            };
            self.velocity = Vec2::new(-self.wall_direction_x * jump.x, jump.y);
        }

        if !status.is_grounded() {
            return;
        }

        let max_jump_velocity = config.jumping.max_jump_velocity();
        if status.sliding_down_max_slope {
            // Jumping into the slope does nothing.
            if input.x != -sign(status.slope_normal.x) {
                self.velocity = max_jump_velocity * status.slope_normal;
            }
        } else {
            self.velocity.y = max_jump_velocity;
        }
    }

    /// React to a jump release: cut the ascent for a shorter jump.
    pub fn on_jump_released(&mut self, config: &ControllerConfig) {
        self.velocity.y = self.velocity.y.min(config.jumping.min_jump_velocity());
    }

    /// Stop vertical motion on floor or ceiling contact. Sliding down a max
    /// slope keeps accelerating along it.
    pub fn respond_to_collisions(
        &mut self,
        config: &ControllerConfig,
        status: &CollisionStatus,
        delta: f32,
    ) {
        if !status.below && !status.above {
            return;
        }

        if status.sliding_down_max_slope {
            self.velocity.y += status.slope_normal.y * -config.jumping.gravity() * delta;
        } else {
            self.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> CollisionStatus {
        CollisionStatus {
            below: true,
            ..default()
        }
    }

    fn against_right_wall() -> CollisionStatus {
        CollisionStatus {
            right: true,
            ..default()
        }
    }

    #[test]
    fn smooth_damp_approaches_without_overshoot() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        let mut previous = value;

        for _ in 0..120 {
            value = smooth_damp(value, 8.0, &mut velocity, 0.1, DT);
            assert!(value >= previous);
            assert!(value <= 8.0);
            previous = value;
        }

        assert_abs_diff_eq!(value, 8.0, epsilon = 1e-2);
    }

    #[test]
    fn walking_accelerates_faster_on_the_ground() {
        let config = ControllerConfig::default();
        let mut on_ground = ActorMotor::default();
        let mut in_air = ActorMotor::default();

        on_ground.calculate_velocity(&config, &grounded(), Vec2::X, DT);
        in_air.calculate_velocity(&config, &CollisionStatus::default(), Vec2::X, DT);

        assert!(on_ground.velocity.x > in_air.velocity.x);
        assert!(in_air.velocity.x > 0.0);
        assert_abs_diff_eq!(on_ground.velocity.y, config.jumping.gravity() * DT);
    }

    #[test]
    fn jump_from_ground_and_cut_on_release() {
        let config = ControllerConfig::default();
        let mut motor = ActorMotor::default();

        motor.on_jump_pressed(&config, &grounded(), Vec2::ZERO);
        assert_abs_diff_eq!(motor.velocity.y, 20.0, epsilon = 1e-3);

        motor.on_jump_released(&config);
        assert_abs_diff_eq!(motor.velocity.y, 10.0, epsilon = 1e-3);

        // Releasing below the cut velocity changes nothing.
        motor.velocity.y = 4.0;
        motor.on_jump_released(&config);
        assert_eq!(motor.velocity.y, 4.0);
    }

    #[test]
    fn no_jump_in_the_air() {
        let config = ControllerConfig::default();
        let mut motor = ActorMotor::default();
        motor.velocity.y = -5.0;

        motor.on_jump_pressed(&config, &CollisionStatus::default(), Vec2::ZERO);
        assert_eq!(motor.velocity.y, -5.0);
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let config = ControllerConfig::default();
        let mut motor = ActorMotor::default();
        motor.velocity = Vec2::new(0.0, -10.0);

        motor.handle_wall_sliding(&config, &against_right_wall(), Vec2::ZERO, DT);

        assert!(motor.is_wall_sliding());
        assert_eq!(motor.wall_direction(), 1.0);
        assert_eq!(motor.velocity.y, -3.0);
    }

    #[test]
    fn wall_stick_holds_before_release() {
        let config = ControllerConfig::default();
        let status = against_right_wall();
        let away = Vec2::NEG_X;
        let mut motor = ActorMotor::default();
        motor.velocity = Vec2::new(-2.0, -1.0);

        // First contact arms the stick timer.
        motor.handle_wall_sliding(&config, &status, away, DT);
        motor.velocity = Vec2::new(-2.0, -1.0);
        motor.handle_wall_sliding(&config, &status, away, DT);

        assert_eq!(motor.velocity.x, 0.0);
        assert_abs_diff_eq!(motor.time_to_wall_unstick, 0.25 - DT, epsilon = 1e-6);
    }

    #[test]
    fn wall_jumps_depend_on_input() {
        let config = ControllerConfig::default();
        let status = against_right_wall();
        let sliding = || {
            let mut motor = ActorMotor::default();
            motor.velocity.y = -1.0;
            motor.handle_wall_sliding(&config, &status, Vec2::ZERO, DT);
            motor
        };

        let mut climb = sliding();
        climb.on_jump_pressed(&config, &status, Vec2::X);
        assert_eq!(climb.velocity, Vec2::new(-7.5, 16.0));

        let mut hop = sliding();
        hop.on_jump_pressed(&config, &status, Vec2::ZERO);
        assert_eq!(hop.velocity, Vec2::new(-8.5, 7.0));

        let mut leap = sliding();
        leap.on_jump_pressed(&config, &status, Vec2::NEG_X);
        assert_eq!(leap.velocity, Vec2::new(-18.0, 17.0));
    }

    #[test]
    fn max_slope_jump_follows_normal() {
        let config = ControllerConfig::default();
        let normal = Vec2::new(0.9, 0.2).normalize();
        let status = CollisionStatus {
            below: true,
            sliding_down_max_slope: true,
            slope_normal: normal,
            ..default()
        };

        let mut motor = ActorMotor::default();
        motor.on_jump_pressed(&config, &status, Vec2::ZERO);
        assert_abs_diff_eq!(motor.velocity.x, 20.0 * normal.x, epsilon = 1e-3);
        assert_abs_diff_eq!(motor.velocity.y, 20.0 * normal.y, epsilon = 1e-3);

        // Pushing into the slope blocks the jump.
        let mut blocked = ActorMotor::default();
        blocked.on_jump_pressed(&config, &status, Vec2::NEG_X);
        assert_eq!(blocked.velocity, Vec2::ZERO);
    }

    #[test]
    fn landing_stops_the_fall() {
        let config = ControllerConfig::default();
        let mut motor = ActorMotor::default();
        motor.velocity = Vec2::new(3.0, -12.0);

        motor.respond_to_collisions(&config, &grounded(), DT);
        assert_eq!(motor.velocity, Vec2::new(3.0, 0.0));

        motor.velocity.y = -12.0;
        motor.respond_to_collisions(&config, &CollisionStatus::default(), DT);
        assert_eq!(motor.velocity.y, -12.0);
    }

    #[test]
    fn sliding_keeps_accelerating_along_slope() {
        let config = ControllerConfig::default();
        let status = CollisionStatus {
            below: true,
            sliding_down_max_slope: true,
            slope_normal: Vec2::new(0.94, 0.34),
            ..default()
        };
        let mut motor = ActorMotor::default();
        motor.velocity.y = -6.0;

        motor.respond_to_collisions(&config, &status, DT);

        let expected = -6.0 + 0.34 * 50.0 * DT;
        assert_abs_diff_eq!(motor.velocity.y, expected, epsilon = 1e-3);
    }
}
