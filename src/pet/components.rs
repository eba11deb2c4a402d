use glam::Vec2;
use instant::Instant;

use super::rng::RandomSource;

/// Seconds of idle time before the pet goes for a walk, drawn per cycle.
const ROAM_COOLDOWN_MIN: i32 = 3;
const ROAM_COOLDOWN_MAX: i32 = 8;

/// Position, velocity and acceleration in canvas units (per nominal tick).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Top-left anchor of the sprite.
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
}

impl Kinematics {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
        }
    }
}

/// Drawing surface the pet lives on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub sprite_size: u32,
}

impl Canvas {
    /// Largest `y` the sprite may occupy.
    pub fn floor(&self) -> f32 {
        self.height as f32 - self.sprite_size as f32
    }

    /// Largest `x` the sprite may occupy.
    pub fn max_x(&self) -> f32 {
        self.width as f32 - self.sprite_size as f32
    }
}

/// Which timed animation is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    IdleToSleep,
    SleepToIdle,
}

/// What currently drives the pet. Each variant carries only the state it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    /// Standing on (or hovering above) the floor in a resting animation.
    Idle,
    /// Walking toward `target_x`.
    Roaming { target_x: f32 },
    Sleeping { timer: f32, duration: f32 },
    /// Input-locked animation bridging idle and sleep.
    Transitioning { kind: Transition, started: Instant },
    Falling,
    /// Under external control; ticks are no-ops.
    Grabbed,
}

/// Idle time accumulated toward the next walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoamClock {
    pub timer: f32,
    pub cooldown: f32,
}

impl RoamClock {
    pub fn new(rng: &mut impl RandomSource) -> Self {
        Self {
            timer: 0.0,
            cooldown: rng.int_in(ROAM_COOLDOWN_MIN, ROAM_COOLDOWN_MAX) as f32,
        }
    }

    /// Start a fresh cycle with a newly drawn cooldown.
    pub fn reset(&mut self, rng: &mut impl RandomSource) {
        *self = Self::new(rng);
    }
}
