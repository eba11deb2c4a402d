use glam::Vec2;

use crate::pet::animation::Animation;
use crate::pet::components::{Canvas, Kinematics};

/// Step size the per-tick velocities are tuned for.
pub const NOMINAL_DT: f32 = 0.1;
/// Horizontal walk speed in canvas units per nominal tick.
const WALK_SPEED: f32 = 2.0;
/// Downward acceleration while falling. Gentler than real gravity.
pub const GRAVITY: f32 = 0.8;

/// What the pet touched during integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    Floor,
}

/// Load the velocity/acceleration preset for `animation`.
/// Transition animations have no preset and leave motion untouched.
pub fn apply_preset(kin: &mut Kinematics, animation: Animation) {
    match animation {
        Animation::WalkLeft | Animation::Walk => {
            kin.vel = Vec2::new(-WALK_SPEED, 0.0);
            kin.acc = Vec2::ZERO;
        }
        Animation::WalkRight | Animation::Walk2 => {
            kin.vel = Vec2::new(WALK_SPEED, 0.0);
            kin.acc = Vec2::ZERO;
        }
        Animation::Falling => {
            // Vertical speed carries over into the fall.
            kin.vel.x = 0.0;
            kin.acc = Vec2::new(0.0, GRAVITY);
        }
        Animation::Idle
        | Animation::Idle2
        | Animation::Clean
        | Animation::Clean2
        | Animation::Sleep
        | Animation::Grabbed => {
            kin.vel = Vec2::ZERO;
            kin.acc = Vec2::ZERO;
        }
        Animation::IdleToSleep | Animation::SleepToIdle => {}
    }
}

/// Euler-integrate one step of `dt` seconds, then keep the sprite on the canvas.
///
/// `x` is clamped without touching velocity; the pet simply stops at the
/// edge. Crossing the floor snaps `y` back onto it and kills vertical speed.
pub fn integrate(kin: &mut Kinematics, canvas: &Canvas, dt: f32) -> Contact {
    let steps = dt / NOMINAL_DT;

    kin.vel += kin.acc * steps;
    kin.pos += kin.vel * steps;

    // Not clamp(): max_x goes negative on a canvas narrower than the sprite.
    kin.pos.x = kin.pos.x.max(0.0).min(canvas.max_x());

    let floor = canvas.floor();
    if kin.pos.y > floor {
        kin.pos.y = floor;
        kin.vel.y = 0.0;
        return Contact::Floor;
    }
    Contact::None
}
