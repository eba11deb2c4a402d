pub mod animation;
pub mod components;
pub mod rng;

use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec2;
use instant::Instant;
use serde::Serialize;

use self::animation::{Animation, AnimationState};
use self::components::{Behavior, Canvas, Kinematics, RoamClock};
use self::rng::RandomSource;
use crate::systems::{self, behavior, movement};

/// Edge length of the square sprite in canvas units.
pub const SPRITE_SIZE: u32 = 100;
/// Horizontal spawn position.
const SPAWN_X: f32 = 100.0;

/// Whether a `width` x `height` canvas has room for the sprite.
pub fn canvas_fits(width: u32, height: u32) -> bool {
    width >= SPRITE_SIZE && height >= SPRITE_SIZE
}

/// The simulated pet: kinematics, current behavior and animation clock.
#[derive(Debug, Clone)]
pub struct Pet {
    pub kin: Kinematics,
    pub canvas: Canvas,
    pub behavior: Behavior,
    pub anim: AnimationState,
    pub roam: RoamClock,
}

impl Pet {
    /// Fresh pet standing on the floor of a `width` x `height` canvas.
    pub fn spawn(width: u32, height: u32, rng: &mut impl RandomSource) -> Self {
        let canvas = Canvas {
            width,
            height,
            sprite_size: SPRITE_SIZE,
        };
        Self {
            kin: Kinematics::at(Vec2::new(SPAWN_X, canvas.floor())),
            canvas,
            behavior: Behavior::Idle,
            anim: AnimationState::default(),
            roam: RoamClock::new(rng),
        }
    }

    /// Switch animation and load its motion preset.
    pub fn play(&mut self, animation: Animation) {
        self.anim.set(animation);
        movement::apply_preset(&mut self.kin, animation);
    }

    pub fn is_grabbed(&self) -> bool {
        matches!(self.behavior, Behavior::Grabbed)
    }

    pub fn on_floor(&self) -> bool {
        self.kin.pos.y >= self.canvas.floor()
    }

    pub fn snapshot(&self) -> PetSnapshot {
        PetSnapshot {
            x: self.kin.pos.x,
            y: self.kin.pos.y,
            animation: self.anim.clip,
            frame: self.anim.frame,
            is_grabbed: self.is_grabbed(),
        }
    }
}

/// What observers see of the pet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetSnapshot {
    pub x: f32,
    pub y: f32,
    pub animation: Animation,
    pub frame: u32,
    pub is_grabbed: bool,
}

/// Owns the pet and the random source its behavior draws from.
pub struct PetEngine<R = fastrand::Rng> {
    pet: Pet,
    rng: R,
}

impl PetEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_rng(width, height, fastrand::Rng::new())
    }
}

impl<R: RandomSource> PetEngine<R> {
    pub fn with_rng(width: u32, height: u32, mut rng: R) -> Self {
        let pet = Pet::spawn(width, height, &mut rng);
        Self { pet, rng }
    }

    #[cfg(test)]
    pub(crate) fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn snapshot(&self) -> PetSnapshot {
        self.pet.snapshot()
    }

    /// Advance one step of `dt` simulated seconds.
    pub fn tick(&mut self, dt: f32) {
        self.tick_at(dt, Instant::now());
    }

    /// Advance one step, measuring transition clocks against `now`.
    pub fn tick_at(&mut self, dt: f32, now: Instant) {
        systems::tick(&mut self.pet, dt, now, &mut self.rng);
    }

    /// Overwrite the position. Velocity, acceleration and animation are kept.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.pet.kin.pos = Vec2::new(x, y);
    }

    pub fn set_grabbed(&mut self, grabbed: bool) {
        if grabbed {
            behavior::grab(&mut self.pet);
        } else {
            behavior::release(&mut self.pet);
        }
    }

    /// Replace the pet with a fresh one on a new canvas.
    pub fn reconfigure(&mut self, width: u32, height: u32) {
        self.pet = Pet::spawn(width, height, &mut self.rng);
    }

    #[cfg(test)]
    pub(crate) fn pet_mut(&mut self) -> &mut Pet {
        &mut self.pet
    }
}

/// Cloneable handle shared by the tick driver and the HTTP handlers.
///
/// Every tick and command runs as one short critical section, so the two
/// never interleave mid-mutation.
#[derive(Clone)]
pub struct SharedPet {
    inner: Arc<Mutex<PetEngine>>,
}

impl SharedPet {
    pub fn new(engine: PetEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut PetEngine) -> T) -> T {
        // A panic mid-tick leaves the pet in a valid (if odd) state; keep going.
        let mut engine = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }

    pub fn snapshot(&self) -> PetSnapshot {
        self.with(|engine| engine.snapshot())
    }
}
