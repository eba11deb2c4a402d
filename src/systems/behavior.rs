use instant::Instant;

use crate::pet::animation::Animation;
use crate::pet::components::{Behavior, Transition};
use crate::pet::rng::RandomSource;
use crate::pet::Pet;

/// Seconds a transition animation locks the pet.
const TRANSITION_DURATION: f32 = 1.0;
/// Nap length range in seconds.
const SLEEP_MIN: i32 = 5;
const SLEEP_MAX: i32 = 10;
/// Roam targets keep this far from either canvas edge.
const ROAM_MARGIN: i32 = 100;
/// Close enough to the roam target to stop walking.
const ARRIVE_DISTANCE: f32 = 10.0;
/// Chance a finished walk ends in a nap.
const NAP_CHANCE: f32 = 0.3;

/// Whether physics should run after the behavior step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Animation is locked this tick; skip integration.
    Hold,
    Integrate,
}

/// Advance the behavior state machine by one tick.
pub fn update(pet: &mut Pet, dt: f32, now: Instant, rng: &mut impl RandomSource) -> Step {
    match pet.behavior {
        Behavior::Grabbed => return Step::Hold,
        Behavior::Transitioning { kind, started } => {
            let elapsed = now.saturating_duration_since(started).as_secs_f32();
            if elapsed >= TRANSITION_DURATION {
                finish_transition(pet, kind, rng);
            }
            return Step::Hold;
        }
        Behavior::Sleeping { timer, duration } => {
            let timer = timer + dt;
            if timer >= duration {
                wake(pet, now);
            } else {
                pet.behavior = Behavior::Sleeping { timer, duration };
            }
            return Step::Hold;
        }
        Behavior::Idle | Behavior::Roaming { .. } | Behavior::Falling => {}
    }

    if matches!(pet.behavior, Behavior::Idle) {
        if pet.on_floor() {
            pet.roam.timer += dt;
            if pet.roam.timer >= pet.roam.cooldown {
                start_roaming(pet, rng);
            }
        } else {
            // Left hanging in mid-air (dropped by a drag, or a resize).
            pet.behavior = Behavior::Falling;
            pet.play(Animation::Falling);
        }
    }

    if let Behavior::Roaming { target_x } = pet.behavior {
        if (pet.kin.pos.x - target_x).abs() < ARRIVE_DISTANCE {
            arrive(pet, now, rng);
        }
    }

    Step::Integrate
}

/// Touched down after a fall.
pub fn land(pet: &mut Pet) {
    pet.behavior = Behavior::Idle;
    pet.play(Animation::Idle);
}

/// Take external control: cancel whatever was going on and freeze.
pub fn grab(pet: &mut Pet) {
    pet.behavior = Behavior::Grabbed;
    pet.play(Animation::Grabbed);
}

/// Hand control back. Mid-air releases start a gentle fall from rest.
pub fn release(pet: &mut Pet) {
    if pet.on_floor() {
        land(pet);
    } else {
        pet.behavior = Behavior::Falling;
        pet.play(Animation::Falling);
        pet.kin.vel.y = 0.0;
    }
}

fn start_roaming(pet: &mut Pet, rng: &mut impl RandomSource) {
    let hi = (pet.canvas.width as i32 - ROAM_MARGIN).max(ROAM_MARGIN);
    let drawn = rng.int_in(ROAM_MARGIN, hi) as f32;
    // Narrow canvases: keep the target somewhere the pet can actually reach.
    let target_x = drawn.min(pet.canvas.max_x()).max(0.0);

    let variants = if target_x > pet.kin.pos.x {
        Animation::WALKING_RIGHT
    } else {
        Animation::WALKING_LEFT
    };
    let walk = variants[rng.index(variants.len())];

    pet.behavior = Behavior::Roaming { target_x };
    pet.play(walk);
}

fn arrive(pet: &mut Pet, now: Instant, rng: &mut impl RandomSource) {
    let rest = Animation::RESTING[rng.index(Animation::RESTING.len())];
    pet.behavior = Behavior::Idle;
    pet.play(rest);
    pet.roam.reset(rng);

    if rng.unit() < NAP_CHANCE {
        go_to_sleep(pet, now);
    }
}

fn go_to_sleep(pet: &mut Pet, now: Instant) {
    begin(pet, Transition::IdleToSleep, now);
}

fn wake(pet: &mut Pet, now: Instant) {
    begin(pet, Transition::SleepToIdle, now);
}

fn begin(pet: &mut Pet, kind: Transition, now: Instant) {
    pet.behavior = Behavior::Transitioning { kind, started: now };
    pet.play(match kind {
        Transition::IdleToSleep => Animation::IdleToSleep,
        Transition::SleepToIdle => Animation::SleepToIdle,
    });
}

fn finish_transition(pet: &mut Pet, kind: Transition, rng: &mut impl RandomSource) {
    match kind {
        Transition::IdleToSleep => {
            pet.behavior = Behavior::Sleeping {
                timer: 0.0,
                duration: rng.int_in(SLEEP_MIN, SLEEP_MAX) as f32,
            };
            pet.play(Animation::Sleep);
        }
        Transition::SleepToIdle => {
            pet.behavior = Behavior::Idle;
            pet.play(Animation::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::rng::Scripted;

    #[test]
    fn narrow_canvas_roam_target_stays_reachable() {
        let mut rng = Scripted::new(&[0.0]);
        let mut pet = Pet::spawn(150, 600, &mut rng);
        pet.kin.pos.x = 0.0;
        let mut rng = Scripted::new(&[0.99, 0.0]);
        start_roaming(&mut pet, &mut rng);
        assert_eq!(pet.behavior, Behavior::Roaming { target_x: 50.0 });
        assert_eq!(pet.anim.clip, Animation::WalkRight);
    }

    #[test]
    fn walk_direction_follows_target() {
        let mut rng = Scripted::new(&[0.0]);
        let mut pet = Pet::spawn(800, 600, &mut rng);
        pet.kin.pos.x = 650.0;
        // Target draw 0.0 -> x = 100, variant 0.99 -> second left variant.
        let mut rng = Scripted::new(&[0.0, 0.99]);
        start_roaming(&mut pet, &mut rng);
        assert_eq!(pet.behavior, Behavior::Roaming { target_x: 100.0 });
        assert_eq!(pet.anim.clip, Animation::Walk);
        assert_eq!(pet.kin.vel.x, -2.0);
    }

    #[test]
    fn roaming_pet_in_the_air_does_not_fall() {
        let mut rng = Scripted::new(&[0.0]);
        let mut pet = Pet::spawn(800, 600, &mut rng);
        pet.kin.pos.y = 200.0;
        pet.behavior = Behavior::Roaming { target_x: 600.0 };
        pet.play(Animation::WalkRight);

        let step = update(&mut pet, 0.1, Instant::now(), &mut rng);
        assert_eq!(step, Step::Integrate);
        assert_eq!(pet.anim.clip, Animation::WalkRight);
    }

    #[test]
    fn transition_holds_physics_until_done() {
        let mut rng = Scripted::new(&[0.0]);
        let mut pet = Pet::spawn(800, 600, &mut rng);
        let now = Instant::now();
        go_to_sleep(&mut pet, now);

        assert_eq!(update(&mut pet, 0.1, now, &mut rng), Step::Hold);
        assert_eq!(pet.anim.clip, Animation::IdleToSleep);
    }
}
