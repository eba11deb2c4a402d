pub mod behavior;
pub mod movement;

use instant::Instant;

use crate::pet::components::Behavior;
use crate::pet::rng::RandomSource;
use crate::pet::Pet;
use behavior::Step;
use movement::Contact;

/// Run all simulation systems for one fixed tick.
pub fn tick(pet: &mut Pet, dt: f32, now: Instant, rng: &mut impl RandomSource) {
    // Held pets are entirely under external control.
    if pet.is_grabbed() {
        return;
    }

    // 1. Behavior state machine transitions
    let step = behavior::update(pet, dt, now, rng);

    // 2. Movement integration (velocity, bounds, floor)
    if step == Step::Integrate {
        let contact = movement::integrate(&mut pet.kin, &pet.canvas, dt);
        if contact == Contact::Floor && matches!(pet.behavior, Behavior::Falling) {
            behavior::land(pet);
        }
    }

    // 3. Animation clock (frozen while a transition plays)
    if !matches!(pet.behavior, Behavior::Transitioning { .. }) {
        pet.anim.advance(dt);
    }
}
