use serde::Serialize;

/// Simulated seconds each animation frame is shown for.
pub const FRAME_DURATION: f32 = 0.1;

/// Visual label of the pet. Serialized in snake_case for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    Idle,
    Idle2,
    Clean,
    Clean2,
    WalkLeft,
    Walk,
    WalkRight,
    Walk2,
    Sleep,
    Grabbed,
    Falling,
    IdleToSleep,
    SleepToIdle,
}

impl Animation {
    pub const ALL: [Animation; 13] = [
        Self::Idle,
        Self::Idle2,
        Self::Clean,
        Self::Clean2,
        Self::WalkLeft,
        Self::Walk,
        Self::WalkRight,
        Self::Walk2,
        Self::Sleep,
        Self::Grabbed,
        Self::Falling,
        Self::IdleToSleep,
        Self::SleepToIdle,
    ];

    /// Animations the pet settles into after a walk.
    pub const RESTING: [Animation; 4] = [Self::Idle, Self::Idle2, Self::Clean, Self::Clean2];
    /// Variants used when walking toward a target on the left.
    pub const WALKING_LEFT: [Animation; 2] = [Self::WalkLeft, Self::Walk];
    /// Variants used when walking toward a target on the right.
    pub const WALKING_RIGHT: [Animation; 2] = [Self::WalkRight, Self::Walk2];

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Idle2 => "idle2",
            Self::Clean => "clean",
            Self::Clean2 => "clean2",
            Self::WalkLeft => "walk_left",
            Self::Walk => "walk",
            Self::WalkRight => "walk_right",
            Self::Walk2 => "walk2",
            Self::Sleep => "sleep",
            Self::Grabbed => "grabbed",
            Self::Falling => "falling",
            Self::IdleToSleep => "idle_to_sleep",
            Self::SleepToIdle => "sleep_to_idle",
        }
    }

    /// Sprite file the client renders for this animation.
    pub fn sprite_file(self) -> &'static str {
        match self {
            Self::Idle | Self::Idle2 | Self::Clean | Self::Clean2 | Self::Grabbed => "idle.gif",
            Self::WalkLeft | Self::Walk | Self::Falling => "walking_negative.gif",
            Self::WalkRight | Self::Walk2 => "walking_positive.gif",
            Self::Sleep => "sleep.gif",
            Self::IdleToSleep => "idle_to_sleep.gif",
            Self::SleepToIdle => "sleep_to_idle.gif",
        }
    }
}

/// Current clip plus a frame counter driven by simulated time.
#[derive(Debug, Clone, Copy)]
pub struct AnimationState {
    pub clip: Animation,
    pub frame: u32,
    pub elapsed: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            clip: Animation::Idle,
            frame: 0,
            elapsed: 0.0,
        }
    }
}

impl AnimationState {
    /// Switch clips. Restarts the frame counter only if the clip changed.
    pub fn set(&mut self, clip: Animation) {
        if self.clip != clip {
            self.clip = clip;
            self.frame = 0;
            self.elapsed = 0.0;
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        // Small epsilon so 0.1 + 0.1 + ... doesn't lose a frame to rounding.
        while self.elapsed + 1e-4 >= FRAME_DURATION {
            self.elapsed -= FRAME_DURATION;
            self.frame = self.frame.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_wire_names() {
        for anim in Animation::ALL {
            let wire = serde_json::to_value(anim).unwrap();
            assert_eq!(wire, serde_json::Value::from(anim.label()));
        }
    }

    #[test]
    fn frames_advance_with_time_and_reset_on_clip_change() {
        let mut state = AnimationState::default();
        for _ in 0..5 {
            state.advance(0.1);
        }
        assert_eq!(state.frame, 5);

        // Same clip keeps counting.
        state.set(Animation::Idle);
        assert_eq!(state.frame, 5);

        state.set(Animation::WalkLeft);
        assert_eq!(state.frame, 0);
        state.advance(0.05);
        assert_eq!(state.frame, 0);
        state.advance(0.05);
        assert_eq!(state.frame, 1);
    }
}
