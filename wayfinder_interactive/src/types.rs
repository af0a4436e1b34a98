// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture input and interaction configuration.

use kurbo::Vec2;

/// Discrete state of a continuous gesture, as reported by a recognizer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Recognizer has not recognized anything yet.
    #[default]
    Possible,
    /// Gesture started.
    Began,
    /// Gesture moved.
    Changed,
    /// Gesture ended normally.
    Ended,
    /// Gesture was interrupted.
    Cancelled,
    /// Recognizer gave up on the gesture.
    Failed,
}

/// One gesture update.
///
/// `translation` is the displacement since the gesture began and `velocity` is
/// in points per second. `extent` is the distance that counts as a complete
/// transition, usually the width or height of the container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gesture {
    /// Current state.
    pub state: GestureState,
    /// Displacement since the gesture began.
    pub translation: Vec2,
    /// Velocity in points per second.
    pub velocity: Vec2,
    /// Displacement that corresponds to a progress of 1.
    pub extent: f64,
}

impl Gesture {
    /// A gesture update with no displacement or velocity.
    pub fn new(state: GestureState, extent: f64) -> Self {
        Self {
            state,
            translation: Vec2::ZERO,
            velocity: Vec2::ZERO,
            extent,
        }
    }

    /// Set the state.
    pub fn with_state(mut self, state: GestureState) -> Self {
        self.state = state;
        self
    }

    /// Set the translation.
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.translation = translation;
        self
    }

    /// Set the velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// How gestures map to transition progress and when they complete it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Direction of a completing gesture. Need not be normalized.
    pub axis: Vec2,
    /// Progress above which a released gesture finishes the transition.
    pub progress_threshold: f64,
    /// Velocity along the axis above which a released gesture finishes the transition.
    pub velocity_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            axis: Vec2::new(1.0, 0.0),
            progress_threshold: 0.5,
            velocity_threshold: 1000.0,
        }
    }
}

impl InteractionConfig {
    /// Component of `v` along the axis. Zero for a zero axis.
    pub fn along_axis(&self, v: Vec2) -> f64 {
        let length = self.axis.hypot();
        if length == 0.0 {
            return 0.0;
        }
        v.dot(self.axis) / length
    }

    /// Progress of `gesture` in `0.0..=1.0`.
    ///
    /// Displacement against the axis, or a non-positive extent, yields 0.
    pub fn progress(&self, gesture: &Gesture) -> f64 {
        if gesture.extent <= 0.0 {
            return 0.0;
        }
        (self.along_axis(gesture.translation) / gesture.extent).clamp(0.0, 1.0)
    }

    /// Whether a gesture released at `progress` with `velocity` completes the transition.
    pub fn should_finish(&self, progress: f64, velocity: Vec2) -> bool {
        self.along_axis(velocity) > self.velocity_threshold || progress > self.progress_threshold
    }
}

/// Where an [`InteractiveTransition`](crate::interaction::InteractiveTransition) stands.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum InteractionPhase {
    /// No gesture in flight.
    #[default]
    Idle,
    /// A transition is driven by the gesture.
    Driving {
        /// Last progress pushed to the interaction handle.
        progress: f64,
    },
    /// The gesture is forwarded to the fallback handler.
    Forwarding,
}

/// How the last gesture ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The driven transition ran to completion.
    Finished,
    /// The driven transition was reverted.
    Cancelled,
    /// No transition could be driven; the gesture went to the fallback.
    Forwarded,
}
