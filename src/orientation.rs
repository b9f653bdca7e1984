//! Pointer-driven orientation with slerp damping.
//!
//! The smoother never snaps: each update moves the current orientation a
//! fixed fraction of the remaining arc toward the pointer target.

use glam::{EulerRot, Quat, Vec2};

/// Pointer position in normalised device coordinates, `[-1, 1]` on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
}

impl PointerInput {
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for PointerInput {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Visible extent at the mesh plane, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent seen by a perspective camera `distance` units from the plane.
    pub fn from_perspective(fov_y_degrees: f32, distance: f32, aspect: f32) -> Self {
        let height = 2.0 * distance * (fov_y_degrees.to_radians() * 0.5).tan();
        Self::new(height * aspect, height)
    }
}

/// Tuning of [`OrientationSmoother`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherConfig {
    /// Radians per world unit of pointer travel.
    pub ratio: f32,
    /// Slerp factor applied per update.
    pub damping: f32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            ratio: 1.0 / 100.0,
            damping: 0.1,
        }
    }
}

impl SmootherConfig {
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmootherState {
    /// No mesh bound.
    Idle,
    Tracking { orientation: Quat },
}

/// Eases a bound mesh's orientation toward the pointer.
#[derive(Debug, Clone)]
pub struct OrientationSmoother {
    config: SmootherConfig,
    state: SmootherState,
}

impl Default for OrientationSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}

impl OrientationSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            state: SmootherState::Idle,
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    pub fn state(&self) -> SmootherState {
        self.state
    }

    /// Start tracking from `initial`.
    pub fn bind(&mut self, initial: Quat) {
        self.state = SmootherState::Tracking {
            orientation: initial.normalize(),
        };
    }

    pub fn unbind(&mut self) {
        self.state = SmootherState::Idle;
    }

    pub fn orientation(&self) -> Option<Quat> {
        match self.state {
            SmootherState::Idle => None,
            SmootherState::Tracking { orientation } => Some(orientation),
        }
    }

    /// Orientation the pointer asks for: pitch from `y`, yaw from `x`, no roll.
    pub fn target(&self, pointer: PointerInput, viewport: Viewport) -> Quat {
        let pitch = pointer.y * viewport.height * self.config.ratio;
        let yaw = pointer.x * viewport.width * self.config.ratio;
        Quat::from_euler(EulerRot::XYZ, pitch, yaw, 0.0)
    }

    /// Advance one frame. Returns the new orientation, or `None` when idle.
    pub fn update(&mut self, pointer: PointerInput, viewport: Viewport) -> Option<Quat> {
        let SmootherState::Tracking { orientation } = self.state else {
            return None;
        };
        let target = self.target(pointer, viewport);
        let next = orientation.slerp(target, self.config.damping);
        self.state = SmootherState::Tracking { orientation: next };
        Some(next)
    }
}
