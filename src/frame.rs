//! The per-frame update loop.
//!
//! One [`FrameDriver::tick`] per rendered frame: the animation driver writes
//! the material, the smoother writes the transform, and the returned
//! [`FrameUniforms`] is what the renderer uploads before drawing.

use crate::animation::{AnimationDriver, FrameClock, LiveParameters};
use crate::material::{MaterialState, MaterialUniforms};
use crate::orientation::{OrientationSmoother, PointerInput, SmootherConfig, Viewport};
use crate::scene::{Transform, TransformUniformData};

/// External inputs sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub pointer: PointerInput,
    pub viewport: Viewport,
}

/// Everything the renderer copies into uniform buffers for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub frame: u64,
    pub material: MaterialUniforms,
    pub transform: TransformUniformData,
}

/// Drives animation and orientation in a fixed order.
pub struct FrameDriver<C: FrameClock> {
    clock: C,
    animation: AnimationDriver,
    smoother: OrientationSmoother,
}

impl<C: FrameClock> FrameDriver<C> {
    pub fn new(clock: C, smoother: SmootherConfig) -> Self {
        Self {
            clock,
            animation: AnimationDriver::new(),
            smoother: OrientationSmoother::new(smoother),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn smoother(&self) -> &OrientationSmoother {
        &self.smoother
    }

    /// Bind or unbind the mesh through this handle.
    pub fn smoother_mut(&mut self) -> &mut OrientationSmoother {
        &mut self.smoother
    }

    pub fn frames(&self) -> u64 {
        self.animation.frames()
    }

    /// Run one frame and return the payload to upload.
    pub fn tick(
        &mut self,
        inputs: &FrameInputs,
        params: &LiveParameters,
        material: &mut MaterialState,
        transform: &mut Transform,
    ) -> FrameUniforms {
        self.animation.tick(&self.clock, params, material);
        if let Some(rotation) = self.smoother.update(inputs.pointer, inputs.viewport) {
            transform.rotation = rotation;
        }

        FrameUniforms {
            frame: self.animation.frames(),
            material: material.uniforms(),
            transform: transform.uniform_data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ManualClock;
    use glam::Quat;

    fn inputs(x: f32, y: f32) -> FrameInputs {
        FrameInputs {
            pointer: PointerInput::new(x, y),
            viewport: Viewport::new(40.0, 20.0),
        }
    }

    #[test]
    fn test_tick_writes_time_then_rotation() {
        let mut driver = FrameDriver::new(ManualClock::new(2.0), SmootherConfig::default());
        driver.smoother_mut().bind(Quat::IDENTITY);
        let mut material = MaterialState::default();
        let mut transform = Transform::default();

        let uniforms = driver.tick(
            &inputs(1.0, 0.0),
            &LiveParameters::default(),
            &mut material,
            &mut transform,
        );

        assert_eq!(uniforms.frame, 1);
        assert_eq!(uniforms.material.distortion.time, 2.0);
        assert_ne!(transform.rotation, Quat::IDENTITY);
        assert_eq!(uniforms.transform, transform.uniform_data());
    }

    #[test]
    fn test_unbound_mesh_keeps_rotation() {
        let mut driver = FrameDriver::new(ManualClock::default(), SmootherConfig::default());
        let mut material = MaterialState::default();
        let mut transform = Transform::default();
        for _ in 0..5 {
            driver.clock_mut().advance(0.1);
            driver.tick(
                &inputs(0.8, -0.4),
                &LiveParameters::default(),
                &mut material,
                &mut transform,
            );
        }
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(driver.frames(), 5);
        assert!((material.time() - 0.5).abs() < 1e-6);
    }
}
