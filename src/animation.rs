//! Per-frame time update and live parameter pass-through.

use std::time::Instant;

use crate::error::UniformError;
use crate::material::{default_base_color, Color, MaterialState, UniformDomain, UniformKind, UniformValue};

/// Source of elapsed time, monotonic from session start.
pub trait FrameClock {
    fn elapsed_seconds(&self) -> f32;
}

/// Wall clock started at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn elapsed_seconds(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Explicitly driven clock for tests and headless runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    seconds: f32,
}

impl ManualClock {
    pub fn new(seconds: f32) -> Self {
        Self { seconds }
    }

    pub fn set(&mut self, seconds: f32) {
        self.seconds = seconds;
    }

    pub fn advance(&mut self, delta: f32) {
        self.seconds += delta;
    }
}

impl FrameClock for ManualClock {
    fn elapsed_seconds(&self) -> f32 {
        self.seconds
    }
}

/// One entry of the live parameter surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: UniformKind,
    pub domain: Option<UniformDomain>,
}

const PARAMETER_SPECS: [ParameterSpec; 6] = [
    ParameterSpec {
        name: "color",
        kind: UniformKind::Color,
        domain: None,
    },
    ParameterSpec {
        name: "metalness",
        kind: UniformKind::Float,
        domain: Some(UniformDomain::new(0.0, 1.0, 0.01)),
    },
    ParameterSpec {
        name: "roughness",
        kind: UniformKind::Float,
        domain: Some(UniformDomain::new(0.0, 1.0, 0.01)),
    },
    ParameterSpec {
        name: "distort_speed",
        kind: UniformKind::Float,
        domain: Some(UniformDomain::new(0.0, 10.0, 0.01)),
    },
    ParameterSpec {
        name: "distort_amplitude",
        kind: UniformKind::Float,
        domain: Some(UniformDomain::new(0.0, 5.0, 0.01)),
    },
    ParameterSpec {
        name: "distort_frequency",
        kind: UniformKind::Float,
        domain: Some(UniformDomain::new(0.0, 2.0, 0.01)),
    },
];

/// Values edited live from an external panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveParameters {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub distort_speed: f32,
    pub distort_amplitude: f32,
    pub distort_frequency: f32,
}

impl Default for LiveParameters {
    fn default() -> Self {
        Self {
            color: default_base_color(),
            metalness: 0.9,
            roughness: 0.5,
            distort_speed: 1.0,
            distort_amplitude: 1.0,
            distort_frequency: 0.5,
        }
    }
}

impl LiveParameters {
    /// The editable surface, in panel order.
    pub fn specs() -> &'static [ParameterSpec] {
        &PARAMETER_SPECS
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let value = match name {
            "color" => UniformValue::Color(self.color),
            "metalness" => UniformValue::Float(self.metalness),
            "roughness" => UniformValue::Float(self.roughness),
            "distort_speed" => UniformValue::Float(self.distort_speed),
            "distort_amplitude" => UniformValue::Float(self.distort_amplitude),
            "distort_frequency" => UniformValue::Float(self.distort_frequency),
            _ => return None,
        };
        Some(value)
    }

    /// Apply a panel edit by name. Values outside the domain are kept as given.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let slot = match (name, value) {
            ("color", UniformValue::Color(c)) => {
                self.color = c;
                return Ok(());
            }
            ("metalness", UniformValue::Float(_)) => &mut self.metalness,
            ("roughness", UniformValue::Float(_)) => &mut self.roughness,
            ("distort_speed", UniformValue::Float(_)) => &mut self.distort_speed,
            ("distort_amplitude", UniformValue::Float(_)) => &mut self.distort_amplitude,
            ("distort_frequency", UniformValue::Float(_)) => &mut self.distort_frequency,
            _ => {
                let spec = Self::specs()
                    .iter()
                    .find(|s| s.name == name)
                    .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
                return Err(UniformError::KindMismatch {
                    name: name.to_string(),
                    expected: spec.kind,
                    found: value.kind(),
                });
            }
        };
        if let UniformValue::Float(v) = value {
            *slot = v;
        }
        Ok(())
    }
}

/// Writes the clock and panel values into a [`MaterialState`] once per frame.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Overwrite `time` and the live-edited uniforms. No smoothing.
    pub fn tick<C: FrameClock + ?Sized>(
        &mut self,
        clock: &C,
        params: &LiveParameters,
        state: &mut MaterialState,
    ) {
        let time = clock.elapsed_seconds();
        state.set_time(time);
        state.set_distort_speed(params.distort_speed);
        state.set_distort_amplitude(params.distort_amplitude);
        state.set_distort_freq(params.distort_frequency);
        state.set_metalness(params.metalness);
        state.set_roughness(params.roughness);
        state.set_base_color(params.color);

        self.frames += 1;
        log::trace!("Animation frame {} at t={time:.3}s", self.frames);
    }
}
