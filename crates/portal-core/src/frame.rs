//! Per-frame time propagation
//!
//! A failing frame step is reported as a [`FrameError`]; the host logs it and
//! the next frame runs normally.

use thiserror::Error;

use crate::clock::ElapsedTime;
use crate::state::SceneState;
use crate::uniforms::TimeDriven;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Uniform update failed: {0}")]
    Uniforms(String),
}

impl SceneState {
    /// Write `time` into every time-driven material
    pub fn sync_time(&mut self, time: ElapsedTime) {
        let materials: [&mut dyn TimeDriven; 2] = [&mut self.portal, &mut self.fireflies];
        for material in materials {
            material.set_time(time);
        }
    }
}
