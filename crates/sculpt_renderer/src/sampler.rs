//! Progressive accumulation across frames.
//!
//! Each frame is blended into a running mean, so the image converges as
//! frames accumulate. Any change to what the camera sees restarts the mean.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sculpt_core::{ConfigResult, FrameState, Scene, TraceParams};
use sculpt_math::Vec3;

use crate::camera::PinholeCamera;
use crate::material::Color;
use crate::renderer::{render_frame, ImageBuffer, RenderSettings};

/// Shared flag that abandons the frame in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Re-arm the token for the next frame.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Running mean after the `n`-th sample (`n >= 1`).
#[inline]
pub fn blend_mean(accum: Color, sample: Color, n: u32) -> Color {
    accum + (sample - accum) / n.max(1) as f32
}

/// Host-owned accumulation buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    buffer: ImageBuffer,
    frame_count: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
            frame_count: 0,
        }
    }

    /// Frames blended since the last reset.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Current mean image.
    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    /// Discard the mean, keeping the resolution.
    pub fn reset(&mut self) {
        self.buffer.pixels.fill(Color::ZERO);
        self.frame_count = 0;
    }

    /// Discard the mean and change the resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = ImageBuffer::new(width, height);
        self.frame_count = 0;
    }

    /// Blend one frame into the mean; returns the new frame count.
    ///
    /// A frame of a different size restarts the mean at that size.
    pub fn blend(&mut self, frame: &ImageBuffer) -> u32 {
        if frame.width != self.buffer.width || frame.height != self.buffer.height {
            self.resize(frame.width, frame.height);
        }
        self.frame_count += 1;
        let n = self.frame_count;
        for (accum, sample) in self.buffer.pixels.iter_mut().zip(&frame.pixels) {
            *accum = blend_mean(*accum, *sample, n);
        }
        n
    }
}

/// Why accumulation restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    SceneChanged,
    CameraChanged,
    Resized,
    SettingsChanged,
}

/// What a call to [`ProgressiveSampler::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerEvent {
    /// The accumulated image was stale and has been cleared.
    ConvergenceReset(ResetReason),
    /// A frame was blended in.
    Accumulated { frame_count: u32 },
    /// The frame limit is reached; no further frames are rendered.
    Converged { frame_count: u32 },
    /// The frame was cancelled; nothing was committed.
    Abandoned,
}

/// Inputs that invalidate the accumulated image when they change.
#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    revision: u64,
    camera: PinholeCamera,
    settings: RenderSettings,
}

impl ViewKey {
    fn reset_reason(&self, next: &ViewKey) -> Option<ResetReason> {
        if self.revision != next.revision {
            Some(ResetReason::SceneChanged)
        } else if (self.camera.image_width, self.camera.image_height)
            != (next.camera.image_width, next.camera.image_height)
        {
            Some(ResetReason::Resized)
        } else if self.camera != next.camera {
            Some(ResetReason::CameraChanged)
        } else if self.settings != next.settings {
            Some(ResetReason::SettingsChanged)
        } else {
            None
        }
    }
}

/// Drives frame dispatch and accumulation.
#[derive(Debug, Clone)]
pub struct ProgressiveSampler {
    settings: RenderSettings,
    view: Option<ViewKey>,
    /// Validated once per settings value, reseeded every frame
    params: Option<TraceParams>,
}

impl ProgressiveSampler {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            view: None,
            params: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Replace the settings; the next step restarts accumulation if they differ.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.params = None;
    }

    /// True once `max_frames` frames are accumulated.
    pub fn is_converged(&self, accum: &Accumulator) -> bool {
        self.settings.max_frames > 0 && accum.frame_count() >= self.settings.max_frames
    }

    /// Advance accumulation by at most one frame.
    ///
    /// `random_vector` is the frame's seed. Fails only if the settings do not
    /// produce valid trace parameters.
    pub fn step(
        &mut self,
        scene: &Scene,
        camera: &PinholeCamera,
        frame_state: FrameState,
        random_vector: Vec3,
        accum: &mut Accumulator,
        cancel: &CancelToken,
    ) -> ConfigResult<Vec<SamplerEvent>> {
        let mut events = Vec::new();

        let key = ViewKey {
            revision: scene.revision(),
            camera: *camera,
            settings: self.settings.clone(),
        };
        match self.view.as_ref().map(|view| view.reset_reason(&key)) {
            None => accum.resize(camera.image_width, camera.image_height),
            Some(Some(reason)) => {
                log::info!("Accumulation reset at frame {}: {:?}", frame_state.frame, reason);
                accum.resize(camera.image_width, camera.image_height);
                events.push(SamplerEvent::ConvergenceReset(reason));
            }
            Some(None) => {}
        }
        self.view = Some(key);

        if self.is_converged(accum) {
            events.push(SamplerEvent::Converged {
                frame_count: accum.frame_count(),
            });
            return Ok(events);
        }

        let params = match self.params {
            Some(params) => params.reseeded(random_vector),
            None => *self.params.insert(self.settings.trace_params(random_vector)?),
        };
        let Some(image) = render_frame(camera, scene, &params, &self.settings, cancel) else {
            log::debug!("Frame {} abandoned", frame_state.frame);
            events.push(SamplerEvent::Abandoned);
            return Ok(events);
        };

        let frame_count = accum.blend(&image);
        log::debug!("Frame {} accumulated ({} total)", frame_state.frame, frame_count);
        events.push(SamplerEvent::Accumulated { frame_count });

        if self.is_converged(accum) {
            log::info!("Converged after {} frames", frame_count);
            events.push(SamplerEvent::Converged { frame_count });
        }
        Ok(events)
    }
}
