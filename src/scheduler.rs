//! Frame scheduler driving the eye animation.
//!
//! Owns the animator and the frame sink. Ticks at the configured frame rate,
//! applies commands queued by the web interface between frames and publishes
//! a snapshot of the animator after every frame.

use crate::behaviour::Behaviour;
use crate::display::FrameSink;
use crate::eyes::{EyeAnimator, EyeCommand, EyeSnapshot, RandomSource};
use crate::render::{pack_pages, Orientation, Rasterizer, RenderError};
use rand::rngs::StdRng;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Host loop for one animator and one panel
pub struct FrameScheduler<S: FrameSink, R: RandomSource = StdRng> {
    eyes: EyeAnimator<R>,
    sink: S,
    behaviour: Behaviour,
    commands: mpsc::Receiver<EyeCommand>,
    snapshots: watch::Sender<EyeSnapshot>,
    raster: Rasterizer,
    orientation: Orientation,
    present_errors: u64,
}

impl<S: FrameSink, R: RandomSource> FrameScheduler<S, R> {
    /// Create a new scheduler
    pub fn new(
        eyes: EyeAnimator<R>,
        sink: S,
        behaviour: Behaviour,
        commands: mpsc::Receiver<EyeCommand>,
        snapshots: watch::Sender<EyeSnapshot>,
        orientation: Orientation,
    ) -> Self {
        let (width, height) = eyes.screen_size();
        Self {
            eyes,
            sink,
            behaviour,
            commands,
            snapshots,
            raster: Rasterizer::new(width.max(1) as u32, height.max(1) as u32),
            orientation,
            present_errors: 0,
        }
    }

    pub fn eyes(&self) -> &EyeAnimator<R> {
        &self.eyes
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn present_errors(&self) -> u64 {
        self.present_errors
    }

    /// Render and present one frame if the frame interval has elapsed
    ///
    /// Returns true when a frame reached the sink.
    pub fn render_frame(&mut self, now_ms: u64) -> bool {
        let Some(commands) = self.eyes.tick(now_ms) else {
            return false;
        };
        self.behaviour.update(&mut self.eyes, now_ms);

        self.raster.draw(&commands);
        if !self.orientation.is_identity() {
            self.raster.orient(self.orientation);
        }
        let buffer = pack_pages(self.raster.canvas());

        let presented = match self.sink.present(&buffer) {
            Ok(()) => true,
            Err(e) => {
                self.present_errors += 1;
                // Keep the log readable when the panel drops out
                if self.present_errors == 1 || self.present_errors % 500 == 0 {
                    tracing::error!(
                        "Failed to present frame ({} failures): {}",
                        self.present_errors,
                        e
                    );
                }
                false
            }
        };

        self.snapshots.send_replace(EyeSnapshot::from(&self.eyes));
        presented
    }

    /// Write the last rendered frame as PNG
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        self.raster.save_snapshot(path)
    }

    /// Run the frame loop until shutdown
    ///
    /// On shutdown the panel is blanked and released.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            "Frame scheduler started ({} ms per frame)",
            self.eyes.frame_interval_ms()
        );

        let started = Instant::now();
        let mut period_ms = self.eyes.frame_interval_ms();
        let mut interval = frame_interval(started, period_ms);

        loop {
            tokio::select! {
                deadline = interval.tick() => {
                    let now_ms = deadline.duration_since(started).as_millis() as u64;
                    self.render_frame(now_ms);
                }
                Some(command) = self.commands.recv() => {
                    command.apply(&mut self.eyes);

                    if self.eyes.frame_interval_ms() != period_ms {
                        period_ms = self.eyes.frame_interval_ms();
                        tracing::debug!("Frame interval changed to {} ms", period_ms);
                        interval = frame_interval(Instant::now(), period_ms);
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Frame scheduler shutting down");
                    break;
                }
            }
        }

        self.finish();
    }

    fn finish(&mut self) {
        if let Err(e) = self.sink.clear() {
            tracing::warn!("Failed to clear display: {}", e);
        }
        if let Err(e) = self.sink.shutdown() {
            tracing::warn!("Failed to shut down display: {}", e);
        }
        tracing::info!(
            "Frame scheduler stopped after {} frames",
            self.eyes.frames()
        );
    }
}

fn frame_interval(start: Instant, period_ms: u64) -> Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
