//! The single-threaded acquire / threshold / render / poll loop.
//!
//! All engine mutation happens here, between frames, by draining the control
//! events every surface has queued up. Surfaces never touch the engine.

use crate::source::{FrameSource, SourceMode};
use colorthresh_engine::{
    Direction, Edge, Frame, Mask, RangeMode, ThreshError, ThresholdConfig, ThresholdEngine,
    ThresholdSnapshot, Thresholded,
};
use std::thread;
use std::time::{Duration, Instant};

// How long a still-image session idles when nothing happened.
const STILL_POLL_INTERVAL: Duration = Duration::from_millis(10);
const STATS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    SetBound { slot: usize, edge: Edge, value: i32 },
    Cycle(Direction),
    Quit,
}

/// What a surface gets to show for one iteration.
pub struct SessionView<'a> {
    pub converted: &'a Frame,
    pub mask: &'a Mask,
    pub representation: &'static str,
    pub config: &'a ThresholdConfig,
    pub range_mode: RangeMode,
    pub mode: SourceMode,
}

/// A display that may also deliver control events.
pub trait Surface {
    fn render(&mut self, view: &SessionView<'_>) -> anyhow::Result<()>;

    /// Must not block for longer than a frame interval.
    fn poll_events(&mut self) -> Vec<ControlEvent>;

    fn is_open(&self) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Applied {
    changed: bool,
    quit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub snapshot: ThresholdSnapshot,
}

struct FrameStats {
    frames_in_window: u64,
    last_log: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames_in_window: 0,
            last_log: Instant::now(),
        }
    }

    fn tick(&mut self, engine: &ThresholdEngine) {
        self.frames_in_window += 1;
        if self.last_log.elapsed() >= STATS_INTERVAL {
            let bounds = engine.config().bounds();
            tracing::info!(
                frames_in_window = self.frames_in_window,
                colorspace = engine.current_representation_name(),
                lower = ?bounds.map(|b| b.low),
                upper = ?bounds.map(|b| b.high),
            );
            self.frames_in_window = 0;
            self.last_log = Instant::now();
        }
    }
}

pub struct Session {
    engine: ThresholdEngine,
    surfaces: Vec<Box<dyn Surface>>,
    mode: SourceMode,
    frames: u64,
    stats: FrameStats,
}

impl Session {
    pub fn new(engine: ThresholdEngine, surfaces: Vec<Box<dyn Surface>>) -> Self {
        Self {
            engine,
            surfaces,
            mode: SourceMode::Continuous,
            frames: 0,
            stats: FrameStats::new(),
        }
    }

    pub fn run(&mut self, source: &mut dyn FrameSource) -> anyhow::Result<SessionSummary> {
        self.mode = source.mode();
        match self.mode {
            SourceMode::Still => self.run_still(source)?,
            SourceMode::Continuous => self.run_continuous(source)?,
        }
        Ok(SessionSummary {
            frames: self.frames,
            snapshot: self.engine.snapshot(),
        })
    }

    // One frame, re-thresholded after every accepted change until quit.
    fn run_still(&mut self, source: &mut dyn FrameSource) -> anyhow::Result<()> {
        let frame = source
            .next_frame()
            .ok_or_else(|| ThreshError::SourceUnavailable("image source yielded no frame".into()))?;
        self.process_and_present(&frame)?;

        while !self.surfaces_closed() {
            let events = self.poll();
            if events.is_empty() {
                thread::sleep(STILL_POLL_INTERVAL);
                continue;
            }

            let applied = self.apply(events);
            if applied.changed {
                self.process_and_present(&frame)?;
            }
            if applied.quit {
                break;
            }
        }
        Ok(())
    }

    // Changes land on the next acquired frame; no explicit refresh.
    fn run_continuous(&mut self, source: &mut dyn FrameSource) -> anyhow::Result<()> {
        while let Some(frame) = source.next_frame() {
            self.process_and_present(&frame)?;

            let events = self.poll();
            let applied = self.apply(events);
            if applied.quit || (!self.surfaces.is_empty() && self.surfaces_closed()) {
                break;
            }
        }
        tracing::info!(frames = self.frames, "Stream finished");
        Ok(())
    }

    fn process_and_present(&mut self, frame: &Frame) -> anyhow::Result<()> {
        let Thresholded { converted, mask } = self.engine.process_frame(frame)?;
        self.frames += 1;
        self.stats.tick(&self.engine);

        let view = SessionView {
            converted: &converted,
            mask: &mask,
            representation: self
                .engine
                .current_representation()
                .label_for(converted.format),
            config: self.engine.config(),
            range_mode: self.engine.range_mode(),
            mode: self.mode,
        };
        for surface in self.surfaces.iter_mut().filter(|s| s.is_open()) {
            surface.render(&view)?;
        }
        Ok(())
    }

    fn poll(&mut self) -> Vec<ControlEvent> {
        self.surfaces
            .iter_mut()
            .flat_map(|surface| surface.poll_events())
            .collect()
    }

    fn apply(&mut self, events: Vec<ControlEvent>) -> Applied {
        let mut applied = Applied::default();
        for event in events {
            match event {
                ControlEvent::SetBound { slot, edge, value } => {
                    match self.engine.set_bound(slot, edge, value) {
                        Ok(()) => applied.changed = true,
                        Err(e) => tracing::warn!(error = %e, "Rejected bound change"),
                    }
                }
                ControlEvent::Cycle(direction) => {
                    self.engine.cycle_representation(direction);
                    applied.changed = true;
                }
                ControlEvent::Quit => applied.quit = true,
            }
        }
        applied
    }

    fn surfaces_closed(&self) -> bool {
        self.surfaces.iter().all(|s| !s.is_open())
    }
}
