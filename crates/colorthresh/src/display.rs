//! Native windows: the converted frame, the mask, and a control panel.
//!
//! The panel is a gray button strip above six slider rows (low then high for
//! each channel). Hit-testing and drawing are plain functions over pixel
//! coordinates so they can be checked without a display.

use crate::config::DisplayConfig;
use crate::session::{ControlEvent, SessionView, Surface};
use colorthresh_engine::{ChannelBounds, Direction, Edge, Mask, CHANNEL_SLOTS, PIXEL_MAX};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub const PANEL_WIDTH: usize = 400;
pub const BUTTON_HEIGHT: usize = 50;
pub const ROW_HEIGHT: usize = 30;
pub const SLIDER_ROWS: usize = CHANNEL_SLOTS * 2;
pub const PANEL_HEIGHT: usize = BUTTON_HEIGHT + SLIDER_ROWS * ROW_HEIGHT;

const BUTTON_GRAY: u32 = 0x7f7f7f;
const TRACK: u32 = 0x202020;
const LOW_FILL: u32 = 0x3c78d8;
const HIGH_FILL: u32 = 0xd8783c;
const DIVIDER: u32 = 0x000000;

const ORIGINAL_TITLE: &str = "Original";
const THRESHOLDED_TITLE: &str = "Thresholded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelHit {
    Button,
    Slider { slot: usize, edge: Edge },
}

/// Maps a pointer position inside the panel to what it is over.
pub fn hit_test(x: f32, y: f32) -> Option<PanelHit> {
    if x < 0.0 || y < 0.0 || x >= PANEL_WIDTH as f32 || y >= PANEL_HEIGHT as f32 {
        return None;
    }
    let y = y as usize;
    if y < BUTTON_HEIGHT {
        return Some(PanelHit::Button);
    }
    let row = (y - BUTTON_HEIGHT) / ROW_HEIGHT;
    Some(PanelHit::Slider {
        slot: row / 2,
        edge: if row % 2 == 0 { Edge::Low } else { Edge::High },
    })
}

/// Pointer x to a bound value; positions past either end clamp.
pub fn slider_value(x: f32) -> i32 {
    let fraction = (x / (PANEL_WIDTH - 1) as f32).clamp(0.0, 1.0);
    (fraction * PIXEL_MAX as f32).round() as i32
}

fn slider_fill_width(value: u8) -> usize {
    (value as usize * PANEL_WIDTH + PIXEL_MAX as usize / 2) / PIXEL_MAX as usize
}

pub fn draw_panel(buf: &mut [u32], bounds: &[ChannelBounds; CHANNEL_SLOTS]) {
    for (y, line) in buf.chunks_exact_mut(PANEL_WIDTH).enumerate().take(PANEL_HEIGHT) {
        if y < BUTTON_HEIGHT {
            line.fill(BUTTON_GRAY);
            continue;
        }
        let row = (y - BUTTON_HEIGHT) / ROW_HEIGHT;
        // Thin divider on the top pixel of each row.
        if (y - BUTTON_HEIGHT) % ROW_HEIGHT == 0 {
            line.fill(DIVIDER);
            continue;
        }
        let (edge, fill) = if row % 2 == 0 {
            (Edge::Low, LOW_FILL)
        } else {
            (Edge::High, HIGH_FILL)
        };
        let filled = slider_fill_width(bounds[row / 2].get(edge));
        line[..filled].fill(fill);
        line[filled..].fill(TRACK);
    }
}

// (key, slot, edge, raise)
const BOUND_KEYS: [(Key, usize, Edge, bool); 12] = [
    (Key::A, 0, Edge::Low, true),
    (Key::Z, 0, Edge::Low, false),
    (Key::S, 1, Edge::Low, true),
    (Key::X, 1, Edge::Low, false),
    (Key::D, 2, Edge::Low, true),
    (Key::C, 2, Edge::Low, false),
    (Key::F, 0, Edge::High, true),
    (Key::V, 0, Edge::High, false),
    (Key::G, 1, Edge::High, true),
    (Key::B, 1, Edge::High, false),
    (Key::H, 2, Edge::High, true),
    (Key::N, 2, Edge::High, false),
];

const CYCLE_KEYS: [(Key, Direction); 4] = [
    (Key::Right, Direction::Forward),
    (Key::Up, Direction::Forward),
    (Key::Left, Direction::Backward),
    (Key::Down, Direction::Backward),
];

const QUIT_KEYS: [Key; 2] = [Key::Q, Key::Escape];

fn nudge(value: u8, step: u8, raise: bool) -> u8 {
    if raise {
        value.saturating_add(step)
    } else {
        value.saturating_sub(step)
    }
}

fn mask_to_u32(mask: &Mask, buf: &mut Vec<u32>) {
    buf.clear();
    buf.extend(mask.iter().map(|&g| {
        let g = g as u32;
        (g << 16) | (g << 8) | g
    }));
}

fn controls_title(representation: &str) -> String {
    format!("Controls - {representation} (click: next, right click: previous)")
}

pub struct WindowSurface {
    original: Option<Window>,
    thresholded: Option<Window>,
    controls: Window,
    panel: Vec<u32>,
    mask_buf: Vec<u32>,
    // Bounds as last rendered plus any changes this surface has requested since.
    bounds: [ChannelBounds; CHANNEL_SLOTS],
    key_step: u8,
    left_was_down: bool,
    right_was_down: bool,
    dragging: Option<(usize, Edge)>,
    open: bool,
}

impl WindowSurface {
    pub fn open(config: &DisplayConfig) -> anyhow::Result<Self> {
        let mut controls = Window::new(
            &controls_title("RGB"),
            PANEL_WIDTH,
            PANEL_HEIGHT,
            WindowOptions::default(),
        )?;
        controls.set_target_fps(config.target_fps);

        let bounds = [ChannelBounds::default(); CHANNEL_SLOTS];
        let mut panel = vec![0; PANEL_WIDTH * PANEL_HEIGHT];
        draw_panel(&mut panel, &bounds);
        controls.update_with_buffer(&panel, PANEL_WIDTH, PANEL_HEIGHT)?;

        Ok(Self {
            original: None,
            thresholded: None,
            controls,
            panel,
            mask_buf: Vec::new(),
            bounds,
            key_step: config.key_step,
            left_was_down: false,
            right_was_down: false,
            dragging: None,
            open: true,
        })
    }

    // Image windows are sized from the first frame they show.
    fn image_window<'a>(
        slot: &'a mut Option<Window>,
        title: &str,
        width: usize,
        height: usize,
    ) -> anyhow::Result<&'a mut Window> {
        let window = match slot.take() {
            Some(window) => window,
            None => Window::new(title, width, height, WindowOptions::default())?,
        };
        Ok(slot.insert(window))
    }

    fn windows(&self) -> impl Iterator<Item = &Window> + '_ {
        self.original
            .iter()
            .chain(self.thresholded.iter())
            .chain(std::iter::once(&self.controls))
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.windows().any(|w| w.is_key_pressed(key, KeyRepeat::No))
    }

    fn read_keys(&mut self, events: &mut Vec<ControlEvent>) {
        for (key, slot, edge, raise) in BOUND_KEYS {
            if self.key_pressed(key) {
                let value = nudge(self.bounds[slot].get(edge), self.key_step, raise);
                self.request_bound(slot, edge, value as i32, events);
            }
        }
        for (key, direction) in CYCLE_KEYS {
            if self.key_pressed(key) {
                events.push(ControlEvent::Cycle(direction));
            }
        }
        if QUIT_KEYS.iter().any(|&key| self.key_pressed(key)) {
            events.push(ControlEvent::Quit);
        }
    }

    fn read_mouse(&mut self, events: &mut Vec<ControlEvent>) {
        let left = self.controls.get_mouse_down(MouseButton::Left);
        let right = self.controls.get_mouse_down(MouseButton::Right);
        let pos = self.controls.get_mouse_pos(MouseMode::Discard);
        let left_clicked = left && !self.left_was_down;
        let right_clicked = right && !self.right_was_down;
        self.left_was_down = left;
        self.right_was_down = right;

        if !left {
            self.dragging = None;
        }
        let Some((x, y)) = pos else {
            return;
        };

        match hit_test(x, y) {
            Some(PanelHit::Button) if left_clicked => {
                events.push(ControlEvent::Cycle(Direction::Forward))
            }
            Some(PanelHit::Button) if right_clicked => {
                events.push(ControlEvent::Cycle(Direction::Backward))
            }
            Some(PanelHit::Slider { slot, edge }) if left_clicked => {
                self.dragging = Some((slot, edge));
            }
            _ => {}
        }

        if let Some((slot, edge)) = self.dragging {
            let value = slider_value(x);
            if value != self.bounds[slot].get(edge) as i32 {
                self.request_bound(slot, edge, value, events);
            }
        }
    }

    fn request_bound(
        &mut self,
        slot: usize,
        edge: Edge,
        value: i32,
        events: &mut Vec<ControlEvent>,
    ) {
        if let Ok(v) = u8::try_from(value) {
            match edge {
                Edge::Low => self.bounds[slot].low = v,
                Edge::High => self.bounds[slot].high = v,
            }
        }
        events.push(ControlEvent::SetBound { slot, edge, value });
    }

    fn redraw_panel(&mut self) -> anyhow::Result<()> {
        draw_panel(&mut self.panel, &self.bounds);
        self.controls
            .update_with_buffer(&self.panel, PANEL_WIDTH, PANEL_HEIGHT)?;
        Ok(())
    }
}

impl Surface for WindowSurface {
    fn render(&mut self, view: &SessionView<'_>) -> anyhow::Result<()> {
        let width = view.converted.width as usize;
        let height = view.converted.height as usize;

        let original = Self::image_window(&mut self.original, ORIGINAL_TITLE, width, height)?;
        original.update_with_buffer(&view.converted.to_u32_buffer(), width, height)?;

        mask_to_u32(view.mask, &mut self.mask_buf);
        let thresholded =
            Self::image_window(&mut self.thresholded, THRESHOLDED_TITLE, width, height)?;
        thresholded.update_with_buffer(&self.mask_buf, width, height)?;

        self.bounds = *view.config.bounds();
        self.controls.set_title(&controls_title(view.representation));
        self.redraw_panel()
    }

    fn poll_events(&mut self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        if !self.open {
            return events;
        }

        for window in self.original.iter_mut().chain(self.thresholded.iter_mut()) {
            window.update();
        }
        if let Err(e) = self.redraw_panel() {
            tracing::warn!(error = %e, "Control panel update failed");
        }

        if self.windows().any(|w| !w.is_open()) {
            tracing::info!("Window closed");
            self.open = false;
            events.push(ControlEvent::Quit);
            return events;
        }

        self.read_keys(&mut events);
        self.read_mouse(&mut events);
        events
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
