use crate::session::ControlEvent;
use bytes::Bytes;
use colorthresh_engine::{ChannelBounds, RangeMode, CHANNEL_SLOTS};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};

pub type EncodedFrame = Bytes;

/// Latest encoded frame for one stream. New viewers get the retained frame
/// straight away, then every frame published after it.
#[derive(Clone)]
pub struct FrameHub {
    tx: Arc<watch::Sender<Option<EncodedFrame>>>,
}

impl FrameHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }
    pub fn subscribe(&self) -> watch::Receiver<Option<EncodedFrame>> {
        self.tx.subscribe()
    }
    pub fn publish(&self, frame: EncodedFrame) {
        self.tx.send_replace(Some(frame));
    }
    pub fn latest(&self) -> Option<EncodedFrame> {
        self.tx.borrow().clone()
    }
    pub fn has_viewers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

impl Default for FrameHub {
    fn default() -> Self {
        Self::new()
    }
}

/// What `GET /state` reports: the settings used for the last rendered frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardStatus {
    pub colorspace: String,
    pub representation_index: usize,
    pub bounds: [ChannelBounds; CHANNEL_SLOTS],
    pub range_mode: RangeMode,
    pub frames: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub converted_frames: FrameHub,
    pub mask_frames: FrameHub,
    pub status: Arc<RwLock<DashboardStatus>>,
    pub controls: mpsc::UnboundedSender<ControlEvent>,
}

impl AppState {
    pub fn new(controls: mpsc::UnboundedSender<ControlEvent>) -> Self {
        Self {
            converted_frames: FrameHub::new(),
            mask_frames: FrameHub::new(),
            status: Arc::new(RwLock::new(DashboardStatus::default())),
            controls,
        }
    }

    pub async fn get_status(&self) -> DashboardStatus {
        self.status.read().await.clone()
    }

    /// False once the session has stopped listening.
    pub fn send(&self, event: ControlEvent) -> bool {
        self.controls.send(event).is_ok()
    }
}
