use super::image::{frame_to_jpeg, mask_to_jpeg};
use super::server::run_dashboard_server;
use super::state::{AppState, DashboardStatus};
use crate::session::{ControlEvent, SessionView, Surface};
use crate::source::SourceMode;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

/// Serves the dashboard from its own runtime; the session thread only
/// publishes frames and drains queued controls.
pub struct DashboardSurface {
    state: AppState,
    events: mpsc::UnboundedReceiver<ControlEvent>,
    address: SocketAddr,
    frames: u64,
    _runtime: Runtime,
}

impl DashboardSurface {
    pub fn start(port: u16) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("dashboard")
            .enable_all()
            .build()?;
        let (tx, events) = mpsc::unbounded_channel();
        let state = AppState::new(tx);
        let address = runtime.block_on(run_dashboard_server(port, state.clone()))?;

        Ok(Self {
            state,
            events,
            address,
            frames: 0,
            _runtime: runtime,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl Surface for DashboardSurface {
    fn render(&mut self, view: &SessionView<'_>) -> anyhow::Result<()> {
        self.frames += 1;
        *self.state.status.blocking_write() = DashboardStatus {
            colorspace: view.representation.to_string(),
            representation_index: view.config.representation_index(),
            bounds: *view.config.bounds(),
            range_mode: view.range_mode,
            frames: self.frames,
        };

        // A still image is rendered only on change, so keep it encoded for
        // viewers who connect later.
        let retain = view.mode == SourceMode::Still;
        if retain || self.state.converted_frames.has_viewers() {
            match frame_to_jpeg(view.converted) {
                Some(jpeg) => self.state.converted_frames.publish(Bytes::from(jpeg)),
                None => tracing::debug!("Converted frame could not be encoded"),
            }
        }
        if retain || self.state.mask_frames.has_viewers() {
            if let Some(jpeg) = mask_to_jpeg(view.mask.view()) {
                self.state.mask_frames.publish(Bytes::from(jpeg));
            }
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
