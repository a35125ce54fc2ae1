use super::state::{AppState, DashboardStatus, FrameHub};
use crate::session::ControlEvent;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::BytesMut;
use colorthresh_engine::{Direction, Edge, ThreshError, ThresholdConfig};
use serde::Deserialize;
use tokio_stream::{wrappers::WatchStream, StreamExt};

type Rejection = (StatusCode, String);

#[derive(Debug, Deserialize)]
pub struct BoundRequest {
    pub slot: usize,
    pub edge: String,
    pub value: i32,
}

#[derive(Debug, Deserialize)]
pub struct CycleRequest {
    pub direction: i32,
}

pub async fn stream_converted(State(state): State<AppState>) -> impl IntoResponse {
    stream_mjpeg_internal(state.converted_frames).await
}

pub async fn stream_mask(State(state): State<AppState>) -> impl IntoResponse {
    stream_mjpeg_internal(state.mask_frames).await
}

async fn stream_mjpeg_internal(hub: FrameHub) -> impl IntoResponse {
    // Starts with the retained frame, so a still image shows up immediately.
    let stream = WatchStream::new(hub.subscribe())
        .filter_map(|frame| frame)
        .map(|frame| {
            let mut buf = BytesMut::new();
            buf.extend_from_slice(b"--frame\r\n");
            buf.extend_from_slice(b"Content-Type: image/jpeg\r\n");
            buf.extend_from_slice(format!("Content-Length: {}\r\n\r\n", frame.len()).as_bytes());
            buf.extend_from_slice(&frame);
            buf.extend_from_slice(b"\r\n");
            Ok::<_, std::io::Error>(buf.freeze())
        });

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "multipart/x-mixed-replace; boundary=frame",
        )],
        axum::body::Body::from_stream(stream),
    )
}

pub async fn get_state_handler(State(state): State<AppState>) -> Json<DashboardStatus> {
    Json(state.get_status().await)
}

pub async fn set_bound_handler(
    State(state): State<AppState>,
    Json(request): Json<BoundRequest>,
) -> Result<StatusCode, Rejection> {
    tracing::debug!(?request, "Bound change requested");
    let edge: Edge = request.edge.parse().map_err(bad_request)?;
    ThresholdConfig::check_bound(request.slot, request.value).map_err(bad_request)?;

    forward(
        &state,
        ControlEvent::SetBound {
            slot: request.slot,
            edge,
            value: request.value,
        },
    )
}

pub async fn cycle_handler(
    State(state): State<AppState>,
    Json(request): Json<CycleRequest>,
) -> Result<StatusCode, Rejection> {
    let direction = Direction::try_from(request.direction).map_err(|d| {
        bad_request(ThreshError::InvalidArgument(format!(
            "direction must be 1 or -1, got {d}"
        )))
    })?;
    forward(&state, ControlEvent::Cycle(direction))
}

pub async fn quit_handler(State(state): State<AppState>) -> Result<StatusCode, Rejection> {
    tracing::info!("Quit requested from dashboard");
    forward(&state, ControlEvent::Quit)
}

fn forward(state: &AppState, event: ControlEvent) -> Result<StatusCode, Rejection> {
    if state.send(event) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "session has ended".to_string(),
        ))
    }
}

fn bad_request(e: ThreshError) -> Rejection {
    tracing::warn!(error = %e, "Rejected dashboard request");
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn state() -> (AppState, mpsc::UnboundedReceiver<ControlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AppState::new(tx), rx)
    }

    fn bound(slot: usize, edge: &str, value: i32) -> Json<BoundRequest> {
        Json(BoundRequest {
            slot,
            edge: edge.to_string(),
            value,
        })
    }

    #[tokio::test]
    async fn valid_bound_is_forwarded() {
        let (state, mut rx) = state();
        let status = set_bound_handler(State(state), bound(2, "high", 90))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(
            rx.try_recv().unwrap(),
            ControlEvent::SetBound {
                slot: 2,
                edge: Edge::High,
                value: 90
            }
        );
    }

    #[tokio::test]
    async fn invalid_bounds_are_rejected_before_the_session() {
        let (state, mut rx) = state();
        let requests = [
            bound(0, "low", 256),
            bound(0, "low", -1),
            bound(3, "low", 5),
            bound(0, "middle", 5),
        ];
        for request in requests {
            let (status, _) = set_bound_handler(State(state.clone()), request)
                .await
                .unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cycle_accepts_only_unit_steps() {
        let (state, mut rx) = state();

        let ok = cycle_handler(State(state.clone()), Json(CycleRequest { direction: -1 })).await;
        assert_eq!(ok.unwrap(), StatusCode::ACCEPTED);
        assert_eq!(
            rx.try_recv().unwrap(),
            ControlEvent::Cycle(Direction::Backward)
        );

        let (status, _) = cycle_handler(State(state), Json(CycleRequest { direction: 2 }))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn requests_after_session_end_are_unavailable() {
        let (state, rx) = state();
        drop(rx);

        let (status, _) = quit_handler(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn state_reports_latest_status() {
        let (state, _rx) = state();
        state.status.write().await.colorspace = "Lab".to_string();

        let Json(status) = get_state_handler(State(state)).await;
        assert_eq!(status.colorspace, "Lab");
    }
}
