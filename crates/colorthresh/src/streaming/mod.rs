//! Browser dashboard: MJPEG previews plus HTTP controls feeding the session.

mod image;
mod routes;
mod server;
mod state;
mod surface;
mod ui;

pub use surface::DashboardSurface;
