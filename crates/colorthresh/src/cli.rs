use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

const DEFAULT_CAMERA: u32 = 0;

#[derive(Parser, Debug, Default)]
#[command(name = "colorthresh")]
#[command(
    version,
    about = "Threshold an image, video or camera feed by color channel in real time",
    long_about = None
)]
pub struct Cli {
    /// Path to image file (if source is an image)
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Path to video file (if source is a video)
    #[arg(short, long, value_name = "FILE")]
    pub video: Option<PathBuf>,

    /// Camera index (if source is camera); default 0
    #[arg(short, long, value_name = "INDEX")]
    pub cam: Option<u32>,

    /// Colorspace to start in (RGB, GRAY, HSV, Lab, Luv, YCrCb, YUV)
    #[arg(long, value_name = "NAME")]
    pub colorspace: Option<String>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serve the web dashboard alongside the windows
    #[arg(long)]
    pub dashboard: bool,

    /// Don't open native windows (use with --dashboard)
    #[arg(long)]
    pub no_window: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    Image(PathBuf),
    Video(PathBuf),
    Camera(u32),
}

impl Cli {
    /// Parses arguments, falling back to camera defaults on anything unparsable.
    pub fn parse_or_default<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid arguments; defaulting to camera {DEFAULT_CAMERA}");
                Cli::default()
            }
        }
    }

    /// Exactly one source. More than one source flag falls back to the camera.
    pub fn selection(&self) -> SourceSelection {
        let camera = SourceSelection::Camera(self.cam.unwrap_or(DEFAULT_CAMERA));
        match (&self.image, &self.video) {
            (Some(image), None) if self.cam.is_none() => SourceSelection::Image(image.clone()),
            (None, Some(video)) if self.cam.is_none() => SourceSelection::Video(video.clone()),
            (None, None) => camera,
            _ => {
                tracing::warn!("More than one source given; defaulting to camera");
                camera
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(args: &[&str]) -> SourceSelection {
        let mut argv = vec!["colorthresh"];
        argv.extend_from_slice(args);
        Cli::parse_or_default(argv).selection()
    }

    #[test]
    fn no_arguments_means_camera_zero() {
        assert_eq!(select(&[]), SourceSelection::Camera(0));
    }

    #[test]
    fn single_flags_select_their_source() {
        assert_eq!(
            select(&["-i", "leaf.png"]),
            SourceSelection::Image(PathBuf::from("leaf.png"))
        );
        assert_eq!(
            select(&["--video", "clip.mp4"]),
            SourceSelection::Video(PathBuf::from("clip.mp4"))
        );
        assert_eq!(select(&["-c", "2"]), SourceSelection::Camera(2));
    }

    #[test]
    fn conflicting_sources_fall_back_to_camera() {
        assert_eq!(
            select(&["-i", "leaf.png", "-v", "clip.mp4"]),
            SourceSelection::Camera(0)
        );
        assert_eq!(
            select(&["-i", "leaf.png", "-c", "1"]),
            SourceSelection::Camera(1)
        );
    }

    #[test]
    fn unparsable_arguments_fall_back_to_camera() {
        assert_eq!(select(&["-c", "front"]), SourceSelection::Camera(0));
        assert_eq!(select(&["--bogus"]), SourceSelection::Camera(0));
    }

    #[test]
    fn starting_colorspace_parses() {
        let cli =
            Cli::parse_or_default(["colorthresh", "-i", "leaf.png", "--colorspace", "hsv"]);
        assert_eq!(cli.colorspace.as_deref(), Some("hsv"));
        assert_eq!(
            cli.selection(),
            SourceSelection::Image(PathBuf::from("leaf.png"))
        );
    }

    #[test]
    fn surface_flags_parse() {
        let cli = Cli::parse_or_default(["colorthresh", "--dashboard", "--no-window"]);
        assert!(cli.dashboard);
        assert!(cli.no_window);
    }
}
