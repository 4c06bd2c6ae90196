//! snapmark: Command-line tool for annotating and cropping images
//!
//! Replays a scripted editor session against an image and writes the saved
//! PNG, or reports how the editor would lay an image out, without any UI.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use snapmark_core::{
    canvas::ImageSource,
    config::EditorConfig,
    editor::{EditorCallbacks, EditorController},
    export::{EncodedImage, crop_rect},
    model::CropRegion,
    script::{EditorAction, parse_script, replay},
};
use tokio::sync::oneshot;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "snapmark")]
#[command(about = "Annotate and crop images by replaying editor sessions")]
struct Cli {
    /// Editor configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the canvas container width
    #[arg(long, global = true)]
    container_width: Option<f64>,

    /// Override the crop export multiplier
    #[arg(long, global = true)]
    multiplier: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script against an image and write the result
    Render {
        /// Image file path or data: URI
        #[arg(short, long)]
        input: String,
        /// Session script (JSON array of actions); saves the full canvas if omitted
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Output file path (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the result as a data: URI instead of writing a file
        #[arg(long)]
        data_uri: bool,
    },
    /// Show how an image is laid out on the canvas
    Inspect {
        /// Image file path or data: URI
        #[arg(short, long)]
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snapmark_cli=info".parse()?)
                .add_directive("snapmark_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.container_width, cli.multiplier)?;

    match cli.command {
        Commands::Render {
            input,
            script,
            out,
            data_uri,
        } => {
            let actions = match script {
                Some(path) => read_script(&path)?,
                None => vec![EditorAction::Save],
            };
            match render(config, &input, &actions).await? {
                RenderResult::Saved(image) if data_uri => println!("{}", image.to_data_uri()),
                RenderResult::Saved(image) => {
                    let out = out.unwrap_or_else(default_output_path);
                    fs::write(&out, &image.bytes)
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    println!("✓ Saved {}x{} image to {}", image.width, image.height, out.display());
                }
                RenderResult::Cancelled => println!("Session cancelled, nothing saved"),
            }
        }
        Commands::Inspect { input } => {
            let inspection = inspect(config, &input, Box::new(ChannelCallbacks { tx: None })).await?;
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
    }

    Ok(())
}

/// Reads the config file, if any, then applies command-line overrides
fn load_config(
    path: Option<&Path>,
    container_width: Option<f64>,
    multiplier: Option<u32>,
) -> Result<EditorConfig> {
    let mut config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            EditorConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EditorConfig::default(),
    };

    if let Some(width) = container_width {
        config.container_width = width;
    }
    if let Some(multiplier) = multiplier {
        config.export_multiplier = multiplier;
    }
    config.validate()?;
    Ok(config)
}

fn read_script(path: &Path) -> Result<Vec<EditorAction>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let actions = parse_script(&json).with_context(|| format!("Invalid script {}", path.display()))?;
    debug!("Loaded {} actions from {}", actions.len(), path.display());
    Ok(actions)
}

/// Treats `input` as a data URI if it looks like one, otherwise as a path
fn read_source(input: &str) -> Result<ImageSource> {
    if input.starts_with("data:") {
        return Ok(ImageSource::from_data_uri(input));
    }
    let bytes = fs::read(input).with_context(|| format!("Failed to read image {}", input))?;
    Ok(ImageSource::Bytes(bytes))
}

/// `snapmark-<timestamp>.png` in the current directory
fn default_output_path() -> PathBuf {
    let timestamp: String = Utc::now()
        .to_rfc3339()
        .chars()
        .map(|c| match c {
            ':' => '-',
            '+' | '.' => '_',
            _ => c,
        })
        .collect();
    PathBuf::from(format!("snapmark-{}.png", timestamp))
}

/// How a session ended
#[derive(Debug)]
enum RenderResult {
    Saved(EncodedImage),
    Cancelled,
}

/// Forwards the session's single callback to the waiting command
struct ChannelCallbacks {
    tx: Option<oneshot::Sender<RenderResult>>,
}

impl EditorCallbacks for ChannelCallbacks {
    fn on_save(&mut self, image: EncodedImage) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(RenderResult::Saved(image));
        }
    }

    fn on_cancel(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(RenderResult::Cancelled);
        }
    }
}

/// Opens a session on `input`
///
/// A session whose image cannot be read or decoded is cancelled before the
/// error is returned, so `callbacks` always hears how it ended.
async fn open_session(
    config: EditorConfig,
    input: &str,
    callbacks: Box<dyn EditorCallbacks>,
) -> Result<EditorController> {
    let mut editor = EditorController::new(config, callbacks)?;

    let loaded = match read_source(input) {
        Ok(source) => editor.load(source).await.map_err(anyhow::Error::from),
        Err(err) => Err(err),
    };
    if let Err(err) = loaded {
        editor.cancel();
        return Err(err.context(format!("Failed to load {}", display_input(input))));
    }
    Ok(editor)
}

/// Data URIs are summarized rather than printed whole
fn display_input(input: &str) -> &str {
    if input.starts_with("data:") { "data: URI" } else { input }
}

/// Loads `input`, replays `actions`, and returns how the session ended
///
/// A script that never saves or cancels is cancelled at the end.
async fn render(config: EditorConfig, input: &str, actions: &[EditorAction]) -> Result<RenderResult> {
    let (tx, rx) = oneshot::channel();
    let mut editor = open_session(config, input, Box::new(ChannelCallbacks { tx: Some(tx) })).await?;

    let replayed = replay(&mut editor, actions);
    if editor.is_open() {
        info!("Script left the session open; cancelling");
        editor.cancel();
    }
    let report = replayed?;
    info!(
        "Replayed {} actions ({} skipped after the session ended)",
        report.applied, report.skipped
    );

    rx.await.context("Editor session ended without a result")
}

/// Layout summary printed by `snapmark inspect`
#[derive(Debug, Serialize)]
struct Inspection {
    image_width:  u32,
    image_height: u32,
    scale:        f64,
    canvas:       (u32, u32),
    crop_region:  Option<CropRegion>,
    crop_output:  Option<(u32, u32)>,
}

/// Loads `input`, reports its layout, and cancels the session
async fn inspect(
    config: EditorConfig,
    input: &str,
    callbacks: Box<dyn EditorCallbacks>,
) -> Result<Inspection> {
    let multiplier = config.export_multiplier;
    let mut editor = open_session(config, input, callbacks).await?;

    let inspection = describe_layout(&mut editor, multiplier);
    editor.cancel();
    inspection
}

fn describe_layout(editor: &mut EditorController, multiplier: u32) -> Result<Inspection> {
    let surface = editor.surface();
    let scale = surface.scale().context("Image did not load")?.value();
    let canvas = surface.pixel_size().context("Image did not load")?;
    let bounds = surface.bounds().context("Image did not load")?;

    let crop_region = editor.enter_crop();
    let crop_output = crop_region.map(|region| {
        let rect = crop_rect(&region, multiplier);
        (rect.width, rect.height)
    });

    Ok(Inspection {
        image_width: (bounds.width / scale).round() as u32,
        image_height: (bounds.height / scale).round() as u32,
        scale,
        canvas,
        crop_region,
        crop_output,
    })
}

#[cfg(test)]
mod tests {
    use snapmark_core::model::Point;
    use snapmark_test_utils::{fixtures, recording::RecordingCallbacks};
    use tempfile::TempDir;

    use super::*;

    fn write_image(dir: &TempDir, width: u32, height: u32) -> String {
        let path = dir.path().join("input.png");
        fs::write(&path, fixtures::test_pattern_png(width, height)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_render_default_saves_full_canvas() {
        let dir = TempDir::new().unwrap();
        let input = write_image(&dir, 1600, 900);

        let result = render(EditorConfig::default(), &input, &[EditorAction::Save]).await.unwrap();
        let RenderResult::Saved(image) = result else {
            panic!("expected a saved image");
        };
        assert_eq!(image.dimensions(), (711, 400));
    }

    #[tokio::test]
    async fn test_render_crop_script() {
        let dir = TempDir::new().unwrap();
        let input = write_image(&dir, 400, 300);
        let actions = vec![
            EditorAction::Stroke {
                points: vec![Point::new(10.0, 10.0), Point::new(50.0, 50.0)],
            },
            EditorAction::EnterCrop,
            EditorAction::CropAndSave,
        ];

        let result = render(EditorConfig::default(), &input, &actions).await.unwrap();
        let RenderResult::Saved(image) = result else {
            panic!("expected a saved image");
        };
        assert_eq!(image.dimensions(), (600, 450));
    }

    #[tokio::test]
    async fn test_render_without_save_cancels() {
        let uri = fixtures::solid_data_uri(50, 50, fixtures::WHITE);
        let result = render(EditorConfig::default(), &uri, &[EditorAction::Clear]).await.unwrap();
        assert!(matches!(result, RenderResult::Cancelled));
    }

    #[tokio::test]
    async fn test_render_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.png");
        let result = render(EditorConfig::default(), &missing.to_string_lossy(), &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_render_corrupt_input_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.png");
        fs::write(&path, fixtures::corrupt_png()).unwrap();

        let err = render(EditorConfig::default(), &path.to_string_lossy(), &[EditorAction::Save])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }

    #[tokio::test]
    async fn test_open_session_cancels_on_load_failure() {
        let dir = TempDir::new().unwrap();
        let corrupt = dir.path().join("corrupt.png");
        fs::write(&corrupt, fixtures::corrupt_png()).unwrap();
        let missing = dir.path().join("nope.png");

        for input in [corrupt, missing] {
            let callbacks = RecordingCallbacks::new();
            let result = open_session(
                EditorConfig::default(),
                &input.to_string_lossy(),
                Box::new(callbacks.clone()),
            )
            .await;
            assert!(result.is_err());
            assert_eq!(callbacks.cancel_count(), 1, "{} left the session open", input.display());
            assert_eq!(callbacks.save_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_render_failure_reports_cancel_through_channel() {
        let (tx, rx) = oneshot::channel();
        let result = open_session(
            EditorConfig::default(),
            "data:image/png;base64,not-base64!",
            Box::new(ChannelCallbacks { tx: Some(tx) }),
        )
        .await;
        assert!(result.is_err());
        assert!(matches!(rx.await.unwrap(), RenderResult::Cancelled));
    }

    #[tokio::test]
    async fn test_inspect_reports_layout() {
        let dir = TempDir::new().unwrap();
        let input = write_image(&dir, 1600, 900);
        let callbacks = RecordingCallbacks::new();

        let inspection = inspect(EditorConfig::default(), &input, Box::new(callbacks.clone()))
            .await
            .unwrap();
        assert_eq!((inspection.image_width, inspection.image_height), (1600, 900));
        assert_eq!(inspection.canvas, (711, 400));
        assert_eq!(inspection.crop_output, Some((600, 450)));
        assert_eq!(callbacks.cancel_count(), 1);
        assert_eq!(callbacks.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_inspect_load_failure_cancels() {
        let callbacks = RecordingCallbacks::new();
        let result = inspect(
            EditorConfig::default(),
            "data:image/png;base64,not-base64!",
            Box::new(callbacks.clone()),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(callbacks.cancel_count(), 1);
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"container_width": 640, "export_multiplier": 2}"#).unwrap();

        let config = load_config(Some(&path), None, Some(4)).unwrap();
        assert_eq!(config.container_width, 640.0);
        assert_eq!(config.export_multiplier, 4);

        assert!(load_config(None, Some(-1.0), None).is_err());
    }

    #[test]
    fn test_read_script_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"[{"action": "enter_crop"}, {"action": "save"}]"#).unwrap();
        assert_eq!(read_script(&path).unwrap(), vec![EditorAction::EnterCrop, EditorAction::Save]);

        fs::write(&path, "not json").unwrap();
        assert!(read_script(&path).is_err());
    }

    #[test]
    fn test_default_output_path_is_png() {
        let path = default_output_path();
        let name = path.to_string_lossy();
        assert!(name.starts_with("snapmark-"));
        assert!(name.ends_with(".png"));
        assert!(!name.contains(':'));
    }
}
