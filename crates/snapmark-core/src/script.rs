//! Scripted editor sessions
//!
//! A script is a JSON array of [`EditorAction`]s replayed against an
//! [`EditorController`] in order. Scripts drive the CLI and make end-to-end
//! tests readable.
//!
//! ```json
//! [
//!   { "action": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 80, "y": 40 }] },
//!   { "action": "enter_crop" },
//!   { "action": "move_region", "left": 40, "top": 30 },
//!   { "action": "resize_region", "handle": "bottom_right", "x": 300, "y": 220 },
//!   { "action": "save" }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    editor::{EditorController, InputEvent, SaveOutcome},
    error::{EditorError, EditorResult},
    model::{Point, ResizeHandle},
};

/// One step of a scripted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    ToggleDrawing,
    /// Pointer down on the first point, moves through the rest, pointer up
    Stroke { points: Vec<Point> },
    EnterCrop,
    ExitCrop,
    MoveRegion { left: f64, top: f64 },
    ResizeRegion { handle: ResizeHandle, x: f64, y: f64 },
    Clear,
    Save,
    CropAndSave,
    Cancel,
}

/// What a replay did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Actions executed before the session ended
    pub applied:   usize,
    /// Actions skipped because the session had already ended
    pub skipped:   usize,
    /// Result of the save that ended the session, if one did
    pub saved:     Option<SaveOutcome>,
    pub cancelled: bool,
}

/// Parses a JSON script
pub fn parse_script(json: &str) -> EditorResult<Vec<EditorAction>> {
    serde_json::from_str(json).map_err(|e| EditorError::invalid_parameter("script", e.to_string()))
}

/// Runs `actions` against `editor`
///
/// Actions after the one that ended the session are counted but not run.
/// A save that produced nothing leaves the session open and the replay
/// continues.
pub fn replay(editor: &mut EditorController, actions: &[EditorAction]) -> EditorResult<ReplayReport> {
    let mut report = ReplayReport::default();

    for action in actions {
        if !editor.is_open() {
            report.skipped += 1;
            continue;
        }

        debug!("Replaying {:?}", action);
        match action {
            EditorAction::ToggleDrawing => {
                editor.toggle_drawing();
            }
            EditorAction::Stroke { points } => {
                if let Some((first, rest)) = points.split_first() {
                    editor.handle_input(InputEvent::PointerDown { point: *first });
                    for point in rest {
                        editor.handle_input(InputEvent::PointerMove { point: *point });
                    }
                    editor.handle_input(InputEvent::PointerUp);
                }
            }
            EditorAction::EnterCrop => {
                editor.enter_crop();
            }
            EditorAction::ExitCrop => editor.exit_crop(),
            EditorAction::MoveRegion { left, top } => {
                editor.handle_input(InputEvent::MoveRegion {
                    left: *left,
                    top:  *top,
                });
            }
            EditorAction::ResizeRegion { handle, x, y } => {
                editor.handle_input(InputEvent::ResizeRegion {
                    handle:  *handle,
                    pointer: Point::new(*x, *y),
                });
            }
            EditorAction::Clear => editor.clear(),
            EditorAction::Save => record_save(&mut report, editor.save()?),
            EditorAction::CropAndSave => record_save(&mut report, editor.crop_and_save()?),
            EditorAction::Cancel => {
                report.cancelled = editor.cancel();
            }
        }
        report.applied += 1;
    }

    Ok(report)
}

fn record_save(report: &mut ReplayReport, outcome: SaveOutcome) {
    if let SaveOutcome::Saved { .. } = outcome {
        report.saved = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::{Bitmap, ImageSource},
        config::EditorConfig,
        editor::EditorCallbacks,
        export::{EncodedImage, encode_png},
    };

    #[test]
    fn test_parse_script() {
        let json = r#"[
            {"action": "toggle_drawing"},
            {"action": "stroke", "points": [{"x": 1, "y": 2}]},
            {"action": "resize_region", "handle": "top_left", "x": 5.5, "y": 0},
            {"action": "crop_and_save"}
        ]"#;
        let actions = parse_script(json).unwrap();
        assert_eq!(actions.len(), 4);
        assert_eq!(
            actions[1],
            EditorAction::Stroke {
                points: vec![Point::new(1.0, 2.0)]
            }
        );
        assert_eq!(
            actions[2],
            EditorAction::ResizeRegion {
                handle: ResizeHandle::TopLeft,
                x:      5.5,
                y:      0.0,
            }
        );
    }

    struct Discard;

    impl EditorCallbacks for Discard {
        fn on_save(&mut self, _image: EncodedImage) {}

        fn on_cancel(&mut self) {}
    }

    #[tokio::test]
    async fn test_replay_stops_after_session_ends() {
        let png = encode_png(&Bitmap::from_test_pattern(400, 300), Default::default()).unwrap();
        let mut editor = EditorController::new(EditorConfig::default(), Box::new(Discard)).unwrap();
        editor.load(ImageSource::Bytes(png.bytes)).await.unwrap();

        let actions = vec![
            EditorAction::CropAndSave,
            EditorAction::EnterCrop,
            EditorAction::MoveRegion { left: 0.0, top: 0.0 },
            EditorAction::Save,
            EditorAction::Cancel,
            EditorAction::Clear,
        ];
        let report = replay(&mut editor, &actions).unwrap();

        assert_eq!(report.applied, 4);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            report.saved,
            Some(SaveOutcome::Saved {
                width:   600,
                height:  450,
                cropped: true,
            })
        );
        assert!(!report.cancelled);
    }

    #[test]
    fn test_parse_script_rejects_unknown_action() {
        let err = parse_script(r#"[{"action": "rotate"}]"#).unwrap_err();
        assert!(matches!(err, EditorError::InvalidParameter { ref parameter, .. } if parameter == "script"));
    }
}
