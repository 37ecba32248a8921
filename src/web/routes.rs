//! HTTP route handlers for the web interface.

use super::templates;
use crate::config::{Config, EyesConfig, Recurrence};
use crate::eyes::{EyeCommand, EyeSnapshot, Mood, Position};
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub commands: mpsc::Sender<EyeCommand>,
    pub snapshots: watch::Receiver<EyeSnapshot>,
    pub config_path: String,
}

#[derive(Debug, Deserialize)]
pub struct MoodForm {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct PositionForm {
    pub position: String,
}

/// Curious or cyclops on/off
#[derive(Debug, Deserialize)]
pub struct ModeForm {
    pub mode: String,
    #[serde(default)]
    pub enabled: Option<String>,
}

/// Auto blink or idle gaze timing
#[derive(Debug, Deserialize)]
pub struct RecurrenceForm {
    #[serde(default)]
    pub enabled: Option<String>,
    pub interval: u32,
    #[serde(default)]
    pub variation: u32,
}

#[derive(Debug, Deserialize)]
pub struct FlickerForm {
    pub axis: String,
    #[serde(default)]
    pub enabled: Option<String>,
    #[serde(default)]
    pub amplitude: i32,
}

/// Largest flicker offset accepted from the control page
pub const MAX_FLICKER_AMPLITUDE: i32 = 64;

/// Form data for the eye settings
#[derive(Debug, Deserialize)]
pub struct EyesForm {
    pub width: i32,
    pub height: i32,
    pub border_radius: i32,
    pub space_between: i32,
    pub frame_rate: u32,
    pub mood: String,
    pub position: String,
    #[serde(default)]
    pub curious: Option<String>,
    #[serde(default)]
    pub cyclops: Option<String>,
    #[serde(default)]
    pub autoblink: Option<String>,
    pub autoblink_interval: u32,
    pub autoblink_variation: u32,
    #[serde(default)]
    pub idle: Option<String>,
    pub idle_interval: u32,
    pub idle_variation: u32,
}

/// GET / - Control page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    render_page(&state, None).await
}

/// GET /state - Current animator snapshot
pub async fn state(State(state): State<AppState>) -> Json<EyeSnapshot> {
    Json(state.snapshots.borrow().clone())
}

/// POST /mood - Change the mood
pub async fn set_mood(
    State(state): State<AppState>,
    Form(form): Form<MoodForm>,
) -> impl IntoResponse {
    let mood = match form.mood.parse::<Mood>() {
        Ok(mood) => mood,
        Err(e) => return bad_request(&e.to_string()),
    };

    state.config.write().await.eyes.mood = mood;
    dispatch(&state, EyeCommand::SetMood(mood), &format!("Mood set to {}", mood)).await
}

/// POST /position - Move the gaze
pub async fn set_position(
    State(state): State<AppState>,
    Form(form): Form<PositionForm>,
) -> impl IntoResponse {
    let position = match form.position.parse::<Position>() {
        Ok(position) => position,
        Err(e) => return bad_request(&e.to_string()),
    };

    state.config.write().await.eyes.position = position;
    dispatch(
        &state,
        EyeCommand::SetPosition(position),
        &format!("Looking {}", position),
    )
    .await
}

/// POST /mode - Switch curious or cyclops mode
pub async fn set_mode(
    State(state): State<AppState>,
    Form(form): Form<ModeForm>,
) -> impl IntoResponse {
    let enabled = form.enabled.is_some();
    let command = match form.mode.trim().to_ascii_lowercase().as_str() {
        "curious" => {
            state.config.write().await.eyes.curious = enabled;
            EyeCommand::SetCurious(enabled)
        }
        "cyclops" => {
            state.config.write().await.eyes.cyclops = enabled;
            EyeCommand::SetCyclops(enabled)
        }
        other => return bad_request(&format!("unknown mode '{}'", other)),
    };

    let message = format!("{} {}", form.mode.trim(), templates::on_off(enabled));
    dispatch(&state, command, &message).await
}

/// POST /autoblink - Auto blink timing
pub async fn set_autoblink(
    State(state): State<AppState>,
    Form(form): Form<RecurrenceForm>,
) -> impl IntoResponse {
    let autoblink = Recurrence::new(form.enabled.is_some(), form.interval, form.variation);
    if let Err(e) = autoblink.validate("autoblink") {
        return bad_request(&e.to_string());
    }

    state.config.write().await.eyes.autoblink = autoblink;
    let command = EyeCommand::SetAutoblink {
        enabled: autoblink.enabled,
        interval_s: autoblink.interval_s,
        variation_s: autoblink.variation_s,
    };
    dispatch(&state, command, "Auto blink updated").await
}

/// POST /idle - Idle gaze timing
pub async fn set_idle(
    State(state): State<AppState>,
    Form(form): Form<RecurrenceForm>,
) -> impl IntoResponse {
    let idle = Recurrence::new(form.enabled.is_some(), form.interval, form.variation);
    if let Err(e) = idle.validate("idle") {
        return bad_request(&e.to_string());
    }

    state.config.write().await.eyes.idle = idle;
    let command = EyeCommand::SetIdle {
        enabled: idle.enabled,
        interval_s: idle.interval_s,
        variation_s: idle.variation_s,
    };
    dispatch(&state, command, "Idle gaze updated").await
}

/// POST /flicker - Continuous horizontal or vertical shake
///
/// Flicker is not part of the saved configuration.
pub async fn set_flicker(
    State(state): State<AppState>,
    Form(form): Form<FlickerForm>,
) -> impl IntoResponse {
    if !(0..=MAX_FLICKER_AMPLITUDE).contains(&form.amplitude) {
        return bad_request(&format!(
            "flicker amplitude must be between 0 and {}",
            MAX_FLICKER_AMPLITUDE
        ));
    }

    let enabled = form.enabled.is_some();
    let amplitude = form.amplitude;
    let command = match form.axis.trim().to_ascii_lowercase().as_str() {
        "h" | "horizontal" => EyeCommand::SetHFlicker { enabled, amplitude },
        "v" | "vertical" => EyeCommand::SetVFlicker { enabled, amplitude },
        other => return bad_request(&format!("unknown flicker axis '{}'", other)),
    };

    dispatch(&state, command, &format!("Flicker {}", templates::on_off(enabled))).await
}

/// GET /action/{action} - Eye actions
pub async fn eye_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> impl IntoResponse {
    let Some(command) = EyeCommand::from_action(&action) else {
        return (
            StatusCode::NOT_FOUND,
            Html(templates::render_message_page("Not Found", "Unknown action", true)),
        );
    };

    dispatch(&state, command, &format!("Action '{}' sent", action)).await
}

/// POST /save - Save eye settings and apply them
pub async fn save_eyes(
    State(state): State<AppState>,
    Form(form): Form<EyesForm>,
) -> impl IntoResponse {
    match update_eyes(&state, &form).await {
        Ok(eyes) => dispatch(
            &state,
            EyeCommand::ApplyEyes(Box::new(eyes)),
            "Configuration saved and applied!",
        )
        .await,
        Err((status, message)) => {
            let (_, page) = render_status(&state, &format!("Error: {}", message)).await;
            (status, page)
        }
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Validate the form, save the config, and return the new eye settings
///
/// The shared config is only replaced once the file is written.
async fn update_eyes(state: &AppState, form: &EyesForm) -> Result<EyesConfig, (StatusCode, String)> {
    let bad = |e: String| (StatusCode::BAD_REQUEST, e);

    let mood = form.mood.parse::<Mood>().map_err(|e| bad(e.to_string()))?;
    let position = form
        .position
        .parse::<Position>()
        .map_err(|e| bad(e.to_string()))?;

    let mut config = state.config.write().await;
    let mut updated = config.clone();
    updated.eyes = EyesConfig {
        width: form.width,
        height: form.height,
        border_radius: form.border_radius,
        space_between: form.space_between,
        frame_rate: form.frame_rate,
        mood,
        position,
        curious: form.curious.is_some(),
        cyclops: form.cyclops.is_some(),
        autoblink: Recurrence::new(
            form.autoblink.is_some(),
            form.autoblink_interval,
            form.autoblink_variation,
        ),
        idle: Recurrence::new(form.idle.is_some(), form.idle_interval, form.idle_variation),
    };

    updated.validate().map_err(|e| bad(e.to_string()))?;
    updated
        .save(&state.config_path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    *config = updated;
    tracing::info!("Configuration saved to {}", state.config_path);
    Ok(config.eyes.clone())
}

/// Queue a command for the frame loop and render the control page
async fn dispatch(state: &AppState, command: EyeCommand, done: &str) -> (StatusCode, Html<String>) {
    if let Err(e) = state.commands.send(command).await {
        tracing::warn!("Frame loop is not running: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(templates::render_message_page(
                "Error",
                "The animation is not running",
                true,
            )),
        );
    }

    render_status(state, done).await
}

async fn render_status(state: &AppState, message: &str) -> (StatusCode, Html<String>) {
    (StatusCode::OK, render_page(state, Some(message)).await)
}

async fn render_page(state: &AppState, message: Option<&str>) -> Html<String> {
    let config = state.config.read().await;
    let snapshot = state.snapshots.borrow().clone();
    Html(templates::render_control_page(&config, &snapshot, message))
}

fn bad_request(message: &str) -> (StatusCode, Html<String>) {
    tracing::debug!("Rejected request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Html(templates::render_message_page(
            "Bad Request",
            &templates::html_escape(message),
            true,
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;

    struct Fixture {
        state: AppState,
        commands: mpsc::Receiver<EyeCommand>,
        _snapshots: watch::Sender<EyeSnapshot>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json").to_string_lossy().into_owned();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (snap_tx, snap_rx) = watch::channel(EyeSnapshot {
            frames: 42,
            ..EyeSnapshot::default()
        });
        Fixture {
            state: AppState {
                config: Arc::new(RwLock::new(Config::default())),
                commands: cmd_tx,
                snapshots: snap_rx,
                config_path,
            },
            commands: cmd_rx,
            _snapshots: snap_tx,
            _dir: dir,
        }
    }

    fn eyes_form() -> EyesForm {
        EyesForm {
            width: 30,
            height: 28,
            border_radius: 6,
            space_between: 8,
            frame_rate: 40,
            mood: "tired".to_string(),
            position: "sw".to_string(),
            curious: None,
            cyclops: Some("on".to_string()),
            autoblink: Some("on".to_string()),
            autoblink_interval: 2,
            autoblink_variation: 1,
            idle: None,
            idle_interval: 3,
            idle_variation: 0,
        }
    }

    fn status(response: impl IntoResponse) -> StatusCode {
        let response: Response = response.into_response();
        response.status()
    }

    #[tokio::test]
    async fn test_set_mood() {
        let mut f = fixture();
        let form = MoodForm {
            mood: "Happy".to_string(),
        };
        let response = set_mood(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetMood(Mood::Happy)
        );
        assert_eq!(f.state.config.read().await.eyes.mood, Mood::Happy);
    }

    #[tokio::test]
    async fn test_invalid_mood_is_rejected() {
        let mut f = fixture();
        let form = MoodForm {
            mood: "sleepy".to_string(),
        };
        let response = set_mood(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
        assert!(f.commands.try_recv().is_err());
        assert_eq!(f.state.config.read().await.eyes.mood, Mood::Neutral);
    }

    #[tokio::test]
    async fn test_set_position() {
        let mut f = fixture();
        let form = PositionForm {
            position: "north-east".to_string(),
        };
        let response = set_position(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetPosition(Position::NorthEast)
        );

        let form = PositionForm {
            position: "up".to_string(),
        };
        let response = set_position(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
        assert!(f.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_actions() {
        let mut f = fixture();
        let response = eye_action(State(f.state.clone()), Path("blink".to_string())).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(f.commands.try_recv().unwrap(), EyeCommand::Blink);

        let response = eye_action(State(f.state.clone()), Path("dance".to_string())).await;
        assert_eq!(status(response), StatusCode::NOT_FOUND);
        assert!(f.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_loop_stopped() {
        let f = fixture();
        drop(f.commands);
        let response = eye_action(State(f.state.clone()), Path("open".to_string())).await;
        assert_eq!(status(response), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_save_eyes() {
        let mut f = fixture();
        let response = save_eyes(State(f.state.clone()), Form(eyes_form())).await;
        assert_eq!(status(response), StatusCode::OK);

        let saved = Config::load(&f.state.config_path).unwrap();
        assert_eq!(saved.eyes.width, 30);
        assert_eq!(saved.eyes.mood, Mood::Tired);
        assert_eq!(saved.eyes.position, Position::SouthWest);
        assert!(saved.eyes.cyclops);
        assert!(!saved.eyes.curious);
        assert!(!saved.eyes.idle.enabled);
        assert_eq!(saved.eyes.autoblink, Recurrence::new(true, 2, 1));

        match f.commands.try_recv().unwrap() {
            EyeCommand::ApplyEyes(eyes) => assert_eq!(*eyes, saved.eyes),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_values() {
        let mut f = fixture();
        let form = EyesForm {
            width: 0,
            ..eyes_form()
        };
        let response = save_eyes(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
        assert!(!std::path::Path::new(&f.state.config_path).exists());
        assert_eq!(f.state.config.read().await.eyes, EyesConfig::default());
        assert!(f.commands.try_recv().is_err());

        let form = EyesForm {
            position: "middle".to_string(),
            ..eyes_form()
        };
        let response = save_eyes(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_mode() {
        let mut f = fixture();
        let form = ModeForm {
            mode: "Cyclops".to_string(),
            enabled: Some("on".to_string()),
        };
        let response = set_mode(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(f.commands.try_recv().unwrap(), EyeCommand::SetCyclops(true));
        assert!(f.state.config.read().await.eyes.cyclops);

        let form = ModeForm {
            mode: "curious".to_string(),
            enabled: None,
        };
        let response = set_mode(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(f.commands.try_recv().unwrap(), EyeCommand::SetCurious(false));
        assert!(!f.state.config.read().await.eyes.curious);

        let form = ModeForm {
            mode: "sleepy".to_string(),
            enabled: None,
        };
        let response = set_mode(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
        assert!(f.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_autoblink_and_idle() {
        let mut f = fixture();
        let form = RecurrenceForm {
            enabled: Some("on".to_string()),
            interval: 5,
            variation: 2,
        };
        let response = set_autoblink(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetAutoblink {
                enabled: true,
                interval_s: 5,
                variation_s: 2,
            }
        );
        assert_eq!(
            f.state.config.read().await.eyes.autoblink,
            Recurrence::new(true, 5, 2)
        );

        let form = RecurrenceForm {
            enabled: None,
            interval: 4,
            variation: 0,
        };
        let response = set_idle(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetIdle {
                enabled: false,
                interval_s: 4,
                variation_s: 0,
            }
        );
        assert!(!f.state.config.read().await.eyes.idle.enabled);

        let form = RecurrenceForm {
            enabled: Some("on".to_string()),
            interval: 7200,
            variation: 0,
        };
        let response = set_idle(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::BAD_REQUEST);
        assert!(f.commands.try_recv().is_err());
        assert_eq!(f.state.config.read().await.eyes.idle.interval_s, 4);
    }

    #[tokio::test]
    async fn test_set_flicker() {
        let mut f = fixture();
        let form = FlickerForm {
            axis: "h".to_string(),
            enabled: Some("on".to_string()),
            amplitude: 3,
        };
        let response = set_flicker(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetHFlicker {
                enabled: true,
                amplitude: 3,
            }
        );

        let form = FlickerForm {
            axis: "vertical".to_string(),
            enabled: None,
            amplitude: 0,
        };
        let response = set_flicker(State(f.state.clone()), Form(form)).await;
        assert_eq!(status(response), StatusCode::OK);
        assert_eq!(
            f.commands.try_recv().unwrap(),
            EyeCommand::SetVFlicker {
                enabled: false,
                amplitude: 0,
            }
        );

        for (axis, amplitude) in [("diagonal", 2), ("h", -1), ("v", 65)] {
            let form = FlickerForm {
                axis: axis.to_string(),
                enabled: Some("on".to_string()),
                amplitude,
            };
            let response = set_flicker(State(f.state.clone()), Form(form)).await;
            assert_eq!(status(response), StatusCode::BAD_REQUEST);
        }
        assert!(f.commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_state_and_index() {
        let f = fixture();
        let Json(snapshot) = state(State(f.state.clone())).await;
        assert_eq!(snapshot.frames, 42);

        let Html(page) = index(State(f.state.clone())).await;
        assert!(page.contains("action=\"/mood\""));
        assert!(page.contains("/action/blink"));
        assert!(page.contains("action=\"/flicker\""));
    }
}
