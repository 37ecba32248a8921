//! Messages marshalled onto the frame loop and the state it publishes back.

use super::animator::{Eye, EyeAnimator};
use super::random::RandomSource;
use super::{Mood, Position};
use crate::config::EyesConfig;
use serde::Serialize;

/// A change requested from outside the frame loop
#[derive(Debug, Clone, PartialEq)]
pub enum EyeCommand {
    SetMood(Mood),
    SetPosition(Position),
    Open,
    Close,
    Blink,
    Confused,
    Laugh,
    SetCurious(bool),
    SetCyclops(bool),
    ToggleCurious,
    ToggleCyclops,
    SetAutoblink {
        enabled: bool,
        interval_s: u32,
        variation_s: u32,
    },
    SetIdle {
        enabled: bool,
        interval_s: u32,
        variation_s: u32,
    },
    SetHFlicker { enabled: bool, amplitude: i32 },
    SetVFlicker { enabled: bool, amplitude: i32 },
    /// Replace geometry and standing behaviour
    ApplyEyes(Box<EyesConfig>),
}

impl EyeCommand {
    /// Parse a one-word action as used by the control page
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "open" => Some(EyeCommand::Open),
            "close" => Some(EyeCommand::Close),
            "blink" => Some(EyeCommand::Blink),
            "confused" => Some(EyeCommand::Confused),
            "laugh" => Some(EyeCommand::Laugh),
            "curious" => Some(EyeCommand::ToggleCurious),
            "cyclops" => Some(EyeCommand::ToggleCyclops),
            _ => None,
        }
    }

    /// Apply to the animator; takes effect on the next frame
    pub fn apply<R: RandomSource>(self, eyes: &mut EyeAnimator<R>) {
        tracing::debug!("Applying {:?}", self);

        match self {
            EyeCommand::SetMood(mood) => eyes.set_mood(mood),
            EyeCommand::SetPosition(position) => eyes.set_position(position),
            EyeCommand::Open => eyes.open(true, true),
            EyeCommand::Close => eyes.close(true, true),
            EyeCommand::Blink => eyes.blink(true, true),
            EyeCommand::Confused => eyes.trigger_confused(),
            EyeCommand::Laugh => eyes.trigger_laugh(),
            EyeCommand::SetCurious(on) => eyes.set_curious(on),
            EyeCommand::SetCyclops(on) => eyes.set_cyclops(on),
            EyeCommand::ToggleCurious => {
                let on = !eyes.is_curious();
                eyes.set_curious(on);
            }
            EyeCommand::ToggleCyclops => {
                let on = !eyes.is_cyclops();
                eyes.set_cyclops(on);
            }
            EyeCommand::SetAutoblink {
                enabled,
                interval_s,
                variation_s,
            } => eyes.set_autoblink(enabled, interval_s, variation_s),
            EyeCommand::SetIdle {
                enabled,
                interval_s,
                variation_s,
            } => eyes.set_idle(enabled, interval_s, variation_s),
            EyeCommand::SetHFlicker { enabled, amplitude } => eyes.set_h_flicker(enabled, amplitude),
            EyeCommand::SetVFlicker { enabled, amplitude } => eyes.set_v_flicker(enabled, amplitude),
            EyeCommand::ApplyEyes(config) => {
                eyes.apply_config(&config);
                eyes.set_position(config.position);
            }
        }
    }
}

/// Drawn geometry of one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EyeGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub border_radius: i32,
    pub open: bool,
}

impl From<&Eye> for EyeGeometry {
    fn from(eye: &Eye) -> Self {
        Self {
            x: eye.x.current,
            y: eye.y.current,
            width: eye.width.current,
            height: eye.height.current,
            border_radius: eye.border_radius.current,
            open: eye.is_open,
        }
    }
}

/// Read-only summary of the animator, published once per frame
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EyeSnapshot {
    pub frames: u64,
    pub mood: Mood,
    pub curious: bool,
    pub cyclops: bool,
    pub autoblink: bool,
    pub idle: bool,
    pub confused: bool,
    pub laughing: bool,
    pub h_flicker: bool,
    pub v_flicker: bool,
    /// Eyelid heights in pixels: tired, angry, happy
    pub eyelids: (i32, i32, i32),
    pub left: EyeGeometry,
    pub right: EyeGeometry,
    pub space_between: i32,
}

impl<R: RandomSource> From<&EyeAnimator<R>> for EyeSnapshot {
    fn from(eyes: &EyeAnimator<R>) -> Self {
        Self {
            frames: eyes.frames(),
            mood: eyes.mood(),
            curious: eyes.is_curious(),
            cyclops: eyes.is_cyclops(),
            autoblink: eyes.autoblink_enabled(),
            idle: eyes.idle_enabled(),
            confused: eyes.is_confused(),
            laughing: eyes.is_laughing(),
            h_flicker: eyes.h_flicker().active,
            v_flicker: eyes.v_flicker().active,
            eyelids: eyes.eyelids(),
            left: EyeGeometry::from(eyes.left()),
            right: EyeGeometry::from(eyes.right()),
            space_between: eyes.space_between().current,
        }
    }
}
