//! Scripted input: a TOML list of timed steps runs through the arbiter and
//! every host call comes out as one JSON line.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use touchmap::event::{
    ButtonState, GenericMotionEvent, KeyCode, KeyEvent, MotionAction, Phase, Point, Pointer,
    PointerEvent, TrackballEvent,
};
use touchmap::{Command, GestureArbiter, Profile, RecordingHost};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("step {index}: time {at} is before the previous step ({previous})")]
    OutOfOrder { index: usize, at: u64, previous: u64 },
    #[error("step {index}: touch step without points")]
    EmptyTouch { index: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    #[default]
    Down,
    LongPress,
    Up,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Touch {
        at: u64,
        phase: Phase,
        points: Vec<[f32; 2]>,
        #[serde(default)]
        buttons: ButtonState,
        /// Contact that changed; defaults to the last one listed.
        index: Option<usize>,
    },
    Key {
        at: u64,
        code: KeyCode,
        #[serde(default)]
        action: KeyAction,
        #[serde(default)]
        repeat: u32,
        #[serde(default)]
        canceled: bool,
    },
    Trackball {
        at: u64,
        phase: Phase,
        #[serde(default)]
        dx: f32,
        #[serde(default)]
        dy: f32,
    },
    Wheel {
        at: u64,
        x: f32,
        y: f32,
        clicks: f32,
    },
    Hover {
        at: u64,
        action: MotionAction,
        x: f32,
        y: f32,
    },
    ZoomButton {
        at: u64,
        zoom_in: bool,
    },
    Visibility {
        at: u64,
        visible: bool,
    },
    /// Only lets time pass.
    Tick {
        at: u64,
    },
}

impl Step {
    pub fn at(&self) -> u64 {
        match self {
            Step::Touch { at, .. }
            | Step::Key { at, .. }
            | Step::Trackball { at, .. }
            | Step::Wheel { at, .. }
            | Step::Hover { at, .. }
            | Step::ZoomButton { at, .. }
            | Step::Visibility { at, .. }
            | Step::Tick { at } => *at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    pub name: Option<String>,
    #[serde(default)]
    pub step: Vec<Step>,
}

impl Script {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ScriptError> {
        let script: Script = toml::from_str(text).map_err(|source| ScriptError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let mut previous = 0;
        for (index, step) in self.step.iter().enumerate() {
            let at = step.at();
            if at < previous {
                return Err(ScriptError::OutOfOrder {
                    index,
                    at,
                    previous,
                });
            }
            if let Step::Touch { points, .. } = step {
                if points.is_empty() {
                    return Err(ScriptError::EmptyTouch { index });
                }
            }
            previous = at;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Line<'a> {
    at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<usize>,
    #[serde(flatten)]
    command: &'a Command,
}

struct Driver<'w, W: Write> {
    arbiter: GestureArbiter<RecordingHost>,
    down_time: u64,
    out: &'w mut W,
}

impl<W: Write> Driver<'_, W> {
    fn emit(&mut self, at: u64, step: Option<usize>) -> Result<(), ScriptError> {
        for command in self.arbiter.host_mut().take() {
            let line = Line {
                at,
                step,
                command: &command,
            };
            writeln!(self.out, "{}", serde_json::to_string(&line)?)?;
        }
        Ok(())
    }

    /// Fires timers due up to `until`, in deadline order.
    fn flush(&mut self, until: Option<u64>) -> Result<(), ScriptError> {
        while let Some(due) = self.arbiter.next_deadline() {
            if until.is_some_and(|t| due > t) {
                break;
            }
            self.arbiter.advance(due);
            self.emit(due, None)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, step: &Step) {
        let arbiter = &mut self.arbiter;
        match step {
            Step::Touch {
                at,
                phase,
                points,
                buttons,
                index,
            } => {
                if *phase == Phase::Down {
                    self.down_time = *at;
                }
                let pointers = points
                    .iter()
                    .enumerate()
                    .map(|(id, [x, y])| Pointer::new(id as i32, *x, *y))
                    .collect();
                let mut ev = PointerEvent::new(*phase, pointers, *at)
                    .with_down_time(self.down_time)
                    .with_buttons(*buttons);
                if let Some(i) = index {
                    ev = ev.with_action_index(*i);
                }
                arbiter.on_touch_event(&ev);
            }
            Step::Key {
                code,
                action,
                repeat,
                canceled,
                ..
            } => {
                let mut ev = KeyEvent::new(*code).repeated(*repeat);
                if *canceled {
                    ev = ev.canceled();
                }
                match action {
                    KeyAction::Down => arbiter.on_key_down(&ev),
                    KeyAction::LongPress => arbiter.on_key_long_press(&ev),
                    KeyAction::Up => arbiter.on_key_up(&ev),
                };
            }
            Step::Trackball { at, phase, dx, dy } => {
                let ev = TrackballEvent {
                    phase: *phase,
                    dx: *dx,
                    dy: *dy,
                    time_ms: *at,
                };
                arbiter.on_trackball_event(&ev);
            }
            Step::Wheel { at, x, y, clicks } => {
                arbiter.on_generic_motion(&GenericMotionEvent::scroll(
                    Point::new(*x, *y),
                    *clicks,
                    *at,
                ));
            }
            Step::Hover { at, action, x, y } => {
                arbiter.on_hover(&GenericMotionEvent::hover(*action, Point::new(*x, *y), *at));
            }
            Step::ZoomButton { zoom_in, .. } => {
                arbiter.on_zoom_button(*zoom_in);
            }
            Step::Visibility { visible, .. } => arbiter.on_visibility_changed(*visible),
            Step::Tick { at } => arbiter.advance(*at),
        }
    }
}

/// Runs `script` against a recording host built from `profile`, writing one
/// JSON object per host call. Timers still pending after the last step fire
/// at their deadlines.
pub fn run_script<W: Write>(
    script: &Script,
    profile: &Profile,
    out: &mut W,
) -> Result<(), ScriptError> {
    let host = RecordingHost::new().with_size(profile.screen.width, profile.screen.height);
    let mut driver = Driver {
        arbiter: GestureArbiter::new(host, profile.thresholds.clone(), profile.settings.clone()),
        down_time: 0,
        out,
    };
    if let Some(name) = &script.name {
        debug!("replaying '{name}' ({} steps)", script.step.len());
    }
    for (index, step) in script.step.iter().enumerate() {
        driver.flush(Some(step.at()))?;
        driver.dispatch(step);
        driver.emit(step.at(), Some(index))?;
    }
    driver.flush(None)
}
