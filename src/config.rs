use directories::UserDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::event::Point;

#[derive(Debug, Error)]
pub enum ProfileError {
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
    #[error("profile not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid profile: {0}")]
    Invalid(String),
    #[error("no home directory for this user")]
    NoHome,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

/// Timing and distance thresholds supplied by the host platform.
///
/// Distances are in density-independent units and scaled by
/// `pixel_density` where the recognizers compare them to screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub tap_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
    pub double_tap_min_time_ms: u64,
    pub long_press_timeout_ms: u64,
    pub touch_slop: f32,
    pub double_tap_slop: f32,
    pub min_fling_velocity: f32,
    pub pixel_density: f32,
    pub min_tilt: f64,
    pub max_tilt: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tap_timeout_ms: 100,
            double_tap_timeout_ms: 300,
            double_tap_min_time_ms: 40,
            long_press_timeout_ms: 500,
            touch_slop: 8.0,
            double_tap_slop: 100.0,
            min_fling_velocity: 50.0,
            pixel_density: 1.0,
            min_tilt: 0.0,
            max_tilt: 60.0,
        }
    }
}

impl Thresholds {
    pub fn touch_slop_px(&self) -> f32 {
        self.touch_slop * self.pixel_density
    }

    pub fn double_tap_slop_px(&self) -> f32 {
        self.double_tap_slop * self.pixel_density
    }

    pub fn min_fling_velocity_px(&self) -> f32 {
        self.min_fling_velocity * self.pixel_density
    }

    pub fn density(&self) -> f64 {
        self.pixel_density as f64
    }
}

/// Gesture toggles the map exposes to applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub zoom_gestures: bool,
    pub rotate_gestures: bool,
    pub tilt_gestures: bool,
    pub scroll_gestures: bool,
    pub deselect_markers_on_tap: bool,
    pub zoom_controls: bool,
    /// Fixed anchor for every scale/rotate/zoom, in screen pixels.
    pub focal_point: Option<Point>,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            zoom_gestures: true,
            rotate_gestures: true,
            tilt_gestures: true,
            scroll_gestures: true,
            deselect_markers_on_tap: true,
            zoom_controls: false,
            focal_point: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub settings: GestureSettings,
    #[serde(default)]
    pub screen: ScreenSize,
}

impl Profile {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(text).map_err(|source| ProfileError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let txt = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&txt, path)
    }
}

pub fn validate_profile(p: &Profile) -> Result<(), ProfileError> {
    let th = &p.thresholds;
    if th.tap_timeout_ms == 0 || th.double_tap_timeout_ms == 0 || th.long_press_timeout_ms == 0 {
        return Err(ProfileError::Invalid(
            "thresholds must be positive durations".into(),
        ));
    }
    if th.double_tap_min_time_ms >= th.double_tap_timeout_ms {
        return Err(ProfileError::Invalid(
            "thresholds.double_tap_min_time_ms must be below double_tap_timeout_ms".into(),
        ));
    }
    if !(th.pixel_density > 0.0) {
        return Err(ProfileError::Invalid(
            "thresholds.pixel_density must be positive".into(),
        ));
    }
    if th.touch_slop < 0.0 || th.double_tap_slop < 0.0 || th.min_fling_velocity < 0.0 {
        return Err(ProfileError::Invalid(
            "slops and fling velocity must not be negative".into(),
        ));
    }
    if th.min_tilt > th.max_tilt {
        return Err(ProfileError::Invalid(format!(
            "thresholds.min_tilt ({}) exceeds max_tilt ({})",
            th.min_tilt, th.max_tilt
        )));
    }
    if p.screen.width <= 0.0 || p.screen.height <= 0.0 {
        return Err(ProfileError::Invalid("screen size must be positive".into()));
    }
    Ok(())
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

pub fn config_dir() -> Result<PathBuf, ProfileError> {
    let home = UserDirs::new()
        .ok_or(ProfileError::NoHome)?
        .home_dir()
        .to_path_buf();
    Ok(home.join(".config").join("touchmap"))
}

/// Profiles on disk plus the pointer naming the active one.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

impl ProfileStore {
    pub fn load_or_install_default() -> Result<Self, ProfileError> {
        Self::open(config_dir()?)
    }

    /// Opens (and seeds, if empty) a store rooted at `root`.
    pub fn open(root: PathBuf) -> Result<Self, ProfileError> {
        let profdir = root.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = root.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let mut active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        if active_name.is_empty() {
            warn!("active profile pointer is empty; using 'default'");
            active_name = "default".into();
        }
        let profile = Profile::load(&profdir.join(format!("{active_name}.toml")))?;

        Ok(Self {
            active_name,
            profile,
            config_dir: root,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.profile_path(&self.active_name)
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    /// Re-reads the active profile; the last good one stays on error.
    pub fn reload(&mut self) -> Result<(), ProfileError> {
        self.profile = Profile::load(&self.active_path())?;
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), ProfileError> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(ProfileError::NotFound(p));
        }
        let profile = Profile::load(&p)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        Ok(())
    }

    /// Loads a named profile without switching to it.
    pub fn load_named(&self, name: &str) -> Result<Profile, ProfileError> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(ProfileError::NotFound(p));
        }
        Profile::load(&p)
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }
}
