//! Live mode: evdev touch frames drive the arbiter against a simulated camera.

use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use notify::{RecursiveMode, Watcher};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, Instant},
};

use evdev::{AbsoluteAxisCode, Device, EventType, SynchronizationCode};

use touchmap::config::{Profile, ProfileStore, ScreenSize};
use touchmap::event::Point;
use touchmap::host::{
    Annotations, GestureTelemetry, LatLng, MapListener, Projection, Telemetry, Viewport,
};
use touchmap::GestureArbiter;

use crate::input;
use crate::tracker::Tracker;

/// World-space degrees covered by one dp at zoom 0.
const DEG_PER_DP_AT_Z0: f64 = 360.0 / 256.0;
const MAX_ZOOM: f64 = 22.0;

/// A camera that only exists in the log.
#[derive(Debug)]
pub struct LoggingHost {
    center: LatLng,
    zoom: f64,
    bearing: f64,
    pitch: f64,
    screen: ScreenSize,
    density: f64,
}

impl LoggingHost {
    pub fn new(screen: ScreenSize, density: f64) -> Self {
        Self {
            center: LatLng::default(),
            zoom: 2.0,
            bearing: 0.0,
            pitch: 0.0,
            screen,
            density,
        }
    }

    fn deg_per_dp(&self) -> f64 {
        DEG_PER_DP_AT_Z0 / 2f64.powf(self.zoom)
    }

    fn log_camera(&self, what: &str) {
        info!(
            "{what}: center=({:.5}, {:.5}) zoom={:.2} bearing={:.1} pitch={:.1}",
            self.center.latitude, self.center.longitude, self.zoom, self.bearing, self.pitch
        );
    }
}

impl Viewport for LoggingHost {
    fn move_by(&mut self, dx: f64, dy: f64, duration_ms: Option<u64>) {
        let k = self.deg_per_dp();
        self.center.longitude -= dx * k;
        self.center.latitude = (self.center.latitude + dy * k).clamp(-85.0, 85.0);
        match duration_ms {
            Some(ms) => self.log_camera(&format!("glide {ms}ms")),
            None => self.log_camera("move"),
        }
    }

    fn scale_by(&mut self, factor: f64, _x: f64, _y: f64) {
        if factor > 0.0 {
            self.zoom = (self.zoom + factor.log2()).clamp(0.0, MAX_ZOOM);
        }
        self.log_camera("scale");
    }

    fn set_bearing(&mut self, bearing: f64, _x: f64, _y: f64) {
        self.bearing = bearing.rem_euclid(360.0);
        self.log_camera("rotate");
    }

    fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch;
        self.log_camera("tilt");
    }

    fn zoom(&mut self, zoom_in: bool, focus: Option<Point>) {
        let step = if zoom_in { 1.0 } else { -1.0 };
        self.zoom = (self.zoom + step).clamp(0.0, MAX_ZOOM);
        if let Some(p) = focus {
            debug!("zoom anchored at ({:.0}, {:.0})", p.x, p.y);
        }
        self.log_camera(if zoom_in { "zoom in" } else { "zoom out" });
    }

    fn cancel_transitions(&mut self) {}

    fn set_gesture_in_progress(&mut self, in_progress: bool) {
        debug!("gesture in progress: {in_progress}");
    }

    fn bearing(&self) -> f64 {
        self.bearing
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn size(&self) -> (f32, f32) {
        (self.screen.width, self.screen.height)
    }

    fn set_zoom_controls_visible(&mut self, visible: bool) {
        debug!("zoom controls visible: {visible}");
    }
}

impl Projection for LoggingHost {
    fn from_screen_location(&self, point: Point) -> LatLng {
        let k = self.deg_per_dp() / self.density;
        let dx = (point.x - self.screen.width / 2.0) as f64;
        let dy = (point.y - self.screen.height / 2.0) as f64;
        LatLng {
            latitude: self.center.latitude - dy * k,
            longitude: self.center.longitude + dx * k,
        }
    }
}

impl Annotations for LoggingHost {}

impl MapListener for LoggingHost {
    fn on_map_click(&mut self, position: LatLng) {
        info!(
            "map click at ({:.5}, {:.5})",
            position.latitude, position.longitude
        );
    }

    fn on_map_long_click(&mut self, position: LatLng) {
        info!(
            "map long click at ({:.5}, {:.5})",
            position.latitude, position.longitude
        );
    }
}

impl Telemetry for LoggingHost {
    fn track(&mut self, event: GestureTelemetry) {
        debug!("telemetry {:?} at ({:.0}, {:.0})", event.kind, event.point.x, event.point.y);
    }
}

pub struct LiveOptions {
    pub device: Option<String>,
    pub profile: Option<String>,
}

fn open_devices(paths: Vec<String>, screen: ScreenSize) -> Vec<(Device, Tracker)> {
    let mut devs = vec![];
    for path in paths {
        match Device::open(&path) {
            Ok(dev) => {
                if let Err(e) = dev.set_nonblocking(true) {
                    warn!("{path}: cannot switch to non-blocking reads: {e}");
                    continue;
                }
                let mut tracker = Tracker::new(screen);
                if let Some((x0, x1, y0, y1)) = input::mt_ranges(&dev) {
                    tracker.set_ranges(x0, x1, y0, y1);
                }
                info!(
                    "listening on {} ({})",
                    path,
                    dev.name().unwrap_or("unknown")
                );
                devs.push((dev, tracker));
            }
            Err(e) => warn!("failed to open {path}: {e}"),
        }
    }
    devs
}

pub fn run(opts: LiveOptions) -> Result<()> {
    let store = ProfileStore::load_or_install_default()?;
    let profile_name = opts.profile.unwrap_or_else(|| store.active_name.clone());
    let profile = store.load_named(&profile_name)?;
    let profile_path: PathBuf = store.profiles_dir.join(format!("{profile_name}.toml"));
    info!("live: using profile '{profile_name}'");

    let paths = match opts.device {
        Some(p) => vec![p],
        None => input::discover_multitouch()
            .into_iter()
            .map(|d| d.path)
            .collect(),
    };
    if paths.is_empty() {
        return Err(anyhow!(
            "no multitouch devices detected; run `touchmap doctor`"
        ));
    }
    let mut devs = open_devices(paths, profile.screen);
    if devs.is_empty() {
        return Err(anyhow!("failed to open any touch device"));
    }

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&stop))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&stop))?;

    // rename-on-save replaces the file, so watch its directory
    let (tx_reload, rx_reload) = mpsc::channel::<()>();
    let watched = profile_path.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(ev) = res
            && (ev.kind.is_modify() || ev.kind.is_create())
            && ev.paths.iter().any(|p| p == &watched)
        {
            let _ = tx_reload.send(());
        }
    })?;
    watcher.watch(&store.profiles_dir, RecursiveMode::NonRecursive)?;

    let host = LoggingHost::new(profile.screen, profile.thresholds.density());
    let mut arbiter = GestureArbiter::new(host, profile.thresholds, profile.settings);
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_millis() as u64;

    while !stop.load(Ordering::Relaxed) {
        if rx_reload.try_recv().is_ok() {
            while rx_reload.try_recv().is_ok() {}
            reload(&mut arbiter, &mut devs, &profile_path);
        }

        let mut any_event = false;
        for (dev, tracker) in devs.iter_mut() {
            let Ok(events) = dev.fetch_events() else {
                continue;
            };
            for ev in events {
                any_event = true;
                if ev.event_type() == EventType::ABSOLUTE {
                    match ev.code() {
                        c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => tracker.on_slot(ev.value()),
                        c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                            tracker.on_tracking_id(ev.value())
                        }
                        c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => {
                            tracker.on_pos_x(ev.value())
                        }
                        c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => {
                            tracker.on_pos_y(ev.value())
                        }
                        _ => {}
                    }
                } else if ev.event_type() == EventType::SYNCHRONIZATION
                    && ev.code() == SynchronizationCode::SYN_REPORT.0
                {
                    for pe in tracker.on_syn_report(now_ms()) {
                        arbiter.on_touch_event(&pe);
                    }
                }
            }
        }

        let now = now_ms();
        if arbiter.next_deadline().is_some_and(|due| due <= now) {
            arbiter.advance(now);
        }

        if !any_event {
            thread::sleep(Duration::from_millis(4));
        }
    }

    info!("live: stopping");
    Ok(())
}

/// Swaps in the edited profile; a broken edit keeps the previous one.
fn reload(
    arbiter: &mut GestureArbiter<LoggingHost>,
    devs: &mut [(Device, Tracker)],
    path: &std::path::Path,
) {
    match Profile::load(path) {
        Ok(p) => {
            arbiter.host_mut().screen = p.screen;
            arbiter.host_mut().density = p.thresholds.density();
            for (_, tracker) in devs.iter_mut() {
                tracker.set_screen(p.screen);
            }
            arbiter.set_thresholds(p.thresholds);
            arbiter.set_settings(p.settings);
            info!("profile reloaded from {}", path.display());
        }
        Err(e) => warn!("reload failed, keeping previous profile: {e}"),
    }
}
