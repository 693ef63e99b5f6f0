//! Input device discovery and diagnostics (evdev 0.13.2 compatible)

use evdev::{AbsoluteAxisCode, Device, EventType};
use serde::Serialize;
use std::{fs, path::Path};

use touchmap::config::ProfileStore;

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            let is_event_node = p
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"));
            if !is_event_node {
                continue;
            }
            if let Ok(dev) = Device::open(&p) {
                if is_multitouch(&dev) {
                    out.push(DeviceInfo {
                        path: p.display().to_string(),
                        name: dev.name().unwrap_or("unknown").to_string(),
                    });
                }
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Raw MT position ranges as (x_min, x_max, y_min, y_max).
pub fn mt_ranges(dev: &Device) -> Option<(i32, i32, i32, i32)> {
    let abs = dev.get_abs_state().ok()?;
    let x = abs.get(AbsoluteAxisCode::ABS_MT_POSITION_X.0 as usize)?;
    let y = abs.get(AbsoluteAxisCode::ABS_MT_POSITION_Y.0 as usize)?;
    Some((x.minimum, x.maximum, y.minimum, y.maximum))
}

fn check_in_input_group() -> bool {
    let Ok(s) = fs::read_to_string("/etc/group") else {
        return false;
    };
    let user = whoami::username();
    s.lines()
        .filter(|line| line.starts_with("input:"))
        .any(|line| {
            line.split(':')
                .nth(3)
                .unwrap_or("")
                .split(',')
                .any(|u| u == user)
        })
}

fn dev_input_readable() -> bool {
    fs::read_dir("/dev/input").is_ok_and(|rd| {
        rd.flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("event"))
            .any(|e| fs::File::open(e.path()).is_ok())
    })
}

pub fn doctor_report(store: &ProfileStore) -> serde_json::Value {
    let devices = discover_multitouch();
    serde_json::json!({
        "dev_input_present": Path::new("/dev/input").exists(),
        "dev_input_readable": dev_input_readable(),
        "input_group_member": check_in_input_group(),
        "profiles_dir": store.profiles_dir,
        "active_profile": store.active_name,
        "screen": store.profile.screen,
        "devices": devices,
        "hints": {
            "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input",
            "verbose_logs": "RUST_LOG=touchmap=debug touchmap live"
        }
    })
}
