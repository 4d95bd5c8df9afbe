//! Moonraker HTTP API access.
//!
//! Moonraker is the web API server that sits in front of Klipper. This
//! module only reads from it:
//!
//! | Endpoint | Used for |
//! |---|---|
//! | `GET /server/files/config/{file}` | raw configuration text |
//! | `GET /server/files/list?root=config` | configuration file listing |
//! | `GET /server/files/logs/{file}` | log files (`klippy.log`, `moonraker.log`) |
//! | `GET /printer/info` | Klippy state |
//! | `GET /printer/objects/query?...` | heater, toolhead and print status |
//!
//! JSON endpoints wrap their payload in `{"result": ...}`.

mod client;
pub mod error;

pub use client::MoonrakerClient;
pub use error::{MoonrakerError, MoonrakerResult};

use serde::Deserialize;

/// Printer objects requested by [`MoonrakerClient::query_status`].
pub const STATUS_OBJECTS: &[&str] = &[
    "webhooks",
    "print_stats",
    "virtual_sdcard",
    "extruder",
    "heater_bed",
    "toolhead",
];

/// JSON envelope used by every Moonraker endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub result: T,
}

/// A file in the `config` root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileEntry {
    /// Path relative to the config root (e.g. `macros/start.cfg`).
    pub path: String,
    /// Last modification time, seconds since the Unix epoch.
    #[serde(default)]
    pub modified: f64,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Permission string (`rw`, `r`).
    #[serde(default)]
    pub permissions: String,
}

/// Response of `/printer/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PrinterInfo {
    /// Klippy state: `ready`, `startup`, `shutdown` or `error`.
    pub state: String,
    /// Human-readable state explanation.
    #[serde(default)]
    pub state_message: String,
    /// Host name of the printer host.
    #[serde(default)]
    pub hostname: String,
    /// Klipper version string.
    #[serde(default)]
    pub software_version: String,
}

/// Response of `/printer/objects/query`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusQuery {
    /// Moonraker event time of the snapshot.
    #[serde(default)]
    pub eventtime: f64,
    /// Requested objects. Objects missing from the printer are `None`.
    #[serde(default)]
    pub status: PrinterObjects,
}

/// Subset of Klipper printer objects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrinterObjects {
    /// Klippy connection state.
    pub webhooks: Option<Webhooks>,
    /// Current job.
    pub print_stats: Option<PrintStats>,
    /// File progress.
    pub virtual_sdcard: Option<VirtualSdcard>,
    /// Primary hotend.
    pub extruder: Option<Heater>,
    /// Heated bed.
    pub heater_bed: Option<Heater>,
    /// Motion system.
    pub toolhead: Option<Toolhead>,
}

/// The `webhooks` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Webhooks {
    /// Klippy state.
    pub state: String,
    /// State explanation.
    pub state_message: String,
}

/// The `print_stats` object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrintStats {
    /// `standby`, `printing`, `paused`, `complete`, `cancelled` or `error`.
    pub state: String,
    /// File being printed.
    pub filename: String,
    /// Seconds spent printing.
    pub print_duration: f64,
    /// Error or status message.
    pub message: String,
}

/// The `virtual_sdcard` object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualSdcard {
    /// Fraction of the file processed, `0.0..=1.0`.
    pub progress: f64,
}

/// A heater object (`extruder`, `heater_bed`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Heater {
    /// Current temperature in °C.
    pub temperature: f64,
    /// Target temperature in °C.
    pub target: f64,
    /// PWM duty, `0.0..=1.0`.
    pub power: f64,
}

/// The `toolhead` object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Toolhead {
    /// Homed axes, e.g. `xyz`.
    pub homed_axes: String,
    /// Commanded position `[x, y, z, e]`.
    pub position: Vec<f64>,
}
