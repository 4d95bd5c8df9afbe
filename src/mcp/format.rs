//! Plain-text rendering of parser results and printer data for tool output.
//!
//! Sections are listed in document order, list values comma-joined, and
//! diagnostics one per line with their `Line N:` prefix.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::klipper::{Diagnostic, ParseResult, Section};
use crate::moonraker::{FileEntry, Heater, PrinterInfo, StatusQuery};

/// Renders one section as `[name]` followed by indented `key: value` lines.
#[must_use]
pub fn render_section(name: &str, section: &Section) -> String {
    let mut out = format!("[{name}]\n");
    if section.is_empty() {
        out.push_str("  (no parameters)\n");
    }
    for (key, value) in section {
        let _ = writeln!(out, "  {key}: {value}");
    }
    out
}

/// Renders diagnostics, one per line.
#[must_use]
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a full parse result, optionally restricted to sections whose
/// name starts with `prefix`.
#[must_use]
pub fn render_parse_result(filename: &str, result: &ParseResult, prefix: Option<&str>) -> String {
    let sections = result.document.sections_with_prefix(prefix.unwrap_or(""));

    let mut out = format!("File: {filename}\n");
    let _ = writeln!(
        out,
        "Sections: {}  Includes: {}  Diagnostics: {}",
        result.document.len(),
        result.includes.len(),
        result.diagnostics.len()
    );
    if let Some(prefix) = prefix {
        let _ = writeln!(out, "Showing {} section(s) matching '{prefix}*'", sections.len());
    }

    if !result.includes.is_empty() {
        out.push_str("\nIncludes:\n");
        for include in &result.includes {
            let _ = writeln!(out, "  - {include}");
        }
    }

    for (name, section) in sections {
        out.push('\n');
        out.push_str(&render_section(name, section));
    }

    if !result.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        out.push_str(&render_diagnostics(&result.diagnostics));
        out.push('\n');
    }

    out
}

/// Formats a byte count with a binary unit.
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

/// Formats seconds since the Unix epoch as a UTC timestamp.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // sub-second precision is dropped
pub fn format_timestamp(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0).map_or_else(
        || "unknown".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

/// Renders a config file listing.
#[must_use]
pub fn render_file_list(files: &[FileEntry]) -> String {
    let width = files.iter().map(|f| f.path.len()).max().unwrap_or(0);

    let mut out = format!("{} configuration file(s)\n", files.len());
    for file in files {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>10}  {}  {}",
            file.path,
            human_size(file.size),
            format_timestamp(file.modified),
            file.permissions
        );
    }
    out
}

/// Returns `true` for log lines that report a problem.
///
/// Klipper prefixes user-facing errors with `!!`.
#[must_use]
pub fn is_error_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("!!")
        || trimmed.contains("Traceback")
        || trimmed.to_ascii_lowercase().contains("error")
}

/// Returns the last `count` lines of `text`, optionally only error lines,
/// plus the number of lines that were eligible.
#[must_use]
pub fn tail_lines(text: &str, count: usize, errors_only: bool) -> (Vec<&str>, usize) {
    let eligible: Vec<&str> = text
        .lines()
        .filter(|line| !errors_only || is_error_line(line))
        .collect();
    let total = eligible.len();
    let start = total.saturating_sub(count);
    (eligible[start..].to_vec(), total)
}

fn render_heater(out: &mut String, label: &str, heater: Option<&Heater>) {
    if let Some(h) = heater {
        let _ = write!(out, "{label}: {:.1}°C / {:.1}°C", h.temperature, h.target);
        if h.power > 0.0 {
            let _ = write!(out, " (power {:.0}%)", h.power * 100.0);
        }
        out.push('\n');
    }
}

/// Renders printer state. `status` is `None` when the object query failed.
#[must_use]
pub fn render_status(info: &PrinterInfo, status: Option<&StatusQuery>) -> String {
    let mut out = format!("Klippy state: {}\n", info.state);
    if !info.state_message.is_empty() {
        let _ = writeln!(out, "Message: {}", info.state_message.trim_end());
    }
    if !info.hostname.is_empty() {
        let _ = writeln!(out, "Host: {}", info.hostname);
    }
    if !info.software_version.is_empty() {
        let _ = writeln!(out, "Klipper version: {}", info.software_version);
    }

    let Some(query) = status else {
        out.push_str("\nPrinter objects unavailable\n");
        return out;
    };
    let objects = &query.status;

    out.push('\n');
    render_heater(&mut out, "Extruder", objects.extruder.as_ref());
    render_heater(&mut out, "Bed", objects.heater_bed.as_ref());

    if let Some(toolhead) = &objects.toolhead {
        let homed = if toolhead.homed_axes.is_empty() {
            "none"
        } else {
            toolhead.homed_axes.as_str()
        };
        let _ = write!(out, "Homed axes: {homed}");
        if let [x, y, z, ..] = toolhead.position.as_slice() {
            let _ = write!(out, "  Position: X{x:.2} Y{y:.2} Z{z:.2}");
        }
        out.push('\n');
    }

    if let Some(stats) = &objects.print_stats {
        let _ = write!(out, "Print state: {}", stats.state);
        if !stats.filename.is_empty() {
            let _ = write!(out, " ({})", stats.filename);
        }
        out.push('\n');
        if let Some(sd) = &objects.virtual_sdcard {
            if stats.state == "printing" || stats.state == "paused" {
                let _ = writeln!(
                    out,
                    "Progress: {:.1}%  Elapsed: {:.0} min",
                    sd.progress * 100.0,
                    stats.print_duration / 60.0
                );
            }
        }
        if !stats.message.is_empty() {
            let _ = writeln!(out, "Print message: {}", stats.message);
        }
    }

    out
}
