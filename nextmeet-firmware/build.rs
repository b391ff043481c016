//! Build script for nextmeet-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates settings.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the firmware understands
const SECTIONS: [&str; 5] = ["network", "location", "endpoints", "display", "sync"];

/// Must match the capacities in nextmeet-core's settings types
const MAX_URL_LEN: usize = 128;
const MAX_SSID_LEN: usize = 32;
const MAX_PASSWORD_LEN: usize = 64;
const MAX_TIMEZONE_LEN: usize = 48;

fn main() {
    setup_linker();
    validate_settings();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate settings.toml at compile time
fn validate_settings() {
    println!("cargo:rerun-if-changed=settings.toml");

    let settings_path = Path::new("settings.toml");

    if !settings_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: settings.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds settings.toml at build time.                ║\n\
            ║  Please create one in the nextmeet-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(settings_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read settings.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let settings: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in settings.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&settings, &mut errors);
    validate_network(&settings, &mut errors);
    validate_location(&settings, &mut errors);
    validate_endpoints(&settings, &mut errors);
    validate_display(&settings, &mut errors);
    validate_sync(&settings, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings.toml                                    ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=settings.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn section<'a>(settings: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    settings.get(name).and_then(|s| s.as_table())
}

/// Every top-level key must be a known section
fn validate_sections(settings: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = settings.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Check an optional string's length, or require it
fn check_string(
    table: Option<&toml::Table>,
    section: &str,
    key: &str,
    max_len: usize,
    required: bool,
    errors: &mut Vec<String>,
) -> Option<String> {
    match table.and_then(|t| t.get(key)) {
        Some(toml::Value::String(s)) => {
            if s.len() > max_len {
                errors.push(format!("[{}] {} longer than {} bytes", section, key, max_len));
            }
            Some(s.clone())
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            None
        }
        None => {
            if required {
                errors.push(format!("[{}] missing '{}'", section, key));
            }
            None
        }
    }
}

/// Check an optional integer lies in `min..=max`
fn check_int(
    table: Option<&toml::Table>,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match table.and_then(|t| t.get(key)) {
        Some(toml::Value::Integer(n)) => {
            if *n < min || *n > max {
                errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            }
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => {}
    }
}

fn validate_network(settings: &toml::Value, errors: &mut Vec<String>) {
    let network = section(settings, "network");
    if let Some(ssid) = check_string(network, "network", "ssid", MAX_SSID_LEN, true, errors) {
        if ssid.is_empty() {
            errors.push("[network] ssid cannot be empty".to_string());
        }
    }
    check_string(network, "network", "password", MAX_PASSWORD_LEN, false, errors);
}

fn validate_location(settings: &toml::Value, errors: &mut Vec<String>) {
    let location = section(settings, "location");
    check_string(location, "location", "timezone", MAX_TIMEZONE_LEN, false, errors);

    for (key, limit) in [("latitude", 90.0), ("longitude", 180.0)] {
        let value = match location.and_then(|t| t.get(key)) {
            Some(toml::Value::Float(f)) => *f,
            Some(toml::Value::Integer(n)) => *n as f64,
            Some(_) => {
                errors.push(format!("[location] {} must be a number", key));
                continue;
            }
            None => continue,
        };
        if !(-limit..=limit).contains(&value) {
            errors.push(format!("[location] {} out of range", key));
        }
    }
}

fn validate_endpoints(settings: &toml::Value, errors: &mut Vec<String>) {
    let endpoints = section(settings, "endpoints");
    for key in ["time_url", "event_url"] {
        if let Some(url) = check_string(endpoints, "endpoints", key, MAX_URL_LEN, true, errors) {
            if !url.starts_with("http://") {
                errors.push(format!("[endpoints] {} must start with http://", key));
            }
        }
    }
}

fn validate_display(settings: &toml::Value, errors: &mut Vec<String>) {
    let display = section(settings, "display");
    if let Some(value) = display.and_then(|t| t.get("twelve_hour")) {
        if !value.is_bool() {
            errors.push("[display] twelve_hour must be true or false".to_string());
        }
    }
    check_int(display, "display", "frame_period_ms", 1, 10_000, errors);
    check_int(display, "display", "moon_pulse_frames", 1, 255, errors);
}

fn validate_sync(settings: &toml::Value, errors: &mut Vec<String>) {
    let sync = section(settings, "sync");
    check_int(sync, "sync", "time_interval_s", 1, u32::MAX as i64, errors);
    check_int(sync, "sync", "time_backoff_s", 1, u32::MAX as i64, errors);
    check_int(sync, "sync", "event_interval_s", 1, u32::MAX as i64, errors);
    check_int(sync, "sync", "time_attempts", 1, 255, errors);
}
