//! Build script for pageflip-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate display.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Cannot read display.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in display.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_panel(&config, &mut errors);
    validate_ranges(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid display configuration", &errors);
    }

    println!("cargo:warning=display.toml validated successfully");
}

/// Sections and keys understood by the firmware parser
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("panel", &["width", "height", "pages"]),
    ("frame", &["clear_on_begin", "background", "interval_ms"]),
    ("transfer", &["stall_timeout_ms"]),
    ("sink", &["flip180", "contrast", "column_offset"]),
];

fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (key, value) in root {
        if key == "label" {
            match value.as_str() {
                Some(label) if label.len() > 16 => {
                    errors.push("label is longer than 16 bytes".to_string())
                }
                Some(_) => {}
                None => errors.push("label must be a string".to_string()),
            }
            continue;
        }

        let Some((_, keys)) = KNOWN_KEYS.iter().find(|(section, _)| *section == key.as_str()) else {
            errors.push(format!("unknown section or key '{}'", key));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", key));
            continue;
        };
        for name in table.keys() {
            if !keys.contains(&name.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", key, name));
            }
        }
    }
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_panel(config: &toml::Value, errors: &mut Vec<String>) {
    let width = int(config, "panel", "width").unwrap_or(128);
    let height = int(config, "panel", "height").unwrap_or(64);
    let pages = int(config, "panel", "pages").unwrap_or(8);

    if width <= 0 || height <= 0 {
        errors.push("[panel] width and height must be positive".to_string());
        return;
    }
    if height % 8 != 0 {
        errors.push("[panel] height must be a multiple of 8".to_string());
        return;
    }
    if !(1..=255).contains(&pages) {
        errors.push("[panel] pages must be 1-255".to_string());
        return;
    }

    let frame_size = width * height / 8;
    if frame_size % pages != 0 {
        errors.push(format!(
            "[panel] pages = {} does not divide the {}-byte frame",
            pages, frame_size
        ));
    }
    if frame_size != 1024 {
        errors.push(format!(
            "[panel] firmware slots are 1024 bytes, panel needs {}",
            frame_size
        ));
    }
}

fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key, max) in [
        ("frame", "background", 0xFF),
        ("sink", "contrast", 0xFF),
        ("sink", "column_offset", 0xFF),
        ("frame", "interval_ms", 60_000),
        ("transfer", "stall_timeout_ms", i64::from(u32::MAX)),
    ] {
        if let Some(value) = int(config, section, key) {
            if !(0..=max).contains(&value) {
                errors.push(format!("[{}] {} must be 0-{}", section, key, max));
            }
        }
    }

    if int(config, "frame", "interval_ms") == Some(0) {
        errors.push("[frame] interval_ms must be non-zero".to_string());
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let line = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
