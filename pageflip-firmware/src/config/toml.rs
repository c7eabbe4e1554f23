//! Minimal TOML parser for display configuration
//!
//! Handles only the subset used by `display.toml`. It does NOT support the
//! full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Integers in decimal or `0x` hex
//! - [section] headers
//! - Comments (# ...)

use pageflip_core::config::DisplayConfig;

/// Default render tick in milliseconds
pub const DEFAULT_FRAME_INTERVAL_MS: u32 = 33;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
}

/// Everything the firmware reads from `display.toml`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    pub display: DisplayConfig,
    /// Render tick
    pub frame_interval_ms: u32,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Panel,
    Frame,
    Transfer,
    Sink,
}

/// Parse TOML configuration, starting from defaults
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "panel" => Ok(Section::Panel),
        "frame" => Ok(Section::Frame),
        "transfer" => Ok(Section::Transfer),
        "sink" => Ok(Section::Sink),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    let value = match value.find('#') {
        // `#` inside a string is not a comment
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut FirmwareConfig,
) -> Result<(), ParseError> {
    let display = &mut config.display;
    match (section, key) {
        (Section::Root, "label") => display.set_label(parse_string(value)?),

        (Section::Panel, "width") => display.geometry.width = parse_int(value)?,
        (Section::Panel, "height") => display.geometry.height = parse_int(value)?,
        (Section::Panel, "pages") => display.num_pages = parse_int(value)?,

        (Section::Frame, "clear_on_begin") => display.clear_on_begin = parse_bool(value)?,
        (Section::Frame, "background") => display.background = parse_int(value)?,
        (Section::Frame, "interval_ms") => config.frame_interval_ms = parse_int(value)?,

        (Section::Transfer, "stall_timeout_ms") => {
            display.stall_timeout_ms = parse_int(value)?
        }

        (Section::Sink, "flip180") => display.sink.flip180 = parse_bool(value)?,
        (Section::Sink, "contrast") => display.sink.contrast = parse_int(value)?,
        (Section::Sink, "column_offset") => display.sink.column_offset = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

/// Parse a decimal or `0x` hex integer into any unsigned width
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    }
    .map_err(|_| ParseError::InvalidValue)?;
    T::try_from(parsed).map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}
