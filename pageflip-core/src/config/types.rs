//! Display configuration types
//!
//! Fixed at init time. With the `serde` feature the configuration can be
//! stored as postcard binary data.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::geometry::{ConfigError, PageLayout, PanelGeometry};

/// Maximum length of the panel label
pub const MAX_LABEL_LEN: usize = 16;

/// Default SH1106 column offset (its RAM is 132 columns wide)
pub const DEFAULT_COLUMN_OFFSET: u8 = 2;

/// Default contrast for OLED panels
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// Default time without a drained frame before the transfer counts as stalled
pub const DEFAULT_STALL_TIMEOUT_MS: u32 = 500;

/// Hardware settings handed to the sink unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SinkSettings {
    /// Rotate output by 180 degrees
    pub flip180: bool,
    /// Panel contrast (0-255)
    pub contrast: u8,
    /// Controller RAM column offset
    pub column_offset: u8,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            flip180: false,
            contrast: DEFAULT_CONTRAST,
            column_offset: DEFAULT_COLUMN_OFFSET,
        }
    }
}

/// Complete display pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Panel name, for logs
    pub label: String<MAX_LABEL_LEN>,
    /// Panel dimensions
    pub geometry: PanelGeometry,
    /// Pages per frame transfer
    pub num_pages: u8,
    /// Clear the slot before handing it to drawing code
    pub clear_on_begin: bool,
    /// Byte used when clearing
    pub background: u8,
    /// Stall threshold in ms (0 disables stall detection)
    pub stall_timeout_ms: u32,
    /// Sink passthrough settings
    pub sink: SinkSettings,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut label = String::new();
        let _ = label.push_str("sh1106");
        Self {
            label,
            geometry: PanelGeometry::MONO_128X64,
            num_pages: 8,
            clear_on_begin: true,
            background: 0x00,
            stall_timeout_ms: DEFAULT_STALL_TIMEOUT_MS,
            sink: SinkSettings::default(),
        }
    }
}

impl DisplayConfig {
    /// Validate geometry and page split, returning the page layout
    pub fn layout(&self) -> Result<PageLayout, ConfigError> {
        self.geometry.validate()?;
        PageLayout::new(self.geometry.frame_size(), self.num_pages as usize)
    }

    /// Check the configuration against the slot size of a pool
    pub fn validate(&self, slot_size: usize) -> Result<PageLayout, ConfigError> {
        let layout = self.layout()?;
        if layout.frame_size() != slot_size {
            return Err(ConfigError::FrameSizeMismatch {
                expected: slot_size,
                actual: layout.frame_size(),
            });
        }
        Ok(layout)
    }

    /// Set the label, truncating to `MAX_LABEL_LEN`
    pub fn set_label(&mut self, label: &str) {
        self.label.clear();
        for ch in label.chars() {
            if self.label.push(ch).is_err() {
                break;
            }
        }
    }
}

/// Version byte prefixed to persisted configurations
#[cfg(feature = "serde")]
pub const CONFIG_VERSION: u8 = 1;

/// Errors when persisting configuration
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Output buffer too small
    BufferTooSmall,
    /// Stored bytes are not a valid configuration
    Deserialize,
    /// Stored configuration has a different version
    VersionMismatch,
}

#[cfg(feature = "serde")]
impl DisplayConfig {
    /// Serialize into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, PersistError> {
        let (version, body) = buf.split_first_mut().ok_or(PersistError::BufferTooSmall)?;
        *version = CONFIG_VERSION;
        let used = postcard::to_slice(self, body).map_err(|_| PersistError::BufferTooSmall)?;
        Ok(1 + used.len())
    }

    /// Deserialize a configuration written by [`DisplayConfig::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        match bytes.split_first() {
            Some((&CONFIG_VERSION, body)) => {
                postcard::from_bytes(body).map_err(|_| PersistError::Deserialize)
            }
            Some(_) => Err(PersistError::VersionMismatch),
            None => Err(PersistError::Deserialize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DisplayConfig::default();
        let layout = config.validate(1024).unwrap();
        assert_eq!(layout.num_pages(), 8);
        assert_eq!(layout.page_size(), 128);
        assert_eq!(config.label.as_str(), "sh1106");
    }

    #[test]
    fn test_slot_size_mismatch() {
        let config = DisplayConfig::default();
        assert_eq!(
            config.validate(512),
            Err(ConfigError::FrameSizeMismatch {
                expected: 512,
                actual: 1024
            })
        );
    }

    #[test]
    fn test_uneven_pages_rejected() {
        let config = DisplayConfig {
            num_pages: 3,
            ..DisplayConfig::default()
        };
        assert!(matches!(
            config.validate(1024),
            Err(ConfigError::PagesDoNotDivideFrame { .. })
        ));
    }

    #[test]
    fn test_label_truncated() {
        let mut config = DisplayConfig::default();
        config.set_label("an-unreasonably-long-panel-name");
        assert_eq!(config.label.len(), MAX_LABEL_LEN);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_persisted_version_checked() {
        let config = DisplayConfig::default();
        let mut buf = [0u8; 64];
        let len = config.encode(&mut buf).unwrap();
        assert_eq!(DisplayConfig::decode(&buf[..len]), Ok(config));

        buf[0] = CONFIG_VERSION + 1;
        assert_eq!(
            DisplayConfig::decode(&buf[..len]),
            Err(PersistError::VersionMismatch)
        );
        assert_eq!(
            DisplayConfig::encode(&DisplayConfig::default(), &mut [0u8; 2]),
            Err(PersistError::BufferTooSmall)
        );
    }
}
