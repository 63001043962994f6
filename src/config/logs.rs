//! Log console configuration

use serde::Deserialize;

use crate::domain::viewport::VirtualList;

use super::error::ValidationError;

/// Retention and geometry of the log console.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Ring-buffer limit; unset keeps every entry
    pub capacity: Option<usize>,

    #[serde(default = "default_row_height")]
    pub row_height: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Extra rows rendered above and below the viewport
    #[serde(default = "default_overscan")]
    pub overscan: usize,
}

impl LogsConfig {
    pub fn virtual_list(&self) -> VirtualList {
        VirtualList::new(self.row_height, self.viewport_height, self.overscan)
    }

    /// Validate log console configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.row_height == 0 {
            return Err(ValidationError::InvalidRowHeight);
        }
        if self.capacity == Some(0) {
            return Err(ValidationError::InvalidLogCapacity);
        }
        Ok(())
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            row_height: default_row_height(),
            viewport_height: default_viewport_height(),
            overscan: default_overscan(),
        }
    }
}

fn default_row_height() -> u32 {
    24
}

fn default_viewport_height() -> u32 {
    320
}

fn default_overscan() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_defaults() {
        let config = LogsConfig::default();
        assert!(config.capacity.is_none());
        let list = config.virtual_list();
        assert_eq!(list.row_height(), 24);
        assert_eq!(list.viewport_height(), 320);
        assert_eq!(list.overscan(), 5);
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = LogsConfig {
            row_height: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRowHeight));

        let config = LogsConfig {
            capacity: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLogCapacity));
    }
}
