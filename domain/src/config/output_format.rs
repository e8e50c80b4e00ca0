//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for council reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage with its metadata
    Full,
    /// Only the output of the last stage (default)
    #[default]
    Final,
    /// The whole report as JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_final() {
        assert_eq!(OutputFormat::default(), OutputFormat::Final);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Full).unwrap();
        assert_eq!(json, "\"full\"");
    }

    #[test]
    fn test_deserialize_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
    }
}
