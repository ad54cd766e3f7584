//! JSON output formatting.

use super::OutputConfig;
use serde::Serialize;

/// JSON output formatter
pub struct JsonOutput;

impl JsonOutput {
    /// Pretty-printed JSON, or a single line when `config.compact` is set.
    pub fn format<T: Serialize + ?Sized>(data: &T, config: &OutputConfig) -> String {
        if config.compact {
            serde_json::to_string(data).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string_pretty(data)
                .unwrap_or_else(|e| format!("{{\n  \"error\": \"{}\"\n}}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[derive(Serialize)]
    struct Counts {
        nodes: usize,
        edges: usize,
    }

    #[test]
    fn test_format_pretty() {
        let config = OutputConfig::new(OutputFormat::Json);
        let output = JsonOutput::format(&Counts { nodes: 3, edges: 2 }, &config);
        assert!(output.contains("\"nodes\": 3"));
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let mut config = OutputConfig::new(OutputFormat::Json);
        config.compact = true;
        let output = JsonOutput::format(&Counts { nodes: 3, edges: 2 }, &config);
        assert_eq!(output, r#"{"nodes":3,"edges":2}"#);
    }
}
