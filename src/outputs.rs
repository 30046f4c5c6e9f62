//! Step outputs written to the file named by `GITHUB_OUTPUT`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{ActionError, Result};

/// Append `name<<delimiter` blocks for every output.
///
/// The heredoc form is used for every value so multi-line JSON survives.
pub fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (name, value) in outputs {
        file.write_all(format_output(name, value)?.as_bytes())?;
    }
    tracing::debug!(path = %path.display(), count = outputs.len(), "Wrote step outputs");
    Ok(())
}

fn format_output(name: &str, value: &str) -> Result<String> {
    if name.is_empty() || name.contains(['\n', '\r', '=', '<']) {
        return Err(ActionError::InvalidParam(format!(
            "invalid output name: {:?}",
            name
        )));
    }
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(ActionError::Other(format!(
            "output {} contains the delimiter",
            name
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut lines = content.lines();
        while let Some(header) = lines.next() {
            let (name, delimiter) = header.split_once("<<").unwrap();
            let mut value = Vec::new();
            for line in lines.by_ref() {
                if line == delimiter {
                    break;
                }
                value.push(line);
            }
            out.push((name.to_string(), value.join("\n")));
        }
        out
    }

    #[test]
    fn test_write_outputs_heredoc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        write_outputs(
            &path,
            &[
                ("entity_number", "42".to_string()),
                ("mcp_config", "{\n  \"mcpServers\": {}\n}".to_string()),
            ],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed = parse(&content);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], ("entity_number".to_string(), "42".to_string()));
        assert_eq!(parsed[1].0, "mcp_config");
        assert_eq!(parsed[1].1, "{\n  \"mcpServers\": {}\n}");
    }

    #[test]
    fn test_write_outputs_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing<<EOF\nvalue\nEOF\n").unwrap();

        write_outputs(&path, &[("is_pr", "true".to_string())]).unwrap();

        let parsed = parse(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], ("is_pr".to_string(), "true".to_string()));
    }

    #[test]
    fn test_invalid_output_name() {
        assert!(format_output("", "x").is_err());
        assert!(format_output("a=b", "x").is_err());
        assert!(format_output("a\nb", "x").is_err());
    }

    #[test]
    fn test_empty_value() {
        let formatted = format_output("allowed_tools", "").unwrap();
        let parsed = parse(&formatted);
        assert_eq!(parsed, vec![("allowed_tools".to_string(), String::new())]);
    }
}
