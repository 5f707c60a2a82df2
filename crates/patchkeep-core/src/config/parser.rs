//! TOML parser with helpful error messages

use std::path::Path;

use super::schema::Settings;
use crate::error::{DeployError, Result};

/// Load patchkeep.toml and resolve its relative paths against its directory.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DeployError::configuration(
                format!("The config file {} couldn't be located", path.display()),
                "Create patchkeep.toml next to the executable or pass --config.",
            )
        } else {
            DeployError::io(path, e)
        }
    })?;

    let settings = parse_settings_str(&content).map_err(|reason| DeployError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let settings = settings.resolve_relative_to(base);
    settings.validate()?;
    Ok(settings)
}

/// Parse patchkeep.toml content from string
pub fn parse_settings_str(content: &str) -> std::result::Result<Settings, String> {
    toml::from_str(content).map_err(|e| enhance_toml_error(e, content))
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> String {
    let message = error.message().to_string();

    let line_num = error
        .span()
        .map(|span| content[..span.start.min(content.len())].matches('\n').count() + 1);

    match line_num {
        Some(line_num) => format!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            get_line_context(content, line_num),
            message
        ),
        None => format!("TOML parsing error: {}", error),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
