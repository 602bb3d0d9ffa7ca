//! Configuration file (.testsum.conf) parsing and package prefix detection
//!
//! The .testsum.conf file uses INI format with a [DEFAULT] section:
//!
//! ```ini
//! [DEFAULT]
//! format=short,dots
//! package_prefix=example.com/project
//! no_summary=skipped
//! color=false
//! ```
//!
//! Values given on the command line take precedence over the file.

use crate::error::{Error, Result};
use crate::format::PackagePath;
use crate::summary::SummarySection;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".testsum.conf";

/// Configuration loaded from .testsum.conf
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestsumConfig {
    /// Formatter names, in the order they are composed
    pub format: Vec<String>,

    /// Import path prefix stripped from package names
    pub package_prefix: Option<String>,

    /// Summary sections to leave out
    pub no_summary: Vec<SummarySection>,

    /// Whether to colour formatter output
    pub color: Option<bool>,
}

impl TestsumConfig {
    /// Load the configuration of `dir`, or an empty one if it has no
    /// .testsum.conf
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        debug!("loading configuration from {}", path.display());
        Self::load_from_file(&path)
    }

    /// Load configuration from a .testsum.conf file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", CONFIG_FILE, e)))?;

        Self::parse(&contents)
    }

    /// Parse configuration from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini: HashMap<String, HashMap<String, String>> = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        let default = ini.get("DEFAULT").ok_or_else(|| {
            Error::Config(format!("No [DEFAULT] section in {}", CONFIG_FILE))
        })?;

        let no_summary = default
            .get("no_summary")
            .map(|value| split_list(value))
            .unwrap_or_default()
            .iter()
            .map(|name| name.parse::<SummarySection>())
            .collect::<Result<Vec<_>>>()?;

        let color = default
            .get("color")
            .map(|value| {
                parse_bool(value)
                    .ok_or_else(|| Error::Config(format!("Invalid value for color: {}", value)))
            })
            .transpose()?;

        Ok(TestsumConfig {
            format: default
                .get("format")
                .map(|value| split_list(value))
                .unwrap_or_default(),
            package_prefix: default
                .get("package_prefix")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            no_summary,
            color,
        })
    }
}

/// Split a comma separated option value, dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Module path declared by the go.mod in `dir`, if there is one
pub fn go_module_path(dir: &Path) -> Result<Option<String>> {
    match fs::read_to_string(dir.join("go.mod")) {
        Ok(contents) => Ok(parse_module_line(&contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_module_line(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let path = line.strip_prefix("module")?;
        if !path.starts_with([' ', '\t']) {
            return None;
        }
        let path = path.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Resolve the package prefix: command line, then configuration file, then
/// the go.mod module path, otherwise no prefix
pub fn resolve_package_path(
    cli: Option<&str>,
    config: &TestsumConfig,
    dir: &Path,
) -> Result<PackagePath> {
    if let Some(prefix) = cli.or(config.package_prefix.as_deref()) {
        return Ok(PackagePath::new(prefix));
    }
    Ok(go_module_path(dir)?
        .map(PackagePath::new)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_config() {
        let config_str = r#"
[DEFAULT]
format=short
"#;

        let config = TestsumConfig::parse(config_str).unwrap();
        assert_eq!(config.format, ["short"]);
        assert!(config.package_prefix.is_none());
        assert!(config.no_summary.is_empty());
        assert!(config.color.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[DEFAULT]
format=dots, standard-quiet
package_prefix=example.com/project
no_summary=skipped,errors
color=no
"#;

        let config = TestsumConfig::parse(config_str).unwrap();
        assert_eq!(config.format, ["dots", "standard-quiet"]);
        assert_eq!(
            config.package_prefix,
            Some("example.com/project".to_string())
        );
        assert_eq!(
            config.no_summary,
            [SummarySection::Skipped, SummarySection::Errors]
        );
        assert_eq!(config.color, Some(false));
    }

    #[test]
    fn test_missing_default_section() {
        let config_str = r#"
[OTHER]
format=short
"#;

        let result = TestsumConfig::parse(config_str);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DEFAULT"));
    }

    #[test]
    fn test_invalid_values() {
        let result = TestsumConfig::parse("[DEFAULT]\ncolor=maybe\n");
        assert!(matches!(result, Err(Error::Config(ref msg)) if msg.contains("color")));

        let result = TestsumConfig::parse("[DEFAULT]\nno_summary=everything\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_without_file() {
        let temp = TempDir::new().unwrap();
        let config = TestsumConfig::load(temp.path()).unwrap();
        assert_eq!(config, TestsumConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[DEFAULT]\nformat=dots\n").unwrap();
        let config = TestsumConfig::load(temp.path()).unwrap();
        assert_eq!(config.format, ["dots"]);
    }

    #[test]
    fn test_parse_module_line() {
        assert_eq!(
            parse_module_line("// comment\nmodule example.com/project\n\ngo 1.21\n"),
            Some("example.com/project".to_string())
        );
        assert_eq!(
            parse_module_line("module \"example.com/quoted\" // trailing\n"),
            Some("example.com/quoted".to_string())
        );
        assert_eq!(parse_module_line("modules are not here\n"), None);
        assert_eq!(parse_module_line("go 1.21\n"), None);
    }

    #[test]
    fn test_resolve_package_path_precedence() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/fromgomod\n").unwrap();

        let config = TestsumConfig {
            package_prefix: Some("example.com/fromconfig".to_string()),
            ..Default::default()
        };

        let path = resolve_package_path(Some("example.com/fromcli"), &config, temp.path()).unwrap();
        assert_eq!(path.prefix(), "example.com/fromcli");

        let path = resolve_package_path(None, &config, temp.path()).unwrap();
        assert_eq!(path.prefix(), "example.com/fromconfig");

        let path = resolve_package_path(None, &TestsumConfig::default(), temp.path()).unwrap();
        assert_eq!(path.prefix(), "example.com/fromgomod");

        let empty = TempDir::new().unwrap();
        let path = resolve_package_path(None, &TestsumConfig::default(), empty.path()).unwrap();
        assert_eq!(path, PackagePath::default());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, ,b,"), ["a", "b"]);
        assert!(split_list("").is_empty());
    }
}
