use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = ".codemap.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    /// The codebase-structure document.
    pub structure: PathBuf,
    /// Directory that file nodes' `path` fields are relative to.
    pub source_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    server: Option<RawServer>,
    render: Option<RawRender>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    structure: Option<PathBuf>,
    source_root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct RawRender {
    width: Option<f64>,
    height: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            server: ServerConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            structure: PathBuf::from("codebase_structure.json"),
            source_root: PathBuf::from("source-original"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

impl Config {
    /// Load `.codemap.toml` from `project_path`; relative data paths are
    /// resolved against `project_path` either way.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        Ok(config.rooted_at(project_path))
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let data = match raw.data {
            Some(d) => DataConfig {
                structure: d.structure.unwrap_or(defaults.data.structure),
                source_root: d.source_root.unwrap_or(defaults.data.source_root),
            },
            None => defaults.data,
        };

        let server = match raw.server {
            Some(s) => ServerConfig {
                host: s.host.unwrap_or(defaults.server.host),
                port: s.port.unwrap_or(defaults.server.port),
            },
            None => defaults.server,
        };

        let render = match raw.render {
            Some(r) => RenderConfig {
                width: r.width.unwrap_or(defaults.render.width),
                height: r.height.unwrap_or(defaults.render.height),
            },
            None => defaults.render,
        };

        Ok(Self {
            data,
            server,
            render,
        })
    }

    /// Resolve relative data paths against `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        if self.data.structure.is_relative() {
            self.data.structure = root.join(&self.data.structure);
        }
        if self.data.source_root.is_relative() {
            self.data.source_root = root.join(&self.data.source_root);
        }
        self
    }
}

pub fn generate_config_template() -> String {
    r#"# codemap configuration

[data]
# Codebase-structure document to serve and render.
structure = "codebase_structure.json"
# Directory that file `path` fields are relative to (source hydration).
source_root = "source-original"

[server]
host = "127.0.0.1"
port = 3000

[render]
# Surface size for SVG export.
width = 960
height = 600
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(&generate_config_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            Config::parse("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_relative_paths_are_rooted() {
        let config = Config::default().rooted_at(Path::new("/work/doom"));
        assert_eq!(
            config.data.structure,
            PathBuf::from("/work/doom/codebase_structure.json")
        );
        assert_eq!(
            config.data.source_root,
            PathBuf::from("/work/doom/source-original")
        );
    }
}
