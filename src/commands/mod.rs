mod check;
mod export;
mod init;
mod links;
mod scan;
mod serve;
mod show;

pub use check::cmd_check;
pub use export::cmd_export;
pub use init::{cmd_init, cmd_init_with_fs};
pub use links::cmd_links;
pub use scan::cmd_scan;
pub use serve::cmd_serve;
pub use show::cmd_show;

use crate::cli::DataArgs;
use crate::config::Config;
use crate::fs::default_fs;
use crate::loader::Loader;
use crate::render::Dimensions;
use crate::style;
use std::path::{Path, PathBuf};

/// Shared context for command execution: the project directory and its
/// config with any command-line overrides applied.
pub struct CommandContext {
    pub project: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Resolve the project directory and load its config.
    /// Returns Err(exit_code) if setup fails.
    pub fn new(project: &Path, data: &DataArgs) -> Result<Self, i32> {
        let project = match project.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                style::error(&format!(
                    "Could not resolve project directory: {}",
                    style::path(project)
                ));
                return Err(1);
            }
        };

        let mut config = Config::load(&project).unwrap_or_else(|e| {
            style::warning(&format!("Failed to load config: {}. Using defaults.", e));
            Config::default().rooted_at(&project)
        });

        if let Some(structure) = &data.structure {
            config.data.structure = structure.clone();
        }
        if let Some(source_root) = &data.source_root {
            config.data.source_root = source_root.clone();
        }

        Ok(Self { project, config })
    }

    pub fn structure(&self) -> &Path {
        &self.config.data.structure
    }

    pub fn source_root(&self) -> &Path {
        &self.config.data.source_root
    }

    pub fn loader(&self) -> Loader<'static> {
        Loader::new(default_fs(), self.structure(), self.source_root())
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.config.render.width, self.config.render.height)
    }
}
