use crate::cli::InitArgs;
use crate::config::{CONFIG_FILE, generate_config_template};
use crate::fs::{FileSystem, default_fs};
use crate::style;

pub fn cmd_init(args: InitArgs) -> i32 {
    cmd_init_with_fs(args, default_fs())
}

pub fn cmd_init_with_fs(args: InitArgs, fs: &dyn FileSystem) -> i32 {
    let config_path = args.path.join(CONFIG_FILE);
    if fs.exists(&config_path) {
        style::error(&format!(
            "{} already exists at {}",
            CONFIG_FILE,
            style::path(&config_path)
        ));
        return 1;
    }

    if let Err(e) = fs.write(&config_path, &generate_config_template()) {
        style::error(&format!("Failed to write config file: {}", e));
        return 1;
    }

    style::success(&format!(
        "Created {} at {}",
        CONFIG_FILE,
        style::path(&config_path)
    ));
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_init_writes_template() {
        let fs = MockFs::new();
        let args = InitArgs {
            path: PathBuf::from("/project"),
        };
        assert_eq!(cmd_init_with_fs(args, &fs), 0);
        assert_eq!(
            fs.contents(Path::new("/project/.codemap.toml")),
            Some(generate_config_template())
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let fs = MockFs::with_files([("/project/.codemap.toml", "[server]\nport = 1\n")]);
        let args = InitArgs {
            path: PathBuf::from("/project"),
        };
        assert_eq!(cmd_init_with_fs(args, &fs), 1);
        assert_eq!(
            fs.contents(Path::new("/project/.codemap.toml")).as_deref(),
            Some("[server]\nport = 1\n")
        );
    }
}
