use std::path::{Path, PathBuf};

use crate::config::{Config, PROJECT_CONFIG_FILE};
use crate::error::Result;
use crate::store::SkillCatalog;

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub catalog: SkillCatalog,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => Self::find_root()?,
        };
        let config = Config::load(cli.config.as_deref(), &root)?;
        let catalog = SkillCatalog::from_config(&root, &config);

        Ok(Self {
            root,
            config,
            catalog,
            robot_mode: cli.robot,
        })
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SKILLSYNC_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        let canonical_dir = std::env::var("SKILLSYNC_CANONICAL_DIR")
            .unwrap_or_else(|_| Config::with_defaults().canonical.dir);
        Ok(find_upwards(&cwd, &[PROJECT_CONFIG_FILE, &canonical_dir]).unwrap_or(cwd))
    }
}

/// First directory at or above `start` holding any of `markers`.
fn find_upwards(start: &Path, markers: &[&str]) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if markers.iter().any(|marker| dir.join(marker).exists()) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
