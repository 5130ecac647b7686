use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// File name of the project-level config, also used as the root marker.
pub const PROJECT_CONFIG_FILE: &str = ".skillsync.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub canonical: CanonicalConfig,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Config {
    /// Defaults, then global and project files (or one explicit file), then env.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::with_defaults();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SKILLSYNC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SyncError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            canonical: CanonicalConfig::default(),
            platforms: default_platforms(),
            sync: SyncSettings::default(),
        }
    }

    /// The policy actually in force; `strict = true` wins over `policy`.
    #[must_use]
    pub const fn effective_policy(&self) -> SyncPolicy {
        if self.sync.strict {
            SyncPolicy::Strict
        } else {
            self.sync.policy
        }
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("skillsync/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join(PROJECT_CONFIG_FILE))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SyncError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SyncError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.canonical {
            self.canonical.merge(patch);
        }
        if let Some(platforms) = patch.platforms {
            for patch in platforms {
                match self.platforms.iter_mut().find(|p| p.name == patch.name) {
                    Some(existing) => existing.merge(patch),
                    None => self.platforms.push(PlatformConfig::from_patch(patch)),
                }
            }
        }
        if let Some(patch) = patch.sync {
            self.sync.merge(patch);
        }
    }

    /// Enable exactly the named platforms; every other platform is disabled.
    fn enable_only(&mut self, names: &[String]) -> Result<()> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.platforms.iter().any(|p| &p.name == *name))
        {
            return Err(SyncError::Config(format!(
                "SKILLSYNC_PLATFORMS_ENABLED names unknown platform {unknown}"
            )));
        }
        for platform in &mut self.platforms {
            platform.enabled = names.contains(&platform.name);
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SKILLSYNC_CANONICAL_DIR") {
            self.canonical.dir = value;
        }

        if let Some(names) = env_list("SKILLSYNC_PLATFORMS_ENABLED")? {
            self.enable_only(&names)?;
        }

        if let Some(value) = env_bool("SKILLSYNC_STRICT") {
            self.sync.strict = value;
        }
        if let Some(value) = env_bool("SKILLSYNC_FAIL_FAST") {
            self.sync.fail_fast = value;
        }
        if let Some(value) = env_string("SKILLSYNC_POLICY") {
            self.sync.policy = SyncPolicy::parse(&value)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalConfig {
    #[serde(default = "default_canonical_dir")]
    pub dir: String,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            dir: default_canonical_dir(),
        }
    }
}

impl CanonicalConfig {
    fn merge(&mut self, patch: CanonicalPatch) {
        if let Some(value) = patch.dir {
            self.dir = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,
    pub dir: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl PlatformConfig {
    fn new(name: &str, dir: &str, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.to_string(),
            enabled,
        }
    }

    fn from_patch(patch: PlatformPatch) -> Self {
        Self {
            dir: patch
                .dir
                .unwrap_or_else(|| format!(".{}/skills", patch.name)),
            enabled: patch.enabled.unwrap_or(true),
            name: patch.name,
        }
    }

    fn merge(&mut self, patch: PlatformPatch) {
        if let Some(value) = patch.dir {
            self.dir = value;
        }
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
    }
}

/// How decisions are made when the engine cannot decide alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    #[default]
    Interactive,
    Strict,
    KeepCanonical,
}

impl SyncPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "interactive" => Ok(Self::Interactive),
            "strict" => Ok(Self::Strict),
            "keep-canonical" | "keep_canonical" => Ok(Self::KeepCanonical),
            other => Err(SyncError::Config(format!("unknown sync policy {other}"))),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Strict => "strict",
            Self::KeepCanonical => "keep-canonical",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub policy: SyncPolicy,
}

impl SyncSettings {
    fn merge(&mut self, patch: SyncPatch) {
        if let Some(value) = patch.strict {
            self.strict = value;
        }
        if let Some(value) = patch.fail_fast {
            self.fail_fast = value;
        }
        if let Some(value) = patch.policy {
            self.policy = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    canonical: Option<CanonicalPatch>,
    platforms: Option<Vec<PlatformPatch>>,
    sync: Option<SyncPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CanonicalPatch {
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlatformPatch {
    name: String,
    dir: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SyncPatch {
    strict: Option<bool>,
    fail_fast: Option<bool>,
    policy: Option<SyncPolicy>,
}

fn default_canonical_dir() -> String {
    ".agents/skills".to_string()
}

fn default_platforms() -> Vec<PlatformConfig> {
    vec![
        PlatformConfig::new("claude", ".claude/skills", true),
        PlatformConfig::new("codex", ".codex/skills", true),
        PlatformConfig::new("cursor", ".cursor/skills", false),
        PlatformConfig::new("gemini", ".gemini/skills", false),
    ]
}

const fn default_true() -> bool {
    true
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_list(key: &str) -> Result<Option<Vec<String>>> {
    match std::env::var(key) {
        Ok(value) => {
            let list = value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            Ok(Some(list))
        }
        Err(_) => Ok(None),
    }
}
