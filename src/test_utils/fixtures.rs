use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::{Document, HEAD_DOCUMENT};
use crate::reconcile::decision::DecisionProvider;
use crate::reconcile::engine::{ReconcileOptions, Reconciler};
use crate::store::{FsStore, Platform, SkillCatalog};

/// Test fixture providing isolated filesystem environment.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();

        println!("[FIXTURE] Created temp directory: {data_path:?}");

        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a test file with content.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.data_path);
    }
}

pub const CANONICAL_DIR: &str = ".agents/skills";

/// A project root laid out with the default canonical and platform folders.
///
/// Platforms are addressed by name (`claude` lives in `.claude/skills`).
pub struct SkillFixture {
    inner: UnitTestFixture,
    platforms: Vec<String>,
}

impl Default for SkillFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillFixture {
    /// Project with `claude` and `codex` enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platforms(&["claude", "codex"])
    }

    #[must_use]
    pub fn with_platforms(platforms: &[&str]) -> Self {
        Self {
            inner: UnitTestFixture::new(),
            platforms: platforms.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.inner.data_path
    }

    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        self.inner.create_file(relative, content)
    }

    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|err| panic!("read {relative}: {err}"))
    }

    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    #[must_use]
    pub fn document(&self, relative: &str) -> Document {
        Document::parse(&self.read(relative)).expect("fixture document parses")
    }

    #[must_use]
    pub fn canonical_doc(skill: &str) -> String {
        format!("{CANONICAL_DIR}/{skill}/{HEAD_DOCUMENT}")
    }

    #[must_use]
    pub fn platform_doc(platform: &str, skill: &str) -> String {
        format!(".{platform}/skills/{skill}/{HEAD_DOCUMENT}")
    }

    pub fn canonical(&self, skill: &str, content: &str) -> PathBuf {
        self.write(&Self::canonical_doc(skill), content)
    }

    pub fn platform(&self, platform: &str, skill: &str, content: &str) -> PathBuf {
        self.write(&Self::platform_doc(platform, skill), content)
    }

    /// Write a dependent file next to a platform's projection.
    pub fn platform_file(
        &self,
        platform: &str,
        skill: &str,
        relative: &str,
        content: &str,
    ) -> PathBuf {
        self.write(&format!(".{platform}/skills/{skill}/{relative}"), content)
    }

    pub fn canonical_file(&self, skill: &str, relative: &str, content: &str) -> PathBuf {
        self.write(&format!("{CANONICAL_DIR}/{skill}/{relative}"), content)
    }

    #[must_use]
    pub fn catalog(&self) -> SkillCatalog {
        let platforms = self
            .platforms
            .iter()
            .map(|name| Platform::new(name, self.path(&format!(".{name}/skills"))))
            .collect();
        SkillCatalog::new(self.path(CANONICAL_DIR), platforms)
    }

    #[must_use]
    pub fn reconciler<D: DecisionProvider>(&self, decisions: D) -> Reconciler<FsStore, D> {
        Reconciler::new(FsStore, decisions, self.catalog(), ReconcileOptions::default())
    }
}
