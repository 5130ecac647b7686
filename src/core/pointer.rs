//! Pointer strings linking a platform projection to its canonical document.
//!
//! A pointer is the path of the canonical `SKILL.md` relative to the
//! directory holding the projection, `/`-separated and prefixed with `@`.
//! Paths are compared lexically; nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

pub const POINTER_MARKER: char = '@';

/// Build the pointer a projection at `platform_doc` should hold.
#[must_use]
pub fn build_pointer(platform_doc: &Path, canonical_doc: &Path) -> String {
    let from_dir = normalize_lexically(platform_doc.parent().unwrap_or_else(|| Path::new("")));
    let target = normalize_lexically(canonical_doc);

    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = target.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && (from_dir.has_root() || target.has_root()) {
        // Different roots (e.g. drive letters): no relative form exists.
        return format!("{POINTER_MARKER}{}", slash_join(&to));
    }

    let mut parts: Vec<String> =
        std::iter::repeat_n("..".to_string(), from.len() - common).collect();
    parts.extend(
        to[common..]
            .iter()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );
    format!("{POINTER_MARKER}{}", parts.join("/").replace('\\', "/"))
}

/// Resolve a pointer found in the projection at `platform_doc`.
#[must_use]
pub fn resolve_pointer(platform_doc: &Path, pointer: &str) -> Option<PathBuf> {
    let relative = pointer.trim().strip_prefix(POINTER_MARKER)?;
    if relative.is_empty() {
        return None;
    }
    let base = platform_doc.parent().unwrap_or_else(|| Path::new(""));
    Some(normalize_lexically(&base.join(relative)))
}

/// Collapse `.` and `..` components without consulting the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

fn slash_join(components: &[Component<'_>]) -> String {
    components
        .iter()
        .filter(|component| !matches!(component, Component::RootDir))
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}
