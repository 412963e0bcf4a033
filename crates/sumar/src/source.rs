//! Canonical source-file identity.
//!
//! Snapshots embed the path the compiler saw, typically relative to the
//! instrumented build tree (`../src/cat.c` from an `obj-gcov`
//! directory). The resolver maps that to a workspace-relative key so
//! snapshots of the same file group together regardless of which run
//! directory they came from. Resolution is purely lexical; nothing here
//! touches the filesystem.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Canonical, normalized identity of a source file.
///
/// Used as the grouping key for merging: two snapshots merge only when
/// their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey(String);

impl SourceKey {
    /// Fallback key for snapshots whose source path cannot be resolved
    pub const UNKNOWN: &'static str = "unknown";

    /// Key from an already-normalized path string
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.trim().is_empty() {
            Self::unknown()
        } else {
            Self(key)
        }
    }

    /// The `unknown` fallback key
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Key as a path string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key ends with the given source extension (e.g. `.c`)
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0.ends_with(extension)
    }

    /// Filesystem-safe directory name for per-source output
    /// (`../src/cat.c` -> `src_cat.c`).
    #[must_use]
    pub fn dir_name(&self) -> String {
        if self.0 == Self::UNKNOWN {
            return Self::UNKNOWN.to_string();
        }
        let mut s = self.0.replace('\\', "/");
        s = s.trim().to_string();
        for prefix in ["../", "./"] {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.to_string();
                break;
            }
        }
        let name = s.replace('/', "_");
        let name = name.trim_matches('_');
        if name.is_empty() {
            Self::UNKNOWN.to_string()
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps embedded snapshot paths to workspace-relative [`SourceKey`]s
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    object_dir: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
}

impl SourceResolver {
    /// Resolver that passes embedded paths through unchanged
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the object directory the instrumented build ran in.
    /// Build-tree-relative paths are joined onto this before
    /// normalization.
    #[must_use]
    pub fn with_object_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.object_dir = Some(dir.into());
        self
    }

    /// Set the workspace root that resolved paths are made relative to
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Resolve an embedded source path to a canonical key.
    ///
    /// Deterministic and pure. Missing or empty paths fall back to the
    /// literal `unknown` key.
    #[must_use]
    pub fn resolve(&self, embedded: Option<&str>) -> SourceKey {
        let Some(raw) = embedded else {
            return SourceKey::unknown();
        };
        let raw = raw.trim().replace('\\', "/");
        if raw.is_empty() {
            return SourceKey::unknown();
        }

        let Some(object_dir) = &self.object_dir else {
            return SourceKey::new(raw);
        };

        let joined = normalize(&object_dir.join(&raw));
        let relative = match &self.workspace_root {
            Some(root) => match joined.strip_prefix(normalize(root)) {
                Ok(rel) => rel.to_path_buf(),
                // Outside the workspace: keep the embedded path as-is
                Err(_) => return SourceKey::new(raw),
            },
            None => joined,
        };

        SourceKey::new(path_to_slash(&relative))
    }
}

/// Lexical path normalization: resolves `.` and `..` components without
/// consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn path_to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
