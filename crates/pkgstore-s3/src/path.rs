//! Key normalization.
//!
//! Registry keys may contain `/` (scoped package names) or `\`; both are
//! escaped so each key maps to exactly one object directly under the
//! configured folder.

/// Escapes a raw registry key: `/` becomes `-` and `\` becomes `_`.
pub fn escape_key(key: &str) -> String {
    key.replace('/', "-").replace('\\', "_")
}

/// Joins `key` onto `folder` with POSIX path-join semantics.
///
/// Redundant separators collapse, `.` segments are dropped and `..`
/// segments are resolved lexically. A leading `/` on the folder and a
/// trailing `/` on the joined result are preserved. Joining two empty
/// strings yields `"."`.
pub fn join_path(folder: &str, key: &str) -> String {
    let joined = match (folder.is_empty(), key.is_empty()) {
        (true, true) => return ".".to_string(),
        (true, false) => key.to_string(),
        (false, true) => folder.to_string(),
        (false, false) => format!("{folder}/{key}"),
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if normalized.is_empty() && !absolute {
        normalized.push('.');
    }
    if trailing && !normalized.is_empty() {
        normalized.push('/');
    }
    if absolute {
        normalized.insert(0, '/');
    }
    normalized
}

/// Maps registry keys to store paths under a fixed folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyNormalizer {
    folder: String,
}

impl KeyNormalizer {
    /// Creates a normalizer for `folder`.
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Returns the folder prefix.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Returns the store path for `key`.
    pub fn normalize(&self, key: &str) -> String {
        join_path(&self.folder, &escape_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_KEYS: &[&str] = &[
        "",
        "lodash-4.17.21.tgz",
        "@babel/core/-/core-7.0.0.tgz",
        "a\\b/c",
        "//",
        "\\\\",
        "..",
        "./x",
        "plain",
    ];

    #[test]
    fn escapes_separators() {
        assert_eq!(escape_key("@scope/name"), "@scope-name");
        assert_eq!(escape_key("a\\b"), "a_b");
        assert_eq!(escape_key("a/b\\c/d"), "a-b_c-d");
        assert_eq!(escape_key(""), "");
    }

    #[test]
    fn escape_is_idempotent() {
        for key in SAMPLE_KEYS {
            let once = escape_key(key);
            assert_eq!(escape_key(&once), once, "key {key:?}");
        }
    }

    #[test]
    fn normalize_is_idempotent_on_safe_keys_without_folder() {
        let normalizer = KeyNormalizer::default();
        for key in ["lodash-4.17.21.tgz", "plain", "a_b-c"] {
            let once = normalizer.normalize(key);
            assert_eq!(normalizer.normalize(&once), once);
        }
    }

    #[test]
    fn no_separators_survive_outside_folder() {
        let normalizer = KeyNormalizer::new("registry/packages");
        for key in SAMPLE_KEYS {
            let path = normalizer.normalize(key);
            let rest = path
                .strip_prefix("registry/packages")
                .unwrap_or(&path)
                .trim_start_matches('/');
            assert!(!rest.contains('/'), "{key:?} -> {path:?}");
            assert!(!rest.contains('\\'), "{key:?} -> {path:?}");
        }
    }

    #[test]
    fn joins_with_single_separator() {
        assert_eq!(join_path("folder", "key"), "folder/key");
        assert_eq!(join_path("folder/", "key"), "folder/key");
        assert_eq!(join_path("folder//sub///", "key"), "folder/sub/key");
        assert_eq!(join_path("/folder", "key"), "/folder/key");
        assert_eq!(join_path("", "key"), "key");
    }

    #[test]
    fn join_edge_cases() {
        assert_eq!(join_path("", ""), ".");
        assert_eq!(join_path("folder", ""), "folder");
        assert_eq!(join_path("folder/", ""), "folder/");
        assert_eq!(join_path("./folder", "key"), "folder/key");
        assert_eq!(join_path("folder", ".."), ".");
        assert_eq!(join_path("a/b", ".."), "a");
        assert_eq!(join_path("/", ".."), "/");
        assert_eq!(join_path("..", "key"), "../key");
    }

    #[test]
    fn normalizer_applies_folder() {
        let normalizer = KeyNormalizer::new("cnpm");
        assert_eq!(normalizer.folder(), "cnpm");
        assert_eq!(
            normalizer.normalize("@scope/pkg/-/pkg-1.0.0.tgz"),
            "cnpm/@scope-pkg---pkg-1.0.0.tgz"
        );
        assert_eq!(normalizer.normalize(""), "cnpm");
    }
}
