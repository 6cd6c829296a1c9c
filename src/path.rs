//! Path manipulation utilities for scroll-split
//!
//! Every path that ends up in a `StructureReport` or in the split report is a
//! repository-relative string with forward slashes, whatever universe it came
//! from (declared in the manifest or enumerated from disk).

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Component, Path};

/// Match a repository-relative path against a glob pattern
///
/// `*` does not cross directory separators; `**/` matches zero or more
/// directories, so `**/*.c` also matches a top-level `main.c`.
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let compiled = Pattern::new(pattern).map_err(Error::Glob)?;
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    if compiled.matches_with(path, options) {
        return Ok(true);
    }
    match pattern.strip_prefix("**/") {
        Some(rest) => Ok(Pattern::new(rest)
            .map_err(Error::Glob)?
            .matches_with(path, options)),
        None => Ok(false),
    }
}

/// Render `path` relative to `root` as a forward-slash string.
pub fn to_repo_relative(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::Path {
        message: format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ),
    })?;
    Ok(normalize(relative))
}

/// Join the normal components of `path` with `/`.
///
/// `.` components are dropped; anything else that is not a plain name
/// (root, prefix, `..`) is kept verbatim so callers can reject it.
pub fn normalize(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::RootDir => parts.push(String::new()),
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
        }
    }
    parts.join("/")
}

/// Validate a manifest path: relative, forward-slash, no parent escapes.
pub fn validate_declared(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::Path {
            message: "empty path in manifest".to_string(),
        });
    }
    if path.starts_with('/') || Path::new(path).is_absolute() {
        return Err(Error::Path {
            message: format!("absolute path in manifest: {}", path),
        });
    }
    if path.contains('\\') {
        return Err(Error::Path {
            message: format!("backslash in manifest path: {}", path),
        });
    }
    if path.split('/').any(|part| part == "..") {
        return Err(Error::Path {
            message: format!("manifest path escapes the repository: {}", path),
        });
    }
    Ok(())
}

/// Returns the final path segment of a forward-slash path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the extension (without dot) of a forward-slash path, if any.
pub fn extension(path: &str) -> Option<&str> {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("**/*.c", "sway/main.c").unwrap());
        assert!(glob_match("**/*.c", "main.c").unwrap());
        assert!(glob_match("**/*.h", "include/sway/tree/scene.h").unwrap());
        assert!(!glob_match("**/*.c", "sway/main.h").unwrap());
        assert!(!glob_match("*.c", "sway/main.c").unwrap());
    }

    #[test]
    fn test_glob_match_invalid_pattern() {
        assert!(glob_match("[", "main.c").is_err());
    }

    #[test]
    fn test_to_repo_relative() {
        let root = PathBuf::from("/ws/scroll");
        let path = root.join("sway").join("tree").join("scene").join("scene.c");
        assert_eq!(
            to_repo_relative(&root, &path).unwrap(),
            "sway/tree/scene/scene.c"
        );
        assert!(to_repo_relative(&root, Path::new("/elsewhere/x.c")).is_err());
    }

    #[test]
    fn test_normalize_drops_cur_dir() {
        assert_eq!(normalize(Path::new("./sway/./tree")), "sway/tree");
    }

    #[test]
    fn test_validate_declared() {
        assert!(validate_declared("sway/tree/scene/scene.c").is_ok());
        assert!(validate_declared("/etc/passwd").is_err());
        assert!(validate_declared("sway/../../x.c").is_err());
        assert!(validate_declared("sway\\tree\\x.c").is_err());
        assert!(validate_declared("").is_err());
    }

    #[test]
    fn test_base_name_and_extension() {
        assert_eq!(base_name("sway/tree/scene/color.c"), "color.c");
        assert_eq!(base_name("scene.h"), "scene.h");
        assert_eq!(extension("sway/tree/scene/color.c"), Some("c"));
        assert_eq!(extension("include/scene.h"), Some("h"));
        assert_eq!(extension("sway/tree/scene/README"), None);
        assert_eq!(extension("sway/.gitignore"), None);
    }
}
