//! # Split Manifest
//!
//! The manifest is the declarative description of the source layout: which
//! files make up the scene hierarchy and which textual rewrite rules turn a
//! consumer's references into references to the extracted library.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "scene_files": {
//!     "implementation": ["sway/tree/scene/scene.c"],
//!     "headers": ["include/sway/tree/scene.h"]
//!   },
//!   "modifications": {
//!     "include_patterns": [
//!       { "from": "#include \"sway/tree/scene.h\"", "to": "#include <scene-scroll/scene.h>" }
//!     ]
//!   }
//! }
//! ```
//!
//! Files ending in `.yaml`/`.yml` are read as YAML with the same keys; every
//! other file is read as JSON. The manifest is validated eagerly: the
//! `scene_files.implementation` key is mandatory, every declared path must be
//! repository-relative, and every rewrite pattern must compile. Any failure is
//! reported as [`Error::ManifestLoad`].

use crate::defaults;
use crate::error::{Error, Result};
use crate::path::validate_declared;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// A `{from, to}` rewrite pair as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Regular expression matched against whole file contents.
    pub from: String,
    /// Replacement text; `\1` and `\g<name>` back-references are accepted.
    pub to: String,
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    version: Option<serde_json::Value>,
    scene_files: SceneFiles,
    #[serde(default)]
    modifications: Modifications,
}

#[derive(Debug, Deserialize)]
struct SceneFiles {
    implementation: Vec<String>,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Modifications {
    #[serde(default)]
    include_patterns: Vec<RewriteRule>,
    #[serde(default)]
    source_patterns: Option<Vec<String>>,
}

/// A rewrite rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: RewriteRule,
    pattern: Regex,
    replacement: String,
}

impl CompiledRule {
    pub fn new(rule: RewriteRule) -> Result<Self> {
        let pattern = Regex::new(&rule.from)?;
        let replacement = translate_replacement(&rule.to);
        Ok(Self {
            rule,
            pattern,
            replacement,
        })
    }

    /// Replace every match in `content`.
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(content, self.replacement.as_str())
    }
}

/// The loaded, validated manifest. Immutable for the run's lifetime.
#[derive(Debug, Clone)]
pub struct SplitManifest {
    /// Informational version string.
    pub version: Option<String>,
    pub implementation_files: Vec<String>,
    pub header_files: Vec<String>,
    /// Applied in declaration order, each seeing the previous rule's output.
    pub rewrite_rules: Vec<CompiledRule>,
    /// Watched subtree, repository-relative.
    pub scene_root: String,
    /// Globs selecting consumer files to rewrite.
    pub source_patterns: Vec<String>,
}

impl SplitManifest {
    /// Declared implementation and header paths, in declaration order,
    /// without duplicates.
    pub fn expected_files(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.implementation_files
            .iter()
            .chain(self.header_files.iter())
            .filter(|p| seen.insert(p.as_str()))
            .cloned()
            .collect()
    }
}

/// Load a manifest from disk.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SplitManifest> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ManifestLoad {
        path: shown.clone(),
        message: e.to_string(),
        hint: None,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        parse_yaml(&content, &shown)
    } else {
        parse_json(&content, &shown)
    }
}

/// Parse JSON manifest text; `origin` names the source in errors.
pub fn parse_json(content: &str, origin: &str) -> Result<SplitManifest> {
    let document: ManifestDocument =
        serde_json::from_str(content).map_err(|e| load_error(origin, e.to_string()))?;
    build(document, origin)
}

/// Parse YAML manifest text; `origin` names the source in errors.
pub fn parse_yaml(content: &str, origin: &str) -> Result<SplitManifest> {
    let document: ManifestDocument =
        serde_yaml::from_str(content).map_err(|e| load_error(origin, e.to_string()))?;
    build(document, origin)
}

fn load_error(origin: &str, message: String) -> Error {
    let hint = if message.contains("scene_files") || message.contains("implementation") {
        Some("The manifest must declare 'scene_files.implementation' (a list of paths)".to_string())
    } else {
        None
    };
    Error::ManifestLoad {
        path: origin.to_string(),
        message,
        hint,
    }
}

fn build(document: ManifestDocument, origin: &str) -> Result<SplitManifest> {
    let scene_root = document
        .scene_files
        .root
        .map(|r| r.trim_end_matches('/').to_string())
        .unwrap_or_else(|| defaults::SCENE_ROOT.to_string());

    for path in document
        .scene_files
        .implementation
        .iter()
        .chain(document.scene_files.headers.iter())
        .chain(std::iter::once(&scene_root))
    {
        validate_declared(path).map_err(|e| load_error(origin, e.to_string()))?;
    }

    let rewrite_rules = document
        .modifications
        .include_patterns
        .into_iter()
        .map(|rule| {
            let from = rule.from.clone();
            CompiledRule::new(rule).map_err(|e| Error::ManifestLoad {
                path: origin.to_string(),
                message: format!("invalid include pattern '{}': {}", from, e),
                hint: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let source_patterns = document
        .modifications
        .source_patterns
        .unwrap_or_else(|| {
            defaults::SOURCE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect()
        });
    for pattern in &source_patterns {
        glob::Pattern::new(pattern).map_err(|e| load_error(origin, e.to_string()))?;
    }

    let version = document.version.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(SplitManifest {
        version,
        implementation_files: document.scene_files.implementation,
        header_files: document.scene_files.headers,
        rewrite_rules,
        scene_root,
        source_patterns,
    })
}

/// Translate a backslash-style (`\1`, `\g<name>`) replacement template into `regex` syntax.
///
/// `\1` and `\g<name>` become `${1}` / `${name}`, `\n` and `\t` become the
/// characters they name, `\\` is a literal backslash, and a bare `$` is
/// escaped so it stays literal.
pub fn translate_replacement(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
                        group.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') => {
                    chars.next();
                    if chars.peek() == Some(&'<') {
                        chars.next();
                        let name: String = chars.by_ref().take_while(|c| *c != '>').collect();
                        out.push_str(&format!("${{{}}}", name));
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }

    out
}
