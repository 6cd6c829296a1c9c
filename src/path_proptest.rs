//! Property-based tests for path handling and textual rewriting.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::{CompiledRule, RewriteRule};
    use crate::meson::{append_to_array, find_keyword_array};
    use crate::path::{base_name, glob_match, normalize, to_repo_relative, validate_declared};
    use crate::phases::rewire::{rewrite_content, update_nested_descriptor};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    fn relative_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..5).prop_map(|parts| parts.join("/"))
    }

    // ============================================================================
    // Path representation
    // ============================================================================

    proptest! {
        /// Property: joining a relative path onto a root and taking it back
        /// off yields the original forward-slash string
        #[test]
        fn repo_relative_round_trips(rel in relative_path()) {
            let root = PathBuf::from("/workspace/scroll");
            let full = root.join(&rel);
            prop_assert_eq!(to_repo_relative(&root, &full).unwrap(), rel);
        }

        /// Property: normalize drops `.` components and is idempotent
        #[test]
        fn normalize_is_idempotent(parts in prop::collection::vec(segment(), 1..5)) {
            let dotted = parts.join("/./");
            let once = normalize(Path::new(&dotted));
            prop_assert_eq!(&once, &parts.join("/"));
            prop_assert_eq!(normalize(Path::new(&once)), once);
        }

        /// Property: generated relative paths are accepted, and any `..`
        /// segment is rejected
        #[test]
        fn validate_declared_rejects_parent_escapes(rel in relative_path(), at in 0usize..4) {
            prop_assert!(validate_declared(&rel).is_ok());
            let mut parts: Vec<&str> = rel.split('/').collect();
            let idx = at.min(parts.len());
            parts.insert(idx, "..");
            prop_assert!(validate_declared(&parts.join("/")).is_err());
            let absolute = format!("/{}", rel);
            prop_assert!(validate_declared(&absolute).is_err());
        }

        /// Property: base_name never contains a separator and ends the path
        #[test]
        fn base_name_is_last_segment(rel in relative_path()) {
            let name = base_name(&rel);
            prop_assert!(!name.contains('/'));
            prop_assert!(rel.ends_with(name));
        }

        /// Property: `**/*.c` selects every `.c` file at any depth and
        /// nothing with another extension
        #[test]
        fn recursive_glob_selects_by_extension(rel in relative_path()) {
            let c_file = format!("{}.c", rel);
            let h_file = format!("{}.h", rel);
            prop_assert!(glob_match("**/*.c", &c_file).unwrap());
            prop_assert!(!glob_match("**/*.c", &h_file).unwrap());
        }
    }

    // ============================================================================
    // Rewriting
    // ============================================================================

    fn include_rules() -> Vec<CompiledRule> {
        vec![
            CompiledRule::new(RewriteRule {
                from: r#"#include "sway/tree/scene\.h""#.to_string(),
                to: "#include <scene-scroll/scene.h>".to_string(),
            })
            .unwrap(),
            CompiledRule::new(RewriteRule {
                from: r#"#include "sway/tree/scene/(\w+)\.h""#.to_string(),
                to: r"#include <scene-scroll/\1.h>".to_string(),
            })
            .unwrap(),
        ]
    }

    fn source_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("#include \"sway/tree/scene.h\"".to_string()),
            segment().prop_map(|name| format!("#include \"sway/tree/scene/{}.h\"", name)),
            segment().prop_map(|name| format!("#include <{}.h>", name)),
            segment().prop_map(|name| format!("int {} = 0;", name)),
            Just(String::new()),
        ]
    }

    proptest! {
        /// Property: a second rewrite pass changes nothing
        #[test]
        fn rewrite_is_idempotent(lines in prop::collection::vec(source_line(), 0..20)) {
            let rules = include_rules();
            let content = lines.join("\n");
            let once = rewrite_content(&content, &rules);
            let twice = rewrite_content(&once, &rules);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!once.contains("\"sway/tree/scene"));
        }

        /// Property: editing a nested build file twice equals editing it once
        #[test]
        fn nested_descriptor_edit_is_idempotent(
            keep in prop::collection::vec(segment(), 0..5),
            scene in prop::collection::vec(segment(), 0..5),
        ) {
            let mut content = String::from("sway_sources = files(\n");
            for name in &keep {
                content.push_str(&format!("  '{}.c',\n", name));
            }
            for name in &scene {
                content.push_str(&format!("  'tree/scene/{}.c',\n", name));
            }
            content.push_str(")\nexecutable('sway', sway_sources, dependencies: [\n    wlroots,\n  ])\n");

            let once = update_nested_descriptor(&content, "tree/scene").unwrap();
            let twice = update_nested_descriptor(&once.content, "tree/scene").unwrap();
            prop_assert!(once.changed);
            prop_assert!(!twice.changed);
            prop_assert!(!once.content.contains("tree/scene/"));
            for name in &keep {
                let entry = format!("'{}.c'", name);
                prop_assert!(once.content.contains(&entry));
            }
        }

        /// Property: an appended item is parsed back as the last item
        #[test]
        fn append_then_parse(items in prop::collection::vec(segment(), 0..6), extra in segment()) {
            let content = format!("dependencies: [{}]", items.join(", "));
            let array = find_keyword_array(&content, "dependencies").unwrap();
            let updated = append_to_array(&content, &array, &extra);
            let reparsed = find_keyword_array(&updated, "dependencies").unwrap();
            let mut expected = items.clone();
            expected.push(extra);
            prop_assert_eq!(reparsed.items, expected);
        }
    }
}
