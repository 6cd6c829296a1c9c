//! Build descriptor generation for the extracted library.
//!
//! [`LibraryDescriptor`] renders the complete `meson.build` of scene-scroll
//! from the files actually present after extraction. Source files are sorted
//! so the output is stable and diff-friendly for identical inputs.
//! [`render_readme`] produces the companion origin document; its timestamp
//! makes it differ between runs.

use crate::defaults;
use crate::meson::render_string_list;

/// Inputs for the library's `meson.build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDescriptor {
    sources: Vec<String>,
    auxiliary_headers: Vec<String>,
}

impl LibraryDescriptor {
    /// `sources` are `.c` basenames in the library's `src/` directory;
    /// `auxiliary_headers` are the optional headers present at generation time.
    pub fn new<S, H>(sources: S, auxiliary_headers: H) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        let mut sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        sources.sort();
        sources.dedup();
        let mut auxiliary_headers: Vec<String> =
            auxiliary_headers.into_iter().map(Into::into).collect();
        auxiliary_headers.sort();
        auxiliary_headers.dedup();
        Self {
            sources,
            auxiliary_headers,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn render(&self) -> String {
        let source_paths: Vec<String> = self
            .sources
            .iter()
            .map(|name| format!("{}/{}", defaults::LIBRARY_SRC_DIR, name))
            .collect();

        let mut out = String::new();
        out.push_str(&format!(
            "project('{}', 'c',\n  version: '0.0.1',\n  license: 'MIT',\n  meson_version: '>=1.3',\n  default_options: [\n    'c_std=c11',\n    'warning_level=2',\n    'werror=false',\n  ],\n)\n\n",
            defaults::LIBRARY_REPO
        ));
        out.push_str(
            "add_project_arguments(\n  [\n    '-DWLR_USE_UNSTABLE',\n    '-D_POSIX_C_SOURCE=200809L',\n  ],\n  language: 'c',\n)\n\n",
        );
        out.push_str("# Compiler\ncc = meson.get_compiler('c')\n\n");
        out.push_str(
            "# Dependencies\n\
             wlroots = dependency('wlroots-0.20', version: ['>=0.20.0', '<0.21.0'])\n\
             wayland_server = dependency('wayland-server', version: '>=1.21.0')\n\
             wayland_protos = dependency('wayland-protocols', version: '>=1.41')\n\
             pixman = dependency('pixman-1')\n\
             math = cc.find_library('m')\n\n",
        );
        out.push_str(
            "scene_scroll_deps = [\n  wlroots,\n  wayland_server,\n  wayland_protos,\n  pixman,\n  math,\n]\n\n",
        );

        out.push_str("# Source files\nscene_scroll_sources = files(\n");
        out.push_str(&render_string_list(&source_paths, "  "));
        out.push_str(")\n\n");

        out.push_str("# Include directories\nscene_scroll_inc = include_directories('include')\n\n");
        out.push_str(&format!(
            "# Build library\nscene_scroll_lib = library(\n  '{}',\n  scene_scroll_sources,\n  include_directories: scene_scroll_inc,\n  dependencies: scene_scroll_deps,\n  install: true,\n)\n\n",
            defaults::LIBRARY_REPO
        ));
        out.push_str(&format!(
            "# Generate pkg-config file\npkg = import('pkgconfig')\npkg.generate(\n  scene_scroll_lib,\n  description: 'Scene graph library extracted from Scroll window manager',\n  subdirs: ['{}'],\n)\n\n",
            defaults::LIBRARY_REPO
        ));
        out.push_str(
            "# Declare dependency\nscene_scroll_dep = declare_dependency(\n  link_with: scene_scroll_lib,\n  include_directories: scene_scroll_inc,\n  dependencies: scene_scroll_deps,\n)\n\n",
        );
        out.push_str(&format!(
            "# Install headers\ninstall_headers(\n  '{}/{}',\n  subdir: '{}',\n)\n",
            defaults::LIBRARY_INCLUDE_DIR,
            defaults::PUBLIC_HEADER,
            defaults::LIBRARY_REPO
        ));

        if !self.auxiliary_headers.is_empty() {
            let headers: Vec<String> = self
                .auxiliary_headers
                .iter()
                .map(|h| format!("{}/{}", defaults::LIBRARY_INCLUDE_DIR, h))
                .collect();
            out.push_str("\n# Install additional headers\ninstall_headers(\n");
            out.push_str(&render_string_list(&headers, "  "));
            out.push_str(&format!("  subdir: '{}',\n)\n", defaults::LIBRARY_REPO));
        }

        out
    }
}

/// Render the library's README, stamped with its origin.
pub fn render_readme(source_version: &str, generated_at: &str) -> String {
    format!(
        r#"# scene-scroll

Scene graph library extracted from Scroll window manager.

This library contains Scroll's modified wlroots scene graph implementation with
custom modifications for content and workspace scaling.

## Building

```bash
meson setup build
ninja -C build
sudo ninja -C build install
```

## Usage

Include in your meson.build:
```meson
scene_scroll_dep = dependency('scene-scroll')
```

Use in your code:
```c
#include <scene-scroll/scene.h>
```

## Origin

Extracted from Scroll version: {}
Generated on: {}
"#,
        source_version, generated_at
    )
}
