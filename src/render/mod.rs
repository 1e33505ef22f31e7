//! Template rendering: template source tree + configuration → staging tree.
//!
//! Rendering runs in two passes. [`collect_items`] walks the source tree once
//! and resolves every node's final relative path (the `.template` suffix
//! stripped from template files and template directories, the latter
//! affecting all descendants). [`Renderer::render_tree`] then materialises the
//! list in order. Any failure aborts the whole render.
pub mod functions;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use walkdir::WalkDir;

use crate::config::ConfigTree;
use crate::error::RenderError;
use crate::helpers::meta::{self, ApplyError, NodeKind, NodeMeta};

pub use functions::{BuiltinFunctions, FunctionRegistry, HostEnvironment, SystemHost};

/// Suffix marking a file to render, or a directory whose name should lose it.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// What the renderer does with a source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Create the directory.
    Directory,
    /// Render the file through the template engine.
    Template,
    /// Copy the file byte for byte.
    Verbatim,
}

/// One node of the template source tree with its final staging path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateItem {
    /// Absolute path in the template tree.
    pub source: PathBuf,
    /// Path relative to the staging root, suffixes already stripped.
    pub relative: PathBuf,
    /// How the node is produced.
    pub kind: ItemKind,
    /// Mode and ownership to give the produced node.
    pub meta: NodeMeta,
}

/// Counters reported after a render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Directories created.
    pub directories: u32,
    /// Files produced by the template engine.
    pub rendered: u32,
    /// Files copied verbatim.
    pub copied: u32,
}

impl RenderStats {
    /// Number of nodes produced.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.directories + self.rendered + self.copied
    }

    /// One-line summary, e.g. `"2 directories, 3 rendered, 1 copied"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} directories, {} rendered, {} copied",
            self.directories, self.rendered, self.copied
        )
    }
}

/// Strip [`TEMPLATE_SUFFIX`] from `name` unless that would leave nothing.
fn strip_suffix(name: &str) -> &str {
    match name.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Final relative path for a node. Every ancestor component is a directory and
/// loses its suffix; the last component does unless it is a verbatim file.
fn resolve_relative(raw: &Path, kind: ItemKind) -> PathBuf {
    let components: Vec<String> = raw
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let last = components.len().saturating_sub(1);
    components
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i < last || kind != ItemKind::Verbatim {
                strip_suffix(name)
            } else {
                name.as_str()
            }
        })
        .collect()
}

/// Walk `root` and return every node below it, parents before children and
/// siblings in lexical order, with final staging paths resolved.
///
/// # Errors
///
/// Returns [`RenderError::Walk`] if the tree cannot be read and
/// [`RenderError::UnsupportedFileType`] for anything other than regular files
/// and directories (symlinks are not followed).
pub fn collect_items(root: &Path) -> Result<Vec<TemplateItem>, RenderError> {
    let mut items = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| RenderError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let raw = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let metadata = entry.metadata().map_err(|source| RenderError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let node = NodeMeta::from_metadata(&metadata);
        let kind = match node.kind {
            NodeKind::Directory => ItemKind::Directory,
            NodeKind::File if raw.to_string_lossy().ends_with(TEMPLATE_SUFFIX) => {
                ItemKind::Template
            }
            NodeKind::File => ItemKind::Verbatim,
            NodeKind::Other => {
                return Err(RenderError::UnsupportedFileType {
                    relative: raw.display().to_string(),
                });
            }
        };
        items.push(TemplateItem {
            source: entry.path().to_path_buf(),
            relative: resolve_relative(raw, kind),
            kind,
            meta: node,
        });
    }
    Ok(items)
}

/// Renders templates against one configuration tree.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
    context: Value,
}

impl Renderer {
    /// Create a renderer over `config` with no extra functions.
    ///
    /// Undefined variables are errors; block tags swallow their own line, and
    /// a file's trailing newline is preserved.
    #[must_use]
    pub fn new(config: &ConfigTree) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        Self {
            env,
            context: Value::from_serialize(config),
        }
    }

    /// Install the functions of `registry`.
    pub fn register(&mut self, registry: &dyn FunctionRegistry) {
        registry.register(&mut self.env);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_functions(mut self, registry: &dyn FunctionRegistry) -> Self {
        self.register(registry);
        self
    }

    /// Render a single template body.
    ///
    /// # Errors
    ///
    /// Returns the template engine's error for syntax errors, undefined
    /// variables and failing function calls.
    pub fn render_str(&self, name: &str, source: &str) -> Result<String, minijinja::Error> {
        self.env.render_named_str(name, source, &self.context)
    }

    /// Render the template tree at `source_root` into `staging_root`.
    ///
    /// `staging_root` is created if missing. Every produced node receives the
    /// mode and ownership of its source node.
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`] encountered; the staging tree is then
    /// incomplete and must not be placed.
    pub fn render_tree(
        &self,
        source_root: &Path,
        staging_root: &Path,
    ) -> Result<RenderStats, RenderError> {
        let items = collect_items(source_root)?;
        fs::create_dir_all(staging_root)
            .map_err(|e| RenderError::io("create directory", staging_root, e))?;

        let mut stats = RenderStats::default();
        for item in &items {
            let dest = staging_root.join(&item.relative);
            match item.kind {
                ItemKind::Directory => {
                    match fs::create_dir(&dest) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                        Err(e) => return Err(RenderError::io("create directory", &dest, e)),
                    }
                    stats.directories += 1;
                }
                ItemKind::Template => {
                    self.render_file(item, &dest)?;
                    stats.rendered += 1;
                }
                ItemKind::Verbatim => {
                    fs::copy(&item.source, &dest).map_err(|e| RenderError::io("copy", &dest, e))?;
                    stats.copied += 1;
                }
            }
            apply_source_metadata(&dest, &item.meta)?;
            tracing::debug!("staged {}", item.relative.display());
        }
        Ok(stats)
    }

    fn render_file(&self, item: &TemplateItem, dest: &Path) -> Result<(), RenderError> {
        let body = fs::read_to_string(&item.source)
            .map_err(|e| RenderError::io("read template", &item.source, e))?;
        let name = item.relative.display().to_string();
        let rendered = self
            .render_str(&name, &body)
            .map_err(|source| RenderError::Template {
                relative: name.clone(),
                source,
            })?;
        fs::write(dest, rendered).map_err(|e| RenderError::io("write", dest, e))
    }
}

fn apply_source_metadata(dest: &Path, node: &NodeMeta) -> Result<(), RenderError> {
    meta::apply_metadata(dest, node).map_err(|e| match e {
        ApplyError::Chown(errno) => RenderError::io("chown", dest, io::Error::from(errno)),
        ApplyError::Chmod(err) => RenderError::io("chmod", dest, err),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt as _;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn renderer(doc: &str) -> Renderer {
        Renderer::new(&ConfigTree::parse(doc).unwrap())
    }

    // -----------------------------------------------------------------------
    // Path resolution
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_relative_strips_template_directories_for_descendants() {
        let path = resolve_relative(Path::new("nginx.template/sites/app.conf"), ItemKind::Verbatim);
        assert_eq!(path, PathBuf::from("nginx/sites/app.conf"));
    }

    #[test]
    fn resolve_relative_keeps_verbatim_file_name() {
        let path = resolve_relative(Path::new("docs/example.template"), ItemKind::Verbatim);
        assert_eq!(path, PathBuf::from("docs/example.template"));
    }

    #[test]
    fn resolve_relative_never_produces_empty_component() {
        let path = resolve_relative(Path::new(".template"), ItemKind::Template);
        assert_eq!(path, PathBuf::from(".template"));
    }

    #[test]
    fn collect_items_orders_parents_first_and_siblings_lexically() {
        let src = tempfile::tempdir().unwrap();
        write(src.path(), "b.conf", "");
        write(src.path(), "a.d.template/z.conf.template", "");
        write(src.path(), "a.d.template/y.conf", "");

        let items = collect_items(src.path()).unwrap();
        let paths: Vec<_> = items.iter().map(|i| i.relative.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.d"),
                PathBuf::from("a.d/y.conf"),
                PathBuf::from("a.d/z.conf"),
                PathBuf::from("b.conf"),
            ]
        );
        assert_eq!(items[0].kind, ItemKind::Directory);
        assert_eq!(items[1].kind, ItemKind::Verbatim);
        assert_eq!(items[2].kind, ItemKind::Template);
    }

    #[test]
    fn collect_items_rejects_symlinks() {
        let src = tempfile::tempdir().unwrap();
        write(src.path(), "real.conf", "");
        std::os::unix::fs::symlink("real.conf", src.path().join("link.conf")).unwrap();

        let err = collect_items(src.path()).unwrap_err();
        assert!(
            matches!(err, RenderError::UnsupportedFileType { ref relative } if relative == "link.conf"),
            "unexpected error: {err}"
        );
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn render_str_substitutes_nested_keys() {
        let r = renderer("[db]\nhost = \"db1\"\nports = [5432, 5433]\n");
        let out = r
            .render_str(
                "t",
                "host={{ db.host }}\n{% for p in db.ports %}\nport={{ p }}\n{% endfor %}\n",
            )
            .unwrap();
        assert_eq!(out, "host=db1\nport=5432\nport=5433\n");
    }

    #[test]
    fn render_str_fails_on_missing_key() {
        let r = renderer("");
        assert!(r.render_str("t", "{{ missing.key }}").is_err());
    }

    #[test]
    fn render_tree_renders_copies_and_preserves_modes() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "app.conf.template", "name = {{ name }}\n");
        write(src.path(), "static.txt", "{{ untouched }}");
        write(src.path(), "conf.d.template/extra.conf", "x");
        fs::set_permissions(
            src.path().join("app.conf.template"),
            fs::Permissions::from_mode(0o600),
        )
        .unwrap();
        fs::set_permissions(
            src.path().join("conf.d.template"),
            fs::Permissions::from_mode(0o750),
        )
        .unwrap();

        let stats = renderer("name = \"web\"")
            .render_tree(src.path(), out.path())
            .unwrap();

        assert_eq!(
            stats,
            RenderStats {
                directories: 1,
                rendered: 1,
                copied: 2,
            }
        );
        assert_eq!(
            fs::read_to_string(out.path().join("app.conf")).unwrap(),
            "name = web\n"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("static.txt")).unwrap(),
            "{{ untouched }}"
        );
        assert!(out.path().join("conf.d/extra.conf").exists());
        assert!(!out.path().join("app.conf.template").exists());

        let mode = |rel: &str| NodeMeta::stat(&out.path().join(rel)).unwrap().mode;
        assert_eq!(mode("app.conf"), 0o600);
        assert_eq!(mode("conf.d"), 0o750);
    }

    #[test]
    fn render_tree_reports_template_name_on_error() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "broken.conf.template", "{% if %}");

        let err = renderer("")
            .render_tree(src.path(), out.path())
            .unwrap_err();
        assert!(err.to_string().contains("broken.conf"), "got: {err}");
    }
}
