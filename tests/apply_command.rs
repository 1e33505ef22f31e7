#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `apply` and `render` commands.
//!
//! These run the whole pipeline (configuration → render → placement →
//! manifest → cleanup) against temporary trees.

mod common;

use std::fs;
use std::path::PathBuf;

use common::*;
use stagehand::cli::{ApplyOpts, RenderOpts, SourceOpts};
use stagehand::commands;
use stagehand::logging::Logger;

const CONFIG: &str = r#"
name = "web01"

[server]
port = 8080
aliases = ["www", "api"]
"#;

struct Pipeline {
    trees: Trees,
}

impl Pipeline {
    fn new() -> Self {
        let trees = Trees::new();
        let root = trees.root.path();
        fs::write(root.join("config.toml"), CONFIG).unwrap();
        dir(root, "templates/etc.template", 0o755);
        file(
            root,
            "templates/etc.template/app.conf.template",
            "name = {{ name }}\nport = {{ server.port }}\n{% for alias in server.aliases %}\nalias = {{ alias }}\n{% endfor %}\n",
            0o640,
        );
        file(root, "templates/etc.template/static.txt", "{{ not rendered }}\n", 0o644);
        Self { trees }
    }

    fn source(&self) -> SourceOpts {
        SourceOpts {
            templates: self.trees.root.path().join("templates"),
            config: self.trees.root.path().join("config.toml"),
        }
    }

    fn staging(&self) -> PathBuf {
        self.trees.root.path().join("stage")
    }

    fn manifest_log(&self) -> PathBuf {
        self.trees.root.path().join("manifest.log")
    }

    fn opts(&self) -> ApplyOpts {
        ApplyOpts {
            source: self.source(),
            dest: self.trees.target(),
            backup: Some(self.trees.backup()),
            log: Some(self.manifest_log()),
            dry_run: false,
            staging: Some(self.staging()),
        }
    }
}

fn logger() -> Logger {
    Logger::new("test")
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[test]
fn apply_renders_places_and_cleans_up() {
    let p = Pipeline::new();

    commands::apply::run(&p.opts(), &logger()).unwrap();

    let target = p.trees.target();
    assert_eq!(
        read(&target, "etc/app.conf"),
        "name = web01\nport = 8080\nalias = www\nalias = api\n"
    );
    assert_eq!(read(&target, "etc/static.txt"), "{{ not rendered }}\n");
    assert_eq!(mode(&target, "etc/app.conf"), 0o640);
    assert!(!p.staging().exists(), "staging tree should be removed");
    insta::assert_snapshot!(
        fs::read_to_string(p.manifest_log()).unwrap().replace('\n', ","),
        @"/etc,/etc/app.conf,/etc/static.txt,"
    );
}

#[test]
fn apply_twice_writes_empty_manifest() {
    let p = Pipeline::new();
    commands::apply::run(&p.opts(), &logger()).unwrap();

    commands::apply::run(&p.opts(), &logger()).unwrap();

    assert_eq!(fs::read_to_string(p.manifest_log()).unwrap(), "");
    assert!(!p.trees.backup().exists());
}

#[test]
fn apply_backs_up_changed_file() {
    let p = Pipeline::new();
    dir(&p.trees.target(), "etc", 0o755);
    file(&p.trees.target(), "etc/static.txt", "local edit\n", 0o644);

    commands::apply::run(&p.opts(), &logger()).unwrap();

    assert_eq!(read(&p.trees.backup(), "etc/static.txt"), "local edit\n");
    assert_eq!(read(&p.trees.target(), "etc/static.txt"), "{{ not rendered }}\n");
}

#[test]
fn apply_dry_run_keeps_staging_and_target() {
    let p = Pipeline::new();
    let opts = ApplyOpts {
        dry_run: true,
        ..p.opts()
    };

    commands::apply::run(&opts, &logger()).unwrap();

    assert!(!p.trees.target().join("etc").exists());
    assert!(!p.trees.backup().exists());
    assert_eq!(read(&p.staging(), "etc/app.conf").lines().next(), Some("name = web01"));
    assert_eq!(
        fs::read_to_string(p.manifest_log()).unwrap(),
        "/etc\n/etc/app.conf\n/etc/static.txt\n"
    );
}

#[test]
fn apply_with_missing_key_places_nothing() {
    let p = Pipeline::new();
    file(
        p.trees.root.path(),
        "templates/broken.conf.template",
        "{{ server.missing }}",
        0o644,
    );

    let err = commands::apply::run(&p.opts(), &logger()).unwrap_err();

    assert!(format!("{err:#}").contains("broken.conf"));
    assert_eq!(fs::read_dir(p.trees.target()).unwrap().count(), 0);
    assert!(!p.manifest_log().exists());
}

#[test]
fn apply_with_missing_config_fails() {
    let p = Pipeline::new();
    fs::remove_file(p.trees.root.path().join("config.toml")).unwrap();

    let err = commands::apply::run(&p.opts(), &logger()).unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"));
}

#[test]
fn apply_refuses_non_empty_staging_directory() {
    let p = Pipeline::new();
    file(&p.staging(), "leftover", "x", 0o644);

    let err = commands::apply::run(&p.opts(), &logger()).unwrap_err();

    assert!(err.to_string().contains("not empty"));
    assert_eq!(fs::read_dir(p.trees.target()).unwrap().count(), 0);
}

#[test]
fn apply_conflict_still_writes_partial_manifest() {
    let p = Pipeline::new();
    file(&p.trees.target(), "etc/static.txt/blocker", "x", 0o644);
    dir(&p.trees.target(), "etc", 0o700);

    let err = commands::apply::run(&p.opts(), &logger()).unwrap_err();

    assert!(format!("{err:#}").contains("not empty"));
    assert_eq!(
        fs::read_to_string(p.manifest_log()).unwrap(),
        "/etc\n/etc/app.conf\n"
    );
    assert!(p.staging().exists(), "staging tree kept for inspection");
    assert_eq!(read(&p.trees.target(), "etc/static.txt/blocker"), "x");
}

#[test]
fn apply_manifest_write_failure_does_not_undo_placement() {
    let p = Pipeline::new();
    let opts = ApplyOpts {
        log: Some(p.trees.root.path().join("no/such/dir/manifest.log")),
        ..p.opts()
    };

    let err = commands::apply::run(&opts, &logger()).unwrap_err();

    assert!(format!("{err:#}").contains("manifest"));
    assert_eq!(read(&p.trees.target(), "etc/static.txt"), "{{ not rendered }}\n");
    assert!(!p.staging().exists());
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_writes_output_without_placing() {
    let p = Pipeline::new();
    let output = p.trees.root.path().join("out");
    let opts = RenderOpts {
        source: p.source(),
        output: output.clone(),
    };

    commands::render::run(&opts, &logger()).unwrap();

    assert_eq!(mode(&output, "etc/app.conf"), 0o640);
    assert!(read(&output, "etc/app.conf").contains("port = 8080"));
    assert_eq!(fs::read_dir(p.trees.target()).unwrap().count(), 0);
}
