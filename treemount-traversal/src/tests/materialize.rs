use std::{cell::Cell, rc::Rc};

use anyhow::Result;

use treemount_filesystem::{Filesystem, MemoryFilesystem};
use treemount_schema::{Content, Kind, Tree};

use crate::{
    compose_tree, materialize, materialize_strict, project, Conflict, Extensions, Materializer,
    Reason,
};

#[test]
fn create_directories_and_files() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            "settings.json" = "{}"
            logs = { type = "dir" }
            config = { children = { "app.toml" = "name = 'app'", profiles = { type = "dir" } } }
            "#
        onto: "/app"
        yields:
            directories:
                "/app/logs"
                "/app/config"
                "/app/config/profiles"
            files:
                "/app/settings.json" ["{}"]
                "/app/config/app.toml" ["name = 'app'"]
    }
}

#[test]
fn missing_content_is_empty() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            empty = { type = "file" }
            "#
        onto: "/app"
        yields:
            files:
                "/app/empty" [""]
    }
}

#[test]
fn existing_entries_are_reused() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            logs = { type = "dir", children = { today = "fresh" } }
            "#
        onto: "/app"
        with:
            directories:
                "/app/logs"
            files:
                "/app/logs/today" ["stale"]
                "/app/logs/yesterday" ["old"]
        yields:
            files:
                "/app/logs/today" ["fresh"]
                "/app/logs/yesterday" ["old"]
    }
}

#[test]
fn conflicts_do_not_stop_siblings() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            a = "hello"
            b = { children = { c = "" } }
            d = "unrelated"
            "#
        onto: "/root"
        with:
            directories:
                "/root/a"
                "/root/b/c"
        yields:
            files:
                "/root/d" ["unrelated"]
            conflicts:
                File "/root/a"
                File "/root/b/c"
    }
}

#[test]
fn directory_over_file_skips_children() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            cache = { children = { index = "", nested = { type = "dir" } } }
            other = { type = "dir" }
            "#
        onto: "/app"
        with:
            directories:
                "/app"
            files:
                "/app/cache" ["not a directory"]
        yields:
            directories:
                "/app/other"
            conflicts:
                Dir "/app/cache"
    }
}

#[test]
fn root_is_a_file() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            child = "content"
            dir = { type = "dir" }
            "#
        onto: "/app"
        with:
            files:
                "/app" ["plain file"]
        yields:
            conflicts:
                Dir "/app"
    }
}

#[test]
fn root_and_ancestors_are_created() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            file = "text"
            "#
        onto: "/home/me/.config/app"
        yields:
            directories:
                "/home/me/.config"
            files:
                "/home/me/.config/app/file" ["text"]
    }
}

#[test]
fn skipped_files_are_left_alone() -> Result<()> {
    assert_effect_of! {
        applying: r#"
            history = { skip = true }
            journal = { contents = "new", skip = true }
            "#
        onto: "/app"
        with:
            directories:
                "/app"
            files:
                "/app/journal" ["kept"]
        yields:
            files:
                "/app/journal" ["kept"]
    }
}

#[test]
fn computed_content_is_evaluated_per_write() -> Result<()> {
    let fs = MemoryFilesystem::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let tree = Tree::new().file(
        "stamp",
        Content::computed(move || {
            counter.set(counter.get() + 1);
            format!("written {} time(s)", counter.get())
        }),
    );
    let planted = project("/app", &tree);

    assert!(materialize(&fs, &planted)?.is_empty());
    assert_eq!(fs.read_file("/app/stamp")?, "written 1 time(s)");
    assert!(materialize(&fs, &planted)?.is_empty());
    assert_eq!(fs.read_file("/app/stamp")?, "written 2 time(s)");

    let root = compose_tree(&fs, &planted, Extensions::new());
    root.file("stamp").unwrap().restore()?;
    assert_eq!(fs.read_file("/app/stamp")?, "written 3 time(s)");
    assert_eq!(calls.get(), 3);
    Ok(())
}

#[test]
fn conflict_reasons() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory_all("/app/file")?;
    fs.write_file("/app/dir", "")?;
    let tree = Tree::new().file("file", "").empty_dir("dir");
    let planted = project("/app", &tree);

    let conflicts = materialize(&fs, &planted)?;
    assert_eq!(
        conflicts,
        vec![
            Conflict {
                kind: Kind::Dir,
                path: "/app/dir".into(),
                reason: "path exists as a file".into(),
            },
            Conflict {
                kind: Kind::File,
                path: "/app/file".into(),
                reason: "path exists as a directory".into(),
            },
        ]
    );
    assert_eq!(
        conflicts[1].to_string(),
        "Cannot create file /app/file: path exists as a directory"
    );

    let conflicts = Materializer::new(&fs)
        .with_reason(|reason| match reason {
            Reason::ExistsAsDirectory => "a directory is in the way".to_owned(),
            Reason::ExistsAsFile => "a file is in the way".to_owned(),
        })
        .run(&planted)?;
    let reasons: Vec<&str> = conflicts.iter().map(|c| c.reason.as_str()).collect();
    assert_eq!(reasons, vec!["a file is in the way", "a directory is in the way"]);
    Ok(())
}

#[test]
fn strict_stops_at_first_conflict() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory_all("/app/a")?;
    let tree = Tree::new().file("a", "").file("z", "");
    let error = materialize_strict(&fs, &project("/app", &tree)).unwrap_err();
    let conflict = error.downcast_ref::<Conflict>().unwrap();
    assert_eq!(conflict.kind, Kind::File);
    assert_eq!(conflict.path, "/app/a");
    assert!(!fs.exists("/app/z"));

    let fs = MemoryFilesystem::new();
    materialize_strict(&fs, &project("/app", &tree))?;
    assert!(fs.is_file("/app/a"));
    assert!(fs.is_file("/app/z"));
    Ok(())
}
