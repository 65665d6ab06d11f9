use anyhow::Result;

use treemount_filesystem::{Filesystem, MemoryFilesystem};
use treemount_schema::{Kind, Tree};

use crate::{
    compose_tree, project, DirOperations, DirOps, Extensions, FileOperations, FileOps, Ops,
    Output, Site,
};

fn sample() -> Tree {
    Tree::new()
        .file("settings.json", "{}")
        .dir(
            "config",
            Tree::new()
                .file("app.toml", "")
                .dir("profiles", Tree::new().empty_dir("default")),
        )
        .empty_dir("logs")
}

fn assert_same_shape(tree: &Tree, ops: &DirOps<'_, MemoryFilesystem>) {
    let declared: Vec<&str> = tree.iter().map(|(name, _)| name).collect();
    let composed: Vec<&str> = ops.children().map(|(name, _)| name).collect();
    assert_eq!(declared, composed, "Children of {}", ops.path());
    for (name, node) in tree.iter() {
        let child = ops.child(name).unwrap();
        assert_eq!(child.kind(), node.kind());
        assert_eq!(child.path(), ops.path().join(name));
        if let (Some(directory), Ops::Dir(child)) = (node.as_directory(), child) {
            match directory.children() {
                Some(children) => assert_same_shape(children, child),
                None => assert_eq!(child.children().count(), 0),
            }
        }
    }
}

#[test]
fn composed_tree_has_declared_shape() {
    let fs = MemoryFilesystem::new();
    let tree = sample();
    let root = compose_tree(&fs, &project("/app", &tree), Extensions::new());
    assert_eq!(root.path(), "/app");
    assert_eq!(root.parent(), "/");
    assert_same_shape(&tree, &root);
}

#[test]
fn builtin_names_are_fixed_per_kind() {
    let fs = MemoryFilesystem::new();
    let root = compose_tree(&fs, &project("/app", &sample()), Extensions::new());
    let dir_names = root.operation_names();
    assert_eq!(
        dir_names,
        vec![
            "clear_file",
            "create_dir",
            "create_dir_all",
            "create_file",
            "delete_dir",
            "delete_file",
            "exists",
            "list",
            "path",
            "read_file",
            "write_file",
        ]
    );
    for path in ["config", "config/profiles", "config/profiles/default", "logs"] {
        assert_eq!(root.lookup(path).unwrap().operation_names(), dir_names);
    }
    let file_names = vec!["clear", "exists", "path", "read", "write"];
    for path in ["settings.json", "config/app.toml"] {
        assert_eq!(root.lookup(path).unwrap().operation_names(), file_names);
    }
}

#[test]
fn lookup_follows_declared_names() {
    let fs = MemoryFilesystem::new();
    let root = compose_tree(&fs, &project("/app", &sample()), Extensions::new());
    let default = root.lookup("config/profiles/default").unwrap();
    assert_eq!(default.kind(), Kind::Dir);
    assert_eq!(default.path(), "/app/config/profiles/default");
    assert!(root.lookup("config/app.toml/below").is_none());
    assert!(root.lookup("config/missing").is_none());
    assert!(root.lookup("../app").is_none());
    assert!(root.lookup("").is_none());
    assert!(root.dir("settings.json").is_none());
    assert!(root.file("settings.json").is_some());
}

#[test]
fn custom_operations_join_builtins() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory("/app")?;
    fs.write_file("/app/settings.json", "{\"a\": 1}")?;
    let extensions = Extensions::new().on_file(|_: &Site<'_>| {
        FileOperations::new().with(
            "size",
            |file: &FileOps<'_, MemoryFilesystem>, _: &[String]| {
                Ok(Output::Text(file.read().map(|text| text.len().to_string())))
            },
        )
    });
    let root = compose_tree(&fs, &project("/app", &sample()), extensions);
    let file = root.file("settings.json").unwrap();
    assert_eq!(
        file.operation_names(),
        vec!["clear", "exists", "path", "read", "size", "write"]
    );
    assert_eq!(file.call("size", &[])?, Output::Text(Some("8".into())));
    // Directories were given nothing extra
    assert!(!root.operation_names().contains(&"size".to_owned()));
    assert!(root.call("size", &[]).is_err());
    Ok(())
}

#[test]
fn custom_operation_replaces_builtin_in_call() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory("/app")?;
    fs.write_file("/app/settings.json", "{}")?;
    let extensions = Extensions::new().on_file(|_: &Site<'_>| {
        FileOperations::new().with(
            "read",
            |_: &FileOps<'_, MemoryFilesystem>, _: &[String]| {
                Ok(Output::Text(Some("<redacted>".into())))
            },
        )
    });
    let root = compose_tree(&fs, &project("/app", &sample()), extensions);
    let file = root.file("settings.json").unwrap();
    assert_eq!(file.call("read", &[])?, Output::Text(Some("<redacted>".into())));
    assert_eq!(file.read().as_deref(), Some("{}"));
    // Still listed once
    assert_eq!(
        file.operation_names(),
        vec!["clear", "exists", "path", "read", "write"]
    );
    Ok(())
}

fn declared_children_operation<'fs>(site: &Site<'_>) -> DirOperations<'fs, MemoryFilesystem> {
    let names: Vec<String> = site.children.iter().map(|name| name.to_string()).collect();
    DirOperations::new().with(
        "declared",
        move |_: &DirOps<'_, MemoryFilesystem>, _: &[String]| Ok(Output::Listing(names.clone())),
    )
}

#[test]
fn factories_see_declared_children() -> Result<()> {
    let fs = MemoryFilesystem::new();
    let extensions = Extensions::new().on_dir(declared_children_operation);
    let root = compose_tree(&fs, &project("/app", &sample()), extensions);
    assert_eq!(
        root.call("declared", &[])?,
        Output::Listing(vec![
            "config".into(),
            "logs".into(),
            "settings.json".into()
        ])
    );
    assert_eq!(
        root.lookup("config/profiles").unwrap().call("declared", &[])?,
        Output::Listing(vec!["default".into()])
    );
    assert_eq!(
        root.dir("logs").unwrap().call("declared", &[])?,
        Output::Listing(vec![])
    );
    Ok(())
}

#[test]
fn created_nodes_carry_extensions() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory("/app")?;
    let extensions = Extensions::new()
        .on_dir(declared_children_operation)
        .on_file(|site: &Site<'_>| {
            let parent = site.parent.to_owned();
            FileOperations::new().with(
                "parent",
                move |_: &FileOps<'_, MemoryFilesystem>, _: &[String]| {
                    Ok(Output::Path(parent.clone()))
                },
            )
        });
    let root = compose_tree(&fs, &project("/app", &Tree::new()), extensions);

    let created = root.create_dir("made").unwrap();
    assert!(created.operation_names().contains(&"declared".to_owned()));
    assert_eq!(created.call("declared", &[])?, Output::Listing(vec![]));

    let nested = created.create_dir("deeper").unwrap();
    assert!(nested.operation_names().contains(&"declared".to_owned()));

    let file = nested.create_file("note")?;
    assert_eq!(file.call("parent", &[])?, Output::Path("/app/made/deeper".into()));
    assert!(file.declared().is_none());
    Ok(())
}

#[test]
fn named_dispatch_of_builtins() -> Result<()> {
    let fs = MemoryFilesystem::new();
    fs.create_directory("/app")?;
    let root = compose_tree(&fs, &project("/app", &sample()), Extensions::new());
    let args = |values: &[&str]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };

    assert_eq!(root.call("path", &[])?, Output::Path("/app".into()));
    assert_eq!(
        root.call("create_dir", &args(&["logs"]))?,
        Output::Path("/app/logs".into())
    );
    assert_eq!(
        root.call("create_dir", &args(&["missing/child"]))?,
        Output::Flag(false)
    );
    assert_eq!(
        root.call("create_dir_all", &args(&["missing/child"]))?,
        Output::Path("/app/missing/child".into())
    );
    assert_eq!(
        root.call("create_file", &args(&["logs/today", "started"]))?,
        Output::Path("/app/logs/today".into())
    );
    assert_eq!(
        root.call("read_file", &args(&["logs/today"]))?,
        Output::Text(Some("started".into()))
    );
    assert_eq!(
        root.call("create_file", &args(&["logs/empty"]))?,
        Output::Path("/app/logs/empty".into())
    );
    assert_eq!(
        root.call("read_file", &args(&["logs/empty"]))?,
        Output::Text(Some(String::new()))
    );
    assert_eq!(
        root.call("exists", &args(&["logs/today"]))?,
        Output::Flag(true)
    );
    assert_eq!(
        root.call("list", &[])?,
        Output::Listing(vec!["logs".into(), "missing".into()])
    );

    let file = root.lookup("config/app.toml").unwrap();
    assert_eq!(file.call("exists", &[])?, Output::Flag(false));
    Ok(())
}

#[test]
fn dispatch_errors() {
    let fs = MemoryFilesystem::new();
    let root = compose_tree(&fs, &project("/app", &sample()), Extensions::new());
    let error = root.call("nope", &[]).unwrap_err();
    assert!(error.to_string().contains("No operation \"nope\""));
    let error = root.call("read_file", &[]).unwrap_err();
    assert!(error.to_string().contains("does not take 0 argument(s)"));
    let file = root.file("settings.json").unwrap();
    assert!(file.call("write", &[]).is_err());
    assert!(file.call("read", &["extra".to_owned()]).is_err());
}

#[test]
fn output_display() {
    assert_eq!(Output::Unit.to_string(), "");
    assert_eq!(Output::Flag(true).to_string(), "true");
    assert_eq!(Output::Text(None).to_string(), "");
    assert_eq!(Output::Text(Some("text".into())).to_string(), "text");
    assert_eq!(Output::Path("/a/b".into()).to_string(), "/a/b");
    assert_eq!(
        Output::Listing(vec!["a".into(), "b".into()]).to_string(),
        "a\nb"
    );
}
