use anyhow::Result;
use camino::Utf8PathBuf;

use treemount_filesystem::{DiskFilesystem, Filesystem};
use treemount_schema::{Kind, Tree};

use crate::{compose_tree, materialize, project, Extensions};

fn temp_root() -> Result<(tempfile::TempDir, Utf8PathBuf)> {
    let temp = tempfile::tempdir()?;
    let root = Utf8PathBuf::try_from(temp.path().to_owned())?;
    Ok((temp, root))
}

#[test]
fn write_then_read_on_disk() -> Result<()> {
    let (_temp, root) = temp_root()?;
    let fs = DiskFilesystem::new();
    let tree = Tree::new().dir("notes", Tree::new().file("today.md", ""));
    let ops = compose_tree(&fs, &project(&root, &tree), Extensions::new());
    let file = ops.lookup("notes/today.md").unwrap().as_file().unwrap();
    for text in ["", "one line", "several\nlines\n", "unicode: \u{2713}"] {
        file.write(text)?;
        assert_eq!(file.read().as_deref(), Some(text));
    }
    assert!(fs.is_directory(root.join("notes")));
    Ok(())
}

#[test]
fn clear_on_disk() -> Result<()> {
    let (_temp, root) = temp_root()?;
    let fs = DiskFilesystem::new();
    let ops = compose_tree(&fs, &project(&root, &Tree::new()), Extensions::new());
    ops.clear_file("absent")?;
    assert!(!ops.exists("absent"));
    ops.write_file("present", "content")?;
    ops.clear_file("present")?;
    assert_eq!(ops.read_file("present").as_deref(), Some(""));
    ops.clear_file("present")?;
    assert_eq!(ops.read_file("present").as_deref(), Some(""));
    Ok(())
}

#[test]
fn exists_on_disk() -> Result<()> {
    let (_temp, root) = temp_root()?;
    let fs = DiskFilesystem::new();
    let tree = Tree::new().file("declared.txt", "").empty_dir("declared");
    let ops = compose_tree(&fs, &project(&root, &tree), Extensions::new());

    assert!(!ops.file("declared.txt").unwrap().exists());
    assert!(!ops.exists("declared"));
    assert!(materialize(&fs, &project(&root, &tree))?.is_empty());
    assert!(ops.file("declared.txt").unwrap().exists());
    assert!(ops.exists("declared"));

    assert!(!ops.exists("dynamic"));
    let dynamic = ops.create_dir("dynamic").unwrap();
    assert!(ops.exists("dynamic"));
    let file = dynamic.create_file("file")?;
    assert!(file.exists());
    ops.delete_dir("dynamic")?;
    assert!(!file.exists());
    assert!(!ops.exists("dynamic"));
    Ok(())
}

#[test]
fn materialize_conflicts_on_disk() -> Result<()> {
    let (_temp, root) = temp_root()?;
    let fs = DiskFilesystem::new();
    fs.create_directory_all(root.join("a"))?;
    fs.create_directory_all(root.join("b/c"))?;
    let tree = Tree::from_toml(
        r#"
        a = "hello"
        b = { children = { c = "" } }
        d = "unrelated"
        "#,
    )?;
    let conflicts = materialize(&fs, &project(&root, &tree))?;
    let found: Vec<(Kind, Utf8PathBuf)> = conflicts
        .into_iter()
        .map(|conflict| (conflict.kind, conflict.path))
        .collect();
    assert_eq!(
        found,
        vec![(Kind::File, root.join("a")), (Kind::File, root.join("b/c"))]
    );
    assert_eq!(fs.read_file(root.join("d"))?, "unrelated");
    Ok(())
}
