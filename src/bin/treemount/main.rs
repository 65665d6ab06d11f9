//! Materializes a configured mount, or invokes an operation on one of its nodes.
//!
//! Without `--apply`, everything happens in memory and the resulting tree is printed.
use anyhow::{anyhow, bail, Result};
use camino::Utf8Path;
use clap::Parser;
use tracing::{span, Level};

mod args;
use args::CommandLineArgs;
use treemount::{
    config::ConfigFile,
    filesystem::{DiskFilesystem, Filesystem, MemoryFilesystem},
    mount, Conflict, Extensions, Mount,
};

fn init_logger(verbosity: u8) {
    let sub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_line_number(false);
    let (level, pretty) = match verbosity {
        0 => (Level::WARN, false),
        1 => (Level::INFO, false),
        2 => (Level::INFO, true),
        3 => (Level::DEBUG, true),
        _ => (Level::TRACE, true),
    };
    let sub = sub.with_max_level(level);
    if pretty {
        sub.pretty().init();
    } else {
        sub.init();
    }
}

fn main() -> Result<()> {
    let CommandLineArgs {
        mount: mount_name,
        operation,
        args,
        node,
        config_file,
        apply,
        verbose,
    } = CommandLineArgs::parse();

    init_logger(verbose);
    let span = span!(Level::DEBUG, "main", mount = mount_name.as_str());
    let _guard = span.enter();

    let config = ConfigFile::load(&config_file)?;
    let mount_config = config.mount(&mount_name)?;
    let root = mount_config.root()?;
    tracing::debug!("Root: {}", root);
    tracing::debug!("Apply: {}", apply);

    if apply {
        let fs = DiskFilesystem::new();
        root.check_mountable(&fs)?;
        let mounted = mount(&fs, &root, mount_config.tree(), Extensions::new())?;
        match operation {
            None => check(mounted.materialize()?),
            Some(operation) => invoke(&mounted, node.as_deref(), &operation, &args),
        }
    } else {
        tracing::warn!("Simulating in memory only, use --apply to apply to disk");
        let fs = MemoryFilesystem::new();
        if let Some(parent) = root.path().parent() {
            fs.create_directory_all(parent)?;
        }
        let mounted = mount(&fs, &root, mount_config.tree(), Extensions::new())?;
        let conflicts = mounted.materialize()?;
        match operation {
            None => {
                tracing::warn!("Displaying in-memory filesystem...");
                println!("\n[Root: {}]", mounted.root());
                print_tree(mounted.root(), &fs, 0)?;
                check(conflicts)
            }
            Some(operation) => {
                check(conflicts)?;
                invoke(&mounted, node.as_deref(), &operation, &args)
            }
        }
    }
}

fn check(conflicts: Vec<Conflict>) -> Result<()> {
    if let Some(first) = conflicts.first() {
        bail!(
            "{} conflict(s) with existing entries, the first being: {}",
            conflicts.len(),
            first
        );
    }
    Ok(())
}

fn invoke<FS>(
    mounted: &Mount<'_, FS>,
    node: Option<&Utf8Path>,
    operation: &str,
    args: &[String],
) -> Result<()>
where
    FS: Filesystem,
{
    let output = match node {
        None => mounted.ops().call(operation, args)?,
        Some(path) => mounted
            .ops()
            .lookup(path)
            .ok_or_else(|| anyhow!("No declared node {} in mount at {}", path, mounted.root()))?
            .call(operation, args)?,
    };
    tracing::info!("{} gave {:?}", operation, output);
    let text = output.to_string();
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

fn print_tree<FS>(path: impl AsRef<Utf8Path>, fs: &FS, depth: usize) -> Result<()>
where
    FS: Filesystem,
{
    let path = path.as_ref();
    let name = match depth {
        0 => path.as_str(),
        _ => path
            .file_name()
            .ok_or_else(|| anyhow!("No file name: {}", path))?,
    };
    let dir = fs.is_directory(path);
    print!(
        "{0:indent$}{name}{symbol}",
        "",
        indent = depth * 2,
        symbol = if dir { "/" } else { "" }
    );
    if dir {
        println!();
        for child in {
            let mut list = fs.list_directory(path)?;
            list.sort();
            list
        } {
            print_tree(path.join(&child), fs, depth + 1)?;
        }
    } else {
        let size = fs.read_file(path).map(|content| content.len()).unwrap_or(0);
        println!(" ({size} bytes)");
    }
    Ok(())
}
