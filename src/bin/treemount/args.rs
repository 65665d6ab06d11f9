use camino::Utf8PathBuf;
use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// The name of the mount to act upon, as given in the config file
    pub mount: String,

    /// An operation to invoke on a node of the mount (otherwise, the mount is materialized)
    pub operation: Option<String>,

    /// Arguments to the operation
    pub args: Vec<String>,

    /// The declared path of the node to operate on, relative to the mount's root (defaults to
    /// the root itself)
    #[arg(long)]
    pub node: Option<Utf8PathBuf>,

    /// The path to the treemount.toml config file
    #[arg(short, long, default_value = "treemount.toml")]
    pub config_file: Utf8PathBuf,

    /// Whether to act on disk (otherwise, only simulate in memory and print)
    #[arg(long)]
    pub apply: bool,

    /// Increase logging verbosity level (0: warn; 1: info; 2: info, pretty; 3: debug; 4: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::CommandLineArgs;

    #[test]
    fn materialize_by_default() {
        let args = CommandLineArgs::parse_from(["treemount", "app"]);
        assert_eq!(args.mount, "app");
        assert!(args.operation.is_none());
        assert!(args.args.is_empty());
        assert_eq!(args.config_file, "treemount.toml");
        assert!(!args.apply);
    }

    #[test]
    fn operation_with_arguments() {
        let args = CommandLineArgs::parse_from([
            "treemount",
            "-vv",
            "--apply",
            "--node",
            "logs",
            "app",
            "write_file",
            "today.log",
            "started",
        ]);
        assert_eq!(args.verbose, 2);
        assert!(args.apply);
        assert_eq!(args.node.as_deref().map(|p| p.as_str()), Some("logs"));
        assert_eq!(args.operation.as_deref(), Some("write_file"));
        assert_eq!(args.args, vec!["today.log", "started"]);
    }
}
