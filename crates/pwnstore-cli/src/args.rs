use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pwnstore")]
#[command(about = "The unofficial Pwnagotchi plugin store")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base directory (default: ~/.pwnstore)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Plugin directory (overrides config)
    #[arg(long, global = true)]
    pub plugin_dir: Option<PathBuf>,

    /// Pwnagotchi config.toml (overrides config)
    #[arg(long, global = true)]
    pub host_config: Option<PathBuf>,

    /// Registry URL or path (overrides config and host config)
    #[arg(long, global = true)]
    pub registry: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all available plugins
    List,

    /// Search plugins by name, description, category or author
    Search {
        /// Search query
        query: String,
    },

    /// Show details about a plugin
    Info {
        /// Name of the plugin
        name: String,
    },

    /// Install a plugin
    Install {
        /// Name of the plugin
        name: String,
    },

    /// Uninstall a plugin
    Uninstall {
        /// Name of the plugin
        name: String,
    },

    /// Upgrade installed plugins whose registry version differs
    Upgrade {
        /// Only this plugin (default: all installed)
        name: Option<String>,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List plugins present in the plugin directory
    Installed,

    /// Build plugins.json from a list of plugin source URLs
    Build {
        /// File with one source URL per line (.py files or .zip archives)
        sources: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "plugins.json")]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective settings
    Show,
    /// Show config file path
    Path,
    /// Create config file with default template
    Init,
}
