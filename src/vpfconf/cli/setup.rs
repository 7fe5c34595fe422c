use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "vpfconf", bin_name = "vpfconf", version = get_version())]
#[command(about = "Choose VPF feature classes and print layer properties", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging on stderr (VPFCONF_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the library / coverage / feature tree of VPF databases
    #[command(alias = "ls", display_order = 1)]
    Tree {
        /// VPF database directories (the ones holding `lat`)
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Build layer properties from feature selectors
    #[command(alias = "props", display_order = 2)]
    Properties {
        /// VPF database directories
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Feature to include, as library/coverage/feature (repeatable)
        #[arg(short = 'f', long = "feature", required = true, value_name = "SELECTOR")]
        features: Vec<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pick features interactively, reading commands from stdin
    #[command(display_order = 3)]
    Session {
        /// VPF database directories
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Get or set configuration
    #[command(display_order = 4)]
    Config {
        /// Configuration key (e.g., line-color, show-all)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {
    /// Keep coverages without features in tiled libraries
    #[arg(long)]
    pub show_all: bool,

    /// Value of searchByFeature on the new layer
    #[arg(long, value_name = "BOOL")]
    pub search_by_feature: Option<bool>,
}

#[derive(Args, Debug, Default)]
pub struct StyleArgs {
    /// Line color, rrggbb or aarrggbb
    #[arg(long, value_name = "COLOR")]
    pub line_color: Option<String>,

    /// Fill color, rrggbb or aarrggbb
    #[arg(long, value_name = "COLOR")]
    pub fill_color: Option<String>,

    /// Highlight color, rrggbb or aarrggbb
    #[arg(long, value_name = "COLOR")]
    pub select_color: Option<String>,

    #[arg(long, value_name = "WIDTH")]
    pub line_width: Option<String>,

    /// Dash and gap lengths, e.g. "4 2"
    #[arg(long, value_name = "PATTERN")]
    pub dash_pattern: Option<String>,
}

impl StyleArgs {
    /// The given flags as style `(key, value)` pairs.
    pub fn pairs(&self) -> Vec<(String, String)> {
        [
            ("lineColor", &self.line_color),
            ("fillColor", &self.fill_color),
            ("selectColor", &self.select_color),
            ("lineWidth", &self.line_width),
            ("dashPattern", &self.dash_pattern),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
        .collect()
    }
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Prefix every property with this layer marker
    #[arg(long, value_name = "NAME")]
    pub marker: Option<String>,

    /// Print properties as JSON instead of key=value lines
    #[arg(long)]
    pub json: bool,
}
