//! zkviz - Visualize the link network of a Zettelkasten
//!
//! Every note named `"<id> <title>.md"` becomes a node, every `[[id]]` in its
//! body an edge. The network is drawn as an interactive HTML plot or, with
//! `--use-graphviz`, as a static Graphviz diagram.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::visualize::VisualizeOptions;
use config::ZkvizConfig;
use output::{OutputConfig, OutputFormat};
use zk_core::layout::LAYOUT_THRESHOLD;
use zk_core::{
    join_patterns, FilterPolicy, GraphvizEngine, NodeStyle, OutputFormat as DiagramFormat,
    RendererConfig, RendererKind,
};

/// Output file name used when neither the flag nor the config sets one.
const DEFAULT_OUTPUT: &str = "zettel-network";

/// Visualize the link network of a Zettelkasten.
#[derive(Parser, Debug)]
#[command(name = "zkviz")]
#[command(author, version)]
#[command(about = "Visualize the link network of a Zettelkasten")]
#[command(
    long_about = "Reads zettels named \"<id> <title>.md\", links them by their [[id]]\ncitations and draws the network as an interactive HTML plot or a Graphviz diagram."
)]
#[command(after_help = "Examples:
  zkviz --notes-dir ~/notes              Interactive plot of ~/notes/*.md
  zkviz --pattern '*.md' --pattern '*.txt'
  zkviz --use-graphviz --graphviz-ext svg
  zkviz '201906242157 Reading notes.md' '201906242200 Ideas.md'")]
pub struct Cli {
    /// Zettel files to visualize (skips --notes-dir and --pattern)
    #[arg(value_name = "ZETTEL_PATHS")]
    zettel_paths: Vec<PathBuf>,

    /// Directory containing the zettels [default: .]
    #[arg(long, value_name = "DIR", env = "ZKVIZ_NOTES_DIR")]
    notes_dir: Option<PathBuf>,

    /// Output file name without extension [default: zettel-network]
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,

    /// Glob pattern for zettel files, may be repeated [default: *.md]
    #[arg(long = "pattern", value_name = "GLOB")]
    patterns: Vec<String>,

    /// Draw a static diagram with Graphviz instead of the interactive plot
    #[arg(long)]
    use_graphviz: bool,

    /// Renderer to use: graphviz (static) or plotly (interactive) [default: plotly]
    #[arg(long, value_name = "KIND", conflicts_with = "use_graphviz")]
    renderer: Option<RendererKind>,

    /// Graphviz layout engine: circo, dot, fdp, neato, osage, patchwork, sfdp, twopi
    #[arg(long, value_name = "ENGINE")]
    graphviz_layout: Option<GraphvizEngine>,

    /// Graphviz node style: record or plaintext
    #[arg(long, value_name = "STYLE")]
    graphviz_style: Option<NodeStyle>,

    /// Graphviz output file type: pdf, png or svg
    #[arg(long, value_name = "EXT")]
    graphviz_ext: Option<DiagramFormat>,

    /// Only draw links between the zettels found
    #[arg(long)]
    only_listed: bool,

    /// Leave out links from a zettel to itself
    #[arg(long)]
    no_self_references: bool,

    /// Do not open the result when done
    #[arg(long)]
    no_view: bool,

    /// Seed for the random layout used on large networks
    #[arg(long)]
    seed: Option<u64>,

    /// Summary format (overrides config default)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print the JSON summary on a single line
    #[arg(long)]
    compact: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file to use instead of ./.zkvizrc.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show detailed version information
    #[arg(long = "version-verbose")]
    version_verbose: bool,
}

impl Cli {
    /// Merge flags with the config file. Flags win, then config, then defaults.
    fn resolve(&self, config: &ZkvizConfig) -> VisualizeOptions {
        let patterns = if self.patterns.is_empty() {
            config.patterns()
        } else {
            self.patterns.as_slice()
        };

        let notes_dir = self
            .notes_dir
            .clone()
            .or_else(|| config.discovery.notes_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let output = self
            .output
            .clone()
            .or_else(|| config.output.name.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

        let policy = FilterPolicy::new(
            !self.no_self_references && config.filter.include_self_references.unwrap_or(true),
            self.only_listed || config.filter.only_listed.unwrap_or(false),
        );

        let renderer = RendererConfig {
            kind: if self.use_graphviz {
                RendererKind::Graphviz
            } else {
                self.renderer.or(config.output.renderer).unwrap_or_default()
            },
            engine: self
                .graphviz_layout
                .or(config.graphviz.engine)
                .unwrap_or_default(),
            node_style: self
                .graphviz_style
                .or(config.graphviz.style)
                .unwrap_or_default(),
            format: self.graphviz_ext.or(config.graphviz.format).unwrap_or_default(),
            layout_threshold: config.plot.layout_threshold.unwrap_or(LAYOUT_THRESHOLD),
            seed: self.seed.or(config.plot.seed),
            ..RendererConfig::default()
        };

        VisualizeOptions {
            notes_dir,
            paths: self.zettel_paths.clone(),
            pattern: join_patterns(patterns),
            output,
            view: !self.no_view && config.output.view.unwrap_or(true),
            policy,
            renderer,
        }
    }

    /// Summary settings. Flags win, then config, then table output.
    fn output_config(&self, config: &ZkvizConfig) -> OutputConfig {
        let format = self.format.unwrap_or_else(|| resolve_format(config));
        OutputConfig {
            compact: self.compact || config.output.compact.unwrap_or(false),
            ..OutputConfig::auto_detect(format, config.use_color())
        }
    }
}

/// The config's summary format, or table when unset or invalid.
fn resolve_format(config: &ZkvizConfig) -> OutputFormat {
    match config.default_format().map(str::parse::<OutputFormat>) {
        Some(Ok(format)) => format,
        Some(Err(e)) => {
            tracing::warn!("Ignoring [output] format in config: {}", e);
            OutputFormat::Table
        }
        None => OutputFormat::Table,
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print verbose version information
fn print_verbose_version() {
    use colored::Colorize;

    let cli_version = env!("CARGO_PKG_VERSION");
    let platform = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    println!("zkviz {}", cli_version);
    println!("  {:<10} {}", "zk-cli:".cyan(), cli_version);
    println!("  {:<10} {}", "zk-core:".cyan(), zk_core::version());
    println!("  {:<10} {}", "Platform:".cyan(), platform);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version_verbose {
        print_verbose_version();
        return Ok(());
    }

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => ZkvizConfig::load_file(path)?,
        None => ZkvizConfig::load(Path::new(".")),
    };

    let output = cli.output_config(&config);
    let options = cli.resolve(&config);
    tracing::debug!("Resolved options: {:?}", options);

    commands::visualize::run(&options, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zkviz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).resolve(&ZkvizConfig::default());

        assert_eq!(options.notes_dir, PathBuf::from("."));
        assert!(options.paths.is_empty());
        assert_eq!(options.pattern, "*.md");
        assert_eq!(options.output, "zettel-network");
        assert!(options.view);
        assert_eq!(options.policy, FilterPolicy::default());
        assert_eq!(options.renderer.kind, RendererKind::Plotly);
        assert_eq!(options.renderer.engine, GraphvizEngine::Sfdp);
        assert_eq!(options.renderer.format, DiagramFormat::Pdf);
        assert_eq!(options.renderer.layout_threshold, 1000);
        assert_eq!(options.renderer.seed, None);
    }

    #[test]
    fn test_flags() {
        let options = parse(&[
            "--notes-dir",
            "notes",
            "--output",
            "net",
            "--pattern",
            "*.md",
            "--pattern",
            "*.txt",
            "--use-graphviz",
            "--graphviz-layout",
            "neato",
            "--graphviz-style",
            "plaintext",
            "--graphviz-ext",
            "svg",
            "--only-listed",
            "--no-self-references",
            "--no-view",
            "--seed",
            "9",
        ])
        .resolve(&ZkvizConfig::default());

        assert_eq!(options.notes_dir, PathBuf::from("notes"));
        assert_eq!(options.output, "net");
        assert_eq!(options.pattern, "*.md|*.txt");
        assert!(!options.view);
        assert_eq!(options.policy, FilterPolicy::new(false, true));
        assert_eq!(options.renderer.kind, RendererKind::Graphviz);
        assert_eq!(options.renderer.engine, GraphvizEngine::Neato);
        assert_eq!(options.renderer.node_style, NodeStyle::Plaintext);
        assert_eq!(options.renderer.format, DiagramFormat::Svg);
        assert_eq!(options.renderer.seed, Some(9));
    }

    #[test]
    fn test_positional_paths() {
        let options = parse(&["1 Intro.md", "2 Body.md"]).resolve(&ZkvizConfig::default());
        assert_eq!(
            options.paths,
            vec![PathBuf::from("1 Intro.md"), PathBuf::from("2 Body.md")]
        );
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let config: ZkvizConfig = toml::from_str(
            r#"
[discovery]
notes_dir = "notes"
patterns = ["*.txt"]

[filter]
only_listed = true
include_self_references = false

[graphviz]
engine = "dot"

[plot]
layout_threshold = 10
seed = 5

[output]
name = "from-config"
view = false
"#,
        )
        .unwrap();

        let options = parse(&[]).resolve(&config);
        assert_eq!(options.notes_dir, PathBuf::from("notes"));
        assert_eq!(options.pattern, "*.txt");
        assert_eq!(options.output, "from-config");
        assert!(!options.view);
        assert_eq!(options.policy, FilterPolicy::new(false, true));
        assert_eq!(options.renderer.engine, GraphvizEngine::Dot);
        assert_eq!(options.renderer.layout_threshold, 10);
        assert_eq!(options.renderer.seed, Some(5));

        // Flags win over the file
        let options = parse(&["--output", "net", "--seed", "1", "--graphviz-layout", "twopi"])
            .resolve(&config);
        assert_eq!(options.output, "net");
        assert_eq!(options.renderer.seed, Some(1));
        assert_eq!(options.renderer.engine, GraphvizEngine::Twopi);
    }

    #[test]
    fn test_renderer_selection() {
        let config: ZkvizConfig = toml::from_str("[output]\nrenderer = \"graphviz\"\n").unwrap();
        assert_eq!(parse(&[]).resolve(&config).renderer.kind, RendererKind::Graphviz);

        // Flags win over the file
        let options = parse(&["--renderer", "interactive"]).resolve(&config);
        assert_eq!(options.renderer.kind, RendererKind::Plotly);

        let options = parse(&["--renderer", "static"]).resolve(&ZkvizConfig::default());
        assert_eq!(options.renderer.kind, RendererKind::Graphviz);

        assert!(Cli::try_parse_from(["zkviz", "--renderer", "svg"]).is_err());
        assert!(Cli::try_parse_from(["zkviz", "--use-graphviz", "--renderer", "plotly"]).is_err());
    }

    #[test]
    fn test_output_config() {
        let output = parse(&[]).output_config(&ZkvizConfig::default());
        assert_eq!(output.format, OutputFormat::Table);
        assert!(!output.compact);

        let output = parse(&["--format", "json", "--compact"]).output_config(&ZkvizConfig::default());
        assert_eq!(output.format, OutputFormat::Json);
        assert!(output.compact);

        let config: ZkvizConfig =
            toml::from_str("[output]\nformat = \"json\"\ncompact = true\n").unwrap();
        let output = parse(&[]).output_config(&config);
        assert_eq!(output.format, OutputFormat::Json);
        assert!(output.compact);

        let output = parse(&["--format", "table"]).output_config(&config);
        assert_eq!(output.format, OutputFormat::Table);
    }

    #[test]
    fn test_invalid_config_format_falls_back_to_table() {
        let config: ZkvizConfig = toml::from_str("[output]\nformat = \"yaml\"\n").unwrap();
        assert_eq!(resolve_format(&config), OutputFormat::Table);

        let config: ZkvizConfig = toml::from_str("[output]\nformat = \"JSON\"\n").unwrap();
        assert_eq!(resolve_format(&config), OutputFormat::Json);

        assert_eq!(resolve_format(&ZkvizConfig::default()), OutputFormat::Table);
    }

    #[test]
    fn test_invalid_engine_rejected() {
        let result = Cli::try_parse_from(["zkviz", "--graphviz-layout", "graphviz"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["zkviz", "-v", "-q"]).is_err());
    }
}
