use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};

use riskgate_core::{OutputFormat, RiskgateConfig};
use riskgate_scoring::report::RepoInfo;
use riskgate_scoring::{RiskAssessment, SourceIndex};

#[derive(Parser)]
#[command(
    name = "riskgate",
    version,
    about = "Risk-assessment gate for git diffs",
    long_about = "Riskgate scores the working-tree diff against a base revision and gates on it.\n\n\
                   Three dimensions feed one 0-100 score: breaking surface (pattern-matched\n\
                   contract breaks), blast radius (textual dependent search), and change scope\n\
                   (size and spread). The gate maps to the exit code for CI use.\n\n\
                   Exit codes:\n  \
                     0  PASS    (risk < 50)\n  \
                     1  REVIEW  (risk 50-74)\n  \
                     2  BLOCK   (risk >= 75) or a fatal error\n\n\
                   Examples:\n  \
                     riskgate assess                    Score uncommitted work vs HEAD\n  \
                     riskgate assess --base origin/main Score a branch before merging\n  \
                     riskgate assess --mode deep        Add churn hotspots and transitive hints\n  \
                     riskgate assess --format json      Machine-readable report"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .riskgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for the assessment report.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Assess the risk of the current diff and gate on it
    #[command(long_about = "Assess the risk of the current diff and gate on it.\n\n\
        Diffs the working tree (index included, untracked files counted as added)\n\
        against the base revision, scores three risk dimensions, and exits with\n\
        the gate code: 0 PASS, 1 REVIEW, 2 BLOCK.\n\n\
        Examples:\n  riskgate assess\n  riskgate assess --base origin/main --path ../service\n  riskgate assess --mode deep --format markdown")]
    Assess {
        /// Base revision to diff against (default: HEAD)
        #[arg(long, default_value = "HEAD")]
        base: String,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Analysis mode
        #[arg(
            long,
            default_value = "fast",
            long_help = "Analysis mode.\n\n\
                Modes:\n  \
                  fast  Diff-only scoring (default)\n  \
                  deep  Adds commit churn, hotspot detection, and a transitive\n        \
                        dependent estimate; slower on large histories"
        )]
        mode: Mode,
    },
    /// Create a default .riskgate.toml configuration file
    #[command(long_about = "Create a default .riskgate.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .riskgate.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Diff-only scoring
    Fast,
    /// Adds history churn and transitive estimates
    Deep,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Fast => "fast",
            Mode::Deep => "deep",
        }
    }
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mriskgate\x1b[0m v{version} - a risk gate for git diffs\n");

        println!("Quick start:");
        println!("  \x1b[36mriskgate init\x1b[0m                      Create a .riskgate.toml config file");
        println!("  \x1b[36mriskgate assess\x1b[0m                    Score uncommitted work vs HEAD");
        println!("  \x1b[36mriskgate assess --base origin/main\x1b[0m Score a branch before merging\n");

        println!("All commands:");
        println!("  \x1b[32massess\x1b[0m  Score the diff and gate on it (exit 0/1/2)");
        println!("  \x1b[32minit\x1b[0m    Create default configuration\n");
    } else {
        println!("riskgate v{version} - a risk gate for git diffs\n");

        println!("Quick start:");
        println!("  riskgate init                      Create a .riskgate.toml config file");
        println!("  riskgate assess                    Score uncommitted work vs HEAD");
        println!("  riskgate assess --base origin/main Score a branch before merging\n");

        println!("All commands:");
        println!("  assess  Score the diff and gate on it (exit 0/1/2)");
        println!("  init    Create default configuration\n");
    }

    println!("Run 'riskgate <command> --help' for details.");
}

const DEFAULT_CONFIG: &str = r#"# Riskgate Configuration

[classify]
# Extensions classified as source code
# code_extensions = [".ts", ".tsx", ".js", ".jsx", ".py", ".go", ".rs"]
# Path prefixes excluded from all scans
# ignore_prefixes = ["node_modules/", "vendor/", "dist/", "build/", "target/"]
# Base names checked for config-key removals (plus any *.env file)
# config_files = ["package.json", "tsconfig.json", ".env", ".env.example"]

[blast]
# Substrings that downgrade blast-radius confidence to low
# dynamic_import_markers = ["import("]
# Root marker files that downgrade confidence to medium
# monorepo_markers = ["lerna.json", "pnpm-workspace.yaml"]

[deep]
# churn_days = 90
# max_files = 20
# hotspot_churn = 10
# hotspot_dependents = 5
"#;

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(report) => {
            eprintln!("{report:?}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    // Default config resolves against the assessed repository, not the
    // invoker's working directory
    let config_root = match &cli.command {
        Some(Command::Assess { path, .. }) => path.as_path(),
        _ => std::path::Path::new("."),
    };
    let config = load_config(cli.config.as_deref(), config_root)?;

    match cli.command {
        None => {
            let use_color =
                std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err();
            print_welcome(use_color);
            Ok(0)
        }
        Some(Command::Assess { base, path, mode }) => {
            run_assess(&config, &base, &path, mode, cli.format, cli.verbose)
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".riskgate.toml");
            if path.exists() {
                miette::bail!(".riskgate.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .into_diagnostic()
                .wrap_err("writing .riskgate.toml")?;
            println!("Created .riskgate.toml with default configuration");
            Ok(0)
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "riskgate", &mut std::io::stdout());
            Ok(0)
        }
    }
}

fn load_config(explicit: Option<&std::path::Path>, root: &std::path::Path) -> Result<RiskgateConfig> {
    match explicit {
        Some(path) => RiskgateConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display())),
        None => {
            let default_path = root.join(".riskgate.toml");
            if default_path.exists() {
                RiskgateConfig::from_file(&default_path)
                    .into_diagnostic()
                    .wrap_err(format!("loading {}", default_path.display()))
            } else {
                Ok(RiskgateConfig::default())
            }
        }
    }
}

fn run_assess(
    config: &RiskgateConfig,
    base: &str,
    path: &PathBuf,
    mode: Mode,
    format: OutputFormat,
    verbose: bool,
) -> Result<i32> {
    let ctx = riskgate_collect::repo_context(path).into_diagnostic()?;
    let snapshot =
        riskgate_collect::collect_snapshot(path, base, &config.classify).into_diagnostic()?;

    let info = RepoInfo {
        repo: ctx.repo,
        branch: ctx.branch,
        head: ctx.head,
    };

    if snapshot.files.is_empty() {
        let report = RiskAssessment::zero(info, mode.as_str(), base);
        emit(&report, format)?;
        return Ok(report.gate.exit_code());
    }

    if verbose {
        eprintln!(
            "collected {} hunks across {} files ({} renames)",
            snapshot.hunks.len(),
            snapshot.files.len(),
            snapshot.renames.len(),
        );
    }

    let breaking =
        riskgate_scoring::score_breaking_surface(&snapshot.hunks, &snapshot.files, &config.classify);

    let index = SourceIndex::build(path, &config.classify);
    if verbose {
        eprintln!("indexed {} source files", index.files.len());
    }

    let blast = riskgate_scoring::score_blast_radius(
        path,
        &index,
        &snapshot.files,
        &config.classify,
        &config.blast,
    );
    let scope = riskgate_scoring::score_change_scope(
        &snapshot.stats,
        &snapshot.files,
        &snapshot.renames,
        &config.classify,
    );
    let migration = riskgate_scoring::check_migration_safety(&snapshot.files);

    let deep = if mode == Mode::Deep {
        let targets: Vec<String> = snapshot
            .files
            .iter()
            .filter(|f| config.classify.is_code_file(&f.path) && !config.classify.is_ignored(&f.path))
            .take(config.deep.max_files)
            .map(|f| f.path.clone())
            .collect();
        let churn = riskgate_collect::file_churn(path, &targets, config.deep.churn_days)
            .into_diagnostic()?;
        Some(riskgate_scoring::deep_analysis(
            &index,
            &snapshot.files,
            &blast,
            &churn,
            &config.classify,
            &config.deep,
        ))
    } else {
        None
    };

    let report = RiskAssessment::build(
        info,
        mode.as_str(),
        base,
        breaking,
        blast,
        scope,
        migration,
        deep,
    );
    emit(&report, format)?;
    Ok(report.gate.exit_code())
}

fn emit(report: &RiskAssessment, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            print!("{}", report.to_markdown());
        }
        OutputFormat::Text => {
            print!("{report}");
        }
    }
    Ok(())
}
