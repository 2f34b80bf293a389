use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use commitscope_charts::{render_donut, render_severity_bar, Distribution};
use commitscope_classify::backend::ClassifierBackend;
use commitscope_classify::completion::complete_severities;
use commitscope_classify::labeler::{ClassifyTargets, Labeler};
use commitscope_classify::output::{read_classified, write_classified};
use commitscope_core::progress::IndicatifReporter;
use commitscope_core::{
    ClassifiedCommit, ClassifierConfig, CommitRecord, OutputFormat, ScopeConfig, Timezone,
};
use commitscope_history::csv_io::{read_history, write_history};
use commitscope_history::mining::{extract_history, open_repository, ExtractOptions};

const CONFIG_FILE: &str = ".commitscope.toml";

#[derive(Parser)]
#[command(
    name = "commitscope",
    version,
    about = "Classify git history with a zero-shot model and chart it",
    long_about = "commitscope reads a repository's history, labels every commit with a\n\
                   category and a severity using a zero-shot text classifier, and renders\n\
                   a category donut chart and a severity bar chart.\n\n\
                   Examples:\n  \
                     commitscope run --repo .              Extract, classify and chart in one go\n  \
                     commitscope extract --since 90        Write the last 90 days to git_history.csv\n  \
                     commitscope classify --only severity  Label severities only\n  \
                     commitscope chart                     Re-render charts from the classified CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .commitscope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for the distribution summary.\n\n\
                       Formats:\n  \
                         text      Human-readable tables (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Extract commit history into a CSV file
    #[command(long_about = "Extract commit history into a CSV file.\n\n\
        Walks HEAD and every branch and tag (or a single branch with --branch) and\n\
        writes hash, author, email, date, subject, containing branches and a diff\n\
        stat summary per commit. Commits that cannot be read are logged and skipped.\n\n\
        Examples:\n  commitscope extract --repo ../app\n  commitscope extract --branch main --since 30 --utc")]
    Extract {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Output CSV (default: git_history.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Walk only this branch
        #[arg(long)]
        branch: Option<String>,
        /// Only commits from the last N days
        #[arg(long)]
        since: Option<u64>,
        /// Stop after N commits
        #[arg(long)]
        max_commits: Option<usize>,
        /// Only commits whose author name or email contains this text
        #[arg(long)]
        author: Option<String>,
        /// Render dates in UTC instead of local time
        #[arg(long)]
        utc: bool,
    },
    /// Label every commit with a category and a severity
    #[command(
        long_about = "Label every commit with a category and a severity.\n\n\
        Sends each commit's subject and diff stat to a zero-shot classifier, once\n\
        with the category labels and once with Severity 1..5. Requires HF_TOKEN for\n\
        the Hugging Face backend or OPENAI_API_KEY for the openai backend.\n\n\
        Examples:\n  commitscope classify\n  commitscope classify --input history.csv --only category"
    )]
    Classify {
        /// Input history CSV (default: git_history.csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output CSV (default: git_history_classified.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Which labels to assign: category, severity or both
        #[arg(long, default_value = "both")]
        only: ClassifyTargets,
    },
    /// Render the category donut and severity bar charts
    #[command(long_about = "Render the category donut and severity bar charts.\n\n\
        Reads a classified CSV and writes two PNG files. Severity levels no commit\n\
        received get a placeholder so all five bars appear.\n\n\
        Examples:\n  commitscope chart\n  commitscope chart --donut out/donut.png --no-fill-severities")]
    Chart {
        /// Input classified CSV (default: git_history_classified.csv)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Donut chart PNG (default: commit_categories_donut.png)
        #[arg(long)]
        donut: Option<PathBuf>,
        /// Bar chart PNG (default: commit_severity_bar.png)
        #[arg(long)]
        bar: Option<PathBuf>,
        /// Leave empty severity levels out instead of adding placeholders
        #[arg(long)]
        no_fill_severities: bool,
    },
    /// Extract, classify and chart in one run
    #[command(long_about = "Extract, classify and chart in one run.\n\n\
        Equivalent to extract, classify and chart with the configured output paths.\n\n\
        Example:\n  commitscope run --repo .")]
    Run {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Create a default .commitscope.toml configuration file
    #[command(long_about = "Create a default .commitscope.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .commitscope.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Whether to colour a stream; `Auto` follows that stream's own terminal check.
    fn enabled(&self, stream_is_terminal: bool, no_color: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => stream_is_terminal && !no_color,
        }
    }
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mcommitscope\x1b[0m v{version}: what kind of work is in your git history?\n");

        println!("Quick start:");
        println!("  \x1b[36mcommitscope init\x1b[0m            Create a .commitscope.toml config file");
        println!("  \x1b[36mcommitscope run --repo .\x1b[0m    Extract, classify and chart\n");

        println!("All commands:");
        println!("  \x1b[32mextract\x1b[0m   Write commit history to a CSV file");
        println!("  \x1b[32mclassify\x1b[0m  Label commits with a category and a severity");
        println!("  \x1b[32mchart\x1b[0m     Render the donut and bar charts");
        println!("  \x1b[32mrun\x1b[0m       All three stages in one go");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("commitscope v{version}: what kind of work is in your git history?\n");

        println!("Quick start:");
        println!("  commitscope init            Create a .commitscope.toml config file");
        println!("  commitscope run --repo .    Extract, classify and chart\n");

        println!("All commands:");
        println!("  extract   Write commit history to a CSV file");
        println!("  classify  Label commits with a category and a severity");
        println!("  chart     Render the donut and bar charts");
        println!("  run       All three stages in one go");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'commitscope <command> --help' for details.");
}

const DEFAULT_CONFIG: &str = r#"# commitscope configuration

[history]
# since_days = 0          # 0 = whole history
# max_commits = 0         # 0 = no limit
# branch = "main"         # walk one branch instead of every reference
# author = "alice"        # case-insensitive match on author name or email
# timezone = "local"      # or "utc"

[classifier]
# provider = "huggingface"            # or "openai"
# model = "facebook/bart-large-mnli"  # e.g. "gpt-4o-mini" for openai
# api_key = "..."                     # or HF_TOKEN / OPENAI_API_KEY
# base_url = "https://router.huggingface.co/hf-inference"
# max_input_chars = 2000
# timeout_secs = 120

[charts]
# width = 2400
# height = 1500
# font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
# fill_missing_severities = true

[output]
# history_csv = "git_history.csv"
# classified_csv = "git_history_classified.csv"
# donut_png = "commit_categories_donut.png"
# bar_png = "commit_severity_bar.png"
"#;

fn init_tracing(verbose: bool, use_color: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .init();
}

fn progress() -> IndicatifReporter {
    if std::io::stderr().is_terminal() {
        IndicatifReporter::new()
    } else {
        IndicatifReporter::hidden()
    }
}

fn extract(repo: &Path, options: &ExtractOptions, output: &Path) -> Result<Vec<CommitRecord>> {
    // Hint: not a git repository
    if open_repository(repo).is_err() {
        miette::bail!(miette::miette!(
            help = "Run commitscope from inside a git repository, or pass --repo",
            "Not a git repository: {}",
            repo.display()
        ));
    }

    let extraction = extract_history(repo, options, &progress())?;
    write_history(output, &extraction.records)?;
    eprintln!(
        "Extracted {} commits to {}{}",
        extraction.records.len(),
        output.display(),
        if extraction.skipped > 0 {
            format!(" ({} skipped)", extraction.skipped)
        } else {
            String::new()
        }
    );
    Ok(extraction.records)
}

fn check_api_key(config: &ClassifierConfig) -> Result<()> {
    // Hint: hosted endpoints need a key; a custom base_url may not
    if config.base_url.is_none() && config.resolve_api_key().is_none() {
        let env_var = config.api_key_env();
        miette::bail!(miette::miette!(
            help = format!("Set {env_var} or add api_key in your .commitscope.toml under [classifier]"),
            "No API key configured for classifier provider '{}'",
            config.provider
        ));
    }
    Ok(())
}

async fn classify(
    records: Vec<CommitRecord>,
    config: &ClassifierConfig,
    targets: ClassifyTargets,
    output: &Path,
) -> Result<Vec<ClassifiedCommit>> {
    check_api_key(config)?;
    let backend = ClassifierBackend::from_config(config)?;
    tracing::info!(provider = backend.name(), model = %config.model, "classifying commits");

    let labeler = Labeler::new(backend, config.max_input_chars);
    let classified = labeler.classify_all(records, targets, &progress()).await?;
    write_classified(output, &classified)?;
    eprintln!("Classified {} commits to {}", classified.len(), output.display());
    Ok(classified)
}

fn chart(
    mut commits: Vec<ClassifiedCommit>,
    config: &ScopeConfig,
    donut: &Path,
    bar: &Path,
    fill_severities: bool,
) -> Result<Distribution> {
    if fill_severities {
        let added = complete_severities(&mut commits);
        if !added.is_empty() {
            tracing::info!(count = added.len(), "added placeholder rows for empty severity levels");
        }
    }
    let distribution = Distribution::from_commits(&commits);

    render_donut(donut, &distribution, &config.charts)?;
    render_severity_bar(bar, &distribution, &config.charts)?;
    eprintln!("Wrote {} and {}", donut.display(), bar.display());
    Ok(distribution)
}

fn print_summary(distribution: &Distribution, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", distribution.to_json()?);
        }
        OutputFormat::Markdown => {
            print!("{}", distribution.to_markdown());
        }
        OutputFormat::Text => {
            print!("{distribution}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let no_color = std::env::var("NO_COLOR").is_ok();
    let use_color = cli.color.enabled(std::io::stdout().is_terminal(), no_color);
    // Log lines go to stderr, which may be a terminal when stdout is piped.
    init_tracing(
        cli.verbose,
        cli.color.enabled(std::io::stderr().is_terminal(), no_color),
    );

    let config = match &cli.config {
        Some(path) => ScopeConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                ScopeConfig::from_file(default_path)?
            } else {
                ScopeConfig::default()
            }
        }
    };
    tracing::debug!(format = %cli.format, provider = %config.classifier.provider, "configuration loaded");

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Extract {
            ref repo,
            ref output,
            ref branch,
            since,
            max_commits,
            ref author,
            utc,
        }) => {
            let mut options = ExtractOptions::from(&config.history);
            if let Some(branch) = branch {
                options.branch = Some(branch.clone());
            }
            if let Some(author) = author {
                options.author = Some(author.clone());
            }
            if let Some(since) = since {
                options.since_days = since;
            }
            if let Some(max_commits) = max_commits {
                options.max_commits = max_commits;
            }
            if utc {
                options.timezone = Timezone::Utc;
            }
            let output = output.as_ref().unwrap_or(&config.output.history_csv);
            extract(repo, &options, output)?;
        }
        Some(Command::Classify {
            ref input,
            ref output,
            only,
        }) => {
            let input = input.as_ref().unwrap_or(&config.output.history_csv);
            let output = output.as_ref().unwrap_or(&config.output.classified_csv);
            let records = read_history(input)?;
            if records.is_empty() {
                eprintln!("No commits found in {}", input.display());
            }
            let classified = classify(records, &config.classifier, only, output).await?;
            print_summary(&Distribution::from_commits(&classified), cli.format)?;
        }
        Some(Command::Chart {
            ref input,
            ref donut,
            ref bar,
            no_fill_severities,
        }) => {
            let input = input.as_ref().unwrap_or(&config.output.classified_csv);
            let donut = donut.as_ref().unwrap_or(&config.output.donut_png);
            let bar = bar.as_ref().unwrap_or(&config.output.bar_png);
            let commits = read_classified(input)?;
            let fill = config.charts.fill_missing_severities && !no_fill_severities;
            let distribution = chart(commits, &config, donut, bar, fill)?;
            print_summary(&distribution, cli.format)?;
        }
        Some(Command::Run { ref repo }) => {
            // Fail before walking history if classification cannot run
            check_api_key(&config.classifier)?;
            let options = ExtractOptions::from(&config.history);
            let records = extract(repo, &options, &config.output.history_csv)?;
            let classified = classify(
                records,
                &config.classifier,
                ClassifyTargets::Both,
                &config.output.classified_csv,
            )
            .await?;
            let distribution = chart(
                classified,
                &config,
                &config.output.donut_png,
                &config.output.bar_png,
                config.charts.fill_missing_severities,
            )?;
            print_summary(&distribution, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "commitscope", &mut std::io::stdout());
        }
    }

    Ok(())
}
