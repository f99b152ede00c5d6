use anyhow::Context;
use clap::Parser;
use combine_files::{exit_codes, Config, Error, FilterConfig, Pipeline, DEFAULT_MAX_TOKENS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "combine-files",
    version,
    about = "Combine text files into token-bounded chunks",
    long_about = "Combine the text files of a directory into path-tagged, token-bounded chunks.\n\n\
    Every matching file becomes one line of the form `[relative/path] content`, with blank \
    lines removed (and `#` comment lines for .py files). Lines are packed into output files \
    of at most --max-tokens cl100k_base tokens.\n\n\
    USAGE EXAMPLES:\n  \
      # Combine .txt/.py/.md/.csv files under the current directory\n  \
      combine-files\n\n  \
      # Write to an explicit path (becomes notes.txt or notes_part1.txt, notes_part2.txt, ...)\n  \
      combine-files --dir ./project -o ./out/notes.txt\n\n  \
      # Only include specific files\n  \
      combine-files -f src/app.py README.md"
)]
struct Cli {
    /// Root directory to scan
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    dir: PathBuf,

    /// Output path; any extension is replaced by .txt / _partN.txt
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Directory for the generated file name when --output is omitted
    #[arg(long, env = "COMBINE_FILES_OUTPUT_DIR", value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Only process these paths, relative to --dir
    #[arg(short, long, num_args = 0.., value_name = "PATH")]
    files: Option<Vec<String>>,

    /// Max tokens per output file
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: usize,

    /// Keep `#` comment lines in .py files
    #[arg(long)]
    keep_comments: bool,

    /// Dry run (don't write files)
    #[arg(long)]
    dry_run: bool,

    /// Print run statistics as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(
                err.downcast_ref::<Error>()
                    .map_or(exit_codes::UNEXPECTED, Error::exit_code),
            )
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut builder = Config::builder()
        .root_dir(cli.dir)
        .max_tokens(cli.max_tokens)
        .dry_run(cli.dry_run)
        .filter_config(FilterConfig {
            remove_comments: !cli.keep_comments,
        });

    if let Some(output) = cli.output {
        builder = builder.output_base(output);
    }

    if let Some(output_dir) = cli.output_dir {
        builder = builder.output_dir(output_dir);
    }

    if let Some(files) = cli.files {
        builder = builder.target_files(files);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pipeline execution failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).map_err(Error::from)?
        );
    } else {
        stats.print_summary();
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("combine_files=info"),
        1 => EnvFilter::new("combine_files=debug"),
        _ => EnvFilter::new("combine_files=trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
