use anyhow::Context;
use clap::Parser;
use evq::commands::{OutputFormat, Session};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "evq", version, about = "Query and edit a dated event store")]
struct Cli {
    #[arg(long, env = "EVQ_SCRIPT", help = "Read commands from a file instead of stdin")]
    script: Option<PathBuf>,

    #[arg(long, env = "EVQ_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,

    #[arg(short, long, help = "Only log errors")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(0) => ExitCode::from(0),
        Ok(failed) => {
            log::info!("{} command(s) failed", failed);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<usize> {
    let stdout = io::stdout();
    let mut session = Session::new(stdout.lock(), cli.format);

    let failed = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            session.run(BufReader::new(file))?
        }
        None => session.run(io::stdin().lock())?,
    };

    log::debug!(
        "finished with {} entries across {} dates",
        session.store().len(),
        session.store().date_count()
    );
    Ok(failed)
}

/// `EVQ_LOG` (or `RUST_LOG`) sets the filter; `-q` and `-v` override it.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::{Builder, Env, Target};
    use std::io::Write;

    let env = Env::default()
        .filter_or("EVQ_LOG", std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()));
    let mut builder = Builder::from_env(env);
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }

    builder
        .format(|buf, record| {
            let level = record.level().as_str().to_lowercase();
            writeln!(buf, "evq: {}: {}", level, record.args())
        })
        .target(Target::Stderr)
        .init();
}

fn level_override(verbose: u8, quiet: bool) -> Option<log::LevelFilter> {
    use log::LevelFilter;

    match (quiet, verbose) {
        (true, _) => Some(LevelFilter::Error),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::Debug),
        (false, _) => Some(LevelFilter::Trace),
    }
}
