use anyhow::Result;
use callfile::{config::Config, schedule::parse_time, version, CallFile, CallFileDocument};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version = version::get_short_version(),
    about = "Build Asterisk call files and hand them to the spool directory",
    long_about = version::get_version_info()
)]
struct Cli {
    #[clap(
        long,
        global = true,
        help = "Path to the configuration file (TOML format)"
    )]
    conf: Option<String>,
    #[clap(
        long,
        global = true,
        help = "Spool directory, overrides the configuration file"
    )]
    spool_dir: Option<PathBuf>,
    #[clap(long, global = true, help = "Directory the call file is assembled in")]
    temp_dir: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the call file a document describes
    Render { document: PathBuf },
    /// Validate a document without writing anything
    Check { document: PathBuf },
    /// Write the call file and move it into the spool directory
    Spool {
        document: PathBuf,
        /// Placement time: now, RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `+<n>[s|m|h|d]`
        #[clap(long)]
        at: Option<String>,
        /// Account to hand the file over to before spooling
        #[clap(long)]
        user: Option<String>,
    },
}

fn init_logging(config: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let mut env_filter = EnvFilter::from_default_env();
    if let Some(Ok(level)) = config
        .log_level
        .as_ref()
        .map(|level| level.parse::<LevelFilter>())
    {
        env_filter = env_filter.add_directive(level.into());
    }

    if let Some(ref log_file) = config.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .try_init()?;
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
        Ok(None)
    }
}

fn load_callfile(document: &Path, config: &Config) -> Result<(CallFileDocument, CallFile)> {
    let doc = CallFileDocument::load(document)?;
    let callfile = doc.clone().into_callfile(config);
    Ok((doc, callfile))
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = match cli.conf {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_env();
    if let Some(dir) = cli.spool_dir.clone() {
        config.spool_dir = dir;
    }
    if let Some(dir) = cli.temp_dir.clone() {
        config.temp_dir = Some(dir);
    }

    let _guard = init_logging(&config)?;

    match cli.command {
        Commands::Render { document } => {
            let (_, callfile) = load_callfile(&document, &config)?;
            print!("{}", callfile.contents()?);
        }
        Commands::Check { document } => {
            let (doc, callfile) = load_callfile(&document, &config)?;
            let mut report = callfile.validate();
            if let Err(e) = doc.schedule_time() {
                report.push("schedule", e.to_string());
            }
            if !report.is_empty() {
                eprintln!("{} is not valid:", document.display());
                for issue in report.issues {
                    eprintln!("- {}: {}", issue.field, issue.message);
                }
                std::process::exit(1);
            }
            println!("{} is valid.", document.display());
        }
        Commands::Spool { document, at, user } => {
            let (doc, mut callfile) = load_callfile(&document, &config)?;
            if let Some(user) = user {
                callfile = callfile.with_user(user);
            }
            let time = match at {
                Some(ref at) => Some(parse_time(at)?),
                None => doc.schedule_time()?,
            };
            match callfile.spool(time) {
                Ok(receipt) => {
                    info!(document = %document.display(), "spool complete");
                    println!("{}", receipt.spool_path.display());
                }
                Err(err) => {
                    eprintln!("failed to spool {}: {}", document.display(), err);
                    if let Some(path) = err.temp_path() {
                        eprintln!("temporary call file left at {}", path.display());
                    }
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
