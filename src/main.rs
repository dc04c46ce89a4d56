//! macron - declarative launchd job scheduling.
//!
//! Usage:
//!   macron generate [--dry-run] [-U] <jobfile>...          Generate agent plists
//!   macron remove [--dry-run] <jobfile>...                 Remove generated plists
//!   macron load <jobfile>...                               Load the agents into launchd
//!   macron unload <jobfile>...                             Unload the agents from launchd
//!   macron logs [--stream ...] [--tail N] <jobfile>...     Show captured job logs

use clap::{Parser, Subcommand, ValueEnum};
use macron::launchd::{self, JobLoader, LogReader, LogStream};
use macron::{FullJobName, JobConfig, PlistGenerator, YamlLoader};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// macron - declarative launchd job scheduling
#[derive(Parser)]
#[command(name = "macron")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate launchd agent plists from job files
    Generate {
        /// Job YAML files
        #[arg(value_name = "JOBFILE", required = true)]
        jobfiles: Vec<PathBuf>,

        /// Print the generated plists instead of writing them
        #[arg(long)]
        dry_run: bool,

        /// Overwrite agent files that already exist
        #[arg(short = 'U', long)]
        update: bool,
    },

    /// Remove generated agent plists
    Remove {
        /// Job YAML files
        #[arg(value_name = "JOBFILE", required = true)]
        jobfiles: Vec<PathBuf>,

        /// Print what would be removed instead of removing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Load the jobs' agents into launchd
    Load {
        /// Job YAML files
        #[arg(value_name = "JOBFILE", required = true)]
        jobfiles: Vec<PathBuf>,
    },

    /// Unload the jobs' agents from launchd
    Unload {
        /// Job YAML files
        #[arg(value_name = "JOBFILE", required = true)]
        jobfiles: Vec<PathBuf>,
    },

    /// Show captured job logs
    Logs {
        /// Job YAML files
        #[arg(value_name = "JOBFILE", required = true)]
        jobfiles: Vec<PathBuf>,

        /// Which captured stream to read
        #[arg(long, value_enum, default_value_t = StreamArg::Stdout)]
        stream: StreamArg,

        /// Number of trailing lines to show
        #[arg(long, default_value = "10")]
        tail: usize,
    },
}

/// CLI name for the captured stream to read.
#[derive(Clone, Copy, ValueEnum)]
enum StreamArg {
    Stdout,
    Stderr,
}

impl From<StreamArg> for LogStream {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Stdout => LogStream::Stdout,
            StreamArg::Stderr => LogStream::Stderr,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let user = resolve_user()?;
    launchd::ensure_dirs()?;

    match cli.command {
        Commands::Generate {
            jobfiles,
            dry_run,
            update,
        } => generate(&jobfiles, &user, dry_run, update),
        Commands::Remove { jobfiles, dry_run } => remove(&jobfiles, &user, dry_run),
        Commands::Load { jobfiles } => load(&jobfiles, &user),
        Commands::Unload { jobfiles } => unload(&jobfiles, &user),
        Commands::Logs {
            jobfiles,
            stream,
            tail,
        } => logs(&jobfiles, &user, stream.into(), tail),
    }
}

/// The invoking user's name, embedded in agent labels and file names.
fn resolve_user() -> Result<String, Box<dyn std::error::Error>> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .map_err(|_| "cannot determine user: neither USER nor LOGNAME is set".into())
}

/// Generate agent plists for each job file.
fn generate(
    jobfiles: &[PathBuf],
    user: &str,
    dry_run: bool,
    update: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for jobfile in jobfiles {
        if let Err(e) = generate_one(jobfile, user, dry_run, update) {
            error!("{}: {}", jobfile.display(), e);
            failures += 1;
        }
    }
    finish(failures, jobfiles.len())
}

/// Generate (or print, for a dry run) the agent plist for one job file.
fn generate_one(
    jobfile: &Path,
    user: &str,
    dry_run: bool,
    update: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_job(jobfile)?;
    let name = FullJobName::new(user, &config.name);
    let document = PlistGenerator::generate(&config, &name)?;
    let path = launchd::agent_path(&name);

    if dry_run {
        println!("# {}", path.display());
        println!("{}", document.to_xml());
        return Ok(());
    }

    if path.exists() && !update {
        warn!(
            "{} already exists, skipping (use --update to overwrite)",
            path.display()
        );
        return Ok(());
    }

    std::fs::write(&path, document.to_xml())?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Remove generated agent plists for each job file.
fn remove(
    jobfiles: &[PathBuf],
    user: &str,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for jobfile in jobfiles {
        if let Err(e) = remove_one(jobfile, user, dry_run) {
            error!("{}: {}", jobfile.display(), e);
            failures += 1;
        }
    }
    finish(failures, jobfiles.len())
}

/// Remove the generated agent plist for one job file.
fn remove_one(jobfile: &Path, user: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_job(jobfile)?;
    let name = FullJobName::new(user, &config.name);
    let path = launchd::agent_path(&name);

    if !path.exists() {
        warn!("{} does not exist, nothing to remove", path.display());
        return Ok(());
    }
    if dry_run {
        println!("would remove {}", path.display());
        return Ok(());
    }

    std::fs::remove_file(&path)?;
    info!("removed {}", path.display());
    Ok(())
}

/// Load each job's agent into launchd.
fn load(jobfiles: &[PathBuf], user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for jobfile in jobfiles {
        if let Err(e) = load_one(jobfile, user) {
            error!("{}: {}", jobfile.display(), e);
            failures += 1;
        }
    }
    finish(failures, jobfiles.len())
}

fn load_one(jobfile: &Path, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_job(jobfile)?;
    let name = FullJobName::new(user, &config.name);
    JobLoader::load(&name)?;
    info!("loaded {}", name.label());
    Ok(())
}

/// Unload each job's agent from launchd.
fn unload(jobfiles: &[PathBuf], user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for jobfile in jobfiles {
        if let Err(e) = unload_one(jobfile, user) {
            error!("{}: {}", jobfile.display(), e);
            failures += 1;
        }
    }
    finish(failures, jobfiles.len())
}

fn unload_one(jobfile: &Path, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_job(jobfile)?;
    let name = FullJobName::new(user, &config.name);
    JobLoader::unload(&name)?;
    info!("unloaded {}", name.label());
    Ok(())
}

/// Print the tail of each job's captured log.
fn logs(
    jobfiles: &[PathBuf],
    user: &str,
    stream: LogStream,
    tail: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for jobfile in jobfiles {
        if let Err(e) = logs_one(jobfile, user, stream, tail) {
            error!("{}: {}", jobfile.display(), e);
            failures += 1;
        }
    }
    finish(failures, jobfiles.len())
}

fn logs_one(
    jobfile: &Path,
    user: &str,
    stream: LogStream,
    tail: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_job(jobfile)?;
    let name = FullJobName::new(user, &config.name);

    match LogReader::read(&name, stream, tail)? {
        Some(lines) => {
            println!("==> {} <==", name.as_str());
            for line in lines {
                println!("{}", line);
            }
        }
        None => println!("==> {} <== (no log yet)", name.as_str()),
    }
    Ok(())
}

/// Load and validate one job file.
fn load_job(jobfile: &Path) -> Result<JobConfig, Box<dyn std::error::Error>> {
    if let Some(ext) = jobfile.extension()
        && (ext == "yaml" || ext == "yml")
    {
        Ok(YamlLoader::load_job_config(jobfile)?)
    } else {
        Err(format!("'{}' is not a YAML job file", jobfile.display()).into())
    }
}

/// Per-file failures keep the batch going; report them at the end.
fn finish(failures: usize, total: usize) -> Result<(), Box<dyn std::error::Error>> {
    if failures > 0 {
        return Err(format!("{} of {} job file(s) failed", failures, total).into());
    }
    Ok(())
}
