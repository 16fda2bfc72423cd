//! txtar CLI
//!
//! Create, extract, list and canonicalize txtar archives (similar to tar
//! command).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use txtar_fs::{Archive, Encoder, ExtractConfig, Extractor, File};

#[derive(Parser, Debug)]
#[command(name = "txtar")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Txtar archive format tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a txtar archive from files/directories
    Create {
        /// Files and directories to archive
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output archive file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// File whose contents become the archive comment
        #[arg(short = 'c', long)]
        comment: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract a txtar archive
    #[command(name = "x")]
    Extract {
        /// Archive file to extract (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Directory to extract to (default: current directory)
        #[arg(short = 'C', long, default_value = ".")]
        directory: PathBuf,

        /// Keep extracting after a file fails instead of stopping
        #[arg(long)]
        keep_going: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List contents of a txtar archive
    #[command(name = "t")]
    List {
        /// Archive file to list (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rewrite a txtar archive in canonical form
    Fmt {
        /// Archive file to format (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Only report whether the archive is already canonical
        #[arg(long)]
        check: bool,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Create { verbose, .. }
            | Commands::Extract { verbose, .. }
            | Commands::List { verbose, .. } => *verbose,
            Commands::Fmt { .. } => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.command.verbose() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Create { inputs, output, comment, verbose } => {
            create_archive(inputs, output, comment, verbose)?;
        }
        Commands::Extract { input, directory, keep_going, verbose } => {
            extract_archive(input, directory, keep_going, verbose)?;
        }
        Commands::List { input, verbose } => {
            list_archive(input, verbose)?;
        }
        Commands::Fmt { input, output, check } => {
            format_archive(input, output, check)?;
        }
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(input_path) = input {
        fs::read(input_path).with_context(|| format!("Failed to read: {}", input_path.display()))
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
        Ok(buffer)
    }
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, bytes)
            .with_context(|| format!("Failed to write: {}", output_path.display()))
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(())
    }
}

fn create_archive(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    comment: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let comment = match &comment {
        Some(path) => fs::read(path)
            .with_context(|| format!("Failed to read comment: {}", path.display()))?,
        None => Vec::new(),
    };

    // (name, contents) pairs; the archive borrows from these
    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

    for input in &inputs {
        if input.is_dir() {
            add_directory(&mut entries, input)?;
        } else {
            let content = fs::read(input)
                .with_context(|| format!("Failed to read file: {}", input.display()))?;

            let name = input
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", input.display()))?
                .to_string_lossy()
                .to_string();

            entries.push((name, content));
        }
    }

    let mut archive = Archive::with_comment(&comment);
    for (name, content) in &entries {
        let file = File::new(name.as_str(), content.as_slice());
        if file.has_marker_conflict() {
            log::warn!("'{}' contains a header line and will not round-trip", name);
        }
        if verbose {
            eprintln!("Added: {} ({} bytes)", name, content.len());
        }
        archive.add_file(file);
    }

    let encoded = Encoder::write_archive(Vec::new(), &archive)?;
    write_output(output.as_deref(), &encoded)?;

    if verbose {
        if let Some(output_path) = &output {
            eprintln!("Created: {} ({} files)", output_path.display(), archive.len());
        }
    }

    Ok(())
}

fn add_directory(entries: &mut Vec<(String, Vec<u8>)>, dir: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let content = fs::read(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;

        let relative_path = path
            .strip_prefix(dir)
            .map_err(|_| anyhow::anyhow!("Failed to get relative path"))?;

        let name = relative_path.to_string_lossy().replace('\\', "/");
        entries.push((name, content));
    }

    Ok(())
}

fn extract_archive(
    input: Option<PathBuf>,
    directory: PathBuf,
    keep_going: bool,
    verbose: bool,
) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let archive = Archive::try_parse(&raw)?;

    if verbose {
        eprintln!("Files: {}", archive.len());
    }

    fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create: {}", directory.display()))?;
    let extractor = Extractor::open(&directory)
        .with_context(|| format!("Failed to open: {}", directory.display()))?;

    let config = if keep_going {
        ExtractConfig::best_effort()
    } else {
        ExtractConfig::default()
    };
    let report = extractor.extract_all(&archive.files, &config)?;

    if verbose {
        for path in &report.written {
            eprintln!("Extracted: {}", path.display());
        }
    }

    if !report.is_complete() {
        for failed in &report.failed {
            eprintln!("Failed: {}: {}", failed.name, failed.error);
        }
        bail!("{} of {} files could not be extracted", report.failed.len(), archive.len());
    }

    Ok(())
}

fn list_archive(input: Option<PathBuf>, verbose: bool) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let archive = Archive::parse(&raw);

    let mut stdout = io::stdout().lock();
    for file in &archive.files {
        if verbose {
            writeln!(stdout, "{}  {}", file.name, file.data.len())?;
        } else {
            writeln!(stdout, "{}", file.name)?;
        }
    }

    Ok(())
}

fn format_archive(input: Option<PathBuf>, output: Option<PathBuf>, check: bool) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let formatted = Archive::parse(&raw).to_bytes();

    if check {
        if formatted != raw {
            bail!("archive is not in canonical form");
        }
        return Ok(());
    }

    write_output(output.as_deref(), &formatted)
}
