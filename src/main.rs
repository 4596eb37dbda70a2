#![allow(clippy::collapsible_if)]

use std::{
    fs::OpenOptions,
    io::Write,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diffy::{DiffOptions, PatchFormatter};
use env_logger::{Builder, Target};
use inline_edit::{config::Config, edit_id::EditId, server::DevServer, tagger::Tagger};
use log::LevelFilter;
use walkdir::WalkDir;

/// Inline visual editing for JSX/TSX projects
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Project root that edit identifiers are relative to
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Log every tagged element and applied edit
    #[arg(short, long, global = true)]
    debug: bool,

    /// Comma-separated tag names that are editable
    #[arg(long, global = true, value_delimiter = ',')]
    editable_tags: Option<Vec<String>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag editable elements in files or directories
    Tag {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Rewrite files in place
        #[arg(short, long, conflicts_with = "diff")]
        write: bool,

        /// Print a unified diff instead of the tagged source
        #[arg(long)]
        diff: bool,
    },

    /// Run the development server with the apply-edit endpoint
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Decode an edit identifier
    ParseId {
        #[arg(value_name = "EDIT_ID")]
        edit_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(root) = &cli.root {
        config.set_root(root.clone());
    }
    if cli.debug {
        config.tagger_mut().set_debug(true);
    }
    if let Some(tags) = cli.editable_tags.clone() {
        config.tagger_mut().set_editable_tags(tags);
    }

    match cli.command {
        Commands::Tag { paths, write, diff } => tag(&config, &paths, write, diff),
        Commands::Serve { interface, port } => {
            let interface = interface.unwrap_or(config.server().interface());
            let port = port.unwrap_or(config.server().port());
            DevServer::new(&config)?.run(SocketAddr::new(interface, port))
        }
        Commands::ParseId { edit_id } => {
            let edit_id: EditId = edit_id.parse().context("invalid edit identifier")?;
            let parts = serde_json::json!({
                "filePath": edit_id.file_path(),
                "line": edit_id.line(),
                "column": edit_id.column(),
            });
            println!("{}", serde_json::to_string_pretty(&parts)?);
            Ok(())
        }
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let mut builder = Builder::from_default_env();
    if debug {
        builder.filter_module("inline_edit", LevelFilter::Debug);
    }

    if let Ok(log_location) = std::env::var("LOG_LOCATION") {
        let path = PathBuf::from(&*shellexpand::tilde(&log_location));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn tag(config: &Config, paths: &[PathBuf], write: bool, diff: bool) -> Result<()> {
    let root = config.canonical_root()?;
    let tagger = Tagger::new(config.tagger().clone(), &root);
    let mut stdout = std::io::stdout().lock();
    let mut tagged_files = 0;

    for file in component_files(&tagger, paths)? {
        let absolute = std::fs::canonicalize(&file)
            .with_context(|| format!("could not resolve {}", file.display()))?;
        let source = std::fs::read_to_string(&absolute)
            .with_context(|| format!("could not read {}", file.display()))?;

        let Some(output) = tagger.transform(&source, &absolute) else {
            log::debug!("[inline-edit] {} unchanged", file.display());
            continue;
        };
        tagged_files += 1;

        if write {
            std::fs::write(&absolute, output.code())?;
            log::info!(
                "[inline-edit] tagged {} element(s) in {}",
                output.edit_ids().len(),
                file.display()
            );
        } else if diff {
            let mut diff_options = DiffOptions::new();
            diff_options.set_original_filename(format!("a/{}", file.display()));
            diff_options.set_modified_filename(format!("b/{}", file.display()));
            let patch = diff_options.create_patch(&source, output.code());
            let formatter = PatchFormatter::new().missing_newline_message(false);
            write!(stdout, "{}", formatter.fmt_patch(&patch))?;
        } else {
            write!(stdout, "{}", output.code())?;
        }
    }

    log::info!("[inline-edit] {tagged_files} file(s) tagged");
    Ok(())
}

/// Expand directories into the component-template files below them
fn component_files(tagger: &Tagger, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.file_name() != "node_modules")
            {
                let entry = entry?;
                if entry.file_type().is_file() && tagger.handles(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if tagger.handles(path) {
            files.push(path.clone());
        } else {
            log::warn!("[inline-edit] skipping {}", path.display());
        }
    }
    Ok(files)
}
