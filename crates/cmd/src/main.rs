// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use diagnostics::log_debug;

use cmd::commands;
use cmd::common::{PromptMode, Session};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "kfs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store file (overrides KEYFS_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Workspace config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to answer rename and confirmation questions
    #[arg(long, global = true, value_enum, default_value_t = PromptMode::Ask)]
    answer: PromptMode,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new store
    Init,
    /// Show the directory tree
    #[command(alias = "ls")]
    List {
        /// Directory to show (defaults to the root)
        path: Option<String>,
        /// Expand closed directories
        #[arg(short, long)]
        all: bool,
    },
    /// Show entries whose names contain a query, with their ancestors
    Find {
        query: String,
    },
    /// Print a file
    Cat {
        path: String,
    },
    /// Make a file current and print it
    Open {
        path: String,
    },
    /// Create a file
    Touch {
        path: String,
        /// Initial content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Replace the content of the current file
    Save {
        /// New content
        content: String,
        /// Open this file first
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parents too
        #[arg(short, long)]
        parents: bool,
    },
    /// Move a file or directory into another directory
    Mv {
        path: String,
        /// Destination directory ("/" for the root)
        destination: String,
        /// Prefer the directory when a file has the same path
        #[arg(short, long)]
        directory: bool,
    },
    /// Rename a file or directory in place
    Rename {
        path: String,
        new_name: String,
        #[arg(short, long)]
        directory: bool,
    },
    /// Delete a file or directory
    Rm {
        path: String,
        #[arg(short, long)]
        directory: bool,
    },
    /// Open or close a directory
    Toggle {
        path: String,
    },
    /// Copy host files into the workspace
    Upload {
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Destination directory
        #[arg(short, long)]
        destination: Option<String>,
    },
    /// Write a directory subtree to the host file system
    Export {
        /// Host directory to write into
        host_dir: PathBuf,
        /// Directory to export (defaults to the root)
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let session = Session::new(cli.store, cli.config, cli.answer)?;
    let shown = session.store_path.display().to_string();
    log_debug!("Using store {path}", path: shown.as_str());

    let output = match cli.command {
        Commands::Init => commands::init_command(&session).await?,
        Commands::List { path, all } => {
            commands::list_command(&session, path.as_deref(), all).await?
        }
        Commands::Find { query } => commands::find_command(&session, &query).await?,
        Commands::Cat { path } => commands::cat_command(&session, &path).await?,
        Commands::Open { path } => commands::open_command(&session, &path).await?,
        Commands::Touch { path, content } => {
            commands::touch_command(&session, &path, content.as_deref()).await?
        }
        Commands::Save { content, path } => {
            commands::save_command(&session, path.as_deref(), &content).await?
        }
        Commands::Mkdir { path, parents } => {
            commands::mkdir_command(&session, &path, parents).await?
        }
        Commands::Mv {
            path,
            destination,
            directory,
        } => commands::mv_command(&session, &path, &destination, directory).await?,
        Commands::Rename {
            path,
            new_name,
            directory,
        } => commands::rename_command(&session, &path, &new_name, directory).await?,
        Commands::Rm { path, directory } => {
            commands::rm_command(&session, &path, directory).await?
        }
        Commands::Toggle { path } => commands::toggle_command(&session, &path).await?,
        Commands::Upload {
            sources,
            destination,
        } => commands::upload_command(&session, &sources, destination.as_deref()).await?,
        Commands::Export { host_dir, path } => {
            commands::export_command(&session, path.as_deref(), &host_dir).await?
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
