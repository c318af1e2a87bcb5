//! Photobook Intake CLI - Bridge interface for the upload service
//!
//! Commands: sizes, classify, page-count, validate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when a folder has mismatched files

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photobook_intake::{
    cover::{base_name, classify_base},
    page_count, BindingDirection, Catalog, FolderStatus, FolderStore, FolderSubmission,
    IntakeConfig, PageLayout,
};

#[derive(Parser)]
#[command(name = "photobook-cli")]
#[command(about = "Photobook Intake CLI - print-readiness checks for album folders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the catalog JSON file
    #[arg(short, long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Optional intake config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog sizes
    Sizes,

    /// Classify file names as covers or inner pages
    Classify {
        names: Vec<String>,
    },

    /// Compute the printed page count
    PageCount {
        #[arg(short, long)]
        files: u32,

        /// single | spread
        #[arg(short, long, default_value = "spread")]
        layout: PageLayout,

        /// left-start-right-end | left-start-left-end | right-start-left-end | right-start-right-end
        #[arg(short, long)]
        binding: Option<BindingDirection>,
    },

    /// Validate a folder
    Validate {
        /// JSON payload (FolderSubmission)
        #[arg(short, long)]
        payload: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { names } => {
            let classified: Vec<_> = names
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "coverType": classify_base(&base_name(name)),
                    })
                })
                .collect();
            print_json(&classified)
        }

        Commands::PageCount { files, layout, binding } => {
            print_json(&serde_json::json!({
                "files": files,
                "layout": layout,
                "binding": binding,
                "pageCount": page_count(files, layout, binding),
            }))
        }

        Commands::Sizes => {
            let catalog = match load_catalog(&cli.catalog) {
                Ok(c) => c,
                Err(code) => return code,
            };
            print_json(&catalog.sizes())
        }

        Commands::Validate { payload } => {
            let submission: FolderSubmission = match serde_json::from_str(&payload) {
                Ok(s) => s,
                Err(e) => {
                    print_error(&format!("Invalid payload: {}", e));
                    return ExitCode::FAILURE;
                }
            };

            let config = match &cli.config {
                Some(path) => match IntakeConfig::load(path) {
                    Ok(c) => c,
                    Err(e) => {
                        print_error(&e.to_string());
                        return ExitCode::FAILURE;
                    }
                },
                None => IntakeConfig::default(),
            };
            let catalog = match load_catalog(&cli.catalog) {
                Ok(c) => c,
                Err(code) => return code,
            };

            let mut store = FolderStore::new(catalog, config);
            let outcome = store.add_folder(submission);
            let folder = outcome.folder_id.and_then(|id| store.folder(id));

            let code = match folder {
                None => ExitCode::FAILURE,
                Some(f) if f.status == FolderStatus::RatioMismatch => ExitCode::from(2),
                Some(_) => ExitCode::SUCCESS,
            };
            match serde_json::to_string_pretty(&serde_json::json!({
                "outcome": outcome,
                "folder": folder,
            })) {
                Ok(s) => {
                    println!("{}", s);
                    code
                }
                Err(e) => {
                    print_error(&e.to_string());
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn load_catalog(path: &Path) -> Result<Catalog, ExitCode> {
    Catalog::load_from_file(path).map_err(|e| {
        print_error(&format!("Failed to load catalog: {}", e));
        ExitCode::FAILURE
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn print_error(message: &str) {
    println!("{}", serde_json::json!({ "success": false, "error": message }));
}
