use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use figproxy_core::{
    batch_response, find_component_by_name, DesignDocument, DesignFileMetadata, DesignQuery,
    DesignService, FigmaConfig, FigmaEnv, PageSummary,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "figproxy")]
#[command(about = "Fetch and search design files from the command line")]
struct Cli {
    /// Design file key (defaults to FIGMA_FILE_KEY)
    #[arg(long, global = true)]
    file_key: Option<String>,

    /// Log outbound requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole document tree as JSON
    File,
    /// Print one node as JSON
    Node {
        /// Node ID, e.g. 1:2
        node_id: String,
    },
    /// Print several nodes, fetched in one request, as a JSON map
    Nodes {
        /// Node IDs
        #[arg(required = true)]
        node_ids: Vec<String>,
    },
    /// Print the first node whose name contains NEEDLE (case-insensitive)
    Find {
        needle: String,
    },
    /// List the pages of the file
    Pages,
    /// Run a query exactly as the REST endpoint would and print its JSON payload
    Query {
        #[arg(long)]
        node_id: Option<String>,
        #[arg(long)]
        component: Option<String>,
    },
    /// Check credentials by fetching the file and printing its metadata
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        println!("Use 'figproxy --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    let cfg = Arc::new(FigmaConfig::from_env_values(FigmaEnv::from_process())?);
    let service = DesignService::new(cfg)?;
    let file_key = cli.file_key.as_deref();

    match command {
        Commands::File => {
            let key = service.resolve_file_key(file_key)?;
            let (document, _) = service.client().fetch_whole_file(&key).await?;
            print_json(&document)?;
        }
        Commands::Node { node_id } => {
            let outcome = service
                .query(DesignQuery {
                    file_key: cli.file_key.clone(),
                    node_id: Some(node_id),
                    component: None,
                })
                .await?;
            print_json(outcome.document())?;
        }
        Commands::Nodes { node_ids } => {
            let nodes = service.query_nodes(file_key, &node_ids).await?;
            for id in node_ids.iter().filter(|id| !nodes.contains_key(id.trim())) {
                eprintln!("warning: node {id} was not found");
            }
            print_json(&batch_response(nodes)?.nodes)?;
        }
        Commands::Find { needle } => {
            let key = service.resolve_file_key(file_key)?;
            let (document, _) = service.client().fetch_whole_file(&key).await?;
            match find_component_by_name(&document, &needle) {
                Some(found) => print_json(found)?,
                None => {
                    eprintln!("No node name contains '{needle}'");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Pages => {
            let pages = service.list_pages(file_key).await?;
            print!("{}", render_pages(&pages));
        }
        Commands::Query { node_id, component } => {
            let outcome = service
                .query(DesignQuery {
                    file_key: cli.file_key.clone(),
                    node_id,
                    component,
                })
                .await?;
            print_json(&outcome.into_response()?)?;
        }
        Commands::Check => {
            let key = service.resolve_file_key(file_key)?;
            let (document, metadata) = service.client().fetch_whole_file(&key).await?;
            print!("{}", render_check(&document, &metadata));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_pages(pages: &[PageSummary]) -> String {
    if pages.is_empty() {
        return "No pages found.\n".to_string();
    }
    pages
        .iter()
        .map(|page| format!("{}\t{}\n", page.id, page.name))
        .collect()
}

fn render_check(document: &DesignDocument, metadata: &DesignFileMetadata) -> String {
    format!(
        "File: {}\nVersion: {}\nLast modified: {}\nPages: {}\n",
        metadata.name,
        metadata.version,
        metadata
            .last_modified
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        document.pages().count()
    )
}
