//! Gridwalk admin CLI: schema migrations and layer registry inspection.
//!
//! Reads the same environment as the API (`DATABASE_URL` or the `DATABASE_*` parts).

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gridwalk_cli::{connect, format_bytes, init_tracing, truncate_string};
use gridwalk_core::models::{Layer, LayerResponse};
use gridwalk_core::Config;
use gridwalk_db::{
    migrate, migration_status, LayerRepository, LayerStore, SourceRepository, SourceStore,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gridwalk", about = "Gridwalk layer registry admin")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Show which migrations are applied
    MigrateStatus,
    /// Inspect registered layers
    Layers {
        #[command(subcommand)]
        command: LayerCommands,
    },
    /// List tables in the layer data schema
    Sources {
        /// Schema to inspect (defaults to LAYER_SCHEMA)
        #[arg(long)]
        schema: Option<String>,
    },
}

#[derive(Subcommand)]
enum LayerCommands {
    /// List layers, newest first
    List {
        #[arg(long, default_value = "50")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show one layer
    Show {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Migrate => {
            migrate(&pool).await.context("Migration failed")?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let status = migration_status(&pool).await?;
            if cli.format == Format::Json {
                let rows: Vec<_> = status
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "version": m.version,
                            "description": m.description,
                            "applied": m.applied,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<16} {:<8} DESCRIPTION", "VERSION", "APPLIED");
                for m in status {
                    println!(
                        "{:<16} {:<8} {}",
                        m.version,
                        if m.applied { "yes" } else { "no" },
                        m.description
                    );
                }
            }
        }
        Commands::Layers { command } => {
            let repo = LayerRepository::new(pool.clone());
            match command {
                LayerCommands::List { limit, offset } => {
                    let layers = repo.list(limit.clamp(1, 1000), offset.max(0)).await?;
                    let total = repo.count().await?;
                    if cli.format == Format::Json {
                        let layers: Vec<LayerResponse> =
                            layers.into_iter().map(LayerResponse::from).collect();
                        println!("{}", serde_json::to_string_pretty(&layers)?);
                    } else {
                        print_layer_table(&layers, total);
                    }
                }
                LayerCommands::Show { id } => {
                    let layer = repo
                        .get(id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Layer {} not found", id))?;
                    if cli.format == Format::Json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&LayerResponse::from(layer))?
                        );
                    } else {
                        print_layer_detail(&layer);
                    }
                }
            }
        }
        Commands::Sources { schema } => {
            let schema = schema.unwrap_or_else(|| config.layer_schema.clone());
            let sources = SourceRepository::new(pool.clone())
                .list_sources(&schema)
                .await?;
            if cli.format == Format::Json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(
                        &serde_json::json!({ "schema": schema, "sources": sources })
                    )?
                );
            } else {
                println!("Tables in {} ({}):", schema, sources.len());
                for source in sources {
                    println!("  {}", source);
                }
            }
        }
    }

    pool.close().await;
    Ok(())
}

fn print_layer_table(layers: &[Layer], total: i64) {
    println!(
        "{:<36}  {:<12}  {:<30}  {:>10}  {:>7}  CREATED",
        "ID", "STATUS", "NAME", "SIZE", "PROG"
    );
    for layer in layers {
        let progress = layer
            .progress_percent()
            .map(|p| format!("{:.0}%", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36}  {:<12}  {:<30}  {:>10}  {:>7}  {}",
            layer.id,
            truncate_string(layer.status.as_str(), 12),
            truncate_string(&layer.name, 30),
            format_bytes(layer.total_size),
            progress,
            layer.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    println!("\n{} of {} layers", layers.len(), total);
}

fn print_layer_detail(layer: &Layer) {
    println!("ID:           {}", layer.id);
    println!("Name:         {}", layer.name);
    println!("Status:       {}", layer.status);
    println!(
        "Upload type:  {}",
        layer.upload_type.as_deref().unwrap_or("-")
    );
    println!(
        "Progress:     {} / {} ({})",
        format_bytes(layer.current_offset),
        format_bytes(layer.total_size),
        layer
            .progress_percent()
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "size unknown".to_string())
    );
    println!("Complete:     {}", layer.is_upload_complete());
    println!("Created:      {}", layer.created_at.to_rfc3339());
    println!("Updated:      {}", layer.updated_at.to_rfc3339());
}
