use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lendtable_app::{modules::books::loader, modules::books::view, LendingTable, TableQuery};
use lendtable_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "lendtable", version, about = "Sortable, searchable book-lending table")]
struct Cli {
    /// Book document to read: a path or an http(s) URL. Overrides `data.source`.
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the table over HTTP
    Serve,
    /// Load the table once and print it
    Table(TableArgs),
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Column to sort by (id, title, author, publicationYear, dateBorrowed, borrowStatus)
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction
    #[arg(long, value_parser = ["asc", "desc"])]
    dir: Option<String>,

    /// Case-insensitive match on title or author
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load lendtable settings")?;
    if let Some(source) = cli.source {
        settings.data.source = source;
    }
    lendtable_telemetry::init(&settings.telemetry);

    tracing::debug!(env = ?settings.environment, source = %settings.data.source, "lendtable CLI");

    match cli.command {
        Command::Serve => lendtable_app::serve(&settings).await,
        Command::Table(args) => print_table(&settings, args).await,
    }
}

async fn print_table(settings: &Settings, args: TableArgs) -> anyhow::Result<()> {
    let query = TableQuery::parse(
        args.sort.as_deref(),
        args.dir.as_deref(),
        args.search.as_deref(),
    )?;

    let source = loader::source_for(
        &settings.data.source,
        Duration::from_millis(settings.data.fetch_timeout_ms),
    )?;

    let mut table = LendingTable::new();
    table.mount(source.as_ref()).await;
    table.apply(&query);

    let rendered = match args.format {
        Format::Text => view::render_text(&table),
        Format::Html => view::render_page(&table),
        Format::Json => serde_json::to_string_pretty(&table.page())? + "\n",
    };
    print!("{rendered}");
    Ok(())
}
