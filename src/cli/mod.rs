//! Command-line interface.
//!
//! Each invocation opens the saved session, applies one command and exits.
//! Every mutation is written back before the command returns.

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::definitions::{EditArgs, GenerateArgs};
use commands::narrative::{CommitArgs, StoryArgs};
use commands::rank::{MoveArgs, RankArgs, SelectArgs};
use commands::session::StartArgs;
use commands::share::{ExportArgs, ShareArgs};
use commands::sort::{CustomArgs, SortArgs};
pub use context::AppContext;

#[derive(Parser)]
#[command(name = "valueslens")]
#[command(about = "ValuesLens - discover, rank and define your core values", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .valueslens/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new assessment with a freshly shuffled deck
    Start(StartArgs),
    /// Show where the current assessment stands
    Status,
    /// List every value in the deck
    Catalog,
    /// Show the current card or file it into a category
    Sort(SortArgs),
    /// Take back the last sorted card
    Undo,
    /// Add your own value as very important
    Custom(CustomArgs),
    /// Choose which very important values to rank
    Select(SelectArgs),
    /// Order the selected values
    Rank(RankArgs),
    /// Move a ranked value to another position
    Move(MoveArgs),
    /// Record the story behind your top values
    Story(StoryArgs),
    /// Set outcome, obstacle and plan for a top value
    Commit(CommitArgs),
    /// Generate personal definitions for the top values
    Generate(GenerateArgs),
    /// Edit a definition by hand
    Edit(EditArgs),
    /// Publish the top values as a shareable card
    Publish,
    /// Show a published share
    Share(ShareArgs),
    /// Export the values card
    Export(ExportArgs),
    /// Discard the current assessment
    Reset,
}

/// Run one command against the opened session.
pub async fn run(command: Commands, ctx: &mut AppContext, json_mode: bool) -> anyhow::Result<()> {
    use commands::{definitions, narrative, rank, session, share, sort};

    match command {
        Commands::Start(args) => session::start(args, ctx, json_mode).await,
        Commands::Status => session::status(ctx, json_mode),
        Commands::Catalog => sort::catalog(ctx, json_mode),
        Commands::Sort(args) => sort::sort(args, ctx, json_mode).await,
        Commands::Undo => sort::undo(ctx, json_mode).await,
        Commands::Custom(args) => sort::custom(args, ctx, json_mode).await,
        Commands::Select(args) => rank::select(args, ctx, json_mode).await,
        Commands::Rank(args) => rank::rank(args, ctx, json_mode).await,
        Commands::Move(args) => rank::move_ranked(args, ctx, json_mode).await,
        Commands::Story(args) => narrative::story(args, ctx, json_mode).await,
        Commands::Commit(args) => narrative::commit(args, ctx, json_mode).await,
        Commands::Generate(args) => definitions::generate(args, ctx, json_mode).await,
        Commands::Edit(args) => definitions::edit(args, ctx, json_mode).await,
        Commands::Publish => share::publish(ctx, json_mode).await,
        Commands::Share(args) => share::share(args, ctx, json_mode).await,
        Commands::Export(args) => share::export(args, ctx, json_mode),
        Commands::Reset => session::reset(ctx, json_mode).await,
    }
}

/// Print an error and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
