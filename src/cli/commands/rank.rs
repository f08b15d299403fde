//! Selection and ranking commands: select, rank, move.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{list_table, output, ActionOutput, CommandOutput};
use crate::domain::models::SelectionPlan;

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Value ids to select; omit to see the candidates
    pub ids: Vec<String>,

    /// Accept the very-important values when there are exactly enough
    #[arg(long, conflicts_with = "ids")]
    pub auto: bool,
}

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub plan: SelectionPlan,
    #[serde(skip)]
    pub names: Vec<(String, String)>,
}

impl CommandOutput for PlanOutput {
    fn to_human(&self) -> String {
        match &self.plan {
            SelectionPlan::AutoSelected { .. } => {
                "Exactly enough very important values. Run 'valueslens select --auto'.".to_string()
            }
            SelectionPlan::Choose { pick, .. } => {
                let mut table = list_table(&["id", "name"]);
                for (id, name) in &self.names {
                    table.add_row(vec![id.clone(), name.clone()]);
                }
                format!("Pick {pick} of these:\n{table}")
            }
            SelectionPlan::Insufficient { have, need } => format!(
                "Only {have} values are very important; {need} are needed. Use 'valueslens undo' to re-sort."
            ),
        }
    }
}

pub async fn select(args: SelectArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    if args.auto {
        if !ctx.manager.auto_select().await? {
            bail!("Selection needs a choice; run 'valueslens select' to see the candidates");
        }
        output(
            &ActionOutput::ok("Selected all very important values.")
                .with_next("Rank them with 'valueslens rank <id>...'"),
            json_mode,
        );
        return Ok(());
    }

    if args.ids.is_empty() {
        let plan = ctx.manager.selection_plan();
        let names = match &plan {
            SelectionPlan::Choose { candidates, .. } => candidates
                .iter()
                .map(|id| (id.clone(), ctx.value_name(id)))
                .collect(),
            _ => Vec::new(),
        };
        output(&PlanOutput { plan, names }, json_mode);
        return Ok(());
    }

    let count = args.ids.len();
    ctx.manager.select(args.ids).await?;
    output(
        &ActionOutput::ok(format!("Selected {count} values."))
            .with_next("Rank them with 'valueslens rank <id>...'"),
        json_mode,
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RankingOutput {
    pub ranking: Vec<RankedEntry>,
    pub top_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub name: String,
}

impl CommandOutput for RankingOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["rank", "id", "name"]);
        for entry in &self.ranking {
            let marker = if entry.rank <= self.top_count { "*" } else { "" };
            table.add_row(vec![
                format!("{}{marker}", entry.rank),
                entry.id.clone(),
                entry.name.clone(),
            ]);
        }
        format!("{table}\n(* top {})", self.top_count)
    }
}

fn ranking_output(ctx: &AppContext) -> RankingOutput {
    RankingOutput {
        ranking: ctx
            .manager
            .session()
            .ranking()
            .iter()
            .enumerate()
            .map(|(i, id)| RankedEntry {
                rank: i + 1,
                id: id.clone(),
                name: ctx.value_name(id),
            })
            .collect(),
        top_count: ctx.manager.rules().top_count,
    }
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Selected value ids, most important first; omit to show the ranking
    pub ids: Vec<String>,
}

pub async fn rank(args: RankArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    if !args.ids.is_empty() {
        ctx.manager.set_ranking(args.ids).await?;
    }
    output(&ranking_output(ctx), json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Current position (1-based)
    pub from: usize,

    /// New position (1-based)
    pub to: usize,
}

pub async fn move_ranked(args: MoveArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    if args.from == 0 || args.to == 0 {
        bail!("Positions start at 1");
    }
    ctx.manager.move_ranked(args.from - 1, args.to - 1).await?;
    output(&ranking_output(ctx), json_mode);
    Ok(())
}
