//! Session lifecycle commands: start, status, reset.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, ActionOutput, CommandOutput};
use crate::domain::models::{Category, Demographics, Phase};
use crate::services::LoadOutcome;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Discard an in-progress session
    #[arg(short, long)]
    pub force: bool,

    /// Consent to storing the results
    #[arg(long)]
    pub consent: bool,

    /// Self-reported age range (e.g. 25-34)
    #[arg(long)]
    pub age_range: Option<String>,

    /// Self-reported country
    #[arg(long)]
    pub country: Option<String>,

    /// Self-reported gender
    #[arg(long)]
    pub gender: Option<String>,
}

pub async fn start(args: StartArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    if ctx.manager.is_in_progress() && !args.force {
        bail!(
            "A session is already in progress (phase: {}). Use --force to discard it.",
            ctx.manager.resume_route().as_str()
        );
    }

    let session_id = ctx.manager.start(&ctx.catalog).await?;
    if args.consent {
        ctx.manager.set_consent(true).await?;
    }
    if args.age_range.is_some() || args.country.is_some() || args.gender.is_some() {
        ctx.manager
            .set_demographics(Demographics {
                age_range: args.age_range,
                country: args.country,
                gender: args.gender,
            })
            .await?;
    }

    let mut result = ActionOutput::ok(format!("Started session {session_id}"));
    if let Some(current) = ctx.manager.session().ledger().current() {
        result = result.with_next(format!("First card: {}", ctx.value_name(current)));
    }
    output(&result, json_mode);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub started: bool,
    pub session_id: Option<String>,
    pub phase: Phase,
    pub durable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub sorted: usize,
    pub total: usize,
    pub very: usize,
    pub somewhat: usize,
    pub less: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<String>,
    pub selection: Vec<String>,
    pub ranking: Vec<String>,
    pub story_words: usize,
    pub commitments_complete: usize,
    pub definitions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_slug: Option<String>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let Some(session_id) = &self.session_id else {
            return "No session. Run 'valueslens start' to begin.".to_string();
        };

        let mut lines = Vec::new();
        if let Some(notice) = &self.notice {
            lines.push(format!("Note: {notice}"));
        }
        lines.push(format!("Session: {session_id}"));
        lines.push(format!("Phase: {}", self.phase.as_str()));
        lines.push(format!(
            "Sorted: {}/{} (very {}, somewhat {}, less {})",
            self.sorted, self.total, self.very, self.somewhat, self.less
        ));
        if let Some(custom) = &self.custom_value {
            lines.push(format!("Custom value: {custom}"));
        }
        if !self.selection.is_empty() {
            lines.push(format!("Selected: {}", self.selection.join(", ")));
        }
        if !self.ranking.is_empty() {
            lines.push("Ranking:".to_string());
            for (i, name) in self.ranking.iter().enumerate() {
                lines.push(format!("  {}. {name}", i + 1));
            }
        }
        lines.push(format!("Story: {} words", self.story_words));
        lines.push(format!("Commitments complete: {}", self.commitments_complete));
        lines.push(format!("Definitions: {}", self.definitions));
        if let Some(slug) = &self.share_slug {
            lines.push(format!("Share slug: {slug}"));
        }
        if !self.durable {
            lines.push("Warning: latest changes could not be saved".to_string());
        }
        lines.join("\n")
    }
}

pub fn status(ctx: &AppContext, json_mode: bool) -> Result<()> {
    let manager = &ctx.manager;
    let session = manager.session();
    let ledger = session.ledger();
    let rules = manager.rules();

    let notice = match manager.load_outcome() {
        LoadOutcome::Migrated { from } => Some(format!("saved session upgraded from version {from}")),
        LoadOutcome::Discarded { reason } => Some(format!("saved session was discarded: {reason}")),
        LoadOutcome::Fresh | LoadOutcome::Restored => None,
    };

    let names = |ids: &[String]| ids.iter().map(|id| ctx.value_name(id)).collect::<Vec<_>>();
    let top = session.top_values(rules);

    let result = StatusOutput {
        started: session.is_started(),
        session_id: session.is_started().then(|| session.id().to_string()),
        phase: manager.resume_route(),
        durable: manager.is_durable(),
        notice,
        sorted: ledger.cursor(),
        total: ledger.total(),
        very: ledger.sequence(Category::Very).len(),
        somewhat: ledger.sequence(Category::Somewhat).len(),
        less: ledger.sequence(Category::Less).len(),
        custom_value: ledger.custom().map(|c| c.name.clone()),
        selection: names(session.selection()),
        ranking: names(session.ranking()),
        story_words: session.story_status(rules).word_count,
        commitments_complete: top
            .iter()
            .filter(|id| session.commitment(id).is_some_and(|c| c.is_complete()))
            .count(),
        definitions: session.definitions().len(),
        share_slug: session.share_slug().map(str::to_string),
    };
    output(&result, json_mode);
    Ok(())
}

pub async fn reset(ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    ctx.manager.reset().await;
    output(&ActionOutput::ok("Session cleared."), json_mode);
    Ok(())
}
