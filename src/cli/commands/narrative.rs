//! Story and goal commands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{CommitmentUpdate, StoryStatus};

#[derive(Args, Debug)]
pub struct StoryArgs {
    /// Story text; omit to show the current word count
    pub text: Option<String>,

    /// Read the story from a file ("-" for stdin)
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct StoryOutput {
    pub word_count: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub meets_requirements: bool,
}

impl From<&StoryStatus> for StoryOutput {
    fn from(status: &StoryStatus) -> Self {
        Self {
            word_count: status.word_count,
            min_words: status.min_words,
            max_words: status.max_words,
            meets_requirements: status.meets_requirements(),
        }
    }
}

impl CommandOutput for StoryOutput {
    fn to_human(&self) -> String {
        let verdict = if self.meets_requirements {
            "ok"
        } else if self.word_count < self.min_words {
            "too short"
        } else {
            "too long"
        };
        format!(
            "Story: {} words ({verdict}; {}-{} needed)",
            self.word_count, self.min_words, self.max_words
        )
    }
}

fn read_story(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read story from stdin");
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read story from {}", path.display()))
}

pub async fn story(args: StoryArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(read_story(&path)?),
        (None, None) => None,
    };
    if let Some(text) = text {
        ctx.manager.set_transcript(text).await?;
    }

    let status = ctx.manager.session().story_status(ctx.manager.rules());
    output(&StoryOutput::from(&status), json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct CommitArgs {
    /// One of the top value ids
    pub value: String,

    /// What you want to achieve
    #[arg(long)]
    pub outcome: Option<String>,

    /// What is most likely to get in the way
    #[arg(long)]
    pub obstacle: Option<String>,

    /// What you will do when it does
    #[arg(long)]
    pub plan: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitOutput {
    pub value_id: String,
    pub name: String,
    pub outcome: String,
    pub obstacle: String,
    pub plan: String,
    pub complete: bool,
    pub implementation_intention: Option<String>,
}

impl CommandOutput for CommitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{}:", self.name),
            format!("  Outcome:  {}", self.outcome),
            format!("  Obstacle: {}", self.obstacle),
            format!("  Plan:     {}", self.plan),
        ];
        match &self.implementation_intention {
            Some(intention) => lines.push(format!("  -> {intention}")),
            None => lines.push("  (incomplete)".to_string()),
        }
        lines.join("\n")
    }
}

pub async fn commit(args: CommitArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let update = CommitmentUpdate {
        outcome: args.outcome,
        obstacle: args.obstacle,
        plan: args.plan,
    };
    if update.is_empty() {
        bail!("Nothing to record; pass --outcome, --obstacle or --plan");
    }

    let commitment = ctx.manager.set_commitment(&args.value, update).await?;
    let result = CommitOutput {
        name: ctx.value_name(&args.value),
        value_id: args.value,
        complete: commitment.is_complete(),
        implementation_intention: commitment.implementation_intention(),
        outcome: commitment.outcome,
        obstacle: commitment.obstacle,
        plan: commitment.plan,
    };
    output(&result, json_mode);
    Ok(())
}
