//! Sharing and export commands: publish, share, export.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::TextCardRenderer;
use crate::cli::context::AppContext;
use crate::cli::output::{output, ActionOutput, CommandOutput};
use crate::domain::models::ShareArtifact;
use crate::domain::ports::{CardRenderer, RenderFormat};

pub async fn publish(ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.share_service().await?;
    let artifact = service.publish(&mut ctx.manager, &ctx.catalog).await?;
    output(
        &ActionOutput::ok(format!("Published share {}", artifact.slug))
            .with_next(format!("View it with 'valueslens share {}'", artifact.slug)),
        json_mode,
    );
    Ok(())
}

#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Share slug
    pub slug: String,

    /// Show the full session snapshot behind the share
    #[arg(long)]
    pub session: bool,
}

#[derive(Debug, Serialize)]
pub struct ShareOutput {
    #[serde(flatten)]
    pub artifact: ShareArtifact,
}

impl CommandOutput for ShareOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Share {}", self.artifact.slug)];
        for (i, value) in self.artifact.values.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("{}. {} - {}", i + 1, value.name, value.tagline));
            if let Some(definition) = &value.definition {
                lines.push(format!("   {definition}"));
            }
            for anchor in &value.behavioral_anchors {
                lines.push(format!("   - {anchor}"));
            }
        }
        lines.join("\n")
    }
}

pub async fn share(args: ShareArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.share_service().await?;
    if args.session {
        let snapshot = service.session_for(&args.slug).await?;
        let bytes = TextCardRenderer.render(&snapshot, RenderFormat::Json)?;
        println!("{}", String::from_utf8_lossy(&bytes));
        return Ok(());
    }

    let artifact = service.get(&args.slug).await?;
    output(&ShareOutput { artifact }, json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// markdown or json
    #[arg(short, long, default_value = "markdown")]
    pub format: RenderFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let snapshot = ctx.manager.snapshot(&ctx.catalog)?;
    let bytes = TextCardRenderer.render(&snapshot, args.format)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output(
                &ActionOutput::ok(format!("Exported {} card to {}", args.format, path.display())),
                json_mode,
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
