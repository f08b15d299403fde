//! Definition commands: generate, edit.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::DefinitionEdit;

#[derive(Debug, Serialize)]
pub struct DefinitionRow {
    pub value_id: String,
    pub name: String,
    pub tagline: String,
    pub definition: Option<String>,
    pub behavioral_anchors: Vec<String>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DefinitionsOutput {
    pub definitions: Vec<DefinitionRow>,
}

impl CommandOutput for DefinitionsOutput {
    fn to_human(&self) -> String {
        if self.definitions.is_empty() {
            return "No definitions yet.".to_string();
        }
        let mut table = list_table(&["value", "tagline", "source"]);
        for row in &self.definitions {
            table.add_row(vec![row.name.clone(), truncate(&row.tagline, 60), row.source.to_string()]);
        }
        table.to_string()
    }
}

/// Rows for the current top values, labelled by where each definition came from.
fn definition_rows(ctx: &AppContext, source_of: impl Fn(&str, bool) -> &'static str) -> DefinitionsOutput {
    let session = ctx.manager.session();
    let definitions = session
        .top_values(ctx.manager.rules())
        .iter()
        .filter_map(|id| {
            session.definition(id).map(|def| DefinitionRow {
                value_id: id.clone(),
                name: ctx.value_name(id),
                tagline: def.tagline.clone(),
                definition: def.definition.clone(),
                behavioral_anchors: def.behavioral_anchors.clone().unwrap_or_default(),
                source: source_of(id.as_str(), def.user_edited),
            })
        })
        .collect();
    DefinitionsOutput { definitions }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Replace definitions you have edited
    #[arg(long)]
    pub overwrite_edited: bool,
}

pub async fn generate(args: GenerateArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let gateway = ctx.gateway()?;
    let report = ctx
        .manager
        .generate_definitions(&gateway, &ctx.catalog, args.overwrite_edited)
        .await?;

    let result = definition_rows(ctx, |id, edited| {
        if report.kept.iter().any(|k| k == id) {
            "kept"
        } else if report.fallback.iter().any(|f| f == id) {
            "fallback"
        } else if edited {
            "edited"
        } else {
            "ai"
        }
    });
    output(&result, json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// One of the top value ids
    pub value: String,

    #[arg(long)]
    pub tagline: Option<String>,

    #[arg(long)]
    pub definition: Option<String>,

    /// Behavioral anchor; repeat to set several
    #[arg(long = "anchor")]
    pub anchors: Vec<String>,
}

pub async fn edit(args: EditArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let edit = DefinitionEdit {
        tagline: args.tagline,
        definition: args.definition,
        behavioral_anchors: (!args.anchors.is_empty()).then_some(args.anchors),
    };
    if edit.is_empty() {
        bail!("Nothing to change; pass --tagline, --definition or --anchor");
    }

    ctx.manager.edit_definition(&args.value, edit).await?;
    let mut result = definition_rows(ctx, |_, edited| if edited { "edited" } else { "generated" });
    result.definitions.retain(|row| row.value_id == args.value);
    output(&result, json_mode);
    Ok(())
}
