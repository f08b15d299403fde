//! Card sort commands: catalog, sort, undo, custom.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{list_table, output, truncate, ActionOutput, CommandOutput};
use crate::domain::models::{Category, UndoOutcome};

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize)]
pub struct CatalogOutput {
    pub values: Vec<CatalogEntry>,
    pub total: usize,
}

impl CommandOutput for CatalogOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "description", "category"]);
        for value in &self.values {
            table.add_row(vec![
                value.id.clone(),
                value.name.clone(),
                truncate(&value.description, 50),
                value.category.map_or("-", |c| c.as_str()).to_string(),
            ]);
        }
        format!("{} values:\n{table}", self.total)
    }
}

pub fn catalog(ctx: &AppContext, json_mode: bool) -> Result<()> {
    let ledger = ctx.manager.session().ledger();
    let mut values: Vec<CatalogEntry> = ctx
        .catalog
        .iter()
        .map(|v| CatalogEntry {
            id: v.id.clone(),
            name: v.name.clone(),
            description: v.short_description.clone(),
            category: ledger.category_of(&v.id),
        })
        .collect();
    if let Some(custom) = ledger.custom() {
        values.push(CatalogEntry {
            id: custom.id.clone(),
            name: custom.name.clone(),
            description: "Your own value".to_string(),
            category: Some(Category::Very),
        });
    }

    let result = CatalogOutput {
        total: values.len(),
        values,
    };
    output(&result, json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct SortArgs {
    /// very, somewhat or less; omit to show the current card
    pub category: Option<String>,

    /// Value id to file; defaults to the current card
    #[arg(short, long)]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CardOutput {
    pub position: usize,
    pub total: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CommandOutput for CardOutput {
    fn to_human(&self) -> String {
        match (&self.name, &self.description) {
            (Some(name), Some(desc)) => {
                format!("Card {}/{}: {name}\n  {desc}", self.position, self.total)
            }
            (Some(name), None) => format!("Card {}/{}: {name}", self.position, self.total),
            _ => "Sorting complete. Run 'valueslens select' next.".to_string(),
        }
    }
}

fn current_card(ctx: &AppContext) -> CardOutput {
    let ledger = ctx.manager.session().ledger();
    let current = ledger.current();
    let value = current.and_then(|id| ctx.catalog.get(id));
    CardOutput {
        position: ledger.cursor() + 1,
        total: ledger.total(),
        id: current.map(str::to_string),
        name: current.map(|id| ctx.value_name(id)),
        description: value.map(|v| v.short_description.clone()),
    }
}

fn next_hint(ctx: &AppContext) -> String {
    current_card(ctx).to_human()
}

pub async fn sort(args: SortArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let Some(category) = args.category else {
        output(&current_card(ctx), json_mode);
        return Ok(());
    };
    let category = Category::from_str(&category)
        .ok_or_else(|| anyhow!("Invalid category: {category}. Use very, somewhat or less"))?;

    let value_id = match args.value {
        Some(id) => {
            ctx.manager.assign(&id, category).await?;
            id
        }
        None => ctx.manager.assign_current(category).await?,
    };

    let result = ActionOutput::ok(format!(
        "Filed {} as {}",
        ctx.value_name(&value_id),
        category.as_str()
    ))
    .with_next(next_hint(ctx));
    output(&result, json_mode);
    Ok(())
}

pub async fn undo(ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let message = match ctx.manager.undo().await {
        UndoOutcome::Nothing => "Nothing to undo.".to_string(),
        UndoOutcome::Reverted { value_id, category } => format!(
            "Took {} back out of {}",
            ctx.value_name(&value_id),
            category.as_str()
        ),
        UndoOutcome::Orphaned { value_id } => {
            format!("Moved back to {} (it was not filed)", ctx.value_name(&value_id))
        }
    };
    output(&ActionOutput::ok(message).with_next(next_hint(ctx)), json_mode);
    Ok(())
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    /// Name of your own value (letters and spaces)
    pub name: Vec<String>,
}

pub async fn custom(args: CustomArgs, ctx: &mut AppContext, json_mode: bool) -> Result<()> {
    let name = args.name.join(" ");
    let custom = ctx.manager.add_custom_value(&name).await?;
    output(
        &ActionOutput::ok(format!("Added {} ({}) as very important", custom.name, custom.id)),
        json_mode,
    );
    Ok(())
}
