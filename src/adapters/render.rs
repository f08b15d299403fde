//! Card export: Markdown and JSON renderings of a finalized snapshot.

use std::fmt::Write as _;

use crate::domain::errors::DomainResult;
use crate::domain::models::SessionSnapshot;
use crate::domain::ports::{CardRenderer, RenderFormat};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextCardRenderer;

impl TextCardRenderer {
    fn markdown(snapshot: &SessionSnapshot) -> String {
        let mut out = String::from("# My Values\n");

        for value in &snapshot.top_values {
            let _ = write!(out, "\n## {}. {}\n", value.rank, value.name);
            if let Some(def) = snapshot.definitions.get(&value.id) {
                let _ = write!(out, "\n_{}_\n", def.tagline);
                if let Some(text) = &def.definition {
                    let _ = write!(out, "\n{text}\n");
                }
                if let Some(anchors) = def.behavioral_anchors.as_ref().filter(|a| !a.is_empty()) {
                    out.push('\n');
                    for anchor in anchors {
                        let _ = writeln!(out, "- {anchor}");
                    }
                }
            }
            if let Some(intention) = snapshot
                .commitments
                .get(&value.id)
                .and_then(|c| c.implementation_intention.as_deref())
            {
                let _ = write!(out, "\n> {intention}\n");
            }
        }

        let rest: Vec<&str> = snapshot
            .ranked_values
            .iter()
            .skip(snapshot.top_values.len())
            .map(|v| v.name.as_str())
            .collect();
        if !rest.is_empty() {
            let _ = write!(out, "\n---\n\nAlso important: {}\n", rest.join(", "));
        }
        out
    }
}

impl CardRenderer for TextCardRenderer {
    fn render(&self, snapshot: &SessionSnapshot, format: RenderFormat) -> DomainResult<Vec<u8>> {
        match format {
            RenderFormat::Markdown => Ok(Self::markdown(snapshot).into_bytes()),
            RenderFormat::Json => Ok(serde_json::to_vec_pretty(snapshot)?),
        }
    }
}
