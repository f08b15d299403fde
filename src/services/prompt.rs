//! Prompt construction and response parsing for definition generation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::domain::models::{Commitment, Definition, ValueRef};
use crate::domain::ports::DefinitionPrompt;

/// Everything the collaborator is told about one generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub values: Vec<ValueRef>,
    pub transcript: String,
    pub commitments: BTreeMap<String, Commitment>,
}

impl GenerationRequest {
    pub fn value_ids(&self) -> Vec<String> {
        self.values.iter().map(|v| v.id.clone()).collect()
    }
}

const SYSTEM_PROMPT: &str = "You write short, personal definitions of a person's core values. \
Ground every definition in the person's own story and goals. \
Respond with JSON only.";

pub fn build_prompt(request: &GenerationRequest) -> DefinitionPrompt {
    let values_text = request
        .values
        .iter()
        .map(|v| match &v.short_description {
            Some(desc) => format!("- {} ({}): {}", v.name, v.id, desc),
            None => format!("- {} ({})", v.name, v.id),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let goals_text = request
        .values
        .iter()
        .filter_map(|v| {
            request.commitments.get(&v.id).map(|c| {
                let mut line = format!("- {}: outcome \"{}\"", v.name, c.outcome);
                if let Some(intention) = c.implementation_intention() {
                    line.push_str(&format!("; {intention}"));
                }
                line
            })
        })
        .collect::<Vec<_>>();
    let goals_text = if goals_text.is_empty() {
        "None recorded".to_string()
    } else {
        goals_text.join("\n")
    };

    let transcript = if request.transcript.trim().is_empty() {
        "None recorded"
    } else {
        request.transcript.trim()
    };

    let user = format!(
        r#"## Values
{values_text}

## Story
{transcript}

## Goals
{goals_text}

## Output
Return a JSON object of this shape, with one entry per value id above:
{{"definitions": [{{"value_id": "...", "tagline": "...", "definition": "...", "behavioral_anchors": ["...", "..."]}}]}}"#
    );

    DefinitionPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Locate the structured payload inside model output.
///
/// A fenced block wins over bare JSON. Otherwise the first position where a
/// complete JSON object (or, failing that, array) parses is taken, so braces
/// in surrounding prose are skipped.
pub fn extract_json_payload(text: &str) -> Option<&str> {
    if let Some(fenced) = fenced_block(text) {
        return Some(fenced);
    }
    first_json_value(text, '{').or_else(|| first_json_value(text, '['))
}

fn first_json_value(text: &str, open: char) -> Option<&str> {
    text.match_indices(open).find_map(|(start, _)| {
        let rest = &text[start..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<JsonValue>();
        match stream.next() {
            Some(Ok(_)) => Some(&rest[..stream.byte_offset()]),
            _ => None,
        }
    })
}

fn fenced_block(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let body_start = after.find('\n')?;
        let info = after[..body_start].trim();
        let body = &after[body_start + 1..];
        let close = body.find("```")?;
        let candidate = body[..close].trim();

        let is_json = info.eq_ignore_ascii_case("json")
            || (info.is_empty() && (candidate.starts_with('{') || candidate.starts_with('[')));
        if is_json {
            return Some(candidate);
        }
        rest = &body[close + 3..];
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    #[serde(default, alias = "valueId", alias = "id")]
    value_id: Option<String>,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default, alias = "behavioralAnchors", alias = "anchors")]
    behavioral_anchors: Option<Vec<String>>,
}

impl RawDefinition {
    fn into_definition(self) -> Option<Definition> {
        let tagline = self.tagline?.trim().to_string();
        if tagline.is_empty() {
            return None;
        }
        let non_empty = |s: String| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        };
        let anchors: Vec<String> = self
            .behavioral_anchors
            .unwrap_or_default()
            .into_iter()
            .filter_map(non_empty)
            .collect();

        Some(Definition {
            tagline,
            definition: self.definition.and_then(non_empty),
            behavioral_anchors: (!anchors.is_empty()).then_some(anchors),
            user_edited: false,
        })
    }
}

/// Flatten every accepted payload shape into `(id, raw)` pairs.
fn collect_entries(payload: JsonValue) -> Result<Vec<(Option<String>, JsonValue)>, String> {
    match payload {
        JsonValue::Array(items) => Ok(items.into_iter().map(|item| (None, item)).collect()),
        JsonValue::Object(mut map) => match map.remove("definitions") {
            Some(inner) => collect_entries(inner),
            None => Ok(map.into_iter().map(|(k, v)| (Some(k), v)).collect()),
        },
        other => Err(format!("expected an object or array, got {other}")),
    }
}

/// Parse and validate the collaborator's output.
///
/// Entries for unknown ids and entries without a tagline are dropped. The
/// result is an error only when no expected id survives.
pub fn parse_definitions(
    text: &str,
    expected_ids: &[String],
) -> Result<BTreeMap<String, Definition>, String> {
    let payload = extract_json_payload(text).ok_or("no JSON payload in response")?;
    let json: JsonValue =
        serde_json::from_str(payload).map_err(|e| format!("payload is not valid JSON: {e}"))?;

    let mut parsed = BTreeMap::new();
    for (key, raw) in collect_entries(json)? {
        let Ok(raw) = serde_json::from_value::<RawDefinition>(raw) else {
            continue;
        };
        let Some(id) = raw.value_id.clone().or(key) else {
            continue;
        };
        if !expected_ids.contains(&id) {
            tracing::debug!(value_id = %id, "ignoring definition for unrequested value");
            continue;
        }
        if let Some(definition) = raw.into_definition() {
            parsed.entry(id).or_insert(definition);
        }
    }

    if parsed.is_empty() {
        return Err("response contained no usable definitions".to_string());
    }
    Ok(parsed)
}
