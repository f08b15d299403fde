//! Deterministic local definition generator.
//!
//! Used whenever the AI collaborator is unconfigured or fails. Output depends
//! only on the value's catalog metadata, so the same value always gets the
//! same definition.

use crate::domain::models::{Definition, ValueRef};

const TAGLINES: [&str; 4] = [
    "Living {name} on purpose",
    "{name} as a daily practice",
    "Choosing {name}, again and again",
    "Where {name} shows up in what I do",
];

const ANCHOR_PAIRS: [(&str, &str); 4] = [
    (
        "I notice moments where {lower} is at stake and act on it.",
        "I make at least one choice each week that reflects {lower}.",
    ),
    (
        "I name {lower} when I explain my decisions to others.",
        "I set aside time to reflect on how {lower} guided my week.",
    ),
    (
        "When I am unsure what to do, I ask what {lower} would ask of me.",
        "I protect time and energy for the things {lower} points me toward.",
    ),
    (
        "I look for small, concrete ways to practice {lower} every day.",
        "I notice when I drift from {lower} and steer back without judgment.",
    ),
];

/// Template index for a value id. Stable across runs and platforms.
fn template_index(value_id: &str, len: usize) -> usize {
    let sum: usize = value_id.bytes().map(usize::from).sum();
    sum % len
}

fn fill(template: &str, name: &str, lower: &str) -> String {
    template.replace("{name}", name).replace("{lower}", lower)
}

/// Synthesize a definition from static metadata.
///
/// Total for any input: an empty name falls back to the id.
pub fn fallback_definition(value: &ValueRef) -> Definition {
    let name = if value.name.trim().is_empty() {
        value.id.as_str()
    } else {
        value.name.trim()
    };
    let lower = name.to_lowercase();
    let index = template_index(&value.id, TAGLINES.len());

    let definition = match value.short_description.as_deref().map(str::trim) {
        Some(desc) if !desc.is_empty() => format!(
            "For me, {lower} means {}. It is a value I want to guide how I spend my time and how I treat the people around me.",
            desc.trim_end_matches('.').to_lowercase()
        ),
        _ => format!(
            "For me, {lower} is a guiding principle. It is a value I want to guide how I spend my time and how I treat the people around me."
        ),
    };

    let (first, second) = ANCHOR_PAIRS[template_index(&value.id, ANCHOR_PAIRS.len())];

    Definition {
        tagline: fill(TAGLINES[index], name, &lower),
        definition: Some(definition),
        behavioral_anchors: Some(vec![fill(first, name, &lower), fill(second, name, &lower)]),
        user_edited: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(id: &str, name: &str, desc: Option<&str>) -> ValueRef {
        ValueRef {
            id: id.to_string(),
            name: name.to_string(),
            short_description: desc.map(str::to_string),
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let v = value("integrity", "Integrity", Some("Acting in line with my principles"));
        assert_eq!(fallback_definition(&v), fallback_definition(&v));
    }

    #[test]
    fn test_fallback_shape() {
        let d = fallback_definition(&value("care", "Care", None));
        assert!(d.tagline.contains("Care"));
        assert!(!d.user_edited);
        assert_eq!(d.behavioral_anchors.as_ref().map(Vec::len), Some(2));
        assert!(d.definition.unwrap().contains("care"));
    }

    #[test]
    fn test_fallback_uses_description() {
        let d = fallback_definition(&value("honesty", "Honesty", Some("Telling the truth.")));
        assert!(d.definition.unwrap().contains("telling the truth"));
    }

    #[test]
    fn test_fallback_total_on_empty_name() {
        let d = fallback_definition(&value("custom-1", "  ", None));
        assert!(d.tagline.contains("custom-1"));
    }
}
