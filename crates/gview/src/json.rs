//! Displayer and actions for JSON messages.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::actions::Actions;
use crate::detail::{Detail, Element, Group};
use crate::displayer::{DetailView, Displayer};

/// Renders `serde_json::Value` messages.
///
/// The summary is the configured top-level fields joined by spaces, or the
/// compact message when no fields are configured. Keywords match the summary
/// or any string anywhere in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonDisplayer {
    summary_fields: Vec<String>,
}

impl JsonDisplayer {
    pub fn new(summary_fields: Vec<String>) -> Self {
        Self { summary_fields }
    }
}

impl Displayer<Value> for JsonDisplayer {
    fn summary(&self, message: &Value) -> Result<String, String> {
        if self.summary_fields.is_empty() {
            return Ok(message.to_string());
        }
        let Value::Object(object) = message else {
            return Ok(message.to_string());
        };
        let parts: Vec<String> = self
            .summary_fields
            .iter()
            .map(|field| object.get(field).map(scalar_text).unwrap_or_default())
            .collect();
        Ok(parts.join(" "))
    }

    fn matches(&self, keyword: &str, message: &Value, summary: &str) -> Result<bool, String> {
        Ok(summary.contains(keyword) || contains_string(message, keyword))
    }

    fn detail_views(&self) -> Vec<DetailView<Value>> {
        vec![
            DetailView::new("Properties", |m: &Value| Ok(properties(m))),
            DetailView::new("Raw", raw),
        ]
    }
}

/// Custom actions for the JSON viewer: `w` writes the focused message to a
/// file under `out_dir`.
pub fn json_actions(out_dir: PathBuf) -> Actions<Value> {
    Actions::new().with("w", "write message to file", move |controller, message| {
        let path = write_message(&out_dir, message)?;
        controller.notify(format!("wrote {}", path.display()));
        Ok(())
    })
}

fn write_message(dir: &Path, message: &Value) -> Result<PathBuf, String> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let path = dir.join(format!("gview-{stamp}.json"));
    let body = serde_json::to_string_pretty(message)
        .map_err(|err| format!("encode message: {err}"))?;
    fs::write(&path, body + "\n").map_err(|err| format!("write {}: {err}", path.display()))?;
    Ok(path)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

fn contains_string(value: &Value, keyword: &str) -> bool {
    match value {
        Value::String(s) => s.contains(keyword),
        Value::Array(items) => items.iter().any(|v| contains_string(v, keyword)),
        Value::Object(object) => object.values().any(|v| contains_string(v, keyword)),
        _ => false,
    }
}

/// Scalar top-level fields in one group, then one group per nested object.
fn properties(message: &Value) -> Detail {
    let Value::Object(object) = message else {
        return Detail::new(vec![Group::new(
            "Value",
            vec![Element::line(scalar_text(message))],
        )]);
    };
    let mut fields = Vec::new();
    let mut nested = Vec::new();
    for (key, value) in object {
        match value {
            Value::Object(inner) => {
                let props: Vec<(String, String)> = inner
                    .iter()
                    .map(|(k, v)| (k.clone(), scalar_text(v)))
                    .collect();
                nested.push(Group::props(key.clone(), props));
            }
            other => fields.push((key.clone(), scalar_text(other))),
        }
    }
    let mut groups = vec![Group::props("Fields", fields)];
    groups.extend(nested);
    Detail::new(groups)
}

fn raw(message: &Value) -> Result<Detail, String> {
    let pretty =
        serde_json::to_string_pretty(message).map_err(|err| format!("encode message: {err}"))?;
    let lines = pretty.lines().map(Element::line).collect();
    Ok(Detail::new(vec![Group::new("Raw", lines).untitled()]))
}
