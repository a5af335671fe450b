//! Markdown report for extraction results

use serde_json::Value;

use crate::engine::{ExtractionResult, FieldValue, GroundedObject};

/// Render one result as a Markdown section
pub fn render_markdown(result: &ExtractionResult) -> String {
    let mut out = format!("# {}\n\n", result.class_name());
    out.push_str(&format!("*Model*: {}  \n", result.model()));
    out.push_str(&format!(
        "*Generated*: {}\n\n",
        result.timestamp().to_rfc3339()
    ));

    out.push_str("## Object\n\n");
    match result.object() {
        Some(object) => {
            write_object(&mut out, object, 0);
            out.push('\n');
        }
        None => out.push_str("_No object could be parsed from the completion._\n\n"),
    }

    if !result.named_entities().is_empty() {
        out.push_str("## Named Entities\n\n");
        out.push_str("| ID | Label | Class |\n|----|-------|-------|\n");
        for entity in result.named_entities() {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                entity.id,
                entity.label,
                entity.range.as_deref().unwrap_or("")
            ));
        }
        out.push('\n');
    }

    out.push_str("## Prompt\n\n");
    push_fenced(&mut out, result.prompt());
    out.push_str("## Completion\n\n");
    push_fenced(&mut out, result.raw_completion());
    out
}

fn write_object(out: &mut String, object: &GroundedObject, indent: usize) {
    for (field, value) in object.fields().iter() {
        write_field(out, field, value, indent);
    }
}

fn write_field(out: &mut String, field: &str, value: &FieldValue, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        FieldValue::Scalar(v) => out.push_str(&format!("{pad}- **{field}**: {}\n", scalar_text(v))),
        FieldValue::Object(o) => {
            out.push_str(&format!("{pad}- **{field}**:\n"));
            write_object(out, o, indent + 1);
        }
        FieldValue::List(items) => {
            out.push_str(&format!("{pad}- **{field}**:\n"));
            for item in items {
                match item {
                    FieldValue::Object(o) => {
                        out.push_str(&format!("{pad}  - _{}_\n", o.class_name()));
                        write_object(out, o, indent + 2);
                    }
                    FieldValue::Scalar(v) => out.push_str(&format!("{pad}  - {}\n", scalar_text(v))),
                    FieldValue::List(_) => {
                        out.push_str(&format!("{pad}  - {}\n", item.to_json()));
                    }
                }
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_fenced(out: &mut String, text: &str) {
    out.push_str("```text\n");
    out.push_str(text.trim_end());
    out.push_str("\n```\n\n");
}
