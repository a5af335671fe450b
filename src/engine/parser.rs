//! Completion text parsing
//!
//! Models answer with pseudo-YAML: one `field: value` line per slot, `;`
//! between the values of a multivalued slot. Inlined objects are written
//! either inline (`address: street: 1 Main St, city: Springfield`) or as an
//! indented block under an empty key:
//!
//! ```text
//! addresses:
//!   - street: 1 Main St
//!     city: Springfield
//!   - street: 2 High St
//! ```
//!
//! The parser is deliberately forgiving about field names and stray lines,
//! and strict only about required slots left empty.

use crate::schema::{SchemaView, SlotDefinition};

use super::error::{DataMakerError, DataMakerResult};
use super::record::{LooseRecord, LooseValue};

const DEFAULT_MAX_DEPTH: usize = 10;

/// A non-blank line with its leading indentation
#[derive(Debug, Clone)]
struct Line {
    indent: usize,
    text: String,
}

fn split_lines(text: &str) -> Vec<Line> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| Line {
            indent: l.len() - l.trim_start().len(),
            text: l.trim().to_string(),
        })
        .collect()
}

/// Turns completion text into loose records for a schema class
pub struct ResponseParser<'a> {
    schema: &'a dyn SchemaView,
    max_depth: usize,
}

impl<'a> ResponseParser<'a> {
    pub fn new(schema: &'a dyn SchemaView) -> Self {
        Self {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit nesting of inlined objects
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parse a completion into a record of `class_name`
    ///
    /// Returns `Ok(None)` when a line cannot be attributed to any slot,
    /// in which case the whole response is discarded.
    ///
    /// # Errors
    ///
    /// [`DataMakerError::MissingRequiredValue`] for an empty required slot,
    /// [`DataMakerError::MaxDepthExceeded`] for runaway nesting.
    pub fn parse(&self, text: &str, class_name: &str) -> DataMakerResult<Option<LooseRecord>> {
        self.parse_lines(&split_lines(text), class_name, 0)
    }

    fn parse_lines(
        &self,
        lines: &[Line],
        class_name: &str,
        depth: usize,
    ) -> DataMakerResult<Option<LooseRecord>> {
        if depth > self.max_depth {
            return Err(DataMakerError::MaxDepthExceeded(self.max_depth));
        }
        let slot_names = self.schema.class_slots(class_name)?;
        let promptable = self.schema.promptable_slots(class_name)?;
        let mut record = LooseRecord::new();

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            i += 1;

            let (field, value) = match line.text.split_once(':') {
                Some((field, value)) => (field.to_string(), value.trim().to_string()),
                None => match promptable.as_slice() {
                    [only] => {
                        tracing::warn!(
                            "Line '{}' has no field name; assigning it to '{}'",
                            line.text,
                            only.name
                        );
                        (only.name.clone(), line.text.clone())
                    }
                    _ => {
                        tracing::error!(
                            "Line '{}' does not contain a colon; discarding {} response",
                            line.text,
                            class_name
                        );
                        return Ok(None);
                    }
                },
            };

            let Some(slot_name) = resolve_field(&field, &slot_names) else {
                tracing::warn!("Field '{}' is not a slot of {}; skipping", field, class_name);
                continue;
            };
            let slot = self.schema.induced_slot(&slot_name, class_name)?;
            let nested = self.schema.is_inlined(&slot)? && self.schema.is_class(slot.range());
            tracing::debug!("Parsed {}.{} = '{}'", class_name, slot_name, value);

            if value.is_empty() {
                if nested {
                    let block = take_block(lines, &mut i, line.indent);
                    if !block.is_empty() {
                        if let Some(value) = self.parse_block(&block, &slot, depth)? {
                            record.insert(slot_name, value);
                        }
                        continue;
                    }
                }
                check_empty(&slot, &line.text)?;
                continue;
            }

            let segments: Vec<&str> = if slot.is_multivalued() {
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            } else {
                vec![value.as_str()]
            };
            if segments.is_empty() {
                check_empty(&slot, &line.text)?;
                continue;
            }

            let mut values = Vec::with_capacity(segments.len());
            for segment in segments {
                if nested {
                    if let Some(v) = self.parse_segment(segment, slot.range(), depth)? {
                        values.push(v);
                    }
                } else {
                    values.push(LooseValue::scalar(segment));
                }
            }
            if let Some(value) = shape(values, &slot) {
                record.insert(slot_name, value);
            }
        }

        Ok(Some(record))
    }

    /// Parse one inline segment of an inlined slot
    fn parse_segment(
        &self,
        segment: &str,
        class_name: &str,
        depth: usize,
    ) -> DataMakerResult<Option<LooseValue>> {
        if !segment.contains(':') && segment.contains(" - ") {
            let promptable = self.schema.promptable_slots(class_name)?;
            if promptable.len() > 1 {
                let parts = segment.split(" - ").map(|p| p.trim().to_string()).collect();
                return Ok(Some(LooseValue::Pair(parts)));
            }
        }
        let lines = segment_lines(segment);
        Ok(self
            .parse_lines(&lines, class_name, depth + 1)?
            .map(LooseValue::Record))
    }

    /// Parse the indented block owned by an inlined slot
    fn parse_block(
        &self,
        block: &[Line],
        slot: &SlotDefinition,
        depth: usize,
    ) -> DataMakerResult<Option<LooseValue>> {
        let mut values = Vec::new();
        for item in block_items(block) {
            if let Some(record) = self.parse_lines(&item, slot.range(), depth + 1)? {
                values.push(LooseValue::Record(record));
            }
        }
        Ok(shape(values, slot))
    }
}

/// Match a raw field name to a slot: case and spaces are ignored, and one
/// trailing `s` is dropped if the plural form is unknown
fn resolve_field(field: &str, slot_names: &[String]) -> Option<String> {
    let normalized = field.trim().to_lowercase().replace(' ', "_");
    let find = |name: &str| {
        slot_names
            .iter()
            .find(|s| s.to_lowercase() == name)
            .cloned()
    };
    find(&normalized).or_else(|| normalized.strip_suffix('s').and_then(find))
}

/// Empty values are only an error for required slots
fn check_empty(slot: &SlotDefinition, line: &str) -> DataMakerResult<()> {
    if slot.is_required() {
        return Err(DataMakerError::MissingRequiredValue {
            slot: slot.name.clone(),
            line: line.to_string(),
        });
    }
    if slot.is_recommended() {
        tracing::warn!("Empty value for recommended slot '{}'", slot.name);
    } else {
        tracing::debug!("Empty value for slot '{}'", slot.name);
    }
    Ok(())
}

/// Final shape of a slot value: a list when multivalued, else the first value
fn shape(mut values: Vec<LooseValue>, slot: &SlotDefinition) -> Option<LooseValue> {
    if slot.is_multivalued() {
        return Some(LooseValue::List(values));
    }
    if values.len() > 1 {
        tracing::error!(
            "Expected one value for slot '{}', got {}; keeping the first",
            slot.name,
            values.len()
        );
    }
    if values.is_empty() {
        None
    } else {
        Some(values.swap_remove(0))
    }
}

/// Consume the lines indented deeper than `indent` starting at `*i`
fn take_block(lines: &[Line], i: &mut usize, indent: usize) -> Vec<Line> {
    let start = *i;
    while *i < lines.len() && lines[*i].indent > indent {
        *i += 1;
    }
    lines[start..*i].to_vec()
}

/// Split an inline segment into sub-field lines
///
/// Sub-fields are `,`-separated; a part without a colon continues the
/// previous sub-field (`street: 1 Main St, Springfield`).
fn segment_lines(segment: &str) -> Vec<Line> {
    if !segment.contains(':') {
        return vec![Line {
            indent: 0,
            text: segment.trim().to_string(),
        }];
    }
    let mut parts: Vec<String> = Vec::new();
    for part in segment.split(',') {
        match parts.last_mut() {
            Some(last) if !part.contains(':') => {
                last.push(',');
                last.push_str(part);
            }
            _ => parts.push(part.to_string()),
        }
    }
    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|text| Line { indent: 0, text })
        .collect()
}

/// Split a block into items at `- ` markers on its outermost indentation
///
/// A block without markers is a single item.
fn block_items(block: &[Line]) -> Vec<Vec<Line>> {
    let base = block.iter().map(|l| l.indent).min().unwrap_or(0);
    let is_marker = |l: &Line| l.indent == base && (l.text.starts_with("- ") || l.text == "-");
    if !block.iter().any(is_marker) {
        return vec![block.to_vec()];
    }

    let mut items: Vec<Vec<Line>> = Vec::new();
    for line in block {
        if is_marker(line) {
            let text = line.text.trim_start_matches('-').trim().to_string();
            let mut item = Vec::new();
            if !text.is_empty() {
                item.push(Line {
                    indent: line.indent + 2,
                    text,
                });
            }
            items.push(item);
        } else {
            match items.last_mut() {
                Some(item) => item.push(line.clone()),
                None => items.push(vec![line.clone()]),
            }
        }
    }
    items.retain(|item| !item.is_empty());
    items
}
