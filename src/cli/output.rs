//! Output formatting for CLI

use crate::engine::ExtractionResult;

/// One-paragraph summary of a generation run, printed to stderr
pub fn format_summary(results: &[ExtractionResult]) -> String {
    let mut output = String::new();
    let parsed = results.iter().filter(|r| r.object().is_some()).count();
    let entities: usize = results.iter().map(|r| r.named_entities().len()).sum();

    output.push_str(&format!("\n✅ Generated {} object(s)", parsed));
    if let Some(first) = results.first() {
        output.push_str(&format!(" of class {} with {}", first.class_name(), first.model()));
    }
    output.push('\n');

    if parsed < results.len() {
        output.push_str(&format!(
            "⚠️  {} completion(s) could not be parsed\n",
            results.len() - parsed
        ));
    }
    if entities > 0 {
        output.push_str(&format!("   Named entities: {}\n", entities));
    }

    output
}
