//! CLI output formatting

use crate::core::{ActionCategory, BoundAction, Environment, Pipeline};
use crate::synth::{categories, PipelineDocument};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format an action category for display
pub fn format_category(category: ActionCategory) -> String {
    match category {
        ActionCategory::Source => style("SOURCE").cyan().to_string(),
        ActionCategory::Build => style("BUILD").yellow().to_string(),
        ActionCategory::Approval => style("APPROVAL").magenta().to_string(),
    }
}

/// One line describing an attached action
pub fn format_action(bound: &BoundAction, pipeline: &Environment) -> String {
    let action = &bound.action;
    let mut line = format!(
        "{} {} ({}, run order {})",
        format_category(action.category()),
        style(&action.name).bold(),
        action.kind.provider(),
        action.run_order
    );

    if bound.is_cross_account(pipeline) {
        line.push_str(&format!(" {}", style(format!("account {}", bound.environment.account)).dim()));
    }
    if bound.is_cross_region(pipeline) {
        line.push_str(&format!(" {}", style(format!("region {}", bound.environment.region)).dim()));
    }
    if let Some(namespace) = &bound.namespace {
        line.push_str(&format!(" {}", style(format!("ns {}", namespace)).cyan()));
    }

    line
}

/// Multi-line overview of a pipeline's stages and actions
pub fn format_pipeline_summary(pipeline: &Pipeline) -> String {
    let mut out = format!(
        "{} {} ({})\n",
        INFO,
        style(&pipeline.name).bold(),
        style(&pipeline.environment).dim()
    );

    for stage in pipeline.stages() {
        out.push_str(&format!("  {}\n", style(&stage.name).bold()));
        for bound in stage.actions() {
            out.push_str(&format!("    {}\n", format_action(bound, &pipeline.environment)));
        }
    }

    out
}

/// Short count of what a document contains
pub fn format_document_stats(document: &PipelineDocument) -> String {
    let kinds: Vec<String> = categories(document).into_iter().map(format_category).collect();
    format!(
        "{} stage(s), {} action(s) [{}]",
        style(document.stages.len()).cyan(),
        style(document.action_count()).cyan(),
        kinds.join(", ")
    )
}
