//! `hostlink features`: preview the resolved feature set.

use anyhow::Result;
use hostlink_engine::{FeaturePreview, FeaturesReport, preview_features};
use hostlink_features::load_drop_in_dir;

use crate::cli::FeaturesArgs;
use crate::cli::handlers::CommandContext;
use crate::output::{OutputFormat, print_json};
use crate::styled_output::{MessageType, Painter};

pub async fn run(args: FeaturesArgs, ctx: &CommandContext) -> Result<i32> {
    let format = OutputFormat::parse(args.output.format.as_deref())?;
    let registry = ctx.config.registry()?;
    let features_config = load_drop_in_dir(&ctx.paths.drop_in_dir()).await?;

    let preview = preview_features(&registry, &features_config, &args.features.cli_layer())?;

    match format {
        OutputFormat::Json => print_json(&FeaturesReport::from_preview(&preview))?,
        OutputFormat::Text => print!("{}", render_text(&preview, Painter::detect(false))),
    }
    Ok(preview.exit_code)
}

pub fn render_text(preview: &FeaturePreview, painter: Painter) -> String {
    let width = preview
        .entries
        .iter()
        .map(|e| e.feature_id.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in &preview.entries {
        let (msg_type, state) = if entry.enabled {
            (MessageType::Success, "enabled ")
        } else {
            (MessageType::Skipped, "disabled")
        };
        let mut line = format!(
            "{:<width$}  {state}  ({})",
            entry.feature_id, entry.source
        );
        if !entry.requires.is_empty() {
            line.push_str(&format!("  requires: {}", entry.requires.join(", ")));
        }
        out.push_str(&painter.status(msg_type, &line));
        out.push('\n');
    }

    for conflict in &preview.conflicts {
        let line = format!(
            "{} requires {}, which is disabled",
            conflict.feature_id, conflict.missing_dependency_id
        );
        out.push_str(&painter.status(MessageType::Failure, &line));
        out.push('\n');
    }
    out
}
