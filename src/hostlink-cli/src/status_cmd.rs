//! `hostlink status`: report what the host is connected to.

use anyhow::Result;
use hostlink_engine::{
    Collaborators, Facet, HostEnvironment, StatusPipeline, StatusReport, StatusResult,
};

use crate::cli::FormatArgs;
use crate::cli::handlers::CommandContext;
use crate::output::{OutputFormat, format_error_table, print_json};
use crate::styled_output::{MessageType, Painter};

pub async fn run(args: FormatArgs, ctx: &CommandContext) -> Result<i32> {
    let format = OutputFormat::parse(args.format.as_deref())?;

    let env = HostEnvironment::detect(ctx.config.services.clone());
    let collaborators = Collaborators::system(&ctx.config.services);
    let result = StatusPipeline::new(&env, collaborators).run().await;

    match format {
        OutputFormat::Json => print_json(&StatusReport::from_result(&result))?,
        OutputFormat::Text => print!("{}", render_text(&result, Painter::detect(false))),
    }
    Ok(result.exit_code)
}

fn facet_line(painter: Painter, facet: &Facet, on: &str, off: &str) -> String {
    let line = if facet.error.is_some() {
        painter.status(MessageType::Warning, off)
    } else if facet.active {
        painter.status(MessageType::Success, on)
    } else {
        painter.status(MessageType::Failure, off)
    };
    line + "\n"
}

pub fn render_text(result: &StatusResult, painter: Painter) -> String {
    let mut out = painter.bold(&format!("Connection status for {}", result.hostname));
    out.push('\n');

    let facets = [
        (
            "rhsm",
            &result.rhsm,
            "Connected to subscription service",
            "Not connected to subscription service",
        ),
        (
            "content",
            &result.content,
            "Content enabled",
            "Content disabled",
        ),
        (
            "analytics",
            &result.analytics,
            "Connected to analytics",
            "Not connected to analytics",
        ),
        (
            "remote-management",
            &result.daemon,
            "Remote management daemon running",
            "Remote management daemon not running",
        ),
    ];

    let mut errors = Vec::new();
    if let Some(err) = &result.hostname_error {
        errors.push(("hostname".to_string(), err.clone()));
    }
    for (name, facet, on, off) in facets {
        out.push_str(&facet_line(painter, facet, on, off));
        if let Some(err) = &facet.error {
            errors.push((name.to_string(), err.clone()));
        }
    }

    out.push_str(&format_error_table(&errors));
    out
}
