//! `hostlink disconnect`: undo what `connect` set up.

use anyhow::Result;
use hostlink_engine::{
    Collaborators, DisconnectPipeline, DisconnectReport, DisconnectResult, HostEnvironment,
};

use crate::cli::FormatArgs;
use crate::cli::handlers::CommandContext;
use crate::output::{OutputFormat, format_error_table, print_json};
use crate::styled_output::{MessageType, Painter};

pub async fn run(args: FormatArgs, ctx: &CommandContext) -> Result<i32> {
    let format = OutputFormat::parse(args.format.as_deref())?;

    let env = HostEnvironment::detect(ctx.config.services.clone());
    let collaborators = Collaborators::system(&ctx.config.services);
    let result = DisconnectPipeline::new(&env, collaborators).run().await;

    match format {
        OutputFormat::Json => print_json(&DisconnectReport::from_result(&result))?,
        OutputFormat::Text => print!("{}", render_text(&result, Painter::detect(false))),
    }
    Ok(result.exit_code)
}

pub fn render_text(result: &DisconnectResult, painter: Painter) -> String {
    let mut out = painter.bold(&format!(
        "Disconnecting {} from management services",
        result.hostname
    ));
    out.push('\n');
    let mut errors = Vec::new();

    if let Some(err) = &result.uid_error {
        out.push_str(&painter.status(MessageType::Failure, "Insufficient privileges"));
        out.push('\n');
        errors.push(("uid".to_string(), err.clone()));
    }

    for record in &result.steps {
        let label = record.step.label();
        let (msg_type, line) = if record.skipped {
            (MessageType::Skipped, format!("Already disconnected from {label}"))
        } else if record.successful {
            (MessageType::Success, format!("Disconnected from {label}"))
        } else {
            (MessageType::Failure, format!("Cannot disconnect from {label}"))
        };
        out.push_str(&painter.status(msg_type, &line));
        out.push('\n');
        if let Some(err) = &record.error {
            errors.push((label.to_string(), err.clone()));
        }
    }

    out.push_str(&format_error_table(&errors));
    out
}
