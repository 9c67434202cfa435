//! `hostlink connect`: register the host and activate features.

use anyhow::Result;
use hostlink_engine::{
    Collaborators, ConnectPipeline, ConnectReport, ConnectRequest, HostEnvironment,
    InvocationResult, RegistrationOutcome,
};
use hostlink_features::{FeatureRegistry, load_drop_in_dir};

use crate::cli::ConnectArgs;
use crate::cli::handlers::CommandContext;
use crate::output::{OutputFormat, format_error_table, print_json};
use crate::styled_output::{MessageType, Painter};

pub async fn run(args: ConnectArgs, ctx: &CommandContext) -> Result<i32> {
    let format = OutputFormat::parse(args.output.format.as_deref())?;
    let registry = ctx.config.registry()?;
    let features_config = load_drop_in_dir(&ctx.paths.drop_in_dir()).await?;

    let request = ConnectRequest {
        credentials: args.credential_args(),
        features_config,
        cli: args.features.cli_layer(),
    };

    let env = HostEnvironment::detect(ctx.config.services.clone());
    let collaborators = Collaborators::system(&ctx.config.services);
    let mut pipeline = ConnectPipeline::new(&registry, &env, collaborators, ctx.cancel.clone());
    let result = pipeline.run(&request).await?;

    match format {
        OutputFormat::Json => print_json(&ConnectReport::from_result(&registry, &result))?,
        OutputFormat::Text => print!(
            "{}",
            render_text(&registry, &result, Painter::detect(false))
        ),
    }
    Ok(result.exit_code)
}

/// `[✓]content, [✓]analytics, [ ]remote-management`
pub fn feature_preferences(registry: &FeatureRegistry, result: &InvocationResult) -> String {
    registry
        .features()
        .iter()
        .map(|f| {
            let mark = if result.features.is_enabled(&f.id) {
                "✓"
            } else {
                " "
            };
            format!("[{mark}]{}", f.id)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_text(registry: &FeatureRegistry, result: &InvocationResult, painter: Painter) -> String {
    let mut out = String::new();
    let mut errors = Vec::new();

    out.push_str(&painter.bold(&format!(
        "Connecting {} to management services",
        result.hostname
    )));
    out.push('\n');
    out.push_str(&format!(
        "Features: {}\n",
        feature_preferences(registry, result)
    ));

    if let Some(err) = &result.hostname_error {
        out.push_str(&painter.status(MessageType::Failure, "Cannot determine hostname"));
        out.push('\n');
        errors.push(("hostname".to_string(), err.clone()));
    }
    if let Some(err) = &result.uid_error {
        out.push_str(&painter.status(MessageType::Failure, "Insufficient privileges"));
        out.push('\n');
        errors.push(("uid".to_string(), err.clone()));
    }

    match &result.registration {
        RegistrationOutcome::NotAttempted => {}
        RegistrationOutcome::Registered => {
            out.push_str(&painter.status(MessageType::Success, "Connected to subscription service"));
            out.push('\n');
        }
        RegistrationOutcome::Failed(err) => {
            out.push_str(&painter.status(
                MessageType::Failure,
                "Cannot connect to subscription service",
            ));
            out.push('\n');
            errors.push(("rhsm".to_string(), err.clone()));
        }
    }

    for record in &result.activation_records {
        let label = registry
            .get(&record.feature_id)
            .map(|f| f.label.as_str())
            .unwrap_or(record.feature_id.as_str());
        let (msg_type, line) = match (record.enabled, record.successful) {
            (true, true) => (MessageType::Success, format!("{label} enabled")),
            (false, true) => (MessageType::Skipped, format!("{label} disabled")),
            (true, false) => (MessageType::Failure, format!("{label} could not be enabled")),
            (false, false) => (MessageType::Failure, format!("{label} could not be disabled")),
        };
        out.push_str(&painter.status(msg_type, &line));
        out.push('\n');
        if let Some(err) = &record.error {
            errors.push((record.feature_id.clone(), err.clone()));
        }
    }

    out.push_str(&format_error_table(&errors));
    out
}
