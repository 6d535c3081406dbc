//! `envforge env` and `envforge render`.

use anyhow::Result;
use tracing::{debug, info, warn};

use envforge_core::{merge_environment, Environment, EnvironmentRequest};
use envforge_render::{unresolved_keys, OutputFormat, Renderer};
use logging::{redact_properties, EventLogger, ResolutionEvent};

use crate::resolver::Resolver;

/// Resolve a request, recording the outcome as a resolution event.
pub async fn resolve(
    resolver: &Resolver,
    request: &EnvironmentRequest,
    events: &EventLogger,
    redact: bool,
) -> Result<Environment> {
    let environment = match resolver.resolve(request).await {
        Ok(environment) => environment,
        Err(e) => {
            events.log_event(ResolutionEvent::Failed {
                error_msg: e.to_string(),
            });
            return Err(e);
        }
    };

    let sources: Vec<String> = environment
        .property_sources
        .iter()
        .map(|s| s.name.clone())
        .collect();
    info!(
        application = %request.application,
        profiles = %request.profile,
        sources = sources.len(),
        "Resolved environment"
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        let merged = merge_environment(&environment);
        let shown = if redact { redact_properties(&merged) } else { merged };
        debug!(properties = %serde_json::Value::Object(shown), "Merged properties");
    }
    events.log_event(ResolutionEvent::Resolved {
        application: request.application.clone(),
        profiles: request.profile.clone(),
        label: request.label.clone(),
        sources,
    });
    Ok(environment)
}

/// Print the environment as pretty JSON.
pub async fn run_env(resolver: &Resolver, request: &EnvironmentRequest, redact: bool) -> Result<()> {
    let events = EventLogger::new();
    let environment = resolve(resolver, request, &events, redact).await?;
    println!("{}", serde_json::to_string_pretty(&environment)?);
    Ok(())
}

/// Print the environment as a properties, JSON or YAML document.
pub async fn run_render(
    resolver: &Resolver,
    renderer: &Renderer,
    request: &EnvironmentRequest,
    format: OutputFormat,
    redact: bool,
) -> Result<()> {
    let events = EventLogger::new();
    // Hyphenated profiles are rejected before any provider is consulted.
    envforge_render::validate_profiles(&request.profile)?;
    let environment = resolve(resolver, request, &events, redact).await?;

    let text = renderer.render(&environment, &request.profile, format)?;
    let merged = merge_environment(&environment);
    if renderer.options().resolve_placeholders {
        let unresolved = unresolved_keys(&merged);
        if !unresolved.is_empty() {
            warn!(keys = ?unresolved, "Output contains unresolved placeholders");
        }
    }
    events.log_event(ResolutionEvent::Rendered {
        format: format.to_string(),
        keys: merged.len(),
    });
    println!("{text}");
    Ok(())
}
