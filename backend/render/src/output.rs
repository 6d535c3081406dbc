//! Environment → text rendering for properties, JSON and YAML output.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use envforge_core::{merge_environment, Environment, PropertyMap, StructureBuilder};

use crate::error::{RenderError, Result};
use crate::placeholder::{resolve_placeholders, value_text};

/// Supported output documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Properties,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Properties => write!(f, "properties"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "properties" => Ok(OutputFormat::Properties),
            "json" => Ok(OutputFormat::Json),
            "yml" | "yaml" => Ok(OutputFormat::Yaml),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit only `X` for YAML documents of the form `{"document": X}`.
    pub strip_document: bool,
    /// Resolve `${...}` placeholders against the environment itself.
    pub resolve_placeholders: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strip_document: true,
            resolve_placeholders: true,
        }
    }
}

/// Renders resolved environments.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render `environment`, which was resolved for `profiles`.
    pub fn render(
        &self,
        environment: &Environment,
        profiles: &str,
        format: OutputFormat,
    ) -> Result<String> {
        validate_profiles(profiles)?;
        let flat = merge_environment(environment);
        debug!(name = %environment.name, %format, keys = flat.len(), "Rendering environment");

        match format {
            OutputFormat::Properties => {
                let text = properties_text(&flat);
                Ok(self.resolve(text, &flat))
            }
            OutputFormat::Json => {
                let document = StructureBuilder::new().build_value(&flat)?;
                let json = serde_json::to_string(&document)?;
                Ok(self.resolve(json, &flat))
            }
            OutputFormat::Yaml => {
                let (document, stripped) = StructureBuilder::new()
                    .unwrap_document(self.options.strip_document)
                    .build_reporting_unwrap(&flat)?;
                let yaml = serde_yaml::to_string(&document.into_value())?;
                if stripped {
                    return Ok(yaml);
                }
                Ok(self.resolve(yaml, &flat))
            }
        }
    }

    fn resolve(&self, text: String, flat: &PropertyMap) -> String {
        if self.options.resolve_placeholders {
            resolve_placeholders(&text, flat)
        } else {
            text
        }
    }
}

/// Properties, JSON and YAML output address a single profile list per path
/// segment, so profiles may not contain hyphens.
pub fn validate_profiles(profiles: &str) -> Result<()> {
    if profiles.contains('-') {
        return Err(RenderError::InvalidRequest(
            "properties output not supported for name or profiles containing hyphens".to_string(),
        ));
    }
    Ok(())
}

/// `key: value` lines in insertion order.
pub fn properties_text(flat: &PropertyMap) -> String {
    flat.iter()
        .map(|(key, value)| {
            let text = value_text(value).unwrap_or(std::borrow::Cow::Borrowed("null"));
            format!("{key}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use envforge_core::PropertySource;
    use serde_json::{json, Value};

    fn environment(sources: Vec<(&str, Value)>) -> Environment {
        let mut env = Environment::new("app", vec!["prod".into()], None);
        for (name, source) in sources {
            let Value::Object(map) = source else {
                panic!("source must be an object")
            };
            env.add(PropertySource::new(name, map));
        }
        env
    }

    fn sample() -> Environment {
        environment(vec![
            (
                "app-prod",
                json!({"server.port": 443, "hosts[0]": "p1", "url": "https://${server.host}:${server.port}"}),
            ),
            (
                "application",
                json!({"server.port": 80, "server.host": "example.com", "hosts[0]": "a", "hosts[1]": "b"}),
            ),
        ])
    }

    #[test]
    fn test_properties_output() {
        let out = Renderer::default()
            .render(&sample(), "prod", OutputFormat::Properties)
            .unwrap();
        assert_eq!(
            out,
            "server.port: 443\nserver.host: example.com\nurl: https://example.com:443\nhosts[0]: p1"
        );
    }

    #[test]
    fn test_properties_without_resolution() {
        let renderer = Renderer::new(RenderOptions {
            resolve_placeholders: false,
            ..RenderOptions::default()
        });
        let out = renderer
            .render(&sample(), "prod", OutputFormat::Properties)
            .unwrap();
        assert!(out.contains("url: https://${server.host}:${server.port}"));
    }

    #[test]
    fn test_json_output() {
        let out = Renderer::default()
            .render(&sample(), "prod", OutputFormat::Json)
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "server": {"port": 443, "host": "example.com"},
                "url": "https://example.com:443",
                "hosts": ["p1"]
            })
        );
    }

    #[test]
    fn test_yaml_output() {
        let out = Renderer::default()
            .render(&sample(), "prod", OutputFormat::Yaml)
            .unwrap();
        let value: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["server"]["port"], json!(443));
        assert_eq!(value["hosts"], json!(["p1"]));
        assert_eq!(value["url"], json!("https://example.com:443"));
    }

    #[test]
    fn test_yaml_strips_document() {
        let env = environment(vec![(
            "app",
            json!({"document[0]": "a", "document[1]": "${x}"}),
        )]);

        let out = Renderer::default()
            .render(&env, "prod", OutputFormat::Yaml)
            .unwrap();
        let value: Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value, json!(["a", "${x}"]));

        let kept = Renderer::new(RenderOptions {
            strip_document: false,
            ..RenderOptions::default()
        })
        .render(&env, "prod", OutputFormat::Yaml)
        .unwrap();
        let value: Value = serde_yaml::from_str(&kept).unwrap();
        assert_eq!(value, json!({"document": ["a", "${x}"]}));
    }

    #[test]
    fn test_hyphenated_profiles_rejected() {
        let err = Renderer::default()
            .render(&sample(), "prod-eu", OutputFormat::Json)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_key_surfaces() {
        let env = environment(vec![("app", json!({"a[x]": 1}))]);
        let err = Renderer::default()
            .render(&env, "prod", OutputFormat::Json)
            .unwrap_err();
        assert!(matches!(err, RenderError::Engine(_)));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("YML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!(
            "properties".parse::<OutputFormat>().unwrap(),
            OutputFormat::Properties
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
