//! CLI runner - executes commands

use crate::accessor::RecordRequest;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{QueryClient, RetrievalResult};
use crate::config::AppConfig;
use crate::connector::Connector;
use crate::error::Result;
use crate::output::ResultMaterializer;
use crate::presets::{DatePreset, DatePresets};
use crate::types::{Conditions, DateRange};
use serde_json::{json, Value};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Describe { object } => self.describe(object).await,
            Commands::Export {
                object,
                fields,
                conditions,
                preset,
                start,
                end,
            } => {
                let request = build_request(
                    fields,
                    conditions,
                    *preset,
                    start.as_deref(),
                    end.as_deref(),
                )?;
                self.export(object, &request).await
            }
            Commands::Updated { object, preset } => self.updated(object, *preset).await,
            Commands::Query { soql, output, name } => self.query(soql, output, name).await,
            Commands::Presets => {
                self.presets();
                Ok(())
            }
        }
    }

    /// Load the config file and apply command-line overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(self.cli.config.as_deref())?;
        if let Some(root) = &self.cli.output_root {
            config.output_root = root.clone();
        }
        Ok(config)
    }

    fn connector(&self) -> Result<Connector> {
        Connector::from_config(self.load_config()?)
    }

    async fn describe(&self, object: &str) -> Result<()> {
        let accessor = self.connector()?.accessor(object).await?;

        self.output_message(&json!({
            "type": "DESCRIBE",
            "object": {
                "name": accessor.object(),
                "label": accessor.label(),
                "fields": accessor.fields()
            }
        }));
        Ok(())
    }

    async fn export(&self, object: &str, request: &RecordRequest) -> Result<()> {
        let accessor = self.connector()?.accessor(object).await?;
        let summary = accessor.get_records(request).await?;

        self.output_message(&json!({
            "type": "RESULT",
            "object": object,
            "result": summary
        }));
        Ok(())
    }

    async fn updated(&self, object: &str, preset: DatePreset) -> Result<()> {
        let mut accessor = self.connector()?.accessor(object).await?;
        let updated = accessor.get_updated_records(preset).await?;

        self.output_message(&json!({
            "type": "UPDATED",
            "object": object,
            "preset": preset.name(),
            "updated": updated
        }));
        Ok(())
    }

    async fn query(&self, soql: &str, output: &Path, name: &str) -> Result<()> {
        let client = self.connector()?.client().await?;
        let records = client.query(soql).await?;
        let summary = ResultMaterializer::new()
            .write(RetrievalResult::Records(records), output, name)
            .await?;

        self.output_message(&json!({
            "type": "RESULT",
            "result": summary
        }));
        Ok(())
    }

    fn presets(&self) {
        let presets = DatePresets::new();
        let table: Vec<Value> = presets
            .iter()
            .map(|(preset, range)| {
                json!({
                    "name": preset.name(),
                    "start": range.start(),
                    "end": range.end()
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "PRESETS",
            "generated_at": presets.generated_at(),
            "presets": table
        }));
    }

    /// Output a message based on format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Turn `export` arguments into a record request
pub fn build_request(
    fields: &[String],
    conditions: &[String],
    preset: Option<DatePreset>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<RecordRequest> {
    let mut request = RecordRequest::new();

    if !fields.is_empty() {
        request = request.with_fields(fields.iter().map(|f| f.trim().to_string()));
    }

    if !conditions.is_empty() {
        let parsed = conditions
            .iter()
            .map(|expr| Conditions::parse_expr(expr))
            .collect::<Result<Conditions>>()?;
        request = request.with_conditions(parsed);
    }

    if let Some(preset) = preset {
        request = request.with_preset(preset);
    }

    if let (Some(start), Some(end)) = (start, end) {
        request = request.with_date_range(DateRange::parse(start, end)?);
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_build_request_empty() {
        let request = build_request(&[], &[], None, None, None).unwrap();
        assert!(request.is_unfiltered());
    }

    #[test]
    fn test_build_request_full() {
        let request = build_request(
            &["Id".to_string(), " Status".to_string()],
            &["Status=Open,Closed".to_string(), "Status=New".to_string()],
            Some(DatePreset::Yesterday),
            Some("2024-01-01"),
            Some("2024-01-31T12:00:00Z"),
        )
        .unwrap();

        assert_eq!(request.fields(), Some(&["Id".to_string(), "Status".to_string()][..]));
        let conditions = request.conditions().unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions.get("Status").unwrap(), ["New"]);
        assert_eq!(request.date_preset, Some(DatePreset::Yesterday));
        assert!(request.date_range.is_some());
    }

    #[test]
    fn test_build_request_rejects_bad_input() {
        assert!(matches!(
            build_request(&[], &["NoEquals".to_string()], None, None, None),
            Err(Error::InvalidConfigValue { .. })
        ));
        assert!(build_request(&[], &[], None, Some("2024-02-01"), Some("2024-01-01")).is_err());
        assert!(build_request(&[], &[], None, Some("yesterday"), Some("2024-01-01")).is_err());
    }
}
