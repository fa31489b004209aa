//! Output formatting for CLI commands.

use std::io::Write;

use quickverse_sdk::Transmission;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Types that can be printed as text or JSON.
pub trait FormattedOutput: Serialize {
    fn format_text(&self) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Write `value` in the selected format followed by a newline.
pub fn write_output<T, W>(format: OutputFormat, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput,
    W: Write,
{
    let output = match format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json()?,
    };
    writeln!(writer, "{output}")?;
    Ok(())
}

/// Print `value` to stdout.
pub fn print_output<T: FormattedOutput>(format: OutputFormat, value: &T) -> Result<(), CliError> {
    write_output(format, value, std::io::stdout().lock())
}

/// Result of `quickverse fetch`.
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub language: String,
    pub count: usize,
}

impl FormattedOutput for FetchOutput {
    fn format_text(&self) -> String {
        format!("retrieved {} localizations for {}", self.count, self.language)
    }
}

/// One resolved key.
#[derive(Debug, Serialize)]
pub struct Resolved {
    pub key: String,
    pub value: Option<String>,
}

/// Result of `quickverse lookup`.
#[derive(Debug, Serialize)]
pub struct LookupOutput {
    pub language: String,
    pub values: Vec<Resolved>,
    pub report: &'static str,
}

impl FormattedOutput for LookupOutput {
    fn format_text(&self) -> String {
        self.values
            .iter()
            .map(|r| match &r.value {
                Some(value) => format!("{} = {value}", r.key),
                None => format!("{} (missing)", r.key),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of `quickverse config`.
#[derive(Debug, Serialize)]
pub struct ConfigOutput<'a> {
    #[serde(flatten)]
    pub config: &'a quickverse_common_config::ClientConfig,
}

impl FormattedOutput for ConfigOutput<'_> {
    fn format_text(&self) -> String {
        let c = self.config;
        let mut lines = vec![
            format!("api_key: {}", c.api_key.hint()),
            format!("package_name: {}", c.package_name),
            format!("base_url: {}", c.base_url),
            format!("connect_timeout_secs: {}", c.connect_timeout_secs),
            format!("request_timeout_secs: {}", c.request_timeout_secs),
            format!("report_threshold: {}", c.report_threshold),
            format!("debug: {}", c.debug),
        ];
        if let Some(secs) = c.flush_interval_secs {
            lines.push(format!("flush_interval_secs: {secs}"));
        }
        if let Some(device_id) = &c.device_id {
            lines.push(format!("device_id: {device_id}"));
        }
        lines.join("\n")
    }
}

/// Label for a report outcome.
pub fn transmission_label(outcome: Transmission) -> &'static str {
    match outcome {
        Transmission::Idle => "idle",
        Transmission::Busy => "busy",
        Transmission::Sent => "sent",
        Transmission::Failed => "failed",
        Transmission::Deferred => "deferred",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickverse_common_config::ClientConfig;

    #[test]
    fn test_lookup_text() {
        let output = LookupOutput {
            language: "en".to_string(),
            values: vec![
                Resolved { key: "A".to_string(), value: Some("hello".to_string()) },
                Resolved { key: "C".to_string(), value: None },
            ],
            report: "sent",
        };
        assert_eq!(output.format_text(), "A = hello\nC (missing)");
    }

    #[test]
    fn test_json_output() {
        let output = FetchOutput { language: "fr".to_string(), count: 3 };
        let mut buf = Vec::new();
        write_output(OutputFormat::Json, &output, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["count"], 3);
        assert_eq!(value["language"], "fr");
    }

    #[test]
    fn test_config_output_redacts_key() {
        let config = ClientConfig {
            api_key: "qv-live-0123456789".into(),
            ..ClientConfig::default()
        };
        let output = ConfigOutput { config: &config };

        assert!(output.format_text().contains("api_key: ****6789"));
        assert!(!output.format_json().unwrap().contains("qv-live"));
    }
}
