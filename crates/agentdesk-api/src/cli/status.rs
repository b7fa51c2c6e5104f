//! `agentdesk status`: where data lives and how the upstream is configured.

use std::path::Path;

use anyhow::Result;
use console::style;
use serde::Serialize;

use agentdesk_infra::llm::openai_compat::config::resolve_base_url;
use agentdesk_infra::llm::openai_compat::credentials::{VarLookup, resolve_credential};
use agentdesk_infra::sqlite::pool::DATABASE_FILE;
use agentdesk_types::config::AppConfig;

/// Snapshot printed by the status command. Never holds the credential itself.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub data_dir: String,
    pub database: String,
    pub base_url: Option<String>,
    /// Set when the configured base URL is rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url_error: Option<String>,
    pub mode: String,
    /// Variable the credential was found in.
    pub credential_source: Option<String>,
    pub credential_vars: Vec<String>,
    pub models: usize,
}

impl StatusReport {
    pub fn collect(data_dir: &Path, config: &AppConfig, env: &impl VarLookup) -> Self {
        let upstream = &config.upstream;
        let (base_url, base_url_error) = match resolve_base_url(upstream, env) {
            Ok(url) => (Some(url), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            version: env!("CARGO_PKG_VERSION"),
            data_dir: data_dir.display().to_string(),
            database: data_dir.join(DATABASE_FILE).display().to_string(),
            base_url,
            base_url_error,
            mode: upstream.mode.to_string(),
            credential_source: resolve_credential(&upstream.credential_vars, env)
                .ok()
                .map(|c| c.source),
            credential_vars: upstream.credential_vars.clone(),
            models: config.models.len(),
        }
    }
}

pub fn status(report: &StatusReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("  {} agentdesk v{}", style("⚡").bold(), report.version);
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Data dir: {}", style(&report.data_dir).dim());
    println!("  Database: {}", style(&report.database).dim());
    println!();

    println!("  {}", style("── Upstream ──").dim());
    match (&report.base_url, &report.base_url_error) {
        (Some(url), _) => println!("  Base URL:   {}", style(url).cyan()),
        (None, Some(e)) => println!("  Base URL:   {}", style(e).red()),
        (None, None) => {}
    }
    println!("  Mode:       {}", report.mode);
    match &report.credential_source {
        Some(source) => println!("  Credential: {} ({source})", style("found").green()),
        None => println!(
            "  Credential: {} (checked {})",
            style("missing").yellow(),
            report.credential_vars.join(", ")
        ),
    }
    println!();

    println!("  {}", style("── Models ──").dim());
    println!("  Configured: {}", style(report.models).bold());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_report_without_credential() {
        let env: HashMap<String, String> = HashMap::new();
        let report = StatusReport::collect(&PathBuf::from("/tmp/agentdesk"), &AppConfig::default(), &env);

        assert_eq!(report.database, "/tmp/agentdesk/agentdesk.db");
        assert_eq!(report.mode, "incremental");
        assert!(report.credential_source.is_none());
        assert_eq!(
            report.base_url.as_deref(),
            Some("https://dashscope.aliyuncs.com/compatible-mode/v1")
        );
    }

    #[test]
    fn test_report_flags_invalid_base_url() {
        let env: HashMap<String, String> =
            HashMap::from([("QWEN_API_BASE".to_string(), "ftp://example.com".to_string())]);
        let report = StatusReport::collect(&PathBuf::from("/tmp/agentdesk"), &AppConfig::default(), &env);

        assert!(report.base_url.is_none());
        assert!(report.base_url_error.unwrap().contains("ftp://example.com"));
    }

    #[test]
    fn test_report_names_credential_source_only() {
        let env: HashMap<String, String> = HashMap::from([
            ("QWEN_API_KEY".to_string(), "sk-secret".to_string()),
            ("QWEN_API_BASE".to_string(), "http://localhost:9999/v1/".to_string()),
        ]);
        let report = StatusReport::collect(&PathBuf::from("/tmp/agentdesk"), &AppConfig::default(), &env);

        assert_eq!(report.credential_source.as_deref(), Some("QWEN_API_KEY"));
        assert_eq!(report.base_url.as_deref(), Some("http://localhost:9999/v1"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
