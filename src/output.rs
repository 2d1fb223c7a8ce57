use anyhow::Result;
use clap::ValueEnum;

use crate::client::SessionCreated;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Render a created session. `extra` rows are appended to the table form.
pub fn render_session(
    created: &SessionCreated,
    format: OutputFormat,
    extra: &[(&str, &str)],
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(created)?),
        OutputFormat::Table => {
            let headline = if created.reused() {
                "♻️  Existing session returned (idempotent request)"
            } else {
                "✅ Session created successfully!"
            };
            let mut out = format!(
                "{headline}\nSession ID: {}\nURL: {}\n",
                created.session_id, created.url
            );
            for (label, value) in extra {
                out.push_str(&format!("{label}: {value}\n"));
            }
            out.push_str(&format!("New Session: {}", created.is_new_session));
            Ok(out)
        }
    }
}
