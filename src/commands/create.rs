use anyhow::Result;
use clap::Args;
use std::io::{self, IsTerminal};

use crate::{
    client::SessionClient,
    config::load_config,
    credential::FileCredentialStore,
    output::{render_session, OutputFormat},
    prompt::TerminalPrompter,
    resolver::{ExplicitFlags, InteractionMode},
    schema::{Field, Schema, SESSION_SCHEMA},
    session::launch,
};

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// The task description for Devin
    #[arg(short, long, env = "DEVIN_PROMPT")]
    pub prompt: Option<String>,
    /// ID of a machine snapshot to use
    #[arg(long, env = "DEVIN_SNAPSHOT_ID")]
    pub snapshot_id: Option<String>,
    /// ID of a playbook to use
    #[arg(long)]
    pub playbook_id: Option<String>,
    /// Make the session unlisted
    #[arg(long)]
    pub unlisted: bool,
    /// Return the existing session when the same prompt was already submitted
    #[arg(long)]
    pub idempotent: bool,
    /// Maximum ACU limit for the session
    #[arg(long, value_name = "N", env = "DEVIN_MAX_ACU_LIMIT")]
    pub max_acu_limit: Option<String>,
    /// Comma-separated list of secret IDs to use
    #[arg(long, value_name = "IDS")]
    pub secret_ids: Option<String>,
    /// Comma-separated list of knowledge IDs to use
    #[arg(long, value_name = "IDS")]
    pub knowledge_ids: Option<String>,
    /// Comma-separated list of tags to add to the session
    #[arg(long)]
    pub tags: Option<String>,
    /// Custom title for the session
    #[arg(long)]
    pub title: Option<String>,
    /// Walk through every parameter interactively
    #[arg(short, long, conflicts_with = "non_interactive")]
    pub interactive: bool,
    /// Never prompt; fail if a required parameter is missing (for scripts)
    #[arg(long)]
    pub non_interactive: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl CreateArgs {
    pub fn to_flags(&self) -> ExplicitFlags {
        ExplicitFlags::new()
            .maybe_text(Field::Prompt, self.prompt.as_deref())
            .maybe_text(Field::SnapshotId, self.snapshot_id.as_deref())
            .maybe_text(Field::PlaybookId, self.playbook_id.as_deref())
            .switch(Field::Unlisted, self.unlisted)
            .switch(Field::Idempotent, self.idempotent)
            .maybe_text(Field::MaxAcuLimit, self.max_acu_limit.as_deref())
            .maybe_text(Field::SecretIds, self.secret_ids.as_deref())
            .maybe_text(Field::KnowledgeIds, self.knowledge_ids.as_deref())
            .maybe_text(Field::Tags, self.tags.as_deref())
            .maybe_text(Field::Title, self.title.as_deref())
    }

    /// `--non-interactive` and a non-terminal stdin both mean flags only;
    /// otherwise a bare invocation gets the full walkthrough.
    pub fn interaction_mode(&self, stdin_is_terminal: bool) -> InteractionMode {
        if self.non_interactive {
            InteractionMode::FlagsOnly
        } else if self.interactive {
            InteractionMode::Interactive
        } else if !stdin_is_terminal {
            InteractionMode::FlagsOnly
        } else if self.to_flags().is_empty() {
            InteractionMode::Interactive
        } else {
            InteractionMode::Mixed
        }
    }
}

pub async fn run(args: CreateArgs) -> Result<()> {
    let mode = args.interaction_mode(io::stdin().is_terminal());
    submit(&SESSION_SCHEMA, &args.to_flags(), mode, args.output).await
}

/// Load config and the saved token, run the session flow and print the result.
pub(crate) async fn submit(
    schema: &Schema,
    flags: &ExplicitFlags,
    mode: InteractionMode,
    output: OutputFormat,
) -> Result<()> {
    let config = load_config()?;
    let store = FileCredentialStore::from_default_location();
    let client = SessionClient::new(&config.api)?;
    let mut prompter = TerminalPrompter;

    tracing::debug!(schema = schema.name, ?mode, "resolving parameters");
    let launched = launch(&store, &mut prompter, &client, schema, flags, mode).await?;

    let mut extra = Vec::new();
    if let Some(playbook) = launched.request.playbook_id.as_deref() {
        extra.push(("Playbook", playbook));
    }
    println!("{}", render_session(&launched.created, output, &extra)?);
    Ok(())
}
