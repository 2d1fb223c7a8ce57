use anyhow::Result;
use clap::Args;
use std::io::{self, IsTerminal};

use crate::{
    output::OutputFormat,
    resolver::{ExplicitFlags, InteractionMode},
    schema::{Field, PLAYBOOK_SCHEMA},
};

#[derive(Args, Debug, Clone, Default)]
pub struct PlaybookArgs {
    /// ID of the playbook to run
    #[arg(long)]
    pub playbook_id: Option<String>,
    /// The task description for Devin
    #[arg(short, long)]
    pub prompt: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

pub async fn run(args: PlaybookArgs) -> Result<()> {
    let flags = ExplicitFlags::new()
        .maybe_text(Field::PlaybookId, args.playbook_id.as_deref())
        .maybe_text(Field::Prompt, args.prompt.as_deref());
    let mode = if io::stdin().is_terminal() {
        InteractionMode::Mixed
    } else {
        InteractionMode::FlagsOnly
    };
    super::create::submit(&PLAYBOOK_SCHEMA, &flags, mode, args.output).await
}
