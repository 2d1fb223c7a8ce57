use anyhow::Result;
use clap::Subcommand;

pub mod auth;
pub mod completions;
pub mod create;
pub mod playbook;

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Create a new Devin session (the default when no command is given)")]
    Create(create::CreateArgs),
    #[command(about = "Create a session from a playbook (prompts for playbook id and task)")]
    Playbook(playbook::PlaybookArgs),
    #[command(about = "Manage the saved API token (setup, --status, --remove)")]
    Auth(auth::AuthArgs),
    #[command(about = "Emit shell completion scripts (bash/zsh/fish/powershell/elvish)")]
    Completions { shell: clap_complete::Shell },
}

/// Dispatch a subcommand; with none, the top-level create flags apply.
pub async fn run(cmd: Option<Commands>, default_create: create::CreateArgs) -> Result<()> {
    match cmd {
        None => create::run(default_create).await,
        Some(Commands::Create(args)) => create::run(args).await,
        Some(Commands::Playbook(args)) => playbook::run(args).await,
        Some(Commands::Auth(args)) => auth::run(args).await,
        Some(Commands::Completions { shell }) => completions::run(shell),
    }
}
