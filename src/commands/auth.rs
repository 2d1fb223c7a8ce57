use anyhow::Result;
use clap::Args;
use std::io;

use crate::{
    client::SessionClient,
    config::load_config,
    constants::MIN_TOKEN_LEN,
    credential::{
        Credential, CredentialSource, CredentialStore, CredentialValidity, FileCredentialStore,
    },
    error::SessionError,
    prompt::{confirm, read_secret},
};

#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Show which token is in use and whether the service accepts it
    #[arg(long, conflicts_with = "remove")]
    pub status: bool,
    /// Remove the saved token (the environment variable is left alone)
    #[arg(long)]
    pub remove: bool,
}

pub async fn run(args: AuthArgs) -> Result<()> {
    let store = FileCredentialStore::from_default_location();
    if args.status {
        status(&store).await
    } else if args.remove {
        remove(&store)
    } else {
        setup(&store).await
    }
}

async fn status(store: &dyn CredentialStore) -> Result<()> {
    let Some(stored) = store.lookup() else {
        println!("❌ No authentication token found");
        println!("\nRun 'devin auth' to set up authentication");
        return Ok(());
    };

    let masked = stored.credential.masked();
    match &stored.source {
        CredentialSource::Environment(key) => {
            println!("✅ Using token from environment variable {key}: {masked}")
        }
        CredentialSource::File(path) => {
            println!("✅ Using saved token: {masked}");
            println!("   Location: {}", path.display());
        }
        CredentialSource::Memory => println!("✅ Using token: {masked}"),
    }

    let config = load_config()?;
    let client = SessionClient::new(&config.api)?;
    println!("\n🧪 Testing token...");
    match client.validate_credential(&stored.credential).await {
        CredentialValidity::Valid => println!("✅ Token is valid!"),
        CredentialValidity::Invalid(msg) => {
            println!("❌ Token appears to be invalid or expired ({msg})")
        }
        CredentialValidity::Unreachable(msg) => {
            println!("⚠️  Could not reach the Devin API, token not checked ({msg})")
        }
    }
    Ok(())
}

fn remove(store: &dyn CredentialStore) -> Result<()> {
    if store.remove_credential()? {
        println!("✅ Saved token removed");
    } else {
        println!("ℹ️  No saved token to remove");
    }
    Ok(())
}

async fn setup(store: &dyn CredentialStore) -> Result<()> {
    println!("🔑 Devin CLI Authentication Setup");
    println!("{}", "=".repeat(40));
    println!("\n1. Go to https://app.devin.ai");
    println!("2. Navigate to your API settings");
    println!("3. Generate or copy your API token");
    println!("4. Paste it below (input will be hidden)\n");

    let secret = read_secret("Paste your Devin API token")?;
    let config = load_config()?;
    let client = SessionClient::new(&config.api)?;
    save_token(store, &client, &secret, || confirm("Save anyway?", false)).await?;

    println!("\n🎉 Authentication setup complete!");
    println!("You can now use: devin --prompt 'your task here'");
    Ok(())
}

/// Check `secret` against the service and save it.
///
/// A rejected token is only saved if `save_anyway` agrees; an unreachable
/// service never blocks saving.
pub async fn save_token(
    store: &dyn CredentialStore,
    client: &SessionClient,
    secret: &str,
    save_anyway: impl FnOnce() -> io::Result<bool>,
) -> Result<Credential, SessionError> {
    let credential = Credential::new(secret)?;
    if credential.expose().chars().count() < MIN_TOKEN_LEN {
        return Err(SessionError::Validation(
            "token seems too short, please check and try again".into(),
        ));
    }

    println!("\n🧪 Testing token...");
    match client.validate_credential(&credential).await {
        CredentialValidity::Valid => println!("✅ Token is valid!"),
        CredentialValidity::Invalid(msg) => {
            println!("❌ Token appears to be invalid ({msg})");
            if !save_anyway()? {
                return Err(SessionError::InvalidCredential(msg));
            }
        }
        CredentialValidity::Unreachable(msg) => {
            tracing::warn!(reason = %msg, "token saved without validation");
            println!("⚠️  Could not reach the Devin API ({msg}); saving without validation");
        }
    }

    store.set_credential(&credential)?;
    println!("✅ Token saved securely to {}", store.location());
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::credential::MemoryCredentialStore;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::net::TcpListener;

    fn client(api_url: String) -> SessionClient {
        SessionClient::new(&ApiConfig {
            api_url,
            request_timeout_secs: 5,
            validate_timeout_secs: 5,
            connect_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn rejected_token_declined_is_not_saved() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/sessions");
                then.status(401).json_body(json!({"detail": "Invalid API key"}));
            })
            .await;
        let store = MemoryCredentialStore::new();
        let asked = Cell::new(false);

        let err = save_token(&store, &client(server.url("/v1")), "sk-rejected-token", || {
            asked.set(true);
            Ok(false)
        })
        .await
        .unwrap_err();

        mock.assert_async().await;
        assert!(asked.get());
        assert!(matches!(err, SessionError::InvalidCredential(ref m) if m == "Invalid API key"));
        assert!(store.lookup().is_none());
    }

    #[tokio::test]
    async fn rejected_token_can_be_saved_anyway() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/sessions");
                then.status(403);
            })
            .await;
        let store = MemoryCredentialStore::new();

        save_token(&store, &client(server.url("/v1")), "sk-forced-token-1", || Ok(true))
            .await
            .unwrap();

        assert_eq!(
            store.get_credential().unwrap().expose(),
            "sk-forced-token-1"
        );
    }

    #[tokio::test]
    async fn unreachable_service_still_saves_without_asking() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let store = MemoryCredentialStore::new();

        save_token(
            &store,
            &client(format!("http://127.0.0.1:{port}/v1")),
            "sk-offline-token-1",
            || panic!("must not ask when the service is unreachable"),
        )
        .await
        .unwrap();

        assert_eq!(
            store.get_credential().unwrap().expose(),
            "sk-offline-token-1"
        );
    }

    #[tokio::test]
    async fn short_token_is_rejected_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;
        let store = MemoryCredentialStore::new();

        let err = save_token(&store, &client(server.url("/v1")), "  short  ", || Ok(true))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        mock.assert_hits_async(0).await;
        assert!(store.lookup().is_none());
    }
}
