//! End-to-end session creation: credential, parameters, payload, submit.

use crate::client::{SessionClient, SessionCreated};
use crate::credential::CredentialStore;
use crate::error::SessionError;
use crate::request::{build, SessionRequest};
use crate::resolver::{resolve, ExplicitFlags, InteractionMode, Prompter};
use crate::schema::Schema;

/// A submitted request together with the service's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub request: SessionRequest,
    pub created: SessionCreated,
}

/// Create one session. The credential is checked before any prompt so a
/// user is never walked through the questions only to hit a missing token.
/// Nothing is sent until the request is fully built.
pub async fn launch(
    store: &dyn CredentialStore,
    prompter: &mut dyn Prompter,
    client: &SessionClient,
    schema: &Schema,
    flags: &ExplicitFlags,
    mode: InteractionMode,
) -> Result<Launched, SessionError> {
    let credential = store.require_credential()?;
    let resolved = resolve(schema, flags, mode, prompter)?;
    let request = build(&resolved)?;
    let created = client.create_session(&request, &credential).await?;
    Ok(Launched { request, created })
}
