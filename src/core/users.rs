//! Get-or-create resolution of remote users

use crate::adapters::moodle::MoodleClient;
use crate::domain::ids::UserId;
use crate::domain::{Result, UserIdentity};

/// Returns the id of the user with `identity`'s email, creating the user if needed
///
/// The lookup uses the lower-cased email. When no user matches, one remote
/// write creates the account with the lower-cased email as username.
///
/// # Errors
///
/// Any remote failure propagates unchanged, including the invariant violation
/// raised when several users share the email.
pub async fn resolve_or_create(client: &MoodleClient, identity: &UserIdentity) -> Result<UserId> {
    let email = identity.normalized_email();

    if let Some(user) = client.get_user_by_email(&email).await? {
        tracing::debug!(email = %email, user_id = %user.id, "Found existing user");
        return Ok(user.id);
    }

    let user_id = client.create_user(identity).await?;
    tracing::info!(
        email = %email,
        user_id = %user_id,
        auth = %identity.auth,
        "Created user"
    );
    Ok(user_id)
}
