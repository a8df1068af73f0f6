// Auth Commands
// Login, logout and session status

use super::{CommandResult, Context, Output};
use crate::models::Authorization;
use serde_json::json;

/// Log in with Basic credentials, or exchange them for a JWT when `jwt` is set
pub async fn login(ctx: &Context, username: &str, password: &str, jwt: bool) -> CommandResult {
    if jwt {
        ctx.client.login_jwt(username, password).await?;
    } else {
        ctx.client.login(username, password).await?;
    }

    let method = if jwt { "token" } else { "basic auth" };
    Ok(Output::Text(format!(
        "Logged in to {} as {username} ({method})",
        ctx.client.base_url()
    )))
}

pub fn logout(ctx: &Context) -> CommandResult {
    ctx.client.logout()?;
    Ok(Output::Text("Logged out".to_string()))
}

/// Which credentials are stored and whether the Core accepts them
pub async fn status(ctx: &Context) -> CommandResult {
    let credentials = ctx.client.session().credentials()?;
    let method = match credentials.authorization() {
        Some(Authorization::Bearer(_)) => "bearer",
        Some(Authorization::Basic { .. }) => "basic",
        None => "none",
    };

    let valid = if method == "none" {
        false
    } else {
        ctx.client.validate_token().await
    };

    Ok(Output::Json(json!({
        "baseUrl": ctx.client.base_url(),
        "username": credentials.auth_username,
        "authMethod": method,
        "valid": valid,
    })))
}
