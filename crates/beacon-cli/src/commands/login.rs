use beacon_core::ClientConfig;

use crate::cli::{Cli, LoginArgs};
use crate::error::CliError;

/// Log in through the resilient dispatch path and report the session.
pub async fn run(config: &ClientConfig, cli: &Cli, args: &LoginArgs) -> Result<(), CliError> {
    let client = super::client_for(config, cli)?;
    let session = client.login(&args.email, &args.password).await?;

    println!("signed in as {} ({})", session.user.full_name, session.user.email);
    let preview = session.access_token.get(..20).unwrap_or(&session.access_token);
    println!("token: {preview}...");
    Ok(())
}
