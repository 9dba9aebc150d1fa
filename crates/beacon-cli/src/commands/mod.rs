mod discover;
mod health;
mod login;
mod probe;

use std::sync::Arc;

use beacon_core::{
    BackendClient, ClientConfig, EndpointDiscovery, HealthProbe, JsonFileStore, ReqwestHttpClient,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Probe => probe::run(&config).await,
        Command::Discover => discover::run(&config).await,
        Command::Health => health::run(&config, cli).await,
        Command::Login(args) => login::run(&config, cli, args).await,
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(ClientConfig::default()),
    }
}

fn discovery_for(config: &ClientConfig) -> Result<EndpointDiscovery, CliError> {
    let registry = Arc::new(config.registry()?);
    let probe = HealthProbe::new(Arc::new(ReqwestHttpClient::new()), config.probe_timeout());
    Ok(EndpointDiscovery::new(registry, probe))
}

fn client_for(config: &ClientConfig, cli: &Cli) -> Result<BackendClient, CliError> {
    let client = BackendClient::new(
        config,
        Arc::new(ReqwestHttpClient::new()),
        Arc::new(JsonFileStore::new(&cli.state)),
    )?;
    Ok(client)
}
