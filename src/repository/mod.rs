pub mod milestone_repo;
pub mod package_repo;
pub mod project_repo;
pub mod repository_error;
pub mod request_repo;
pub mod template_repo;

use crate::config::mongo_conf::MongoConfig;

/// Open a database handle using the shared connection settings. Each
/// repository holds its own collection handle off this database.
pub async fn connect(config: &MongoConfig) -> Result<mongodb::Database, mongodb::error::Error> {
    use mongodb::{
        options::{ClientOptions, Credential, ResolverConfig},
        Client,
    };

    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("ProjectHubBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout =
        Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    Ok(client.database(&config.database))
}
