//! MongoDB connection management
//!
//! [`connect`] builds a pooled client from [`MongoConfig`], pings the server and
//! retries with exponential backoff. The `*_repository` helpers bind the model
//! types to their configured collections.

use std::time::Duration;

use mongodb::{bson::doc, options::ClientOptions, Client, Database};

use crate::config::{CollectionsConfig, MongoConfig};
use crate::error::{sanitize_url, Error, Result, StorageError, StorageOperation};
use crate::models::{Recipe, Role, User};
use crate::repository::{DocumentRepository, MongoCollection};

/// Repository over the recipes collection
pub type RecipeRepository = DocumentRepository<Recipe, MongoCollection<Recipe>>;
/// Repository over the users collection
pub type UserRepository = DocumentRepository<User, MongoCollection<User>>;
/// Repository over the roles collection
pub type RoleRepository = DocumentRepository<Role, MongoCollection<Role>>;

/// Connect to the configured database, retrying up to `max_retries` times
pub async fn connect(config: &MongoConfig) -> Result<Database> {
    let mut attempt = 0;
    let base_delay = config.retry_delay();

    loop {
        match try_connect(config).await {
            Ok(database) => {
                if attempt > 0 {
                    tracing::info!(
                        "MongoDB connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "MongoDB connected: url={}, database={}",
                        sanitize_url(&config.url),
                        config.database
                    );
                }
                return Ok(database);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    tracing::error!(
                        "Failed to connect to MongoDB after {} attempts: {}",
                        config.max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = backoff(base_delay, attempt);
                tracing::warn!(
                    "MongoDB connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based)
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}

async fn try_connect(config: &MongoConfig) -> Result<Database> {
    let url_safe = sanitize_url(&config.url);
    tracing::debug!("Connecting to MongoDB: {}", url_safe);

    let connect_fault = |e: mongodb::error::Error| -> Error {
        StorageError::from(e)
            .with_operation(StorageOperation::Connect)
            .add_context(url_safe.clone())
            .into()
    };

    let mut options = ClientOptions::parse(&config.url).await.map_err(connect_fault)?;
    options.app_name = config.app_name.clone();
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout());

    let client = Client::with_options(options).map_err(connect_fault)?;
    let database = client.database(&config.database);
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(connect_fault)?;

    Ok(database)
}

pub fn recipe_repository(database: &Database, collections: &CollectionsConfig) -> RecipeRepository {
    DocumentRepository::new(MongoCollection::new(database, &collections.recipes))
}

pub fn user_repository(database: &Database, collections: &CollectionsConfig) -> UserRepository {
    DocumentRepository::new(MongoCollection::new(database, &collections.users))
}

pub fn role_repository(database: &Database, collections: &CollectionsConfig) -> RoleRepository {
    DocumentRepository::new(MongoCollection::new(database, &collections.roles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff(base, 1), Duration::from_secs(2));
        assert_eq!(backoff(base, 2), Duration::from_secs(4));
        assert_eq!(backoff(base, 3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let config = MongoConfig {
            url: "not-a-mongodb-url".to_string(),
            database: "recipes".to_string(),
            app_name: None,
            max_pool_size: 1,
            min_pool_size: 0,
            connect_timeout_secs: 1,
            max_retries: 0,
            retry_delay_secs: 0,
        };

        let result = connect(&config).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
