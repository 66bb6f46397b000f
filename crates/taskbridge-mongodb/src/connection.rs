//! Per-task MongoDB connections
//!
//! Every task opens its own client, runs one operation and shuts the client
//! down again. Nothing is pooled across tasks.

use bson::{doc, Document as BsonDocument};
use mongodb::{options::ClientOptions, Client, Collection, Database};
use std::future::Future;
use taskbridge_common::config::FALLBACK_DATABASE;
use taskbridge_common::{BridgeConfig, BridgeError, Result};

use crate::validation::ValidatedCollectionName;

/// A single-use MongoDB connection
pub struct Connection {
    client: Client,
    database: Database,
}

impl Connection {
    /// Open a connection and verify the server answers a ping.
    ///
    /// The client is shut down before returning if the ping fails.
    pub async fn open(config: &BridgeConfig) -> Result<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_url)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        // One operation per client, so a single pooled connection is enough
        client_options.min_pool_size = Some(0);
        client_options.max_pool_size = Some(1);
        client_options.connect_timeout = Some(config.connect_timeout);
        client_options.server_selection_timeout = Some(config.server_selection_timeout);
        client_options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(client_options)
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let database = match &config.database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
        };

        let connection = Self { client, database };
        if let Err(e) = connection.ping().await {
            connection.close().await;
            return Err(e);
        }

        tracing::debug!("Connected to database '{}'", connection.database_name());
        Ok(connection)
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Get a collection by name
    pub fn collection(&self, name: &ValidatedCollectionName) -> Collection<BsonDocument> {
        self.database.collection(name.as_str())
    }

    /// Check that the server is reachable
    pub async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| BridgeError::Connection(format!("Ping failed: {}", e)))
    }

    /// Shut the client down, releasing its sockets and monitors
    pub async fn close(self) {
        let database_name = self.database.name().to_string();
        self.client.shutdown().await;
        tracing::debug!("Closed connection to database '{}'", database_name);
    }
}

/// Run `op` against one collection on a fresh connection.
///
/// The connection is closed whether `op` succeeds or fails.
pub async fn with_collection<T, F, Fut>(
    config: &BridgeConfig,
    name: &ValidatedCollectionName,
    op: F,
) -> Result<T>
where
    F: FnOnce(Collection<BsonDocument>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let connection = Connection::open(config).await?;
    let result = op(connection.collection(name)).await;
    connection.close().await;
    result
}

/// Open a connection, ping it and report the database name
pub async fn check_health(config: &BridgeConfig) -> Result<String> {
    let connection = Connection::open(config).await?;
    let name = connection.database_name().to_string();
    connection.close().await;
    Ok(name)
}
