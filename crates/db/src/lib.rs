//! MongoDB client factory for the bookshelf service.
//!
//! [`connect`] parses the connection string, wires a [`ConnectionMonitor`] into the driver's
//! server discovery events and issues a background `ping` so the logs report whether the
//! database is reachable. The driver reconnects on its own; nothing here retries.

pub mod monitor;

use anyhow::Context;
use bson::doc;
use mongodb::{
    event::{sdam::SdamEvent, EventHandler},
    options::ClientOptions,
    Client, Database,
};

use bookshelf_kernel::settings::DatabaseSettings;

pub use monitor::{ConnectionMonitor, ConnectionState};

const APP_NAME: &str = "bookshelf";

/// An open client bound to the configured database.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database: Database,
    monitor: ConnectionMonitor,
}

impl Connection {
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;

        Ok(())
    }

    /// Shut the client down, waiting for in-flight operations to finish.
    pub async fn close(self) {
        tracing::info!(target: "bookshelf-db", "closing MongoDB client");
        self.client.shutdown().await;
        self.monitor.record(ConnectionState::Disconnected);
    }
}

/// Build a client for `settings.uri` and start an initial round-trip in the background.
///
/// Returns without waiting for the server. A failed initial ping is logged and does not abort
/// startup; requests issued while the server is unreachable fail individually.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Connection> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .context("invalid MongoDB connection string")?;

    if options.app_name.is_none() {
        options.app_name = Some(APP_NAME.to_string());
    }

    let monitor = ConnectionMonitor::new();
    let handler = monitor.clone();
    options.sdam_event_handler = Some(EventHandler::callback(move |event: SdamEvent| {
        handler.observe(event)
    }));

    let client = Client::with_options(options).context("failed to create MongoDB client")?;
    let database = client.database(&settings.name);

    tracing::info!(
        target: "bookshelf-db",
        database = %settings.name,
        "attempting to connect to MongoDB"
    );

    let connection = Connection {
        client,
        database,
        monitor,
    };

    let pinger = connection.clone();
    tokio::spawn(async move {
        let result = pinger.ping().await;
        record_initial_ping(&pinger.monitor, &result);
    });

    Ok(connection)
}

fn record_initial_ping(monitor: &ConnectionMonitor, result: &anyhow::Result<()>) {
    match result {
        Ok(()) => {
            monitor.record(ConnectionState::Connected);
        }
        Err(err) => {
            tracing::error!(
                target: "bookshelf-db",
                error = %format!("{err:#}"),
                "initial MongoDB connection error"
            );
            monitor.record(ConnectionState::Errored);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn rejects_malformed_connection_string() {
        let settings = DatabaseSettings {
            uri: "not-a-mongodb-uri".to_string(),
            name: "bookshelf".to_string(),
        };

        let err = connect(&settings).await.unwrap_err();
        assert!(err.to_string().contains("connection string"));
    }

    #[tokio::test]
    async fn connect_returns_before_the_server_answers() {
        let settings = DatabaseSettings {
            uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=60000".to_string(),
            name: "bookshelf".to_string(),
        };

        let connection = tokio::time::timeout(Duration::from_secs(5), connect(&settings))
            .await
            .expect("connect waited on the server")
            .unwrap();
        assert_eq!(connection.database().name(), "bookshelf");
    }

    #[test]
    fn initial_ping_result_sets_connection_state() {
        let monitor = ConnectionMonitor::new();
        record_initial_ping(&monitor, &Ok(()));
        assert_eq!(monitor.state(), ConnectionState::Connected);

        let monitor = ConnectionMonitor::new();
        record_initial_ping(&monitor, &Err(anyhow::anyhow!("server selection timeout")));
        assert_eq!(monitor.state(), ConnectionState::Errored);
    }
}
