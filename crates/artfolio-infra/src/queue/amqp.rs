use super::{EventPublisher, PublishError};
use artfolio_core::AmqpSettings;
use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::uri::{AMQPAuthority, AMQPQueryString, AMQPScheme, AMQPUri, AMQPUserInfo};
use lapin::{BasicProperties, Connection, ConnectionProperties};

const REPLY_SUCCESS: u16 = 200;

/// AMQP publisher using a connection per publish.
///
/// Each `publish` opens a connection and channel, declares the queue, publishes
/// to the default exchange with the queue name as routing key, waits for the
/// broker confirm and closes the connection. The connection is closed on every
/// exit path, including failures and timeouts of the publish itself, and the
/// close is bounded by the same timeout.
#[derive(Clone)]
pub struct AmqpPublisher {
    settings: AmqpSettings,
}

impl AmqpPublisher {
    pub fn new(settings: AmqpSettings) -> Self {
        Self { settings }
    }

    async fn connect(&self) -> Result<Connection, PublishError> {
        let uri = amqp_uri(&self.settings);
        match tokio::time::timeout(
            self.settings.timeout,
            Connection::connect_uri(uri, ConnectionProperties::default()),
        )
        .await
        {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) => Err(PublishError::Connection(e.to_string())),
            Err(_) => Err(PublishError::Timeout(self.settings.timeout)),
        }
    }

    /// Close with the same bound as the publish; a broker that stops answering
    /// must not hold the request open.
    async fn close(&self, connection: &Connection) {
        match tokio::time::timeout(self.settings.timeout, connection.close(REPLY_SUCCESS, "OK")).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, queue = %self.settings.queue, "Failed to close broker connection")
            }
            Err(_) => tracing::warn!(
                queue = %self.settings.queue,
                timeout_ms = self.settings.timeout.as_millis() as u64,
                "Timed out closing broker connection"
            ),
        }
    }

    async fn publish_on(&self, connection: &Connection, payload: &[u8]) -> Result<(), PublishError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublishError::Channel(e.to_string()))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| PublishError::Channel(e.to_string()))?;

        channel
            .queue_declare(
                &self.settings.queue,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::Declare(e.to_string()))?;

        let confirmation = channel
            .basic_publish(
                "",
                &self.settings.queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        if confirmation.is_nack() {
            return Err(PublishError::Rejected);
        }

        Ok(())
    }
}

/// Connection URI for the configured broker
pub fn amqp_uri(settings: &AmqpSettings) -> AMQPUri {
    AMQPUri {
        scheme: if settings.use_tls {
            AMQPScheme::AMQPS
        } else {
            AMQPScheme::AMQP
        },
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: settings.username.clone(),
                password: settings.password.clone(),
            },
            host: settings.host.clone(),
            port: settings.port,
        },
        vhost: settings.virtual_host.clone(),
        query: AMQPQueryString::default(),
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, payload: &[u8]) -> Result<(), PublishError> {
        let start = std::time::Instant::now();
        let connection = self.connect().await.inspect_err(|e| {
            tracing::error!(
                error = %e,
                host = %self.settings.host,
                port = self.settings.port,
                queue = %self.settings.queue,
                "Failed to connect to message broker"
            );
        })?;

        let result = match tokio::time::timeout(
            self.settings.timeout,
            self.publish_on(&connection, payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout(self.settings.timeout)),
        };

        self.close(&connection).await;

        match &result {
            Ok(()) => tracing::info!(
                queue = %self.settings.queue,
                size_bytes = payload.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Event published"
            ),
            Err(e) => tracing::error!(
                error = %e,
                queue = %self.settings.queue,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Event publish failed"
            ),
        }

        result
    }

    fn destination(&self) -> &str {
        &self.settings.queue
    }
}
