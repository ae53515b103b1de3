use std::sync::Arc;

use messaging::consumer::run_consumer;
use messaging::handlers::MessageHandler;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::{
    config::app_config::AppConfig, setup::dependency_injection::DependencyContainer,
    setup::server::Server,
};

pub struct Worker;

impl Worker {
    /// Runs both consumers and the health server until a shutdown signal,
    /// then drains in-flight deliveries and closes the broker connection.
    pub async fn run(config: AppConfig, container: DependencyContainer) -> anyhow::Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let topology = container.connection.topology().clone();
        let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();

        let consumers: [(&str, Arc<dyn MessageHandler>); 2] = [
            (topology.upload_topic.as_str(), container.upload_handler.clone()),
            (topology.delete_topic.as_str(), container.delete_handler.clone()),
        ];
        for (topic, handler) in consumers {
            let consumer = container
                .connection
                .consume(topic, &format!("image-worker.{}", handler.name()))
                .await?;
            let policy = config.worker.retry.clone();
            let shutdown = shutdown_rx.clone();
            let drain_timeout = config.worker.shutdown_timeout;
            tasks.spawn(async move {
                run_consumer(consumer, handler, policy, shutdown, drain_timeout)
                    .await
                    .map_err(anyhow::Error::from)
            });
        }

        let server_config = config.server;
        let health_api = container.health_api;
        tasks.spawn(Server::run(server_config, health_api, shutdown_rx));

        tokio::select! {
            _ = shutdown_signal() => tracing::info!("Shutdown signal received"),
            Some(finished) = tasks.join_next() => {
                tracing::error!(?finished, "Worker task stopped unexpectedly");
            }
        }

        let _ = shutdown_tx.send(true);
        while let Some(finished) = tasks.join_next().await {
            match finished {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Worker task failed"),
                Err(e) => tracing::error!(error = %e, "Worker task panicked"),
            }
        }

        container.connection.close().await?;
        tracing::info!("Image worker stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
