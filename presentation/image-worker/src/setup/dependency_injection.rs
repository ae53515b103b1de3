use std::sync::Arc;

use logger::TracingLogger;
use persistence::image::repository::ImageRepositoryPostgres;

use imagekit::asset_store::ImageKitAssetStore;

use messaging::connection::AmqpConnection;
use messaging::handlers::{DeleteImageHandler, MessageHandler, UploadImageHandler};
use messaging::publisher::RabbitMQImagePublisher;

use business::application::image::delete::DeleteImageUseCaseImpl;
use business::application::image::upload::UploadImageUseCaseImpl;
use business::domain::image::progress::InMemoryProgressTracker;

use crate::api::health::routes::Api as HealthApi;
use crate::config::app_config::AppConfig;

pub struct DependencyContainer {
    pub health_api: HealthApi,
    pub connection: AmqpConnection,
    pub upload_handler: Arc<dyn MessageHandler>,
    pub delete_handler: Arc<dyn MessageHandler>,
}

impl DependencyContainer {
    pub async fn new(config: &AppConfig, pool: sqlx::PgPool) -> anyhow::Result<Self> {
        let logger = Arc::new(TracingLogger);
        // Batch progress lives in this process only; run a single worker instance.
        let progress = Arc::new(InMemoryProgressTracker::new());
        let health_api = HealthApi::new(progress.clone());

        // Infrastructure adapters
        let image_repository = Arc::new(ImageRepositoryPostgres::new(pool));
        let asset_store = Arc::new(ImageKitAssetStore::new(
            config
                .imagekit
                .client()
                .with_timeout(config.worker.timeouts.asset_store),
        ));

        let connection =
            AmqpConnection::connect(&config.rabbitmq.url, config.rabbitmq.topology.clone()).await?;
        let topology = connection.topology();
        let publisher = Arc::new(RabbitMQImagePublisher::new(
            connection.publisher_channel().await?,
            topology.exchange.as_str(),
            topology.uploaded_topic.as_str(),
        ));

        // Image use cases
        let upload_use_case = Arc::new(UploadImageUseCaseImpl {
            repository: image_repository,
            asset_store: asset_store.clone(),
            publisher,
            progress,
            timeouts: config.worker.timeouts,
            logger: logger.clone(),
        });
        let delete_use_case = Arc::new(DeleteImageUseCaseImpl {
            asset_store,
            timeouts: config.worker.timeouts,
            logger,
        });

        Ok(Self {
            health_api,
            connection,
            upload_handler: Arc::new(UploadImageHandler {
                use_case: upload_use_case,
            }),
            delete_handler: Arc::new(DeleteImageHandler {
                use_case: delete_use_case,
            }),
        })
    }
}
