use poem::{EndpointExt, Route, Server as PoemServer, listener::TcpListener, middleware::Tracing};
use poem_openapi::OpenApiService;
use tokio::sync::watch;

use crate::{api::health::routes::Api as HealthApi, config::server_config::ServerConfig};

pub struct Server;

impl Server {
    /// Serves the health API until `shutdown` flips to true.
    pub async fn run(
        config: ServerConfig,
        health_api: HealthApi,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let addr = config.bind_address();
        let api_service = OpenApiService::new(health_api, "Product Image Worker", "0.1.0")
            .server(format!("http://{}", addr));
        let ui = api_service.swagger_ui();
        let spec = api_service.spec_endpoint();
        let app = Route::new()
            .nest("/", api_service)
            .nest("/docs", ui)
            .nest("/openapi.json", spec)
            .with(Tracing);

        tracing::info!(%addr, "Health server listening");
        PoemServer::new(TcpListener::bind(&addr))
            .run_with_graceful_shutdown(
                app,
                async move {
                    let _ = shutdown.wait_for(|stop| *stop).await;
                },
                None,
            )
            .await?;
        Ok(())
    }
}
