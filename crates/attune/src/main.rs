use attune::{Server, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("ATTUNE_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3001".to_string());

    let server = Server::builder().bind(&addr).build().await?;
    server.run().await
}
