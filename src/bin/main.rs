#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();

    if let Err(err) = wishlist::cli::commands::run().await {
        tracing::debug!(error = ?err, "wishlist command failed");
        std::process::exit(1);
    }
}
