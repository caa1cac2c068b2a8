//! Spark demo plugin binary.

use serde_json::json;
use spark_core::{Descriptor, Facade};
use spark_server::{Spark, SparkConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SparkConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let descriptor = match &config.descriptor {
        Some(path) => Descriptor::from_file(path)?,
        None => Descriptor::new("spark-demo")
            .with_facade(Facade::new("message").with_events(["ping"])),
    };

    let mut spark = Spark::with_config(descriptor, config);
    spark.message("ping", |event, ctx| async move {
        tracing::info!(request_id = %ctx.request_id(), "Received ping");
        Ok(json!({ "pong": true, "echo": event.field("text") }))
    });

    spark.start().await?;
    Ok(())
}
