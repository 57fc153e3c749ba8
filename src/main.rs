use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use tracing::info;

use speech_classifier::classifier::{Classifier, LinearTextModel};
use speech_classifier::config::Config;
use speech_classifier::routes;
use speech_classifier::service::PredictionService;
use speech_classifier::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init_tracing(config.log_format);
    config.validate()?;

    let model = LinearTextModel::load(&config.model_path).with_context(|| {
        format!(
            "could not load classifier from {}",
            config.model_path.display()
        )
    })?;
    info!(
        labels = ?model.labels(),
        features = model.feature_count(),
        "Classifier loaded"
    );

    let service = web::Data::new(PredictionService::new(Arc::new(model)));
    let max_body_bytes = config.max_body_bytes;

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(routes::configure(max_body_bytes))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Server running at http://{}", config.bind_addr);

    server
        .bind(config.bind_addr.as_str())
        .with_context(|| format!("failed to bind {}", config.bind_addr))?
        .run()
        .await?;

    Ok(())
}
