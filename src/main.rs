use actix_request_identifier::{IdReuse, RequestIdentifier};
use actix_web::web::Data;
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::config::Config;
use crate::database::connect::open_repository;
use crate::routes::AppContext;

mod config;
mod courses;
mod database;
mod error;
mod ledger;
mod money;
mod orders;
mod pricing;
mod proto;
mod records;
mod reports;
mod responses;
mod routes;
mod schema;
mod session;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load();

    // setup tracing and use bunyan formatter
    let level = config.log_level;
    let formatting_layer = BunyanFormattingLayer::new("campus-hub".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(filter_fn(move |metadata| *metadata.level() <= level))
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber).context("failed to install tracing subscriber")?;

    let repository = open_repository(&config)?;
    let bind_address = config.bind_address.clone();
    let context = Data::new(AppContext::new(repository, config));
    let admins = context
        .provision_admins()
        .context("failed to provision admin accounts")?;
    info!(admins, "admin accounts ready");

    info!("listening on {bind_address}");
    let server = actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .wrap(RequestIdentifier::with_uuid().use_incoming_id(IdReuse::UseIncoming))
            .wrap(TracingLogger::default())
            .app_data(context.clone())
            .configure(routes::configure)
    });

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {bind_address}"))?
        .run()
        .await?;
    Ok(())
}
