use twilio_sales_relay::completion::OpenAICompleter;
use twilio_sales_relay::config::Config;
use twilio_sales_relay::error::handle_error;
use twilio_sales_relay::store::PgStore;
use twilio_sales_relay::token::TokenIssuer;
use twilio_sales_relay::types::AppState;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_targets([
                    ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
                    (
                        "twilio_sales_relay",
                        tracing_subscriber::filter::LevelFilter::DEBUG,
                    ),
                ])
                .with_default(tracing_subscriber::filter::LevelFilter::INFO),
        );
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&e);
            process::exit(1);
        }
    };
    let store = match PgStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            handle_error(&e);
            process::exit(1);
        }
    };

    let http_client = reqwest::Client::new();
    let token_issuer = TokenIssuer::new(&config.twilio);
    info!(identity=%token_issuer.identity(), "token issuer ready");
    let app_state = Arc::new(AppState {
        token_issuer,
        caller_id: config.twilio.phone_number.clone(),
        store: Arc::new(store),
        completer: Arc::new(OpenAICompleter::new(http_client, &config.openai)),
    });

    let app = twilio_sales_relay::app(app_state, &config.frontend_origin);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "listening");
    if let Err(e) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        handle_error(&e);
        process::exit(1);
    }
}
