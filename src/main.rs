mod app;
mod completion;
mod config;
mod controller;
mod event;
mod markdown;
mod session;
mod theme;

use app::ChatApp;
use clap::Parser;
use completion::{CompletionService, GroqClient, LoggingService};
use config::{Cli, Config, API_KEY_VARS};
use eframe::egui;
use std::sync::{mpsc, Arc};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "groqchat=info".into()),
        )
        .init();

    let config = Config::from_cli(Cli::parse());
    if config.api_key.is_none() {
        tracing::warn!(
            vars = ?API_KEY_VARS,
            "no API key configured; every request will fail until one is set"
        );
    }
    tracing::info!(
        mode = %config.mode,
        model = %config.settings.model,
        base_url = %config.base_url,
        "starting chat window"
    );

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("groqchat-runtime")
        .build()?;

    let client = GroqClient::with_base_url(config.api_key.clone(), &config.base_url);
    let service: Arc<dyn CompletionService> = Arc::new(LoggingService::new(Arc::new(client)));

    let app = ChatApp::new(rx, tx, service, runtime.handle().clone(), &config);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(ChatApp::window_title(config.mode))
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        ChatApp::window_title(config.mode),
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
