pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod server;
pub mod viewer;

use cli::{ Args, Command };
use config::ApiConfig;
use log::info;
use std::error::Error;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let command = args.command.clone().unwrap_or(Command::Chat);
    if let Command::ServeMock { addr } = &command {
        info!("Starting mock scene service on: {}", addr);
        return server::serve(addr).await;
    }

    info!("--- Core Configuration ---");
    info!("API Base URL: {}", args.api_base_url);
    info!("CORS Mode: {}", args.cors_mode);
    if let Some(proxy) = &args.cors_proxy {
        info!("CORS Proxy: {}", proxy);
    }
    info!("Gallery Refresh Delay: {}ms", args.refresh_delay_ms);
    info!("-------------------------");

    let config = ApiConfig::from_args(&args)?;
    let client = api::new_client(&config);

    match command {
        Command::Chat => app::run_chat(client).await,
        Command::Generate { description } => app::generate(client, &description).await,
        Command::History { conversation_id } => app::history(client, &conversation_id).await,
        Command::Health => app::health(client).await,
        Command::Optimize { scene_path } => app::optimize(client, &scene_path).await,
        Command::Gallery { page, refresh } => {
            let delay = refresh.then(|| Duration::from_millis(args.refresh_delay_ms));
            app::gallery(client, page, delay).await
        }
        Command::ServeMock { .. } => Ok(()),
    }
}
