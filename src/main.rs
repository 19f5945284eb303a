use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use std::sync::Arc;
use tracing::{error, info};

mod backend;
mod bot;
mod cache;
mod config;
mod error;
mod lookup;
mod media;
mod scheduler;
mod ui;

use crate::backend::{RadarrClient, SonarrClient};
use crate::bot::{ArrBot, ChannelNotifier};
use crate::config::Config;
use crate::lookup::MediaService;
use crate::media::{Movie, Show};
use crate::scheduler::{Backend, RefreshScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arr_bot=debug".parse()?)
                .add_directive("serenity=info".parse()?),
        )
        .init();

    info!("🎬 Iniciando Arr Bot v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;
    info!("{}", config.summary());

    // Servicios por backend
    let mut backends: Vec<Arc<dyn Backend>> = Vec::new();

    let movies = match &config.radarr {
        Some(settings) => {
            let client = RadarrClient::new(settings, config.request_timeout)?;
            let service: Arc<MediaService<Movie>> = Arc::new(MediaService::new(
                Arc::new(client),
                settings.clone(),
                config.max_results,
            ));
            backends.push(service.clone());
            info!("🎞️ Radarr habilitado en {}", settings.url);
            Some(service)
        }
        None => None,
    };

    let shows = match &config.sonarr {
        Some(settings) => {
            let client = SonarrClient::new(settings, config.request_timeout)?;
            let service: Arc<MediaService<Show>> = Arc::new(MediaService::new(
                Arc::new(client),
                settings.clone(),
                config.max_results,
            ));
            backends.push(service.clone());
            info!("📺 Sonarr habilitado en {}", settings.url);
            Some(service)
        }
        None => None,
    };

    // Carga inicial del caché y recarga periódica
    let scheduler = Arc::new(RefreshScheduler::from_config(&config));
    scheduler.start_cache_refresh(backends.clone()).await;

    // Solo comandos slash
    let intents = GatewayIntents::GUILDS;

    let handler = ArrBot::new(config.clone(), movies, shows);
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;

    // Notificaciones periódicas en los canales configurados
    let notifier = Arc::new(ChannelNotifier::new(
        client.http.clone(),
        &config.notification_channels,
    ));
    scheduler.start_notification_sweep(backends, notifier);

    // Manejar shutdown graceful
    let shard_manager = client.shard_manager.clone();
    let shutdown_scheduler = scheduler.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error al registrar Ctrl+C: {:?}", e);
            return;
        }
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        shutdown_scheduler.shutdown().await;
        shard_manager.shutdown_all().await;
    });

    // Iniciar bot
    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}
