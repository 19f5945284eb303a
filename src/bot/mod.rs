//! # Bot Module
//!
//! Discord front end for the Radarr and Sonarr backends.
//!
//! This module contains:
//! - Slash command registration (`/movie`, `/show`, `/help`)
//! - Interaction dispatch to the per-backend [`MediaService`]
//! - [`ChannelNotifier`], the Discord side of the periodic notifications
//!
//! ## Architecture
//!
//! [`ArrBot`] implements Serenity's [`EventHandler`] trait. It only holds the
//! services of the backends that are configured; commands for a missing
//! backend are not registered.
//!
//! ## Example
//!
//! ```rust,no_run
//! use arr_bot::bot::ArrBot;
//! use arr_bot::config::Config;
//!
//! let config = Config::load()?;
//! let bot = ArrBot::new(config, None, None);
//! ```

use anyhow::Result;
use serenity::{
    all::{Context, EventHandler, GuildId, Interaction, Ready},
    async_trait,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod commands;
pub mod handlers;
pub mod notifier;

pub use notifier::ChannelNotifier;

use crate::{
    config::Config,
    lookup::MediaService,
    media::{MediaKind, Movie, Show},
};

/// Main Discord bot handler.
///
/// ## Fields
///
/// - `config`: Bot configuration (tokens, guild, backends)
/// - `movies`: Radarr service, if configured
/// - `shows`: Sonarr service, if configured
pub struct ArrBot {
    config: Arc<Config>,
    pub movies: Option<Arc<MediaService<Movie>>>,
    pub shows: Option<Arc<MediaService<Show>>>,
}

impl ArrBot {
    pub fn new(
        config: Config,
        movies: Option<Arc<MediaService<Movie>>>,
        shows: Option<Arc<MediaService<Show>>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            movies,
            shows,
        }
    }

    /// Tipos de medio con backend configurado
    pub fn enabled_kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::new();
        if self.movies.is_some() {
            kinds.push(MediaKind::Movie);
        }
        if self.shows.is_some() {
            kinds.push(MediaKind::Show);
        }
        kinds
    }

    /// Registers slash commands with Discord.
    ///
    /// Commands are registered per guild when `guild_id` is configured (fast
    /// propagation, useful for development) and globally otherwise.
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        info!("📝 Registrando comandos slash...");
        let kinds = self.enabled_kinds();

        match self.config.guild_id {
            Some(guild_id) => {
                info!("🏠 Registrando comandos para guild específica: {}", guild_id);
                let guild_id = GuildId::new(guild_id);

                if !ctx.cache.guilds().contains(&guild_id) {
                    warn!("⚠️ El bot no está en la guild especificada: {}", guild_id);
                    return Ok(());
                }

                commands::register_guild_commands(ctx, guild_id, &kinds)
                    .await
                    .map_err(|e| {
                        error!("❌ Error registrando comandos de guild: {:?}", e);
                        anyhow::anyhow!("No se pudieron registrar comandos de guild. Verifica que el bot tenga permisos de 'applications.commands' en la guild.")
                    })?;
                info!("✅ Comandos de guild registrados para: {}", guild_id);
            }
            None => {
                info!("🌐 Registrando comandos globalmente");
                commands::register_global_commands(ctx, &kinds)
                    .await
                    .map_err(|e| {
                        error!("❌ Error registrando comandos globales: {:?}", e);
                        anyhow::anyhow!("No se pudieron registrar comandos globales. Verifica que el bot tenga permisos de 'applications.commands'.")
                    })?;
                info!("✅ Comandos globales registrados");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl EventHandler for ArrBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command_interaction) = interaction {
            if let Err(e) = handlers::handle_command(&ctx, command_interaction, self).await {
                error!("Error manejando comando: {:?}", e);
            }
        }
    }
}
