use async_trait::async_trait;
use serenity::{all::ChannelId, builder::CreateMessage, http::Http};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::scheduler::Notifier;
use crate::ui::{embeds, messages::ChatMessage};

/// Publica las notificaciones periódicas en los canales configurados
pub struct ChannelNotifier {
    http: Arc<Http>,
    channels: Vec<ChannelId>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channels: &[u64]) -> Self {
        Self {
            http,
            channels: channels.iter().copied().map(ChannelId::new).collect(),
        }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, message: ChatMessage) -> anyhow::Result<()> {
        if self.channels.is_empty() {
            debug!("Sin canales de notificación, se descarta '{}'", message.title);
            return Ok(());
        }

        let embed = embeds::create_embed(&message);
        let mut failures = 0;

        for channel in &self.channels {
            // un canal caído no bloquea al resto
            if let Err(e) = channel
                .send_message(&self.http, CreateMessage::new().embed(embed.clone()))
                .await
            {
                warn!("⚠️ No se pudo notificar en canal {}: {:?}", channel, e);
                failures += 1;
            }
        }

        if failures == self.channels.len() {
            anyhow::bail!("Ningún canal de notificación aceptó el mensaje");
        }

        Ok(())
    }
}
