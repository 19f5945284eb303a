use serenity::{
    all::{Colour, Timestamp},
    builder::{CreateEmbed, CreateEmbedFooter},
};

use super::messages::{ChatMessage, MessageKind};

/// Límite de embeds por mensaje en Discord
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const WARNING_ORANGE: Colour = Colour::from_rgb(255, 193, 7);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const LIBRARY_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
    pub const ACCENT_CYAN: Colour = Colour::from_rgb(23, 162, 184);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎬 Arr Bot";

pub fn colour_for(kind: MessageKind) -> Colour {
    match kind {
        MessageKind::Info => colors::INFO_BLUE,
        MessageKind::Success => colors::SUCCESS_GREEN,
        MessageKind::Error => colors::ERROR_RED,
        MessageKind::NewEntry => colors::ACCENT_CYAN,
        MessageKind::ExistingEntry => colors::LIBRARY_PURPLE,
        MessageKind::Download => colors::WARNING_ORANGE,
        MessageKind::Profile => colors::NEUTRAL_GRAY,
        MessageKind::Release => colors::INFO_BLUE,
    }
}

fn decorated_title(message: &ChatMessage) -> String {
    let prefix = match message.kind {
        MessageKind::Success => "✅ ",
        MessageKind::Error => "❌ ",
        MessageKind::Download => "⬇️ ",
        MessageKind::NewEntry => "🆕 ",
        MessageKind::Release => "📦 ",
        _ => "",
    };
    format!("{}{}", prefix, message.title)
}

/// Crea el embed de Discord para un mensaje
pub fn create_embed(message: &ChatMessage) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(decorated_title(message))
        .color(colour_for(message.kind));

    if let Some(description) = &message.description {
        embed = embed.description(description);
    }

    for (name, value, inline) in &message.fields {
        embed = embed.field(name, value, *inline);
    }

    if let Some(thumbnail) = &message.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Agrupa los embeds en lotes que Discord acepta en un solo mensaje
pub fn embed_batches(messages: &[ChatMessage]) -> Vec<Vec<CreateEmbed>> {
    messages
        .chunks(MAX_EMBEDS_PER_MESSAGE)
        .map(|chunk| chunk.iter().map(create_embed).collect())
        .collect()
}
