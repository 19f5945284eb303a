use anyhow::Result;
use serenity::{
    builder::{
        CreateInteractionResponse, CreateInteractionResponseFollowup,
        CreateInteractionResponseMessage, EditInteractionResponse,
    },
    model::application::CommandInteraction,
    prelude::Context,
};
use tracing::{info, warn};

use super::commands::MediaCommand;
use crate::{
    bot::ArrBot,
    lookup::MediaService,
    media::{MediaEntry, MediaKind},
    ui::{
        embeds,
        messages::{
            add_outcome_messages, backend_error_message, discover_messages, download_message,
            grab_message, help_message, no_downloads_message, profile_message,
            reconciliation_messages, release_outcome_messages, ChatMessage,
        },
    },
};

/// Maneja comandos slash
pub async fn handle_command(ctx: &Context, command: CommandInteraction, bot: &ArrBot) -> Result<()> {
    info!(
        "📝 Comando /{} usado por {}",
        command.data.name, command.user.name
    );

    let kind = match command.data.name.as_str() {
        "help" => {
            return send_messages(ctx, &command, vec![help_message()], false).await;
        }
        "movie" => MediaKind::Movie,
        "show" => MediaKind::Show,
        _ => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("❌ Comando no reconocido")
                            .ephemeral(true),
                    ),
                )
                .await?;
            return Ok(());
        }
    };

    let media_command = match MediaCommand::from_options(&command.data.options) {
        Ok(media_command) => media_command,
        Err(e) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format!("❌ {}", e))
                            .ephemeral(true),
                    ),
                )
                .await?;
            return Ok(());
        }
    };

    // Las consultas al backend pueden tardar más que la ventana de respuesta
    command.defer(&ctx.http).await?;

    let messages = match kind {
        MediaKind::Movie => match &bot.movies {
            Some(service) => execute(service, media_command).await,
            None => vec![disabled_message(kind)],
        },
        MediaKind::Show => match &bot.shows {
            Some(service) => execute(service, media_command).await,
            None => vec![disabled_message(kind)],
        },
    };

    send_messages(ctx, &command, messages, true).await
}

/// Runs one subcommand against the service and builds the reply messages.
///
/// Backend failures become a single error message; they are never reported
/// as an empty result.
pub async fn execute<E: MediaEntry>(
    service: &MediaService<E>,
    command: MediaCommand,
) -> Vec<ChatMessage> {
    let kind = E::KIND;

    let result = match &command {
        MediaCommand::FindNew { title } => service
            .find(title, true)
            .await
            .map(|r| reconciliation_messages(&r, title)),
        MediaCommand::FindExisting { title } => service
            .find(title, false)
            .await
            .map(|r| reconciliation_messages(&r, title)),
        MediaCommand::Add { title } => service
            .add_with_title(title)
            .await
            .map(|outcome| add_outcome_messages(&outcome, title)),
        MediaCommand::AddId { title, id } => service
            .add_with_id(title, *id)
            .await
            .map(|outcome| add_outcome_messages(&outcome, title)),
        MediaCommand::Downloads => service.downloads().await.map(|items| {
            if items.is_empty() {
                vec![no_downloads_message(kind)]
            } else {
                items.iter().map(|item| download_message(item, kind)).collect()
            }
        }),
        MediaCommand::Profiles => service.profiles().await.map(|profiles| {
            if profiles.is_empty() {
                vec![ChatMessage::info("No hay perfiles de calidad configurados")]
            } else {
                profiles.iter().map(profile_message).collect()
            }
        }),
        MediaCommand::Discover => service.discover().await.map(|r| discover_messages(&r)),
        MediaCommand::Releases {
            title,
            include_rejected,
        } => service
            .releases(title, *include_rejected)
            .await
            .map(|outcome| release_outcome_messages(&outcome, kind, title)),
        MediaCommand::Grab { guid, indexer_id } => service
            .grab(guid, *indexer_id)
            .await
            .map(|()| vec![grab_message(kind, guid)]),
    };

    result.unwrap_or_else(|e| {
        warn!("⚠️ {} falló en {:?}: {}", kind.backend_name(), command, e);
        vec![backend_error_message(kind, &e.user_message())]
    })
}

fn disabled_message(kind: MediaKind) -> ChatMessage {
    backend_error_message(kind, &format!("{} no está configurado", kind.backend_name()))
}

/// Sends the messages in batches of at most 10 embeds.
///
/// The first batch answers the interaction; the rest go out as followups.
async fn send_messages(
    ctx: &Context,
    command: &CommandInteraction,
    messages: Vec<ChatMessage>,
    deferred: bool,
) -> Result<()> {
    let mut batches = embeds::embed_batches(&messages).into_iter();

    let first = batches.next().unwrap_or_default();
    if deferred {
        command
            .edit_response(&ctx.http, EditInteractionResponse::new().embeds(first))
            .await?;
    } else {
        command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().embeds(first),
                ),
            )
            .await?;
    }

    for batch in batches {
        command
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new().embeds(batch),
            )
            .await?;
    }

    Ok(())
}
