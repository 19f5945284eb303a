use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{
        application::{CommandDataOption, CommandDataOptionValue, CommandOptionType},
        id::GuildId,
    },
    prelude::Context,
};

use crate::media::MediaKind;

/// Subcomando de `/movie` o `/show` ya validado
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    FindNew { title: String },
    FindExisting { title: String },
    Add { title: String },
    AddId { title: String, id: i64 },
    Downloads,
    Profiles,
    Discover,
    Releases { title: String, include_rejected: bool },
    Grab { guid: String, indexer_id: i64 },
}

/// Opciones crudas de un subcomando, tal como llegan de Discord
#[derive(Debug, Default, Clone, Copy)]
pub struct SubcommandArgs<'a> {
    pub title: Option<&'a str>,
    pub id: Option<i64>,
    pub guid: Option<&'a str>,
    pub indexer_id: Option<i64>,
    pub include_rejected: Option<bool>,
}

fn required_text(value: Option<&str>, missing: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => anyhow::bail!("Falta {}", missing),
    }
}

impl MediaCommand {
    /// Construye el comando a partir del nombre del subcomando y sus opciones
    pub fn parse(subcommand: &str, args: SubcommandArgs<'_>) -> Result<Self> {
        let title = || required_text(args.title, "el título");

        Ok(match subcommand {
            "find-new" => Self::FindNew { title: title()? },
            "find-existing" => Self::FindExisting { title: title()? },
            "add" => Self::Add { title: title()? },
            "add-id" => Self::AddId {
                title: title()?,
                id: args.id.ok_or_else(|| anyhow::anyhow!("Falta el id"))?,
            },
            "downloads" => Self::Downloads,
            "profiles" => Self::Profiles,
            "discover" => Self::Discover,
            "releases" => Self::Releases {
                title: title()?,
                include_rejected: args.include_rejected.unwrap_or(false),
            },
            "grab" => Self::Grab {
                guid: required_text(args.guid, "el guid")?,
                indexer_id: args
                    .indexer_id
                    .ok_or_else(|| anyhow::anyhow!("Falta el indexer-id"))?,
            },
            other => anyhow::bail!("Subcomando no reconocido: {}", other),
        })
    }

    /// Lee el subcomando de las opciones de la interacción
    pub fn from_options(options: &[CommandDataOption]) -> Result<Self> {
        let option = options
            .first()
            .ok_or_else(|| anyhow::anyhow!("Subcomando no proporcionado"))?;

        let sub_options: &[CommandDataOption] = match &option.value {
            CommandDataOptionValue::SubCommand(sub_options) => sub_options,
            _ => &[],
        };

        let value = |name: &str| {
            sub_options
                .iter()
                .find(|opt| opt.name == name)
                .map(|opt| &opt.value)
        };

        let args = SubcommandArgs {
            title: value("title").and_then(|v| v.as_str()),
            id: value("id").and_then(|v| v.as_i64()),
            guid: value("guid").and_then(|v| v.as_str()),
            indexer_id: value("indexer-id").and_then(|v| v.as_i64()),
            include_rejected: value("include-rejected").and_then(|v| v.as_bool()),
        };

        Self::parse(&option.name, args)
    }
}

/// Registra comandos globales
pub async fn register_global_commands(ctx: &Context, kinds: &[MediaKind]) -> Result<()> {
    for command in all_commands(kinds) {
        ctx.http.create_global_command(&command).await?;
    }

    Ok(())
}

/// Registra comandos para una guild específica (desarrollo)
pub async fn register_guild_commands(
    ctx: &Context,
    guild_id: GuildId,
    kinds: &[MediaKind],
) -> Result<()> {
    guild_id.set_commands(&ctx.http, all_commands(kinds)).await?;

    Ok(())
}

fn all_commands(kinds: &[MediaKind]) -> Vec<CreateCommand> {
    let mut commands: Vec<CreateCommand> = kinds.iter().map(|kind| media_command(*kind)).collect();
    commands.push(help_command());
    commands
}

fn title_option(kind: MediaKind) -> CreateCommandOption {
    CreateCommandOption::new(
        CommandOptionType::String,
        "title",
        format!("Título de la {}", kind.singular()),
    )
    .required(true)
}

fn media_command(kind: MediaKind) -> CreateCommand {
    let plural = kind.plural();

    let command = CreateCommand::new(kind.command_name())
        .description(format!("Busca y agrega {} en {}", plural, kind.backend_name()))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "find-new",
                format!("Busca {} que no estén en la biblioteca", plural),
            )
            .add_sub_option(title_option(kind)),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "find-existing",
                format!("Busca entre todas las {}", plural),
            )
            .add_sub_option(title_option(kind)),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "add",
                "Agrega por título si hay un único resultado nuevo",
            )
            .add_sub_option(title_option(kind)),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "add-id",
                "Agrega por título e id",
            )
            .add_sub_option(title_option(kind))
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Integer, "id", "Id del resultado")
                    .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "downloads",
            "Muestra las descargas activas",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "profiles",
            "Lista los perfiles de calidad",
        ));

    match kind {
        MediaKind::Movie => with_release_commands(command),
        // Sonarr no tiene recomendaciones ni búsqueda por película
        MediaKind::Show => command,
    }
}

fn with_release_commands(command: CreateCommand) -> CreateCommand {
    command
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "discover",
            "Recomienda películas que no estén en la biblioteca",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "releases",
                "Lista los releases de una película de la biblioteca",
            )
            .add_sub_option(title_option(MediaKind::Movie))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "include-rejected",
                "Incluye los releases rechazados",
            )),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "grab",
                "Descarga un release listado por `releases`",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "guid", "Guid del release")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "indexer-id",
                    "Id del indexador",
                )
                .required(true),
            ),
        )
}

fn help_command() -> CreateCommand {
    CreateCommand::new("help").description("Muestra los comandos disponibles")
}
