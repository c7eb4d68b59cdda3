use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_queue::config::BotConfig;
use rusty_queue::utils::database::init_db;
use rusty_queue::{CommandResult, Context, Data, Error};

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_queue=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;

    // Initialize the SQLite database
    if let Err(e) = init_db(&config.database_path) {
        error!("Failed to initialize database {}: {}", config.database_path, e);
    }

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Create a vector to hold our commands
    #[allow(unused_mut)]
    let mut commands = vec![
        // Default commands
        register(),
        help(),
    ];

    // Handle Music feature
    #[cfg(feature = "music")]
    {
        use rusty_queue::commands::music::{pause::*, play::*, queue::*, settings::*, stop::*};

        commands.extend(vec![play(), pause(), stop(), queue(), musicset()]);
    }

    let database_path = config.database_path.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            owners: config.owners.clone(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Running {} for {} in guild {:?}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.guild_id()
                    );
                })
            },
            on_error: |err| {
                Box::pin(async move {
                    if let poise::FrameworkError::Command { error, ctx, .. } = &err {
                        error!("Command {} failed: {}", ctx.command().qualified_name, error);
                    }
                    if let Err(e) = poise::builtins::on_error(err).await {
                        error!("Error while handling error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data::new(database_path))
            })
        });

    let client_builder = ClientBuilder::new(config.token, intents).framework(framework.build());

    // Create and run client
    build_and_start_client(client_builder).await
}

async fn build_and_start_client(client_builder: ClientBuilder) -> Result<(), Error> {
    #[cfg(feature = "music")]
    {
        use songbird::SerenityInit;

        let mut client = client_builder.register_songbird().await?;
        client.start().await.map_err(Into::into)
    }

    #[cfg(not(feature = "music"))]
    {
        let mut client = client_builder.await?;
        client.start().await.map_err(Into::into)
    }
}
