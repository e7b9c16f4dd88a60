use dotenv::dotenv;
use reqwest::Url;
use std::sync::Arc;
use teloxide::types::{InputFile, ParseMode};
use teloxide::{prelude::*, utils::command::BotCommands};

mod api;
mod config;
mod db;
mod error;
mod favorites;
mod recipe;
mod render;
mod state;

use api::{HttpTransport, RecipeApi, DEFAULT_CATEGORY, MIN_SEARCH_LEN};
use config::{Config, StorageLocation};
use db::{KeyValueStore, SqliteStore};
use favorites::FavoritesRepository;
use state::FavoritesState;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "Display this text.")]
    Help,
    #[command(description = "List recipe categories.")]
    Categories,
    #[command(description = "Browse a category (Seafood when empty).")]
    Category(String),
    #[command(description = "Search recipes by name.")]
    Search(String),
    #[command(description = "Show a recipe by id.")]
    Recipe(String),
    #[command(description = "Add a recipe to your favorites.")]
    Fav(String),
    #[command(description = "Remove a recipe from your favorites.")]
    Unfav(String),
    #[command(description = "List your favorites.")]
    Favorites,
}

#[tokio::main]
async fn main() {
    // Load all env variables from .env file.
    dotenv().ok();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    if let Err(e) = run().await {
        log::error!("Bot stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> HandlerResult {
    log::info!("Starting bot...");
    let config = Config::from_env();

    let store: Arc<dyn KeyValueStore> = match &config.storage {
        StorageLocation::InMemory => Arc::new(SqliteStore::open_in_memory()?),
        StorageLocation::File(path) => Arc::new(SqliteStore::open(path)?),
    };
    let favorites = Arc::new(FavoritesState::new(FavoritesRepository::new(store)));
    let api = Arc::new(RecipeApi::new(
        config.api_base.clone(),
        Arc::new(HttpTransport::new()?),
    ));

    log::info!("Loading favorites");
    let loader = favorites.clone();
    tokio::spawn(async move { loader.refresh().await });

    let mut changes = favorites.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snapshot = changes.borrow_and_update().clone();
            if !snapshot.loading {
                log::info!("{} favorites stored", snapshot.favorites.len());
            }
        }
    });

    let bot = Bot::from_env();
    let handler = Update::filter_message()
        .filter_command::<Command>()
        .branch(dptree::case![Command::Help].endpoint(help))
        .branch(dptree::case![Command::Categories].endpoint(list_categories))
        .branch(dptree::case![Command::Category(name)].endpoint(browse_category))
        .branch(dptree::case![Command::Search(query)].endpoint(search))
        .branch(dptree::case![Command::Recipe(id)].endpoint(show_recipe))
        .branch(dptree::case![Command::Fav(id)].endpoint(add_favorite))
        .branch(dptree::case![Command::Unfav(id)].endpoint(remove_favorite))
        .branch(dptree::case![Command::Favorites].endpoint(list_favorites));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![api, favorites])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}

async fn send_markdown(bot: &Bot, msg: &Message, text: String) -> HandlerResult {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn list_categories(bot: Bot, msg: Message, api: Arc<RecipeApi>) -> HandlerResult {
    let categories = api.categories().await;
    send_markdown(&bot, &msg, render::category_list(&categories)).await
}

async fn browse_category(
    bot: Bot,
    msg: Message,
    api: Arc<RecipeApi>,
    name: String,
) -> HandlerResult {
    let name = name.trim();
    let category = if name.is_empty() { None } else { Some(name) };
    let recipes = api.recipes_by_category(category).await;
    let title = category.unwrap_or(DEFAULT_CATEGORY);
    send_markdown(&bot, &msg, render::recipe_list(title, &recipes)).await
}

async fn search(bot: Bot, msg: Message, api: Arc<RecipeApi>, query: String) -> HandlerResult {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        bot.send_message(
            msg.chat.id,
            format!("Type at least {} characters, e.g. /search chicken", MIN_SEARCH_LEN),
        )
        .await?;
        return Ok(());
    }
    let recipes = api.search_recipes(query).await;
    send_markdown(
        &bot,
        &msg,
        render::recipe_list(&format!("Search: {}", query), &recipes),
    )
    .await
}

async fn show_recipe(
    bot: Bot,
    msg: Message,
    api: Arc<RecipeApi>,
    favorites: Arc<FavoritesState>,
    id: String,
) -> HandlerResult {
    let id = id.trim();
    if id.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /recipe <id>").await?;
        return Ok(());
    }
    let Some(recipe) = api.recipe_details(id).await else {
        bot.send_message(msg.chat.id, format!("No recipe found with id {}", id))
            .await?;
        return Ok(());
    };
    let favorite = favorites.is_favorite(&recipe.id).await;

    if let Ok(thumb) = Url::parse(&recipe.thumb) {
        let sent = bot
            .send_photo(msg.chat.id, InputFile::url(thumb))
            .caption(render::recipe_caption(&recipe, favorite))
            .parse_mode(ParseMode::MarkdownV2)
            .await;
        if let Err(e) = sent {
            log::error!("Failed to send photo {} for recipe {}: {}", recipe.thumb, recipe.id, e);
        }
    }
    send_markdown(&bot, &msg, render::recipe_details(&recipe, favorite)).await
}

async fn add_favorite(
    bot: Bot,
    msg: Message,
    api: Arc<RecipeApi>,
    favorites: Arc<FavoritesState>,
    id: String,
) -> HandlerResult {
    let id = id.trim();
    let Some(recipe) = api.recipe_details(id).await else {
        bot.send_message(msg.chat.id, format!("No recipe found with id {}", id))
            .await?;
        return Ok(());
    };

    let reply = if favorites.add_favorite(&recipe).await {
        format!("Added {} to your favorites", recipe.name)
    } else if favorites.is_favorite(&recipe.id).await {
        format!("{} is already in your favorites", recipe.name)
    } else {
        "Could not update your favorites, try again later".to_string()
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn remove_favorite(
    bot: Bot,
    msg: Message,
    favorites: Arc<FavoritesState>,
    id: String,
) -> HandlerResult {
    let id = id.trim();
    if id.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /unfav <id>").await?;
        return Ok(());
    }
    let reply = if favorites.remove_favorite(id).await {
        format!("Recipe {} is no longer in your favorites", id)
    } else {
        "Could not update your favorites, try again later".to_string()
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn list_favorites(
    bot: Bot,
    msg: Message,
    favorites: Arc<FavoritesState>,
) -> HandlerResult {
    let snapshot = favorites.snapshot();
    if snapshot.loading {
        bot.send_message(msg.chat.id, "Favorites are still loading, try again in a moment")
            .await?;
        return Ok(());
    }
    send_markdown(
        &bot,
        &msg,
        render::recipe_list("Favorites", &snapshot.favorites),
    )
    .await
}
