//! KLIPING - Croatian news monitor for Telegram

mod consts;
mod filter;
mod logic;
mod network;
mod report;
mod utils;

use crate::consts::limits;
use crate::filter::DateWindow;
use crate::logic::{
    build_help_message, build_profiles_message, build_response, build_sources_message, routes,
    run, Query,
};
use crate::network::NewsEngine;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Dostupne naredbe:")]
enum Command {
    #[command(description = "Pokazi pomoc")]
    Start,
    #[command(description = "Pokazi pomoc")]
    Help,

    // Profile commands; the argument narrows the source selection
    #[command(description = "💶 Porezi i proracun")]
    Porezi(String),
    #[command(description = "🪙 Mirovine i socijalna politika")]
    Mirovine(String),
    #[command(description = "🌱 Klimatske politike i energija")]
    Klima(String),
    #[command(description = "🏛 Subvencije i drzavne potpore")]
    Potpore(String),

    // Free-form search and tooling
    #[command(description = "Pretraga po vlastitim rijecima")]
    Trazi(String),
    #[command(description = "Dnevni pregled kao HTML dokument")]
    Pregled,
    #[command(description = "Izvoz rezultata kao JSON")]
    Izvoz(String),
    #[command(description = "Popis pracenih izvora")]
    Izvori,
    #[command(description = "Profili i njihove kljucne rijeci")]
    Profili,
}

impl Command {
    fn to_query(&self) -> Option<Query> {
        let text = match self {
            Command::Porezi(_) => "porezi",
            Command::Mirovine(_) => "mirovine",
            Command::Klima(_) => "klima",
            Command::Potpore(_) => "potpore",
            Command::Trazi(text) => text.as_str(),
            _ => return None,
        };
        routes::resolve_query(text)
    }

    /// Comma separated source names narrowing the run; empty means all.
    fn source_restriction(&self) -> &str {
        match self {
            Command::Porezi(rest)
            | Command::Mirovine(rest)
            | Command::Klima(rest)
            | Command::Potpore(rest) => rest,
            _ => "",
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("═══════════════════════════════════════════");
    log::info!("  KLIPING ONLINE. PRATIM HRVATSKE PORTALE...");
    log::info!("═══════════════════════════════════════════");

    let token = env::var("TELOXIDE_TOKEN").expect("TELOXIDE_TOKEN not found!");
    let bot = Bot::new(token);
    let engine = NewsEngine::new();

    Command::repl(bot, move |bot: Bot, msg: Message, cmd: Command| {
        let engine = Arc::clone(&engine);
        async move { handle_command(bot, msg, cmd, engine).await }
    })
    .await;
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<NewsEngine>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    match &cmd {
        Command::Start | Command::Help => {
            bot.send_message(chat_id, build_help_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
            return Ok(());
        }
        Command::Izvori => {
            bot.send_message(chat_id, build_sources_message())
                .parse_mode(ParseMode::Html)
                .disable_web_page_preview(true)
                .await?;
            return Ok(());
        }
        Command::Profili => {
            bot.send_message(chat_id, build_profiles_message())
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
        Command::Pregled => {
            let loading = bot
                .send_message(chat_id, "⏳ Slazem dnevni pregled...")
                .await?;
            let digest = report::build_digest(engine, consts::SOURCES).await;
            let _ = bot.delete_message(chat_id, loading.id).await;

            if digest.total() == 0 {
                bot.send_message(chat_id, report::digest_caption(&digest))
                    .await?;
                return Ok(());
            }

            let document = report::render_digest_document(&digest);
            let file = InputFile::memory(document.into_bytes()).file_name(format!(
                "kliping-pregled-{}.html",
                digest.generated.format("%Y-%m-%d")
            ));
            bot.send_document(chat_id, file)
                .caption(report::digest_caption(&digest))
                .await?;
            return Ok(());
        }
        Command::Izvoz(text) => {
            match routes::resolve_query(text) {
                Some(query) => send_export(&bot, chat_id, engine, &query).await?,
                None => {
                    bot.send_message(chat_id, "Navedi profil ili kljucne rijeci, npr. /izvoz porezi")
                        .await?;
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let query = match cmd.to_query() {
        Some(q) => q,
        None => {
            bot.send_message(chat_id, "Navedi kljucne rijeci, npr. /trazi pdv, trosarine")
                .await?;
            return Ok(());
        }
    };

    let sources = match routes::resolve_sources(cmd.source_restriction()) {
        Ok(sources) => sources,
        Err(unknown) => {
            bot.send_message(
                chat_id,
                format!("Nepoznat izvor '{}'. Pogledaj /izvori za popis.", unknown),
            )
            .await?;
            return Ok(());
        }
    };

    let loading = bot
        .send_message(chat_id, format!("⏳ Pretrazujem '{}'...", query.display_name()))
        .await?;

    let window = DateWindow::last_days(limits::DEFAULT_WINDOW_DAYS);
    let result = run(engine, &sources, &query, window).await;
    let response = build_response(&result);

    let _ = bot.delete_message(chat_id, loading.id).await;

    send_chunked(&bot, chat_id, &response).await?;
    Ok(())
}

/// Run the query across all sources and hand the result over as JSON.
async fn send_export(
    bot: &Bot,
    chat_id: ChatId,
    engine: Arc<NewsEngine>,
    query: &Query,
) -> ResponseResult<()> {
    let loading = bot
        .send_message(chat_id, format!("⏳ Izvozim '{}'...", query.display_name()))
        .await?;

    let window = DateWindow::last_days(limits::DEFAULT_WINDOW_DAYS);
    let result = run(engine, consts::SOURCES, query, window).await;

    let _ = bot.delete_message(chat_id, loading.id).await;

    match report::render_export_json(&result) {
        Ok(bytes) => {
            let file = InputFile::memory(bytes).file_name(export_file_name(query));
            bot.send_document(chat_id, file)
                .caption(format!(
                    "📦 {} | {} clanaka",
                    query.display_name(),
                    result.matches()
                ))
                .await?;
        }
        Err(e) => {
            log::error!("Export serialization failed: {}", e);
            bot.send_message(chat_id, "Izvoz nije uspio.").await?;
        }
    }

    Ok(())
}

fn export_file_name(query: &Query) -> String {
    match query {
        Query::Profile(profile) => format!("kliping-{}.json", profile.slug),
        Query::Keywords(_) => "kliping-upit.json".to_string(),
    }
}

async fn send_chunked(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    for chunk in split_message(text, limits::MESSAGE_CHUNK_BYTES) {
        bot.send_message(chat_id, chunk)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await?;
    }
    Ok(())
}

/// Split on char boundaries, preferring the last newline in each chunk so
/// HTML tags and article blocks stay intact.
fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = start + max_len;
        if end >= text.len() {
            chunks.push(&text[start..]);
            break;
        }
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let search_range = &text[start..end];
        if let Some(last_newline) = search_range.rfind('\n') {
            let split_idx = start + last_newline + 1;
            if split_idx > start {
                end = split_idx;
            }
        }
        chunks.push(&text[start..end]);
        start = end;
    }
    chunks
}
