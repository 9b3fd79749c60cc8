mod backend;
mod cart;
mod chat;
mod common;
mod config;
mod feed;
mod isbn;
mod search;
mod session;
mod storage;
mod trade;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use backend::{BackendClient, BoxError, Collections, Functions};
use chat::ChatSession;
use common::{BackendEvent, ClientCommand, UserProfile};
use session::Session;
use storage::CacheDatabase;
use trade::{BookingOutcome, BookingRequest};

#[derive(Parser)]
#[command(
    name = "campus_book_chat",
    version,
    about = "Campus second-hand book trading & chat client"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and cache the session locally
    Login {
        #[arg(long)]
        nickname: String,
        #[arg(long, default_value = "")]
        avatar: String,
    },
    /// Clear the cached session
    Logout,
    /// Open a live chat with another user (by openid)
    Chat { peer: String },
    /// Search goods by book name or ISBN
    Search { keyword: String },
    /// Look up book info for a scanned ISBN code
    Scan { code: String },
    /// Book a second-hand book for purchase
    Trade {
        goods_id: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "")]
        spot: String,
        /// Trade date; defaults to today
        #[arg(long)]
        time: Option<String>,
    },
    /// Show the cart, or remove one entry
    Cart {
        #[arg(long, value_name = "ENTRY_ID")]
        remove: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    storage::ensure_data_dir()?;
    let cache = CacheDatabase::new()?;

    let collections = Collections::new(&app_config);
    let functions = Functions::new(&app_config);

    match cli.command {
        Command::Login { nickname, avatar } => {
            let profile = UserProfile {
                nick_name: nickname,
                avatar_url: avatar,
            };
            let session = Session::login(&functions, &collections, profile, &cache).await?;
            println!("logged in as {}", session.openid);
        }
        Command::Logout => {
            Session::logout(&cache)?;
            println!("logged out");
        }
        Command::Chat { peer } => {
            let session = require_session(&cache)?;
            run_chat(session, peer, collections, cache).await?;
        }
        Command::Search { keyword } => {
            let listings = search::search_goods(&collections, &keyword).await?;
            if listings.is_empty() {
                println!("no goods found for `{keyword}`");
            }
            for listing in listings {
                let tag = if listing.is_new { " [new]" } else { "" };
                println!(
                    "{}  {}{tag}  ¥{:.2}  {}",
                    listing.book.id.as_deref().unwrap_or("-"),
                    listing.book.name,
                    listing.book.price.unwrap_or(listing.book.original_price),
                    listing.introduction,
                );
            }
        }
        Command::Scan { code } => {
            let info = isbn::scan_lookup(&functions, &code).await?;
            println!("{} — {} ({})", info.name, info.author, info.publisher);
            if !info.summary.is_empty() {
                println!("{}", info.summary);
            }
        }
        Command::Trade {
            goods_id,
            price,
            spot,
            time,
        } => {
            let _session = require_session(&cache)?;
            run_trade(&collections, &functions, &goods_id, price, spot, time).await?;
        }
        Command::Cart { remove } => {
            let session = require_session(&cache)?;
            if let Some(entry_id) = remove {
                cart::remove_entry(&collections, &entry_id).await?;
                println!("removed {entry_id}");
            } else {
                let entries = cart::cart_entries(&collections, &session.openid).await?;
                if entries.is_empty() {
                    println!("cart is empty");
                }
                for entry in entries {
                    match entry.book_detail {
                        Some(book) => println!(
                            "{}  {}  ¥{:.2}",
                            entry.item.id.as_deref().unwrap_or("-"),
                            book.name,
                            book.price.unwrap_or(book.original_price),
                        ),
                        None => println!(
                            "{}  (goods {} no longer exists)",
                            entry.item.id.as_deref().unwrap_or("-"),
                            entry.item.goods_id,
                        ),
                    }
                }
            }
        }
    }

    Ok(())
}

fn require_session(cache: &CacheDatabase) -> Result<Session, BoxError> {
    Session::restore(cache)?.ok_or_else(|| "not logged in — run `login` first".into())
}

async fn run_chat(
    session: Session,
    peer: String,
    collections: Collections,
    cache: CacheDatabase,
) -> Result<(), BoxError> {
    let mut chat_session = ChatSession::new(&session.openid, &peer);
    chat_session.open(&collections).await?;

    // Hiện lịch sử đã cache trong lúc chờ snapshot đầu tiên.
    let cached = cache.conversation(&session.openid, &peer)?;
    if !cached.is_empty() {
        println!("--- cached history ---");
        for message in &cached {
            print_message(message, &session.openid);
        }
    }

    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Backend
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Backend -> UI
    let (event_tx, mut event_rx) = mpsc::channel(100);

    // 2. Khởi chạy vòng lặp backend (chạy ngầm)
    let client = BackendClient::new(
        event_tx,
        cmd_rx,
        collections.clone(),
        session.openid.clone(),
        peer.clone(),
    );
    tokio::spawn(async move {
        if let Err(err) = client.run().await {
            log::error!("Backend client terminated: {err}");
        }
    });

    println!("chatting with {peer} — type a message, /quit to leave");

    // 3. Vòng lặp UI: đọc stdin và nhận sự kiện backend
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let content = line.trim();
                if content == "/quit" {
                    break;
                }
                if content.is_empty() {
                    println!("(message must not be empty)");
                    continue;
                }
                if cmd_tx.send(ClientCommand::SendMessage(content.to_string())).await.is_err() {
                    break;
                }
            }
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    BackendEvent::Feed(feed_event) => {
                        chat_session.apply_event(&feed_event);
                        for message in chat_session.feed() {
                            cache.insert_message(message)?;
                        }
                        render_feed(&chat_session);
                    }
                    BackendEvent::MessageSent(message) => {
                        cache.insert_message(&message)?;
                    }
                    BackendEvent::SendFailed(reason) => {
                        println!("(send failed: {reason})");
                    }
                }
            }
        }
    }

    Ok(())
}

/// In lại toàn bộ feed sau mỗi đợt dữ liệu, như trang chat render lại
/// rồi cuộn xuống cuối.
fn render_feed(chat_session: &ChatSession) {
    println!("----------------------");
    for message in chat_session.feed() {
        print_message(message, chat_session.openid());
    }
}

fn print_message(message: &common::ChatMessage, own_openid: &str) {
    let who = if message.sender == own_openid {
        "me"
    } else {
        message.sender.as_str()
    };
    println!("[{}] {}: {}", message.send_time, who, message.content);
}

async fn run_trade(
    collections: &Collections,
    functions: &Functions,
    goods_id: &str,
    price: f64,
    spot: String,
    time: Option<String>,
) -> Result<(), BoxError> {
    let mut found: Vec<common::BookDetail> = collections
        .get("goods", &serde_json::json!({ "_id": goods_id }))
        .await?;
    if found.is_empty() {
        return Err(format!("goods `{goods_id}` not found").into());
    }
    let mut book = found.swap_remove(0);
    book.price = Some(price);

    // Kiểm tra nhanh cho UI; quyết định cuối cùng vẫn nằm ở lệnh ghi
    // có điều kiện bên trong launch_trade.
    let existing: Vec<common::TradeRecord> = collections
        .get("trade", &serde_json::json!({ "goods_id": goods_id }))
        .await?;
    if trade::has_open_booking(&existing) {
        println!("this book is already booked");
        return Ok(());
    }

    let request = BookingRequest {
        book,
        trade_time: time
            .unwrap_or_else(|| chrono::Local::now().format("%Y/%-m/%-d").to_string()),
        trade_spot: spot,
    };

    match trade::launch_trade(collections, functions, &request).await? {
        BookingOutcome::Booked => println!("trade request sent"),
        BookingOutcome::AlreadyBooked => println!("this book is already booked"),
    }
    Ok(())
}
