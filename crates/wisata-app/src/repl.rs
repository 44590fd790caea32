//! Line-oriented terminal chat over one orchestrator session.

use std::io::Write;

use tracing::debug;
use uuid::Uuid;
use wisata_chat::{ChatEntry, ChatError, ChatOrchestrator, CityProfile};

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Empty,
    Quit,
    Clear,
    Confirm,
    Cancel,
    History,
    City(&'a str),
    Message(&'a str),
}

pub fn parse_line(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    match line {
        "" => ReplCommand::Empty,
        "/quit" | "/exit" => ReplCommand::Quit,
        "/clear" => ReplCommand::Clear,
        "/yes" => ReplCommand::Confirm,
        "/no" => ReplCommand::Cancel,
        "/history" => ReplCommand::History,
        _ => match line.strip_prefix("/city") {
            Some(rest) if rest.is_empty() || rest.starts_with(' ') => ReplCommand::City(rest.trim()),
            _ => ReplCommand::Message(line),
        },
    }
}

pub fn render_entry(entry: &ChatEntry) -> String {
    match entry {
        ChatEntry::User(text) => format!("🧑 User: {text}"),
        ChatEntry::Bot(text) => format!("🤖 Bot: {text}"),
        ChatEntry::Table(table) => table.to_text(),
    }
}

pub fn render_profile(profile: &CityProfile) -> String {
    format!(
        "📌 {}\n{}\n\n🌐 Google Maps: {}\n\n{}",
        profile.name, profile.description, profile.maps_url, profile.travel_info
    )
}

/// Run one command against the session at `session_id`.
///
/// A message answered in a different session (the old one expired) moves
/// `session_id` there. Returns `false` when the user quits.
pub async fn execute(
    orchestrator: &ChatOrchestrator,
    session_id: &mut Uuid,
    command: ReplCommand<'_>,
) -> Result<bool, ChatError> {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Quit => return Ok(false),
        ReplCommand::Clear => {
            orchestrator.request_clear(*session_id).await?;
            println!("Hapus seluruh riwayat percakapan? Ketik /yes atau /no.");
        }
        ReplCommand::Confirm => match orchestrator.confirm_clear(*session_id).await {
            Ok(_) => println!("Riwayat percakapan dihapus."),
            Err(ChatError::NoPendingClear) => println!("Tidak ada permintaan hapus riwayat."),
            Err(e) => return Err(e),
        },
        ReplCommand::Cancel => {
            orchestrator.cancel_clear(*session_id).await?;
            println!("Penghapusan riwayat dibatalkan.");
        }
        ReplCommand::History => {
            for entry in orchestrator.history(*session_id).await? {
                println!("{}", render_entry(&entry));
            }
        }
        ReplCommand::City(name) => {
            let profile = orchestrator.explore_city(*session_id, name).await?;
            println!("{}", render_profile(&profile));
        }
        ReplCommand::Message(text) => {
            let reply = orchestrator.handle_message(text, Some(*session_id)).await?;
            if reply.session_id != *session_id {
                debug!(old = %session_id, new = %reply.session_id, "session replaced");
                println!("{SESSION_RESTARTED}");
                *session_id = reply.session_id;
            }
            for entry in &reply.entries {
                println!("{}", render_entry(entry));
            }
        }
    }
    Ok(true)
}

const SESSION_RESTARTED: &str = "Sesi sebelumnya telah berakhir; percakapan dimulai dari awal.";

pub async fn run(orchestrator: &ChatOrchestrator) -> Result<(), Box<dyn std::error::Error>> {
    let mut session_id = orchestrator.create_session()?;

    println!("Wisata travel assistant. /city <nama>, /clear, /history, /quit");
    println!("---");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        match execute(orchestrator, &mut session_id, parse_line(&input)).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(ChatError::SessionNotFound(_)) => {
                session_id = orchestrator.create_session()?;
                println!("{SESSION_RESTARTED}");
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}
