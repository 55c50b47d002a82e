//! Session CLI commands: save, history, list, user chats, create, delete.
//!
//! Tables via comfy-table, deletion behind a dialoguer confirmation.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use parlor_types::chat::ChatTurn;

use crate::http::handlers::session::NO_HISTORY_MESSAGE;
use crate::state::AppState;

/// Save one chat turn.
///
/// # Examples
///
/// ```bash
/// parlor save --user alice --session s1 --message "hi" --response "hello"
/// ```
pub async fn save_turn(
    state: &AppState,
    user: &str,
    session: &str,
    message: &str,
    response: &str,
    json: bool,
) -> Result<()> {
    let turn = state
        .session_service
        .save_turn(user, session, message, response)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turn)?);
    } else {
        println!();
        println!(
            "  {} Saved turn to session '{}'",
            style("✓").green().bold(),
            style(&turn.session_id).cyan()
        );
        println!("  {}", style(format!("id: {}", turn.id)).dim());
        println!();
    }

    Ok(())
}

/// Show a session's history, cache first.
pub async fn show_history(state: &AppState, session: &str, json: bool) -> Result<()> {
    let history = state.session_service.get_session_history(session).await?;

    if json {
        let body = match &history {
            Some(history) => serde_json::json!({
                "session_id": session,
                "cached": history.is_cached(),
                "turns": history.turns,
            }),
            None => serde_json::json!({
                "session_id": session,
                "cached": false,
                "turns": [],
                "message": NO_HISTORY_MESSAGE,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let Some(history) = history else {
        println!();
        println!("  {} {}", style("i").blue().bold(), NO_HISTORY_MESSAGE);
        println!();
        return Ok(());
    };

    println!();
    println!(
        "  Session '{}' {}",
        style(session).cyan().bold(),
        style(format!("(from {})", history.source)).dim()
    );
    println!();
    print_turns(&history.turns);
    println!();

    Ok(())
}

/// List a user's sessions, most recent first.
pub async fn list_sessions(state: &AppState, user: &str, json: bool) -> Result<()> {
    let sessions = state.session_service.list_sessions(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions found for '{}'.",
            style("i").blue().bold(),
            style(user).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("First message").fg(Color::White),
    ]);

    for session in &sessions {
        table.add_row(vec![
            Cell::new(&session.session_id).fg(Color::Cyan),
            Cell::new(session.timestamp.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(truncate(&session.first_message, 48)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  Sessions for '{}'", style(user).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show every turn a user has written, across sessions.
pub async fn list_user_chats(state: &AppState, user: &str, json: bool) -> Result<()> {
    let turns = state.session_service.get_user_history(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No chats found for '{}'.",
            style("i").blue().bold(),
            style(user).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  Chats for '{}'", style(user).cyan().bold());
    println!();
    print_turns(&turns);
    println!();

    Ok(())
}

/// Mint a new session id.
pub fn new_session(state: &AppState, json: bool) -> Result<()> {
    let session = state.session_service.create_session();

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("{}", session.session_id);
    }

    Ok(())
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// parlor delete-session <session-id>
/// parlor delete-session <session-id> --force
/// ```
pub async fn delete_session(state: &AppState, session: &str, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' and all of its history?",
                style(session).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let deleted = state.session_service.delete_session(session).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted_turns": deleted, "session_id": session})
        );
    } else {
        println!(
            "  {} Session '{}' deleted ({} turn{}).",
            style("x").red().bold(),
            session,
            deleted,
            if deleted == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

// --- Formatting helpers ---

fn print_turns(turns: &[ChatTurn]) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Session").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Response").fg(Color::White),
    ]);

    for turn in turns {
        table.add_row(vec![
            Cell::new(turn.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()).fg(Color::DarkGrey),
            Cell::new(&turn.session_id).fg(Color::Cyan),
            Cell::new(&turn.message).fg(Color::White),
            Cell::new(&turn.response).fg(Color::Green),
        ]);
    }

    println!("{table}");
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
