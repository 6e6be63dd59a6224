//! services/api/src/web/render.rs
//!
//! Renders a session's conversation as a small HTML page.

use doc_chat_core::ConversationTurn;
use std::fmt::Write;

const USER_BLOCK_STYLE: &str =
    "padding: 10px; background-color: #e0f7fa; border-radius: 10px; margin: 5px 0;";
const BOT_BLOCK_STYLE: &str =
    "padding: 10px; background-color: #ffe0b2; border-radius: 10px; margin: 5px 0;";
const RESPONSE_BLOCK_STYLE: &str =
    "border: 1px solid #d1d1d1; border-radius: 5px; padding: 10px; background-color: #f9f9f9;";

/// One user block and one bot block per turn, followed by the latest response.
pub fn render_transcript(document_name: Option<&str>, turns: &[ConversationTurn]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Conversation</title></head><body>\n");

    // Writing into a String cannot fail.
    match document_name {
        Some(name) => {
            let _ = writeln!(html, "<p>Document loaded: {}</p>", escape_html(name));
        }
        None => html.push_str("<p>No document loaded.</p>\n"),
    }

    if !turns.is_empty() {
        html.push_str("<h2>Conversation History</h2>\n");
        for turn in turns {
            let _ = writeln!(
                html,
                "<div style='{USER_BLOCK_STYLE}'><strong>You:</strong> {}</div>",
                escape_html(&turn.user)
            );
            let _ = writeln!(
                html,
                "<div style='{BOT_BLOCK_STYLE}'><strong>Chatbot:</strong> {}</div>",
                escape_html(&turn.bot)
            );
        }
    }

    if let Some(latest) = turns.last() {
        html.push_str("<h3>Chatbot Response:</h3>\n");
        let _ = writeln!(
            html,
            "<div style='{RESPONSE_BLOCK_STYLE}'>{}</div>",
            escape_html(&latest.bot)
        );
    }

    html.push_str("</body></html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
