#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Role;
use crate::domain::models::Selection;

const PREVIEW_LENGTH: usize = 60;

/// Plain text rendition of a message, citations indented underneath.
pub fn format_message(message: &Message, author: &str) -> String {
    let mut lines = vec![format!("{author}: {}", message.content)];
    for line in message.citation_lines() {
        lines.push(format!("    {line}"));
    }

    return lines.join("\n");
}

/// Shortens an excerpt to a single line for the "ask about this" hint.
pub fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    if flat.chars().count() <= PREVIEW_LENGTH {
        return flat;
    }

    let head = flat.chars().take(PREVIEW_LENGTH - 3).collect::<String>();
    return format!("{head}...");
}

pub fn format_selection_hint(selection: &Selection) -> String {
    return format!(
        "Selected \"{}\". Use /ask [QUESTION] to ask about it, or /dismiss.",
        preview(&selection.text)
    );
}

pub fn print_message(message: &Message) {
    let text = format_message(message, &message.role.display_name());
    if message.message_type() == MessageType::Error {
        println!("{}", text.if_supports_color(Stream::Stdout, |e| return e.red()));
        return;
    }

    if message.role == Role::User {
        println!("{}", text.if_supports_color(Stream::Stdout, |e| return e.cyan()));
        return;
    }

    println!("{text}");
}

pub fn print_info(text: &str) {
    println!("{}", text.if_supports_color(Stream::Stdout, |e| return e.dimmed()));
}

pub fn print_warning(text: &str) {
    eprintln!("{}", text.if_supports_color(Stream::Stderr, |e| return e.yellow()));
}

pub fn print_thinking() {
    print_info("thinking...");
}
