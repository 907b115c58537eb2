//! Utility helpers: data paths, timestamps, chat-safe truncation.

use std::path::PathBuf;

/// Get the PromptGate data directory (e.g. `~/.promptgate/`).
pub fn get_data_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promptgate")
}

/// Current UTC timestamp as ISO 8601 with millisecond precision.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Shorten a response to fit a chat message limit (e.g. 2000 for Discord).
///
/// Prefers cutting after the last full sentence, then at the last word
/// boundary, and only then mid-word. The trailing marker tells the reader
/// the text was cut.
pub fn truncate_for_chat(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }

    let window = max_len.saturating_sub(100);
    let boundary = max_len.saturating_sub(200);
    let head = &chars[..window];

    let last_period = head.iter().rposition(|&c| c == '.');
    let last_space = head.iter().rposition(|&c| c == ' ');

    match (last_period, last_space) {
        (Some(p), _) if p > boundary => {
            let kept: String = chars[..=p].iter().collect();
            format!("{kept}\n\n*[Response truncated due to length]*")
        }
        (_, Some(s)) if s > boundary => {
            let kept: String = chars[..s].iter().collect();
            format!("{kept}...\n\n*[Response truncated]*")
        }
        _ => {
            let kept: String = chars[..max_len.saturating_sub(50)].iter().collect();
            format!("{kept}...\n\n*[Response truncated]*")
        }
    }
}

/// Split text into chunks of at most `max_len` characters.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_len)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
