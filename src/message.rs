// src/message.rs
//
// Envelope data handed over by the MIME parsing stage, and the key used to
// archive a message body and address its preview.

/// What the mail parser extracted from one inbound message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub message_id: String,
    pub html: Option<String>,
}

impl Envelope {
    /// Archive / preview key for this message.
    pub fn key(&self) -> &str {
        message_key(&self.message_id)
    }

    /// Plain-text summary used when the rendered body cannot be delivered.
    pub fn description(&self) -> String {
        format!(
            "From: {}\nTo: {}\nSubject: {}",
            self.from, self.to, self.subject
        )
    }
}

/// `<local-part@host>` → `local-part`.
pub fn message_key(message_id: &str) -> &str {
    let id = message_id.trim();
    let id = id.strip_prefix('<').unwrap_or(id);
    match id.find('@') {
        Some(at) => &id[..at],
        None => id.trim_end_matches('>'),
    }
}

pub fn format_address(name: &str, address: &str) -> String {
    format!("{name} <{address}>")
}
