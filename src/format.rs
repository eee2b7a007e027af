//! Rendering of leads into channel-specific message bodies.
//!
//! Pure string work, no I/O.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ChannelKind;
use crate::lead::{Lead, Locale};

/// Hard cap on SMS bodies, in characters.
pub const SMS_MAX_CHARS: usize = 1600;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line break pattern is valid"));

/// A lead rendered for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedMessage {
    Email { subject: String, html: String },
    Sms { body: String },
}

impl RenderedMessage {
    pub fn kind(&self) -> ChannelKind {
        match self {
            RenderedMessage::Email { .. } => ChannelKind::Email,
            RenderedMessage::Sms { .. } => ChannelKind::Sms,
        }
    }
}

/// Renders leads using the configured business name.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    business_name: String,
}

impl MessageFormatter {
    pub fn new(business_name: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
        }
    }

    pub fn render(&self, lead: &Lead, channel: ChannelKind) -> RenderedMessage {
        match channel {
            ChannelKind::Email => self.render_email(lead),
            ChannelKind::Sms => self.render_sms(lead),
        }
    }

    /// Locale-dependent subject, also used as the SMS header line.
    pub fn subject(&self, locale: Locale) -> String {
        match locale {
            Locale::English => format!("New lead – {}", self.business_name),
            Locale::Spanish => format!("Nuevo lead – {}", self.business_name),
        }
    }

    fn render_email(&self, lead: &Lead) -> RenderedMessage {
        let subject = self.subject(lead.locale);
        let html = format!(
            r#"
<h2 style="font-family:Arial,sans-serif;margin:0 0 12px 0;">{heading}</h2>
<p style="font-family:Arial,sans-serif;margin:8px 0;"><b>Name/Nombre:</b> {name}</p>
<p style="font-family:Arial,sans-serif;margin:8px 0;"><b>Email:</b> {email}</p>
<p style="font-family:Arial,sans-serif;margin:8px 0;"><b>Phone/Tel:</b> {phone}</p>
<p style="font-family:Arial,sans-serif;margin:8px 0;"><b>Message/Mensaje:</b><br>{message}</p>
"#,
            heading = escape_html(&subject),
            name = escape_html(&lead.name),
            email = escape_html(&lead.email),
            phone = escape_html(lead.phone_or_placeholder()),
            message = nl2br(&escape_html(&lead.message)),
        );
        RenderedMessage::Email { subject, html }
    }

    fn render_sms(&self, lead: &Lead) -> RenderedMessage {
        let (name_label, phone_label, message_label) = match lead.locale {
            Locale::English => ("Name", "Phone", "Message"),
            Locale::Spanish => ("Nombre", "Tel", "Mensaje"),
        };
        let full = [
            self.subject(lead.locale),
            format!("{name_label}: {}", lead.name),
            format!("Email: {}", lead.email),
            format!("{phone_label}: {}", lead.phone_or_placeholder()),
            format!("{message_label}: {}", lead.message),
        ]
        .join("\n");

        RenderedMessage::Sms {
            body: truncate_chars(&full, SMS_MAX_CHARS),
        }
    }
}

/// Escape `& < > " '` for embedding in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace `\n` and `\r\n` with `<br>`.
pub fn nl2br(input: &str) -> String {
    LINE_BREAK.replace_all(input, "<br>").into_owned()
}

/// Keep at most `max` characters.
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}
