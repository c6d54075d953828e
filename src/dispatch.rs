// src/dispatch.rs
//
// Bot sendMessage payloads and the deliver-or-degrade policy.
// The HTTP call itself belongs to whoever implements Transport. When the
// rendered message is rejected (usually a markup complaint from the API), the
// plain description is posted once instead.

use log::warn;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::message::Envelope;
use crate::render::escape_text;
use crate::{convert_html, ConversionState, Error, PolicyConfig, Result};

const PARSE_MODE_HTML: &str = "HTML";
const PREVIEW_BUTTON: &str = "Preview";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendMessage {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<KeyboardButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    pub web_app: WebAppInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}

impl InlineKeyboard {
    /// Single "Preview" button opening the archived body.
    pub fn preview(url: String) -> Self {
        Self {
            inline_keyboard: vec![vec![KeyboardButton {
                text: PREVIEW_BUTTON.to_string(),
                web_app: WebAppInfo { url },
            }]],
        }
    }
}

pub fn preview_url(base: &str, key: &str) -> String {
    format!("{base}?id={}", utf8_percent_encode(key, NON_ALPHANUMERIC))
}

impl SendMessage {
    /// Restricted-HTML message.
    pub fn rendered(chat_id: &str, markup: String, keyboard: Option<InlineKeyboard>) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text: markup,
            parse_mode: Some(PARSE_MODE_HTML),
            disable_web_page_preview: true,
            reply_markup: keyboard,
        }
    }

    /// Plain-text fallback: no parse mode, so nothing in it can be rejected
    /// as bad markup.
    pub fn degraded(chat_id: &str, description: String, keyboard: Option<InlineKeyboard>) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text: description,
            parse_mode: None,
            disable_web_page_preview: true,
            reply_markup: keyboard,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Primary and fallback payloads for one inbound message.
#[derive(Clone, Debug)]
pub struct Outgoing {
    pub primary: SendMessage,
    pub fallback: SendMessage,
    pub state: ConversionState,
}

impl Outgoing {
    pub fn prepare(
        chat_id: &str,
        envelope: &Envelope,
        config: &PolicyConfig,
        preview_base: Option<&str>,
    ) -> Result<Self> {
        let description = envelope.description();
        let keyboard =
            preview_base.map(|base| InlineKeyboard::preview(preview_url(base, envelope.key())));

        let (body, state) = match &envelope.html {
            Some(html) => {
                let conversion = convert_html(html, config)?;
                (conversion.markup, conversion.state)
            }
            None => (String::new(), ConversionState::default()),
        };
        let mut text = escape_text(&description);
        if !body.is_empty() {
            text.push_str("\n\n");
            text.push_str(&body);
        }

        Ok(Self {
            primary: SendMessage::rendered(chat_id, text, keyboard.clone()),
            fallback: SendMessage::degraded(chat_id, description, keyboard),
            state,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("bot API returned {status}: {body}")]
pub struct TransportError {
    pub status: u16,
    pub body: String,
}

/// Posts one payload to the bot API.
pub trait Transport {
    fn post(&self, payload: &SendMessage) -> std::result::Result<(), TransportError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Primary,
    Degraded,
}

/// Post `primary`; on rejection post `fallback` exactly once.
pub fn dispatch<T: Transport + ?Sized>(
    transport: &T,
    primary: &SendMessage,
    fallback: &SendMessage,
) -> Result<Delivery> {
    let primary_err = match transport.post(primary) {
        Ok(()) => return Ok(Delivery::Primary),
        Err(e) => e,
    };
    warn!("rendered message rejected ({primary_err}), retrying with plain description");
    match transport.post(fallback) {
        Ok(()) => Ok(Delivery::Degraded),
        Err(fallback_err) => Err(Error::Dispatch {
            primary: primary_err.to_string(),
            fallback: fallback_err.to_string(),
        }),
    }
}
