//! Click-to-contact links
//!
//! Builders for the URIs handed to desktop applications: the SIP dialer,
//! the default mail client, Microsoft Teams and WhatsApp. Every builder
//! returns `None` and logs a warning when the input is empty.

use serde::{Deserialize, Serialize};

const TEAMS_APP_CHAT: &str = "msteams:/l/chat/0/0?users=";
const TEAMS_WEB_CHAT: &str = "https://teams.microsoft.com/l/chat/0/0?users=";
const TEAMS_WEB_SEARCH: &str = "https://teams.microsoft.com/_#/conversations/search?q=";
const WHATSAPP_BASE: &str = "https://wa.me/";
const WHATSAPP_COUNTRY_CODE: &str = "55";

/// Teams deep link plus the browser fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsLinks {
    pub app: String,
    pub web: String,
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `sip:` URI for a phone extension
pub fn dial_uri(ramal: &str) -> Option<String> {
    if ramal.trim().is_empty() {
        tracing::warn!("Ramal não informado para ligação");
        return None;
    }
    let number = digits(ramal);
    if number.is_empty() {
        tracing::warn!(ramal = %ramal, "Ramal inválido");
        return None;
    }
    Some(format!("sip:{}", number))
}

/// `mailto:` URI with optional subject and body
pub fn mailto_uri(address: &str, subject: Option<&str>, body: Option<&str>) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        tracing::warn!("Destinatário não informado para email");
        return None;
    }

    let params: Vec<String> = [("subject", subject), ("body", body)]
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some(format!("{}={}", key, urlencoding::encode(v))),
            _ => None,
        })
        .collect();

    if params.is_empty() {
        Some(format!("mailto:{}", address))
    } else {
        Some(format!("mailto:{}?{}", address, params.join("&")))
    }
}

/// Teams chat links for a handle or e-mail address
///
/// The web fallback opens a direct chat for e-mail addresses and a people
/// search for bare handles.
pub fn teams_chat_links(handle: &str) -> Option<TeamsLinks> {
    let handle = handle.trim();
    if handle.is_empty() {
        tracing::warn!("Nome de usuário Teams não informado");
        return None;
    }
    let encoded = urlencoding::encode(handle);
    let web = if handle.contains('@') {
        format!("{}{}", TEAMS_WEB_CHAT, encoded)
    } else {
        format!("{}{}", TEAMS_WEB_SEARCH, encoded)
    };
    Some(TeamsLinks {
        app: format!("{}{}", TEAMS_APP_CHAT, encoded),
        web,
    })
}

/// `wa.me` link; the number is reduced to digits and prefixed with the
/// Brazilian country code.
pub fn whatsapp_link(number: &str) -> Option<String> {
    let number = digits(number);
    if number.is_empty() {
        tracing::warn!("Número de WhatsApp não informado");
        return None;
    }
    Some(format!("{}{}{}", WHATSAPP_BASE, WHATSAPP_COUNTRY_CODE, number))
}
