use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, PartialEq)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

/// Envelope every Bot API method replies with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,

    #[serde(default)]
    pub description: Option<String>,
}
