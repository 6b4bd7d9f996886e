use super::{CodecMode, ToolError};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Base64Request {
    pub text: String,
    #[serde(default)]
    pub mode: CodecMode,
    #[serde(default)]
    pub url_safe: bool,
}

#[derive(Debug, Serialize)]
pub struct Base64Response {
    pub output: String,
}

pub fn run(req: Base64Request) -> Result<Base64Response, ToolError> {
    let output = match req.mode {
        CodecMode::Encode => encode(&req.text, req.url_safe),
        CodecMode::Decode => decode(&req.text, req.url_safe)?,
    };
    Ok(Base64Response { output })
}

pub fn encode(text: &str, url_safe: bool) -> String {
    if url_safe {
        URL_SAFE_NO_PAD.encode(text.as_bytes())
    } else {
        STANDARD.encode(text.as_bytes())
    }
}

/// Whitespace is ignored so wrapped input (e.g. MIME line breaks) decodes.
pub fn decode(text: &str, url_safe: bool) -> Result<String, ToolError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = if url_safe {
        URL_SAFE_NO_PAD.decode(compact.trim_end_matches('='))
    } else {
        STANDARD.decode(&compact)
    }
    .map_err(|e| ToolError::InvalidInput(format!("not valid Base64: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|_| ToolError::InvalidInput("decoded bytes are not UTF-8 text".to_string()))
}
