//! Single-purpose tools.
//!
//! Every tool is a pure, synchronous transformation from a typed request to a
//! typed response. [`run_tool`] is the JSON boundary used by the HTTP layer.

pub mod base64_codec;
pub mod case_converter;
pub mod color;
pub mod cron;
pub mod hash;
pub mod html_minifier;
pub mod json_formatter;
pub mod password;
pub mod readability;
pub mod url_codec;
pub mod vat;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Failed to encode output: {0}")]
    Output(String),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolId {
    Base64,
    HashGenerator,
    PasswordGenerator,
    Readability,
    CronBuilder,
    HtmlMinifier,
    VatCalculator,
    ColorConverter,
    JsonFormatter,
    CaseConverter,
    UrlEncoder,
}

impl ToolId {
    pub fn title(&self) -> &'static str {
        match self {
            ToolId::Base64 => "Base64 Encoder / Decoder",
            ToolId::HashGenerator => "Hash Generator",
            ToolId::PasswordGenerator => "Password Generator",
            ToolId::Readability => "Readability Score",
            ToolId::CronBuilder => "Cron Expression Builder",
            ToolId::HtmlMinifier => "HTML Minifier",
            ToolId::VatCalculator => "VAT Calculator",
            ToolId::ColorConverter => "Color Converter",
            ToolId::JsonFormatter => "JSON Formatter",
            ToolId::CaseConverter => "Case Converter",
            ToolId::UrlEncoder => "URL Encoder / Decoder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolId::Base64 => "Encode text to Base64 or decode Base64 back to text",
            ToolId::HashGenerator => "SHA-2 digests and HMAC-SHA signatures, with optional comparison",
            ToolId::PasswordGenerator => "Random passwords from selectable character classes",
            ToolId::Readability => "Flesch, Gunning fog, SMOG and other readability formulas",
            ToolId::CronBuilder => "Build, validate and explain five-field cron expressions",
            ToolId::HtmlMinifier => "Strip comments and redundant whitespace from HTML",
            ToolId::VatCalculator => "Add VAT to a net amount or extract it from a gross amount",
            ToolId::ColorConverter => "Convert between hex, RGB and HSL colors",
            ToolId::JsonFormatter => "Validate, pretty-print or minify JSON",
            ToolId::CaseConverter => "Convert text between camel, snake, kebab and other cases",
            ToolId::UrlEncoder => "Percent-encode or decode URL components",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub id: ToolId,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn catalogue() -> Vec<ToolInfo> {
    ToolId::iter()
        .map(|id| ToolInfo {
            id,
            title: id.title(),
            description: id.description(),
        })
        .collect()
}

/// Shared direction switch for the reversible codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    #[default]
    Encode,
    Decode,
}

pub fn run_tool(tool: ToolId, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
    match tool {
        ToolId::Base64 => dispatch(input, base64_codec::run),
        ToolId::HashGenerator => dispatch(input, hash::run),
        ToolId::PasswordGenerator => dispatch(input, password::run),
        ToolId::Readability => dispatch(input, readability::run),
        ToolId::CronBuilder => dispatch(input, cron::run),
        ToolId::HtmlMinifier => dispatch(input, html_minifier::run),
        ToolId::VatCalculator => dispatch(input, vat::run),
        ToolId::ColorConverter => dispatch(input, color::run),
        ToolId::JsonFormatter => dispatch(input, json_formatter::run),
        ToolId::CaseConverter => dispatch(input, case_converter::run),
        ToolId::UrlEncoder => dispatch(input, url_codec::run),
    }
}

fn dispatch<Req, Resp>(
    input: serde_json::Value,
    tool: impl FnOnce(Req) -> Result<Resp, ToolError>,
) -> Result<serde_json::Value, ToolError>
where
    Req: DeserializeOwned,
    Resp: Serialize,
{
    let request: Req =
        serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    let response = tool(request)?;
    serde_json::to_value(response).map_err(|e| ToolError::Output(e.to_string()))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tool_ids_are_kebab_case() {
        assert_eq!(ToolId::HashGenerator.to_string(), "hash-generator");
        assert_eq!(ToolId::from_str("vat-calculator").unwrap(), ToolId::VatCalculator);
        assert!(ToolId::from_str("chart-renderer").is_err());
    }

    #[test]
    fn catalogue_lists_every_tool_once() {
        let tools = catalogue();
        assert_eq!(tools.len(), ToolId::iter().count());
        assert!(tools.iter().any(|t| t.id == ToolId::Readability));
    }

    #[test]
    fn run_tool_dispatches_json() {
        let out = run_tool(
            ToolId::Base64,
            serde_json::json!({ "text": "hi", "mode": "encode" }),
        )
        .unwrap();
        assert_eq!(out["output"], "aGk=");
    }

    #[test]
    fn run_tool_rejects_wrong_shape() {
        let err = run_tool(ToolId::VatCalculator, serde_json::json!({ "amount": "lots" }));
        assert!(matches!(err, Err(ToolError::InvalidInput(_))));
    }
}
