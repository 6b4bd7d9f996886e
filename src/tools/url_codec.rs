use super::{CodecMode, ToolError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub text: String,
    #[serde(default)]
    pub mode: CodecMode,
    /// Treat `+` as a space when decoding form-encoded input.
    #[serde(default)]
    pub plus_as_space: bool,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub output: String,
}

pub fn run(req: UrlRequest) -> Result<UrlResponse, ToolError> {
    let output = match req.mode {
        CodecMode::Encode => urlencoding::encode(&req.text).into_owned(),
        CodecMode::Decode => {
            let source = if req.plus_as_space {
                req.text.replace('+', " ")
            } else {
                req.text
            };
            urlencoding::decode(&source)
                .map_err(|e| ToolError::InvalidInput(format!("decoded bytes are not UTF-8: {}", e)))?
                .into_owned()
        }
    };

    Ok(UrlResponse { output })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str, mode: CodecMode, plus_as_space: bool) -> Result<String, ToolError> {
        run(UrlRequest {
            text: text.to_string(),
            mode,
            plus_as_space,
        })
        .map(|r| r.output)
    }

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(
            convert("a b&c=d/é", CodecMode::Encode, false).unwrap(),
            "a%20b%26c%3Dd%2F%C3%A9"
        );
    }

    #[test]
    fn decodes_percent_sequences() {
        assert_eq!(
            convert("a%20b%26c", CodecMode::Decode, false).unwrap(),
            "a b&c"
        );
        assert_eq!(convert("a+b", CodecMode::Decode, false).unwrap(), "a+b");
        assert_eq!(convert("a+b", CodecMode::Decode, true).unwrap(), "a b");
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            convert("%FF%FE", CodecMode::Decode, false),
            Err(ToolError::InvalidInput(_))
        ));
    }
}
