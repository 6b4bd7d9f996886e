use super::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

const MAX_INDENT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    #[default]
    Format,
    Minify,
    Validate,
}

fn default_indent() -> usize {
    2
}

#[derive(Debug, Deserialize)]
pub struct JsonRequest {
    pub input: String,
    #[serde(default)]
    pub mode: JsonMode,
    #[serde(default = "default_indent")]
    pub indent: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

pub fn pretty(value: &serde_json::Value, indent: usize) -> Result<String, ToolError> {
    let indent_bytes = vec![b' '; indent];
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent_bytes));
    value
        .serialize(&mut ser)
        .map_err(|e| ToolError::Output(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ToolError::Output(e.to_string()))
}

pub fn run(req: JsonRequest) -> Result<JsonResponse, ToolError> {
    if req.indent > MAX_INDENT {
        return Err(ToolError::InvalidInput(format!(
            "indent must be at most {}",
            MAX_INDENT
        )));
    }

    let value: serde_json::Value = serde_json::from_str(&req.input).map_err(|e| {
        ToolError::InvalidInput(format!(
            "invalid JSON at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })?;

    let output = match req.mode {
        JsonMode::Validate => None,
        JsonMode::Minify => {
            Some(serde_json::to_string(&value).map_err(|e| ToolError::Output(e.to_string()))?)
        }
        JsonMode::Format => Some(pretty(&value, req.indent)?),
    };

    Ok(JsonResponse {
        valid: true,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: &str, mode: JsonMode, indent: usize) -> JsonRequest {
        JsonRequest {
            input: input.to_string(),
            mode,
            indent,
        }
    }

    #[test]
    fn formats_with_requested_indent() {
        let out = run(request(r#"{"a":[1,2]}"#, JsonMode::Format, 4)).unwrap();
        assert_eq!(
            out.output.unwrap(),
            "{\n    \"a\": [\n        1,\n        2\n    ]\n}"
        );
    }

    #[test]
    fn minifies() {
        let out = run(request("{\n  \"a\" : [ 1, 2 ]\n}", JsonMode::Minify, 2)).unwrap();
        assert_eq!(out.output.unwrap(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn validate_reports_position() {
        let ok = run(request("[true]", JsonMode::Validate, 2)).unwrap();
        assert!(ok.valid);
        assert!(ok.output.is_none());

        let err = run(request("{\n  \"a\": ,\n}", JsonMode::Validate, 2)).unwrap_err();
        match err {
            ToolError::InvalidInput(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_huge_indent() {
        assert!(run(request("{}", JsonMode::Format, 20)).is_err());
    }
}
