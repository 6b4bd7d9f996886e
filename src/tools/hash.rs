use super::ToolError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, Deserialize)]
pub struct HashRequest {
    pub text: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// When present the digest is an HMAC keyed with this value.
    #[serde(default)]
    pub hmac_key: Option<String>,
    /// Optional digest to compare against (case-insensitive hex).
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub uppercase: bool,
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

#[derive(Debug, Serialize)]
pub struct HashResponse {
    pub algorithm: HashAlgorithm,
    pub hmac: bool,
    pub digest: String,
    pub length_bits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<bool>,
}

pub fn parse_algorithm(raw: &str) -> Result<HashAlgorithm, ToolError> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.as_str() {
        "sha224" => Ok(HashAlgorithm::Sha224),
        "sha256" => Ok(HashAlgorithm::Sha256),
        "sha384" => Ok(HashAlgorithm::Sha384),
        "sha512" => Ok(HashAlgorithm::Sha512),
        "md5" | "sha1" => Err(ToolError::Unsupported(format!(
            "{} is broken and not offered; use a SHA-2 variant",
            raw
        ))),
        _ => Err(ToolError::InvalidInput(format!("unknown hash algorithm {}", raw))),
    }
}

macro_rules! hmac_bytes {
    ($digest:ty, $key:expr, $data:expr) => {{
        let mut mac = <Hmac<$digest> as Mac>::new_from_slice($key)
            .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        mac.update($data);
        mac.finalize().into_bytes().to_vec()
    }};
}

pub fn digest(
    algorithm: HashAlgorithm,
    data: &[u8],
    hmac_key: Option<&[u8]>,
) -> Result<Vec<u8>, ToolError> {
    let bytes = match (algorithm, hmac_key) {
        (HashAlgorithm::Sha224, None) => Sha224::digest(data).to_vec(),
        (HashAlgorithm::Sha256, None) => Sha256::digest(data).to_vec(),
        (HashAlgorithm::Sha384, None) => Sha384::digest(data).to_vec(),
        (HashAlgorithm::Sha512, None) => Sha512::digest(data).to_vec(),
        (HashAlgorithm::Sha224, Some(key)) => hmac_bytes!(Sha224, key, data),
        (HashAlgorithm::Sha256, Some(key)) => hmac_bytes!(Sha256, key, data),
        (HashAlgorithm::Sha384, Some(key)) => hmac_bytes!(Sha384, key, data),
        (HashAlgorithm::Sha512, Some(key)) => hmac_bytes!(Sha512, key, data),
    };
    Ok(bytes)
}

pub fn run(req: HashRequest) -> Result<HashResponse, ToolError> {
    let algorithm = parse_algorithm(&req.algorithm)?;
    let key = req.hmac_key.as_deref().map(str::as_bytes);
    let bytes = digest(algorithm, req.text.as_bytes(), key)?;

    let mut encoded = hex::encode(&bytes);
    if req.uppercase {
        encoded = encoded.to_ascii_uppercase();
    }

    let matches = req
        .expected
        .as_deref()
        .map(|expected| expected.trim().eq_ignore_ascii_case(&encoded));

    Ok(HashResponse {
        algorithm,
        hmac: key.is_some(),
        digest: encoded,
        length_bits: bytes.len() * 8,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, algorithm: &str) -> HashRequest {
        HashRequest {
            text: text.to_string(),
            algorithm: algorithm.to_string(),
            hmac_key: None,
            expected: None,
            uppercase: false,
        }
    }

    #[test]
    fn sha256_of_abc() {
        let out = run(request("abc", "SHA-256")).unwrap();
        assert_eq!(
            out.digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(out.length_bits, 256);
        assert!(!out.hmac);
    }

    #[test]
    fn sha512_length() {
        let out = run(request("", "sha512")).unwrap();
        assert_eq!(out.digest.len(), 128);
        assert!(out.digest.starts_with("cf83e1357eefb8bd"));
    }

    #[test]
    fn hmac_sha256_known_vector() {
        // RFC 4231 test case 2
        let mut req = request("what do ya want for nothing?", "sha256");
        req.hmac_key = Some("Jefe".to_string());
        let out = run(req).unwrap();
        assert_eq!(
            out.digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert!(out.hmac);
    }

    #[test]
    fn compares_against_expected_digest() {
        let mut req = request("abc", "sha256");
        req.expected =
            Some("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD".to_string());
        assert_eq!(run(req).unwrap().matches, Some(true));

        let mut req = request("abd", "sha256");
        req.expected = Some("ba7816bf".to_string());
        assert_eq!(run(req).unwrap().matches, Some(false));
    }

    #[test]
    fn legacy_algorithms_are_unsupported() {
        assert!(matches!(parse_algorithm("MD5"), Err(ToolError::Unsupported(_))));
        assert!(matches!(parse_algorithm("sha-1"), Err(ToolError::Unsupported(_))));
        assert!(matches!(parse_algorithm("crc32"), Err(ToolError::InvalidInput(_))));
    }
}
