use super::{round_to, ToolError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?~";
const AMBIGUOUS: &str = "Il1O0o|";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const MAX_COUNT: usize = 50;

fn yes() -> bool {
    true
}

fn default_length() -> usize {
    16
}

fn default_count() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordRequest {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "yes")]
    pub uppercase: bool,
    #[serde(default = "yes")]
    pub lowercase: bool,
    #[serde(default = "yes")]
    pub digits: bool,
    #[serde(default)]
    pub symbols: bool,
    #[serde(default)]
    pub exclude_ambiguous: bool,
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for PasswordRequest {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: false,
            exclude_ambiguous: false,
            count: default_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PasswordResponse {
    pub passwords: Vec<String>,
    pub entropy_bits: f64,
    pub strength: Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryWeak,
    Weak,
    Reasonable,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn from_entropy(bits: f64) -> Self {
        match bits {
            b if b < 28.0 => Strength::VeryWeak,
            b if b < 36.0 => Strength::Weak,
            b if b < 60.0 => Strength::Reasonable,
            b if b < 128.0 => Strength::Strong,
            _ => Strength::VeryStrong,
        }
    }
}

/// Selected character classes, each already stripped of ambiguous characters if asked.
fn character_classes(req: &PasswordRequest) -> Vec<Vec<char>> {
    [
        (req.uppercase, UPPERCASE),
        (req.lowercase, LOWERCASE),
        (req.digits, DIGITS),
        (req.symbols, SYMBOLS),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, chars)| {
        chars
            .chars()
            .filter(|c| !(req.exclude_ambiguous && AMBIGUOUS.contains(*c)))
            .collect()
    })
    .collect()
}

fn validate(req: &PasswordRequest, classes: &[Vec<char>]) -> Result<(), ToolError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&req.length) {
        return Err(ToolError::InvalidInput(format!(
            "length must be between {} and {}",
            MIN_LENGTH, MAX_LENGTH
        )));
    }
    if !(1..=MAX_COUNT).contains(&req.count) {
        return Err(ToolError::InvalidInput(format!(
            "count must be between 1 and {}",
            MAX_COUNT
        )));
    }
    if classes.is_empty() {
        return Err(ToolError::InvalidInput(
            "select at least one character class".to_string(),
        ));
    }
    Ok(())
}

pub fn entropy_bits(length: usize, pool_size: usize) -> f64 {
    if pool_size == 0 {
        return 0.0;
    }
    length as f64 * (pool_size as f64).log2()
}

/// One character from every selected class is placed first, the rest is drawn
/// from the union, then the whole password is shuffled.
pub fn generate_with<R: Rng + ?Sized>(
    req: &PasswordRequest,
    rng: &mut R,
) -> Result<PasswordResponse, ToolError> {
    let classes = character_classes(req);
    validate(req, &classes)?;

    let pool: Vec<char> = classes.iter().flatten().copied().collect();
    let mut passwords = Vec::with_capacity(req.count);

    for _ in 0..req.count {
        let mut chars: Vec<char> = classes
            .iter()
            .filter_map(|class| class.choose(&mut *rng).copied())
            .collect();
        while chars.len() < req.length {
            if let Some(c) = pool.choose(&mut *rng) {
                chars.push(*c);
            }
        }
        chars.shuffle(&mut *rng);
        passwords.push(chars.into_iter().collect());
    }

    let entropy = entropy_bits(req.length, pool.len());
    Ok(PasswordResponse {
        passwords,
        entropy_bits: round_to(entropy, 1),
        strength: Strength::from_entropy(entropy),
    })
}

pub fn run(req: PasswordRequest) -> Result<PasswordResponse, ToolError> {
    generate_with(&req, &mut rand::thread_rng())
}
