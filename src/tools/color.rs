use super::{round_to, ToolError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ColorRequest {
    /// `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `hsl(h, s%, l%)`.
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[derive(Debug, Serialize)]
pub struct ColorResponse {
    pub hex: String,
    pub rgb: Rgb,
    pub hsl: Hsl,
    pub rgb_css: String,
    pub hsl_css: String,
}

fn invalid(value: &str) -> ToolError {
    ToolError::InvalidInput(format!("unrecognised color '{}'", value))
}

pub fn parse_hex(value: &str) -> Result<Rgb, ToolError> {
    let digits = value.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid(value)),
    };

    let channel = |i: usize| {
        expanded
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| invalid(value))
    };

    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Pulls the comma separated numbers out of `name(a, b, c)`, ignoring `%`.
fn function_args(value: &str, name: &str) -> Option<Vec<f64>> {
    let inner = value
        .trim()
        .to_ascii_lowercase()
        .strip_prefix(name)?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?
        .to_string();

    inner
        .split(',')
        .map(|part| part.trim().trim_end_matches('%').trim().parse::<f64>().ok())
        .collect()
}

pub fn to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: round_to(l * 100.0, 1),
        };
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    Hsl {
        h: round_to(h, 1),
        s: round_to(s * 100.0, 1),
        l: round_to(l * 100.0, 1),
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h.rem_euclid(360.0);
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}

pub fn parse_color(value: &str) -> Result<Rgb, ToolError> {
    let trimmed = value.trim();

    if let Some(args) = function_args(trimmed, "rgb") {
        let [r, g, b] = args.as_slice() else {
            return Err(invalid(value));
        };
        let channel = |v: f64| {
            if (0.0..=255.0).contains(&v) {
                Ok(v.round() as u8)
            } else {
                Err(invalid(value))
            }
        };
        return Ok(Rgb {
            r: channel(*r)?,
            g: channel(*g)?,
            b: channel(*b)?,
        });
    }

    if let Some(args) = function_args(trimmed, "hsl") {
        let [h, s, l] = args.as_slice() else {
            return Err(invalid(value));
        };
        if !h.is_finite() || !(0.0..=100.0).contains(s) || !(0.0..=100.0).contains(l) {
            return Err(invalid(value));
        }
        return Ok(hsl_to_rgb(Hsl { h: *h, s: *s, l: *l }));
    }

    parse_hex(trimmed)
}

pub fn run(req: ColorRequest) -> Result<ColorResponse, ToolError> {
    let rgb = parse_color(&req.value)?;
    let hsl = rgb_to_hsl(rgb);

    Ok(ColorResponse {
        hex: to_hex(rgb),
        rgb_css: format!("rgb({}, {}, {})", rgb.r, rgb.g, rgb.b),
        hsl_css: format!("hsl({}, {}%, {}%)", hsl.h, hsl.s, hsl.l),
        rgb,
        hsl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(parse_hex("#ff8000").unwrap(), Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(parse_hex("0F0").unwrap(), Rgb { r: 0, g: 255, b: 0 });
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#gggggg").is_err());
    }

    #[test]
    fn red_in_every_notation() {
        let out = run(ColorRequest {
            value: "#FF0000".to_string(),
        })
        .unwrap();
        assert_eq!(out.hex, "#ff0000");
        assert_eq!(out.hsl, Hsl { h: 0.0, s: 100.0, l: 50.0 });
        assert_eq!(out.rgb_css, "rgb(255, 0, 0)");
        assert_eq!(out.hsl_css, "hsl(0, 100%, 50%)");
    }

    #[test]
    fn hsl_input_converts_to_hex() {
        let out = run(ColorRequest {
            value: "hsl(120, 100%, 25%)".to_string(),
        })
        .unwrap();
        assert_eq!(out.hex, "#008000");
    }

    #[test]
    fn rgb_input_and_grey() {
        let out = run(ColorRequest {
            value: "RGB( 128 , 128 , 128 )".to_string(),
        })
        .unwrap();
        assert_eq!(out.hex, "#808080");
        assert_eq!(out.hsl.s, 0.0);
    }

    #[test]
    fn rejects_out_of_range_channels() {
        assert!(parse_color("rgb(256, 0, 0)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(parse_color("hsl(10, 150%, 50%)").is_err());
        assert!(matches!(
            parse_color("hsl(NaN, 50%, 50%)"),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(parse_color("hsl(inf, 50%, 50%)").is_err());
        assert!(parse_color("blue").is_err());
    }
}
