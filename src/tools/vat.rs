use super::{round_to, ToolError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VatMode {
    /// `amount` is net; VAT is added on top.
    #[default]
    Add,
    /// `amount` is gross; VAT is extracted from it.
    Remove,
}

#[derive(Debug, Deserialize)]
pub struct VatRequest {
    pub amount: f64,
    /// Percent, e.g. `20` for 20%.
    pub rate: f64,
    #[serde(default)]
    pub mode: VatMode,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct VatResponse {
    pub net: f64,
    pub vat: f64,
    pub gross: f64,
    pub rate: f64,
}

pub fn run(req: VatRequest) -> Result<VatResponse, ToolError> {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(ToolError::InvalidInput(
            "amount must be a non-negative number".to_string(),
        ));
    }
    if !req.rate.is_finite() || !(0.0..=100.0).contains(&req.rate) {
        return Err(ToolError::InvalidInput(
            "rate must be between 0 and 100 percent".to_string(),
        ));
    }

    let factor = req.rate / 100.0;
    let (net, gross) = match req.mode {
        VatMode::Add => {
            let net = round_to(req.amount, 2);
            (net, round_to(net * (1.0 + factor), 2))
        }
        VatMode::Remove => {
            let gross = round_to(req.amount, 2);
            (round_to(gross / (1.0 + factor), 2), gross)
        }
    };

    // Derived from the rounded figures so net + vat == gross to the cent.
    Ok(VatResponse {
        net,
        vat: round_to(gross - net, 2),
        gross,
        rate: req.rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(amount: f64, rate: f64, mode: VatMode) -> VatResponse {
        run(VatRequest { amount, rate, mode }).unwrap()
    }

    #[test]
    fn adds_vat_to_net() {
        let out = calc(100.0, 20.0, VatMode::Add);
        assert_eq!((out.net, out.vat, out.gross), (100.0, 20.0, 120.0));
    }

    #[test]
    fn extracts_vat_from_gross() {
        let out = calc(120.0, 20.0, VatMode::Remove);
        assert_eq!((out.net, out.vat, out.gross), (100.0, 20.0, 120.0));

        let out = calc(10.0, 19.0, VatMode::Remove);
        assert_eq!((out.net, out.vat, out.gross), (8.4, 1.6, 10.0));
    }

    #[test]
    fn zero_rate_is_identity() {
        let out = calc(42.5, 0.0, VatMode::Add);
        assert_eq!((out.net, out.vat, out.gross), (42.5, 0.0, 42.5));
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(run(VatRequest { amount: -1.0, rate: 20.0, mode: VatMode::Add }).is_err());
        assert!(run(VatRequest { amount: 1.0, rate: 150.0, mode: VatMode::Add }).is_err());
        assert!(run(VatRequest { amount: f64::NAN, rate: 20.0, mode: VatMode::Add }).is_err());
    }
}
