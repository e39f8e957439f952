use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidValuationInputError;
use crate::scoring::round2;
use crate::scoring_tables::SATURATION;

pub const MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiBasis {
    Delta,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionFormula {
    /// `min(score/100 * value * k, value * cap_multiple)`.
    LinearToCap { k: f64, cap_multiple: f64 },
    FixedCeiling { ceiling: f64, basis: RoiBasis },
    RatioRoi,
    XgGrowth,
}

impl Default for ProjectionFormula {
    fn default() -> Self {
        Self::linear_to_cap()
    }
}

impl ProjectionFormula {
    pub const NAMES: [&'static str; 6] = [
        "linear",
        "ceiling-50m",
        "ceiling-80m",
        "ceiling-100m",
        "ratio",
        "xg-growth",
    ];

    pub fn linear_to_cap() -> Self {
        Self::LinearToCap {
            k: 2.3,
            cap_multiple: 4.0,
        }
    }

    pub fn ceiling_50m() -> Self {
        Self::FixedCeiling {
            ceiling: 50.0 * MILLION,
            basis: RoiBasis::Delta,
        }
    }

    pub fn ceiling_80m() -> Self {
        Self::FixedCeiling {
            ceiling: 80.0 * MILLION,
            basis: RoiBasis::Percent,
        }
    }

    pub fn ceiling_100m() -> Self {
        Self::FixedCeiling {
            ceiling: 100.0 * MILLION,
            basis: RoiBasis::Percent,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::LinearToCap { .. } => "linear".to_string(),
            Self::FixedCeiling { ceiling, .. } => format!("ceiling-{}m", ceiling / MILLION),
            Self::RatioRoi => "ratio".to_string(),
            Self::XgGrowth => "xg-growth".to_string(),
        }
    }
}

impl fmt::Display for ProjectionFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ProjectionFormula {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linear" | "linear-to-cap" => Ok(Self::linear_to_cap()),
            "ceiling-50m" => Ok(Self::ceiling_50m()),
            "ceiling-80m" => Ok(Self::ceiling_80m()),
            "ceiling-100m" => Ok(Self::ceiling_100m()),
            "ratio" | "ratio-roi" => Ok(Self::RatioRoi),
            "xg-growth" => Ok(Self::XgGrowth),
            other => Err(format!(
                "unknown projection formula '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RoiTier {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 15.0 {
            RoiTier::Excellent
        } else if ratio > 10.0 {
            RoiTier::Good
        } else if ratio > 5.0 {
            RoiTier::Fair
        } else {
            RoiTier::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoiTier::Excellent => "excellent",
            RoiTier::Good => "good",
            RoiTier::Fair => "fair",
            RoiTier::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Roi {
    Delta { amount: f64 },
    Percent { percent: f64 },
    Tier { ratio: f64, tier: RoiTier },
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roi::Delta { amount } => write!(f, "{}", format_euros(*amount)),
            Roi::Percent { percent } => write!(f, "{percent:+.1}%"),
            Roi::Tier { ratio, tier } => write!(f, "{ratio:.2} ({})", tier.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub formula: ProjectionFormula,
    pub current_value: f64,
    pub future_value: Option<f64>,
    pub roi: Roi,
    pub adjusted_score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionContext {
    pub xg_per90: Option<f64>,
}

pub fn project(
    score: f64,
    current_value: f64,
    formula: ProjectionFormula,
) -> Result<ValuationResult, InvalidValuationInputError> {
    project_with(score, current_value, formula, ProjectionContext::default())
}

pub fn project_with(
    score: f64,
    current_value: f64,
    formula: ProjectionFormula,
    ctx: ProjectionContext,
) -> Result<ValuationResult, InvalidValuationInputError> {
    if !current_value.is_finite() || current_value <= 0.0 {
        return Err(InvalidValuationInputError::NotPositive(current_value));
    }

    let (future_value, roi) = match formula {
        ProjectionFormula::LinearToCap { k, cap_multiple } => {
            let future = (score / 100.0 * current_value * k).min(current_value * cap_multiple);
            (Some(future), roi_for(future, current_value, RoiBasis::Percent))
        }
        ProjectionFormula::FixedCeiling { ceiling, basis } => {
            let future = score / 100.0 * ceiling;
            (Some(future), roi_for(future, current_value, basis))
        }
        ProjectionFormula::RatioRoi => {
            let ratio = score / (current_value / MILLION);
            (
                None,
                Roi::Tier {
                    ratio,
                    tier: RoiTier::from_ratio(ratio),
                },
            )
        }
        ProjectionFormula::XgGrowth => {
            let future = current_value * (1.5 + ctx.xg_per90.unwrap_or(0.0));
            (Some(future), roi_for(future, current_value, RoiBasis::Percent))
        }
    };

    Ok(ValuationResult {
        formula,
        current_value,
        future_value,
        roi,
        adjusted_score: adjust_score_for_value(score, current_value),
    })
}

pub fn project_text(
    score: f64,
    text: &str,
    formula: ProjectionFormula,
    ctx: ProjectionContext,
) -> Result<ValuationResult, InvalidValuationInputError> {
    let value = parse_valuation(text)?;
    project_with(score, value, formula, ctx)
}

fn roi_for(future: f64, current: f64, basis: RoiBasis) -> Roi {
    match basis {
        RoiBasis::Delta => Roi::Delta {
            amount: future - current,
        },
        RoiBasis::Percent => Roi::Percent {
            percent: (future - current) / current * 100.0,
        },
    }
}

pub fn adjust_score_for_value(score: f64, current_value: f64) -> f64 {
    let multiplier = if current_value < 2.0 * MILLION {
        1.10
    } else if current_value < 5.0 * MILLION {
        1.05
    } else if current_value > 15.0 * MILLION {
        0.95
    } else {
        1.0
    };
    round2(score * multiplier).min(SATURATION)
}

const SUFFIXES: &[(&str, f64)] = &[
    ("million", MILLION),
    ("mil", MILLION),
    ("mn", MILLION),
    ("m", MILLION),
    ("thousand", 1_000.0),
    ("k", 1_000.0),
];

/// Parses user-entered valuations such as `10m`, `€8,000,000`, `2.5 million` or `750k`.
pub fn parse_valuation(text: &str) -> Result<f64, InvalidValuationInputError> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return Err(InvalidValuationInputError::Empty);
    }

    let cleaned: String = lowered
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£' | ',' | '_') && !c.is_whitespace())
        .collect();

    let (number, multiplier) = SUFFIXES
        .iter()
        .find_map(|(suffix, mult)| cleaned.strip_suffix(suffix).map(|rest| (rest, *mult)))
        .unwrap_or((cleaned.as_str(), 1.0));

    let unparsable = || InvalidValuationInputError::Unparsable(text.trim().to_string());
    let base: f64 = number.parse().map_err(|_| unparsable())?;
    let value = base * multiplier;
    if !value.is_finite() {
        return Err(unparsable());
    }
    if value <= 0.0 {
        return Err(InvalidValuationInputError::NotPositive(value));
    }
    Ok(value)
}

pub fn format_euros(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_and_punctuated_values_agree() {
        assert_eq!(parse_valuation("10m").unwrap(), 10_000_000.0);
        assert_eq!(parse_valuation("€8,000,000").unwrap(), 8_000_000.0);
        assert_eq!(parse_valuation("€10,000,000").unwrap(), parse_valuation("10m").unwrap());
        assert_eq!(parse_valuation(" 2.5 Million ").unwrap(), 2_500_000.0);
        assert_eq!(parse_valuation("750k").unwrap(), 750_000.0);
        assert_eq!(parse_valuation("1.5m").unwrap(), 1_500_000.0);
    }

    #[test]
    fn rejects_empty_garbage_and_non_positive() {
        assert_eq!(parse_valuation("   "), Err(InvalidValuationInputError::Empty));
        assert!(matches!(
            parse_valuation("lots"),
            Err(InvalidValuationInputError::Unparsable(_))
        ));
        assert!(matches!(
            parse_valuation("0"),
            Err(InvalidValuationInputError::NotPositive(_))
        ));
        assert!(matches!(
            parse_valuation("-3m"),
            Err(InvalidValuationInputError::NotPositive(_))
        ));
        assert!(matches!(
            parse_valuation("inf"),
            Err(InvalidValuationInputError::Unparsable(_))
        ));
        assert_eq!(
            parse_valuation("1e308m"),
            Err(InvalidValuationInputError::Unparsable("1e308m".to_string()))
        );
    }

    #[test]
    fn linear_projection_caps_at_multiple() {
        let v = project(80.0, 10.0 * MILLION, ProjectionFormula::linear_to_cap()).unwrap();
        let future = v.future_value.unwrap();
        assert!((future - 18_400_000.0).abs() < 1e-6);

        let capped = ProjectionFormula::LinearToCap {
            k: 10.0,
            cap_multiple: 4.0,
        };
        let v = project(90.0, MILLION, capped).unwrap();
        assert_eq!(v.future_value, Some(4.0 * MILLION));
        assert_eq!(v.roi, Roi::Percent { percent: 300.0 });
    }

    #[test]
    fn fixed_ceiling_ignores_current_value() {
        let a = project(50.0, 5.0 * MILLION, ProjectionFormula::ceiling_50m()).unwrap();
        let b = project(50.0, 20.0 * MILLION, ProjectionFormula::ceiling_50m()).unwrap();
        assert_eq!(a.future_value, Some(25.0 * MILLION));
        assert_eq!(a.future_value, b.future_value);
        assert_eq!(a.roi, Roi::Delta { amount: 20.0 * MILLION });
        assert_eq!(b.roi, Roi::Delta { amount: 5.0 * MILLION });

        let pct = project(50.0, 20.0 * MILLION, ProjectionFormula::ceiling_100m()).unwrap();
        assert_eq!(pct.roi, Roi::Percent { percent: 150.0 });
    }

    #[test]
    fn ratio_roi_bands() {
        let v = project(80.0, 4.0 * MILLION, ProjectionFormula::RatioRoi).unwrap();
        assert_eq!(v.future_value, None);
        assert_eq!(
            v.roi,
            Roi::Tier {
                ratio: 20.0,
                tier: RoiTier::Excellent
            }
        );
        assert_eq!(RoiTier::from_ratio(15.0), RoiTier::Good);
        assert_eq!(RoiTier::from_ratio(10.5), RoiTier::Good);
        assert_eq!(RoiTier::from_ratio(6.0), RoiTier::Fair);
        assert_eq!(RoiTier::from_ratio(5.0), RoiTier::Poor);
    }

    #[test]
    fn xg_growth_uses_context() {
        let ctx = ProjectionContext { xg_per90: Some(0.5) };
        let v = project_with(60.0, 4.0 * MILLION, ProjectionFormula::XgGrowth, ctx).unwrap();
        assert_eq!(v.future_value, Some(8.0 * MILLION));
        assert_eq!(v.roi, Roi::Percent { percent: 100.0 });
    }

    #[test]
    fn non_positive_current_value_is_rejected() {
        assert!(project(70.0, 0.0, ProjectionFormula::default()).is_err());
        assert!(project(70.0, -1.0, ProjectionFormula::RatioRoi).is_err());
    }

    #[test]
    fn adjusted_score_tiers() {
        assert_eq!(adjust_score_for_value(80.0, 1.0 * MILLION), 88.0);
        assert_eq!(adjust_score_for_value(80.0, 3.0 * MILLION), 84.0);
        assert_eq!(adjust_score_for_value(80.0, 10.0 * MILLION), 80.0);
        assert_eq!(adjust_score_for_value(80.0, 20.0 * MILLION), 76.0);
        assert_eq!(adjust_score_for_value(98.0, 1.0 * MILLION), 100.0);
    }

    #[test]
    fn formulas_round_trip_through_names() {
        for name in ProjectionFormula::NAMES {
            let formula: ProjectionFormula = name.parse().unwrap();
            assert_eq!(formula.name(), name);
        }
        assert!("quadratic".parse::<ProjectionFormula>().is_err());
    }

    #[test]
    fn euros_are_grouped() {
        assert_eq!(format_euros(12_500_000.0), "€12,500,000");
        assert_eq!(format_euros(-950.4), "-€950");
        assert_eq!(format_euros(0.0), "€0");
    }
}
