// Salary & Currency Normalisation

use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "north-america";

/// Currencies trend records are reported in, keyed by market region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
    Jpy,
    Brl,
    Zar,
    Aed,
}

impl Currency {
    /// Unknown regions report in USD
    pub fn for_region(region: &str) -> Self {
        match region.trim().to_ascii_lowercase().as_str() {
            "europe" => Currency::Eur,
            "asia-pacific" => Currency::Jpy,
            "south-america" => Currency::Brl,
            "africa" => Currency::Zar,
            "middle-east" => Currency::Aed,
            _ => Currency::Usd,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Brl => "BRL",
            Currency::Zar => "ZAR",
            Currency::Aed => "AED",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Jpy => "¥",
            Currency::Brl => "R$",
            Currency::Zar => "R",
            Currency::Aed => "د.إ",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Jpy => "Japanese Yen",
            Currency::Brl => "Brazilian Real",
            Currency::Zar => "South African Rand",
            Currency::Aed => "UAE Dirham",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Structured salary breakdown attached to every trend record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryData {
    pub currency_code: String,
    pub currency_symbol: String,
    pub currency_name: String,
    pub base_salary: f64,
    pub formatted_salary: String,
    pub salary_range: SalaryRange,
}

impl SalaryData {
    pub fn new(base_salary: f64, currency: Currency) -> Self {
        let base = if base_salary.is_finite() {
            base_salary.max(0.0)
        } else {
            0.0
        };

        Self {
            currency_code: currency.code().to_string(),
            currency_symbol: currency.symbol().to_string(),
            currency_name: currency.name().to_string(),
            base_salary: base,
            formatted_salary: format!("{}{}", currency.symbol(), group_thousands(base)),
            salary_range: SalaryRange {
                min: base * 0.8,
                max: base * 1.2,
                median: base,
            },
        }
    }

    pub fn for_region(base_salary: f64, region: &str) -> Self {
        Self::new(base_salary, Currency::for_region(region))
    }
}

/// Whole-number rendering with comma separators, e.g. 85000.4 -> "85,000"
fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.round());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_currency_mapping() {
        assert_eq!(Currency::for_region("europe").code(), "EUR");
        assert_eq!(Currency::for_region("asia-pacific").code(), "JPY");
        assert_eq!(Currency::for_region("middle-east").symbol(), "د.إ");
        assert_eq!(Currency::for_region("antarctica").code(), "USD");
    }

    #[test]
    fn test_salary_range_and_formatting() {
        let salary = SalaryData::for_region(85_000.0, DEFAULT_REGION);
        assert_eq!(salary.formatted_salary, "$85,000");
        assert_eq!(salary.salary_range.min, 68_000.0);
        assert_eq!(salary.salary_range.max, 102_000.0);
        assert_eq!(salary.salary_range.median, 85_000.0);
    }

    #[test]
    fn test_group_thousands_edges() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(1_234_567.6), "1,234,568");
    }

    #[test]
    fn test_negative_base_is_floored() {
        let salary = SalaryData::for_region(-10.0, "europe");
        assert_eq!(salary.base_salary, 0.0);
        assert_eq!(salary.formatted_salary, "€0");
    }
}
