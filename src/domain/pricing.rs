//! Line-item pricing
//!
//! One rule prices every line, whether it feeds the editable grid, a list
//! total or a generated document: `quantity × unit price − discount`, where a
//! symbolic quantity (`Forfait`, `Ensemble`) or a blank one contributes no
//! multiplier.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::repositories::LineItem;

/// Symbolic quantities meaning "unit pricing, no multiplier"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityToken {
    Forfait,
    Ensemble,
}

impl QuantityToken {
    pub const ALL: [QuantityToken; 2] = [QuantityToken::Forfait, QuantityToken::Ensemble];

    pub fn as_str(self) -> &'static str {
        match self {
            QuantityToken::Forfait => "Forfait",
            QuantityToken::Ensemble => "Ensemble",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

/// Interpreted content of the `quantite` TEXT column
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Numeric(Decimal),
    Token(QuantityToken),
    /// Blank, or legacy text that is not a number
    Unspecified(String),
}

impl Quantity {
    /// Strict parse used when the operator saves a form.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Quantity::Unspecified(String::new()));
        }
        if let Some(token) = QuantityToken::from_label(trimmed) {
            return Ok(Quantity::Token(token));
        }
        parse_decimal(trimmed)
            .filter(within_bounds)
            .map(Quantity::Numeric)
            .ok_or_else(|| DomainError::validation(format!("Quantité invalide : {}", trimmed)))
    }

    /// Lenient reading of stored values: anything unparseable prices like a token.
    pub fn interpret(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|_| Quantity::Unspecified(raw.trim().to_string()))
    }

    pub fn multiplier(&self) -> Option<Decimal> {
        match self {
            Quantity::Numeric(q) => Some(*q),
            Quantity::Token(_) | Quantity::Unspecified(_) => None,
        }
    }
}

/// Largest magnitude accepted for a typed quantity, price or discount
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

pub fn within_bounds(value: &Decimal) -> bool {
    value.abs() <= MAX_AMOUNT
}

/// Parse an operator-entered decimal, accepting `,` or `.` as separator.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

/// Stored REAL → Decimal
pub fn money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Decimal → stored REAL
pub fn to_store(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// How a flat discount combines with a numeric quantity.
///
/// Early invoice templates applied the discount to every unit; the live grid
/// and the quote template subtract it once per line. Both are kept so the
/// business owner can pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingFormula {
    /// `quantity × price − discount`
    #[default]
    DiscountOnLine,
    /// `quantity × (price − discount)`
    DiscountPerUnit,
}

impl FromStr for PricingFormula {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "discount_on_line" | "line" => Ok(PricingFormula::DiscountOnLine),
            "discount_per_unit" | "per_unit_discount" | "per_unit" => {
                Ok(PricingFormula::DiscountPerUnit)
            }
            other => Err(DomainError::validation(format!(
                "Unknown pricing formula '{}'",
                other
            ))),
        }
    }
}

/// Un-discounted and discounted amount of a line or of a sum of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineAmounts {
    pub gross: Decimal,
    pub net: Decimal,
}

impl LineAmounts {
    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        Ok(LineAmounts {
            gross: checked(self.gross.checked_add(rhs.gross))?,
            net: checked(self.net.checked_add(rhs.net))?,
        })
    }
}

fn checked(value: Option<Decimal>) -> Result<Decimal, DomainError> {
    value.ok_or_else(|| DomainError::validation("Montant trop élevé"))
}

/// Running totals of a dossier. `options` is `None` when the dossier has no
/// option at all, which is what drops the "AVEC OPTIONS" lines from documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DossierTotals {
    pub products: LineAmounts,
    pub options: Option<LineAmounts>,
}

impl DossierTotals {
    pub fn with_options(&self) -> Result<Option<LineAmounts>, DomainError> {
        self.options
            .map(|o| self.products.checked_add(o))
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub formula: PricingFormula,
    /// Deposit requested at signing, in percent of the discounted total
    pub deposit_percent: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            formula: PricingFormula::DiscountOnLine,
            deposit_percent: Decimal::from(50),
        }
    }
}

impl PricingPolicy {
    /// Amounts of one line. Fails with `Validation` when they do not fit a
    /// `Decimal`, which only stored values past the form bounds can reach.
    pub fn line_amounts(
        &self,
        quantity: &Quantity,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Result<LineAmounts, DomainError> {
        match quantity.multiplier() {
            None => Ok(LineAmounts {
                gross: unit_price,
                net: checked(unit_price.checked_sub(discount))?,
            }),
            Some(q) => {
                let gross = checked(q.checked_mul(unit_price))?;
                let net = match self.formula {
                    PricingFormula::DiscountOnLine => checked(gross.checked_sub(discount))?,
                    PricingFormula::DiscountPerUnit => {
                        checked(unit_price.checked_sub(discount).and_then(|u| q.checked_mul(u)))?
                    }
                };
                Ok(LineAmounts { gross, net })
            }
        }
    }

    pub fn price_item(&self, item: &LineItem) -> Result<LineAmounts, DomainError> {
        self.line_amounts(&item.quantity(), money(item.prix), money(item.remise))
    }

    fn sum(&self, items: &[LineItem]) -> Result<LineAmounts, DomainError> {
        items.iter().try_fold(LineAmounts::default(), |acc, item| {
            acc.checked_add(self.price_item(item)?)
        })
    }

    pub fn totals(
        &self,
        products: &[LineItem],
        options: &[LineItem],
    ) -> Result<DossierTotals, DomainError> {
        let options_total = if options.is_empty() {
            None
        } else {
            Some(self.sum(options)?)
        };

        Ok(DossierTotals {
            products: self.sum(products)?,
            options: options_total,
        })
    }

    pub fn deposit(&self, total: Decimal) -> Result<Decimal, DomainError> {
        checked(
            total
                .checked_mul(self.deposit_percent)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_token_quantity_ignores_multiplier() {
        let policy = PricingPolicy::default();
        for token in QuantityToken::ALL {
            let q = Quantity::parse(token.as_str()).unwrap();
            let amounts = policy.line_amounts(&q, dec("250"), dec("30")).unwrap();
            assert_eq!(amounts.gross, dec("250"));
            assert_eq!(amounts.net, dec("220"));
        }
    }

    #[test]
    fn test_numeric_quantity_discount_once_per_line() {
        let policy = PricingPolicy::default();
        let q = Quantity::parse("2,5").unwrap();
        let amounts = policy.line_amounts(&q, dec("40"), dec("10")).unwrap();
        assert_eq!(amounts.gross, dec("100"));
        assert_eq!(amounts.net, dec("90"));
    }

    #[test]
    fn test_per_unit_formula_is_opt_in() {
        let policy = PricingPolicy {
            formula: PricingFormula::DiscountPerUnit,
            ..PricingPolicy::default()
        };
        let q = Quantity::parse("3").unwrap();
        assert_eq!(
            policy.line_amounts(&q, dec("40"), dec("10")).unwrap().net,
            dec("90")
        );

        // Tokens price the same under both formulas
        let forfait = Quantity::Token(QuantityToken::Forfait);
        assert_eq!(
            policy.line_amounts(&forfait, dec("40"), dec("10")).unwrap().net,
            dec("30")
        );
    }

    #[test]
    fn test_blank_and_legacy_quantities() {
        assert_eq!(
            Quantity::parse("  ").unwrap(),
            Quantity::Unspecified(String::new())
        );
        assert!(matches!(
            Quantity::parse("beaucoup"),
            Err(DomainError::Validation(_))
        ));
        let legacy = Quantity::interpret("beaucoup");
        assert_eq!(legacy.multiplier(), None);
    }

    #[test]
    fn test_deposit_uses_percentage() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.deposit(dec("1000")).unwrap(), dec("500"));

        let thirty = PricingPolicy {
            deposit_percent: dec("30"),
            ..PricingPolicy::default()
        };
        assert_eq!(thirty.deposit(dec("1234.50")).unwrap(), dec("370.35"));
    }

    #[test]
    fn test_out_of_range_quantity_is_rejected() {
        assert!(matches!(
            Quantity::parse("79228162514264337593543950335"),
            Err(DomainError::Validation(_))
        ));
        assert!(Quantity::parse("1000000000").is_ok());
        assert!(Quantity::parse("-1000000001").is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let policy = PricingPolicy::default();
        let huge = Quantity::Numeric(Decimal::MAX);
        assert!(matches!(
            policy.line_amounts(&huge, dec("2"), Decimal::ZERO),
            Err(DomainError::Validation(_))
        ));
        assert!(policy.deposit(Decimal::MAX).is_err());

        let big = LineAmounts {
            gross: Decimal::MAX,
            net: Decimal::MAX,
        };
        assert!(big.checked_add(big).is_err());
    }

    #[test]
    fn test_formula_from_str() {
        assert_eq!(
            "per_unit_discount".parse::<PricingFormula>().unwrap(),
            PricingFormula::DiscountPerUnit
        );
        assert!("whatever".parse::<PricingFormula>().is_err());
    }
}
