//! Document totals calculator.
//!
//! Pure arithmetic over line items: no I/O, no entity types. The document
//! lifecycle calls [`compute`] on every save so stored totals are always a
//! function of the current lines and never drift.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::entities::document::DocumentStatus;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Input for one line: quantities and rates, before any derived columns.
#[derive(Debug, Clone)]
pub struct LineInput {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Percent discount on the line; takes precedence over the fixed
    /// amount when positive
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub tax_percent: Decimal,
}

/// Derived columns for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTotals {
    pub discount_amount: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Derived totals for a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTotals {
    /// Sum of line subtotals after line discounts, minus the general
    /// discount
    pub subtotal: Decimal,
    /// Line discounts plus the general discount
    pub total_discount: Decimal,
    pub total_tax: Decimal,
    /// `subtotal + total_tax`
    pub total_amount: Decimal,
    pub lines: Vec<LineTotals>,
}

impl DocumentTotals {
    /// All-zero totals, kept on drafts until they are issued.
    pub fn zeroed(line_count: usize) -> Self {
        Self {
            subtotal: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            lines: vec![
                LineTotals {
                    discount_amount: Decimal::ZERO,
                    subtotal: Decimal::ZERO,
                    tax_amount: Decimal::ZERO,
                    total: Decimal::ZERO,
                };
                line_count
            ],
        }
    }
}

/// Computes document totals from line inputs and the general discount.
///
/// Per line: gross = quantity * unit_price; the percent discount wins over
/// the fixed one when positive; tax applies to the discounted line
/// subtotal. The general discount (again percent-over-fixed) then comes
/// off the summed subtotal; line taxes are not re-derived after it.
pub fn compute(
    lines: &[LineInput],
    general_discount: Decimal,
    general_discount_percent: Decimal,
) -> DocumentTotals {
    let mut subtotal = Decimal::ZERO;
    let mut line_discounts = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut line_totals = Vec::with_capacity(lines.len());

    for line in lines {
        let gross = line.quantity * line.unit_price;
        let discount = if line.discount_percent > Decimal::ZERO {
            gross * line.discount_percent / HUNDRED
        } else {
            line.discount_amount
        };
        let line_subtotal = gross - discount;
        let tax = line_subtotal * line.tax_percent / HUNDRED;

        subtotal += line_subtotal;
        line_discounts += discount;
        total_tax += tax;
        line_totals.push(LineTotals {
            discount_amount: discount,
            subtotal: line_subtotal,
            tax_amount: tax,
            total: line_subtotal + tax,
        });
    }

    let general = if general_discount_percent > Decimal::ZERO {
        subtotal * general_discount_percent / HUNDRED
    } else {
        general_discount
    };
    let subtotal = subtotal - general;

    DocumentTotals {
        subtotal,
        total_discount: line_discounts + general,
        total_tax,
        total_amount: subtotal + total_tax,
        lines: line_totals,
    }
}

/// Payment-driven status for invoices.
pub fn derive_status(
    total_amount: Decimal,
    paid_amount: Decimal,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DocumentStatus {
    if total_amount > Decimal::ZERO && paid_amount >= total_amount {
        DocumentStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        DocumentStatus::PartiallyPaid
    } else if due_date.is_some_and(|due| due < now) {
        DocumentStatus::Overdue
    } else {
        DocumentStatus::Issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(
        quantity: Decimal,
        unit_price: Decimal,
        discount_percent: Decimal,
        discount_amount: Decimal,
        tax_percent: Decimal,
    ) -> LineInput {
        LineInput {
            quantity,
            unit_price,
            discount_percent,
            discount_amount,
            tax_percent,
        }
    }

    #[test]
    fn single_line_no_discounts() {
        let totals = compute(
            &[line(dec!(4), dec!(25), dec!(0), dec!(0), dec!(0))],
            dec!(0),
            dec!(0),
        );
        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.total_discount, dec!(0));
        assert_eq!(totals.total_tax, dec!(0));
        assert_eq!(totals.total_amount, dec!(100));
    }

    #[test]
    fn percent_discount_wins_over_fixed() {
        // 10% of 200 beats the fixed 5
        let totals = compute(
            &[line(dec!(2), dec!(100), dec!(10), dec!(5), dec!(0))],
            dec!(0),
            dec!(0),
        );
        assert_eq!(totals.lines[0].discount_amount, dec!(20));
        assert_eq!(totals.subtotal, dec!(180));
    }

    #[test]
    fn fixed_discount_used_when_percent_zero() {
        let totals = compute(
            &[line(dec!(2), dec!(100), dec!(0), dec!(5), dec!(0))],
            dec!(0),
            dec!(0),
        );
        assert_eq!(totals.lines[0].discount_amount, dec!(5));
        assert_eq!(totals.subtotal, dec!(195));
    }

    #[test]
    fn tax_applies_to_discounted_subtotal() {
        let totals = compute(
            &[line(dec!(1), dec!(100), dec!(10), dec!(0), dec!(15))],
            dec!(0),
            dec!(0),
        );
        assert_eq!(totals.lines[0].subtotal, dec!(90));
        assert_eq!(totals.lines[0].tax_amount, dec!(13.50));
        assert_eq!(totals.total_amount, dec!(103.50));
    }

    #[test]
    fn general_percent_discount_over_fixed() {
        let totals = compute(
            &[line(dec!(1), dec!(200), dec!(0), dec!(0), dec!(0))],
            dec!(30),
            dec!(25),
        );
        // 25% of 200, not the fixed 30
        assert_eq!(totals.total_discount, dec!(50));
        assert_eq!(totals.total_amount, dec!(150));
    }

    #[test]
    fn general_fixed_discount_when_percent_zero() {
        let totals = compute(
            &[line(dec!(1), dec!(200), dec!(0), dec!(0), dec!(0))],
            dec!(30),
            dec!(0),
        );
        assert_eq!(totals.total_discount, dec!(30));
        assert_eq!(totals.total_amount, dec!(170));
    }

    #[test]
    fn zeroed_totals_for_drafts() {
        let totals = DocumentTotals::zeroed(3);
        assert_eq!(totals.total_amount, dec!(0));
        assert_eq!(totals.lines.len(), 3);
        assert!(totals.lines.iter().all(|l| l.total == dec!(0)));
    }

    #[test]
    fn status_derivation() {
        let now = Utc::now();
        let future = Some(now + Duration::days(10));
        let past = Some(now - Duration::days(1));

        assert_eq!(
            derive_status(dec!(100), dec!(100), future, now),
            DocumentStatus::Paid
        );
        assert_eq!(
            derive_status(dec!(100), dec!(150), future, now),
            DocumentStatus::Paid
        );
        assert_eq!(
            derive_status(dec!(100), dec!(40), past, now),
            DocumentStatus::PartiallyPaid
        );
        assert_eq!(
            derive_status(dec!(100), dec!(0), past, now),
            DocumentStatus::Overdue
        );
        assert_eq!(
            derive_status(dec!(100), dec!(0), future, now),
            DocumentStatus::Issued
        );
        assert_eq!(
            derive_status(dec!(100), dec!(0), None, now),
            DocumentStatus::Issued
        );
    }

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn percent() -> impl Strategy<Value = Decimal> {
        (0i64..10_000).prop_map(|basis_points| Decimal::new(basis_points, 2))
    }

    fn arb_line() -> impl Strategy<Value = LineInput> {
        (money(), money(), percent(), money(), percent()).prop_map(
            |(quantity, unit_price, discount_percent, discount_amount, tax_percent)| LineInput {
                quantity,
                unit_price,
                discount_percent,
                discount_amount,
                tax_percent,
            },
        )
    }

    proptest! {
        #[test]
        fn compute_is_deterministic(
            lines in proptest::collection::vec(arb_line(), 0..8),
            general in money(),
            general_percent in percent(),
        ) {
            let a = compute(&lines, general, general_percent);
            let b = compute(&lines, general, general_percent);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn total_is_subtotal_plus_tax(
            lines in proptest::collection::vec(arb_line(), 1..8),
            general in money(),
            general_percent in percent(),
        ) {
            let totals = compute(&lines, general, general_percent);
            prop_assert_eq!(
                totals.total_amount,
                totals.subtotal + totals.total_tax
            );
        }
    }
}
