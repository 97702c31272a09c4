//! What-if calculators driven by the ledger's total cost.
//!
//! Both calculators are pure: they take the current total cost and their own
//! inputs, and never touch stored records.

use ledger_core::money::{clamp_non_negative, clamp_signed, coerce_money, percent_of};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest area accepted by the cost-per-area calculator.
pub const MIN_AREA: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Inputs of the cost-per-area / target-profit calculator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPlanInput {
    /// Cultivated area (hectares, m², ...), floored at [`MIN_AREA`].
    pub area_units: Decimal,
    /// Profit the farmer wants on top of total cost; may be negative.
    pub target_profit: Decimal,
}

impl CostPlanInput {
    pub fn new(area_units: Decimal, target_profit: Decimal) -> Self {
        Self {
            area_units: area_units.max(MIN_AREA),
            target_profit: clamp_signed(target_profit),
        }
    }

    /// Build from raw form text; unparsable values become zero.
    pub fn from_text(area_units: &str, target_profit: &str) -> Self {
        Self::new(coerce_money(area_units), coerce_money(target_profit))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPlan {
    pub cost_per_unit: Decimal,
    pub required_revenue: Decimal,
    pub required_margin_percent: Decimal,
}

/// Cost per unit of area and the revenue needed to reach a target profit.
pub fn plan_cost(total_cost: Decimal, input: &CostPlanInput) -> CostPlan {
    let area = input.area_units.max(MIN_AREA);
    CostPlan {
        cost_per_unit: total_cost.checked_div(area).unwrap_or(Decimal::MAX),
        required_revenue: total_cost.saturating_add(input.target_profit),
        required_margin_percent: percent_of(input.target_profit, total_cost),
    }
}

/// Inputs of the yield/price simulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldScenario {
    /// Expected harvest quantity (kg, units, ...), >= 0.
    pub yield_quantity: Decimal,
    /// Expected selling price per unit, >= 0.
    pub unit_price: Decimal,
}

impl YieldScenario {
    pub fn new(yield_quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            yield_quantity: clamp_non_negative(yield_quantity),
            unit_price: clamp_non_negative(unit_price),
        }
    }

    pub fn from_text(yield_quantity: &str, unit_price: &str) -> Self {
        Self::new(coerce_money(yield_quantity), coerce_money(unit_price))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldOutcome {
    pub revenue: Decimal,
    pub profit: Decimal,
    /// Profit against the whole ledger's total cost, in percent.
    pub roi: Decimal,
    /// Unit price at which revenue equals total cost; 0 without yield.
    pub break_even_price: Decimal,
}

/// Revenue, profit, ROI and break-even price for a yield/price guess.
///
/// ROI here is measured against the ledger-wide total cost, unlike per-plot
/// ROI which uses the plot's own cost.
///
/// Example:
/// let out = simulate_yield(Decimal::new(20_000_000, 0),
///     &YieldScenario::new(Decimal::new(5_000, 0), Decimal::new(8_000, 0)));
/// assert_eq!(out.break_even_price, Decimal::new(4_000, 0));
pub fn simulate_yield(total_cost: Decimal, scenario: &YieldScenario) -> YieldOutcome {
    let quantity = scenario.yield_quantity.max(Decimal::ZERO);
    let price = scenario.unit_price.max(Decimal::ZERO);
    let revenue = quantity.saturating_mul(price);
    let profit = revenue.saturating_sub(total_cost);
    let break_even_price = if quantity > Decimal::ZERO {
        total_cost.checked_div(quantity).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };
    YieldOutcome {
        revenue,
        profit,
        roi: percent_of(profit, total_cost),
        break_even_price,
    }
}
