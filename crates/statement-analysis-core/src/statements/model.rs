//! One reporting period of financial statements.
//!
//! Every numeric line item is optional. A missing value reads as zero in
//! calculations and counts as missing for completeness. Nothing is derived at
//! construction time.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Currency, Money};
use crate::StatementAnalysisResult;

/// Tolerance for the balance-sheet and gross-profit reconciliations.
const RECONCILIATION_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialStatements {
    // Income statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_of_goods_sold: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_expenses: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_expense: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_before_tax: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_expense: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Money>,

    // Balance sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_and_equivalents: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts_receivable: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepaid_expenses: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_assets: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_plant_equipment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intangible_assets: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_assets: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts_payable: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrued_liabilities: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_term_debt: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_liabilities: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term_debt: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_liabilities: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_liabilities: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shareholders_equity: Option<Money>,

    // Cash flow statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_cash_from_operations: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_cash_from_investing: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_cash_from_financing: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_change_in_cash: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beginning_cash: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_cash: Option<Money>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<Decimal>,
    pub period: String,
    pub currency: Currency,
}

// ---------------------------------------------------------------------------
// Field schema
// ---------------------------------------------------------------------------

/// Every numeric line item of [`FinancialStatements`], in statement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementField {
    Revenue,
    CostOfGoodsSold,
    GrossProfit,
    OperatingExpenses,
    OperatingIncome,
    InterestExpense,
    InterestIncome,
    OtherIncome,
    EarningsBeforeTax,
    TaxExpense,
    NetIncome,
    CashAndEquivalents,
    AccountsReceivable,
    Inventory,
    PrepaidExpenses,
    CurrentAssets,
    PropertyPlantEquipment,
    IntangibleAssets,
    OtherAssets,
    TotalAssets,
    AccountsPayable,
    AccruedLiabilities,
    ShortTermDebt,
    CurrentLiabilities,
    LongTermDebt,
    OtherLiabilities,
    TotalLiabilities,
    ShareholdersEquity,
    NetCashFromOperations,
    NetCashFromInvesting,
    NetCashFromFinancing,
    NetChangeInCash,
    BeginningCash,
    EndingCash,
    SharesOutstanding,
}

/// Fields whose presence drives the completeness metric.
pub const REQUIRED_FIELDS: [StatementField; 6] = [
    StatementField::Revenue,
    StatementField::NetIncome,
    StatementField::TotalAssets,
    StatementField::TotalLiabilities,
    StatementField::ShareholdersEquity,
    StatementField::NetCashFromOperations,
];

impl StatementField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::GrossProfit => "gross_profit",
            Self::OperatingExpenses => "operating_expenses",
            Self::OperatingIncome => "operating_income",
            Self::InterestExpense => "interest_expense",
            Self::InterestIncome => "interest_income",
            Self::OtherIncome => "other_income",
            Self::EarningsBeforeTax => "earnings_before_tax",
            Self::TaxExpense => "tax_expense",
            Self::NetIncome => "net_income",
            Self::CashAndEquivalents => "cash_and_equivalents",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::PrepaidExpenses => "prepaid_expenses",
            Self::CurrentAssets => "current_assets",
            Self::PropertyPlantEquipment => "property_plant_equipment",
            Self::IntangibleAssets => "intangible_assets",
            Self::OtherAssets => "other_assets",
            Self::TotalAssets => "total_assets",
            Self::AccountsPayable => "accounts_payable",
            Self::AccruedLiabilities => "accrued_liabilities",
            Self::ShortTermDebt => "short_term_debt",
            Self::CurrentLiabilities => "current_liabilities",
            Self::LongTermDebt => "long_term_debt",
            Self::OtherLiabilities => "other_liabilities",
            Self::TotalLiabilities => "total_liabilities",
            Self::ShareholdersEquity => "shareholders_equity",
            Self::NetCashFromOperations => "net_cash_from_operations",
            Self::NetCashFromInvesting => "net_cash_from_investing",
            Self::NetCashFromFinancing => "net_cash_from_financing",
            Self::NetChangeInCash => "net_change_in_cash",
            Self::BeginningCash => "beginning_cash",
            Self::EndingCash => "ending_cash",
            Self::SharesOutstanding => "shares_outstanding",
        }
    }
}

impl std::fmt::Display for StatementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

impl FinancialStatements {
    /// Parse statements from JSON. A non-numeric amount fails here and
    /// nowhere later.
    pub fn from_json(json: &str) -> StatementAnalysisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The reported value of a line item, `None` when absent.
    pub fn get(&self, field: StatementField) -> Option<Money> {
        use StatementField as F;
        match field {
            F::Revenue => self.revenue,
            F::CostOfGoodsSold => self.cost_of_goods_sold,
            F::GrossProfit => self.gross_profit,
            F::OperatingExpenses => self.operating_expenses,
            F::OperatingIncome => self.operating_income,
            F::InterestExpense => self.interest_expense,
            F::InterestIncome => self.interest_income,
            F::OtherIncome => self.other_income,
            F::EarningsBeforeTax => self.earnings_before_tax,
            F::TaxExpense => self.tax_expense,
            F::NetIncome => self.net_income,
            F::CashAndEquivalents => self.cash_and_equivalents,
            F::AccountsReceivable => self.accounts_receivable,
            F::Inventory => self.inventory,
            F::PrepaidExpenses => self.prepaid_expenses,
            F::CurrentAssets => self.current_assets,
            F::PropertyPlantEquipment => self.property_plant_equipment,
            F::IntangibleAssets => self.intangible_assets,
            F::OtherAssets => self.other_assets,
            F::TotalAssets => self.total_assets,
            F::AccountsPayable => self.accounts_payable,
            F::AccruedLiabilities => self.accrued_liabilities,
            F::ShortTermDebt => self.short_term_debt,
            F::CurrentLiabilities => self.current_liabilities,
            F::LongTermDebt => self.long_term_debt,
            F::OtherLiabilities => self.other_liabilities,
            F::TotalLiabilities => self.total_liabilities,
            F::ShareholdersEquity => self.shareholders_equity,
            F::NetCashFromOperations => self.net_cash_from_operations,
            F::NetCashFromInvesting => self.net_cash_from_investing,
            F::NetCashFromFinancing => self.net_cash_from_financing,
            F::NetChangeInCash => self.net_change_in_cash,
            F::BeginningCash => self.beginning_cash,
            F::EndingCash => self.ending_cash,
            F::SharesOutstanding => self.shares_outstanding,
        }
    }

    /// The value of a line item with absent values read as zero.
    pub fn amount(&self, field: StatementField) -> Money {
        self.get(field).unwrap_or(Decimal::ZERO)
    }

    pub fn is_reported(&self, field: StatementField) -> bool {
        self.get(field).is_some()
    }

    /// Human-readable descriptions of the soft accounting identities these
    /// statements violate. Violations are never rejected.
    pub fn check_invariants(&self) -> Vec<String> {
        use StatementField as F;
        let mut violations = Vec::new();

        if !self.balance_sheet_balances() {
            violations.push(format!(
                "Balance sheet does not balance: total assets {} vs liabilities + equity {}",
                self.amount(F::TotalAssets),
                display_total(self.claims()),
            ));
        }
        if !self.gross_profit_reconciles() {
            violations.push(format!(
                "Gross profit {} does not reconcile to revenue less COGS {}",
                self.amount(F::GrossProfit),
                display_total(self.expected_gross_profit()),
            ));
        }
        if !self.cash_rolls_forward() {
            violations.push(format!(
                "Ending cash {} does not equal beginning cash plus net change {}",
                self.amount(F::EndingCash),
                display_total(self.expected_ending_cash()),
            ));
        }

        violations
    }

    /// `total_assets ≈ total_liabilities + shareholders_equity` within 1% of total assets.
    /// Totals beyond `Decimal`'s range never balance.
    pub fn balance_sheet_balances(&self) -> bool {
        let assets = self.amount(StatementField::TotalAssets);
        within_tolerance(assets, self.claims(), assets)
    }

    /// `gross_profit ≈ revenue − cost_of_goods_sold` within 1% of revenue.
    pub fn gross_profit_reconciles(&self) -> bool {
        within_tolerance(
            self.amount(StatementField::GrossProfit),
            self.expected_gross_profit(),
            self.amount(StatementField::Revenue),
        )
    }

    /// `ending_cash == beginning_cash + net_change_in_cash`, exactly.
    pub fn cash_rolls_forward(&self) -> bool {
        self.expected_ending_cash()
            .is_some_and(|expected| expected == self.amount(StatementField::EndingCash))
    }

    fn claims(&self) -> Option<Money> {
        use StatementField as F;
        self.amount(F::TotalLiabilities)
            .checked_add(self.amount(F::ShareholdersEquity))
    }

    fn expected_gross_profit(&self) -> Option<Money> {
        use StatementField as F;
        self.amount(F::Revenue)
            .checked_sub(self.amount(F::CostOfGoodsSold))
    }

    fn expected_ending_cash(&self) -> Option<Money> {
        use StatementField as F;
        self.amount(F::BeginningCash)
            .checked_add(self.amount(F::NetChangeInCash))
    }
}

fn within_tolerance(actual: Money, expected: Option<Money>, scale: Money) -> bool {
    let Some(diff) = expected.and_then(|e| actual.checked_sub(e)) else {
        return false;
    };
    diff.abs() <= scale.abs() * RECONCILIATION_TOLERANCE
}

fn display_total(total: Option<Money>) -> String {
    total.map_or_else(|| "out of range".to_string(), |t| t.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
