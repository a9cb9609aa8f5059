use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    fact_balance_sheet, fact_cash_flow, fact_comprehensive_income, fact_equity_statement,
    fact_income_statement, statement_item,
};

/// Which concepts are the main items of which primary statement, and in
/// what order they display.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = statement_item)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatementItem {
    pub id: Uuid,
    pub filing_id: Uuid,
    pub concept_id: Uuid,
    pub statement_type: String,
    pub display_order: i32,
    pub is_header: bool,
    pub is_main_item: bool,
    pub role_uri: String,
    pub side: Option<String>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = statement_item)]
pub struct NewStatementItem {
    pub filing_id: Uuid,
    pub concept_id: Uuid,
    pub statement_type: String,
    pub display_order: i32,
    pub is_header: bool,
    pub is_main_item: bool,
    pub role_uri: String,
    pub side: Option<String>,
}

/// a balance-sheet main item's ancestor root in the presentation
/// tree (`Assets` vs `LiabilitiesAndStockholdersEquity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceSheetSide {
    Assets,
    LiabilitiesEquity,
}

impl BalanceSheetSide {
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceSheetSide::Assets => "assets",
            BalanceSheetSide::LiabilitiesEquity => "liabilities_equity",
        }
    }
}

macro_rules! denormalized_statement_table {
    ($struct_name:ident, $new_name:ident, $table:ident $(, $extra_field:ident : $extra_ty:ty)* $(,)?) => {
        #[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
        #[diesel(table_name = $table)]
        #[diesel(check_for_backend(diesel::pg::Pg))]
        pub struct $struct_name {
            pub id: Uuid,
            pub filing_id: Uuid,
            pub fact_id: Uuid,
            pub concept_id: Uuid,
            pub normalized_label: String,
            pub value_numeric: Option<f64>,
            pub display_order: i32,
            pub is_header: bool,
            pub hierarchy_level: i32,
            $(pub $extra_field: $extra_ty,)*
        }

        #[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
        #[diesel(table_name = $table)]
        pub struct $new_name {
            pub filing_id: Uuid,
            pub fact_id: Uuid,
            pub concept_id: Uuid,
            pub normalized_label: String,
            pub value_numeric: Option<f64>,
            pub display_order: i32,
            pub is_header: bool,
            pub hierarchy_level: i32,
            $(pub $extra_field: $extra_ty,)*
        }
    };
}

// "Statement-specific fact tables ... exist for query simplicity,
// not to add information" — one denormalised table per primary statement.
denormalized_statement_table!(FactIncomeStatement, NewFactIncomeStatement, fact_income_statement);
denormalized_statement_table!(
    FactBalanceSheet,
    NewFactBalanceSheet,
    fact_balance_sheet,
    side: Option<String>,
);
denormalized_statement_table!(FactCashFlow, NewFactCashFlow, fact_cash_flow);
denormalized_statement_table!(
    FactComprehensiveIncome,
    NewFactComprehensiveIncome,
    fact_comprehensive_income,
    sign_corrected: bool,
);
denormalized_statement_table!(
    FactEquityStatement,
    NewFactEquityStatement,
    fact_equity_statement,
    equity_component: Option<String>,
);
