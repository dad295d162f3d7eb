//! Response shapes of the banking and brokerage endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::records::Amount;

#[derive(Debug, Deserialize)]
pub(super) struct Values<T> {
    pub values: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Balance {
    pub account: Account,
    pub available_cash_amount: Amount,
    #[serde(rename = "availableCashAmountEUR")]
    pub available_cash_amount_eur: Amount,
    pub balance: Amount,
    #[serde(rename = "balanceEUR")]
    pub balance_eur: Amount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Account {
    pub account_id: String,
    pub account_display_id: String,
    pub currency: String,
    pub iban: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Depot {
    pub depot_id: String,
    pub depot_display_id: String,
    pub depot_type: String,
    pub holder_name: Option<String>,
    pub default_settlement_account_id: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Positions {
    pub aggregated: Aggregated,
    #[serde(default)]
    pub values: Vec<Position>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DepotRef {
    pub depot_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Aggregated {
    pub depot: DepotRef,
    pub purchase_value: Amount,
    pub current_value: Amount,
    pub profit_loss_purchase_abs: Option<Amount>,
    pub profit_loss_purchase_rel: Option<Decimal>,
    pub profit_loss_prev_day_abs: Option<Amount>,
    pub profit_loss_prev_day_rel: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Quantity {
    pub value: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CurrentPrice {
    pub price: Amount,
    pub price_date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Position {
    pub wkn: String,
    pub depot_id: String,
    pub position_id: String,
    pub quantity: Quantity,
    pub available_quantity: Quantity,
    pub purchase_value: Amount,
    pub purchase_price: Amount,
    pub current_value: Amount,
    pub current_price: CurrentPrice,
    pub hedgeability: Option<String>,
    pub current_price_determinable: Option<bool>,
    pub custody_type: Option<String>,
    pub profit_loss_purchase_abs: Option<Amount>,
    pub profit_loss_purchase_rel: Option<Decimal>,
    pub profit_loss_prev_day_abs: Option<Amount>,
    pub profit_loss_prev_day_rel: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Order {
    pub order_id: Option<String>,
    pub instrument_id: Option<String>,
    pub venue_id: Option<String>,
    #[serde(default)]
    pub order_status: String,
    pub order_type: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub validity_type: String,
    pub quantity: Option<Quantity>,
    pub limit: Option<Amount>,
    pub trigger_limit: Option<Amount>,
    #[serde(default)]
    pub sub_orders: Vec<Order>,
}
