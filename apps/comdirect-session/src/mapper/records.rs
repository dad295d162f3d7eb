//! Tabular records handed to reporting and storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric value with its currency or unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Numeric value.
    pub value: Decimal,
    /// Currency code (`EUR`) or unit (`XXX` for pieces).
    pub unit: String,
}

impl Amount {
    /// Build an amount.
    #[must_use]
    pub fn new(value: Decimal, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// One cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalanceRecord {
    /// Date the record was read.
    pub as_of: NaiveDate,
    /// Internal account id.
    pub account_id: String,
    /// Display account number.
    pub account_display_id: String,
    /// Account currency.
    pub currency: String,
    /// IBAN, when the account has one.
    pub iban: Option<String>,
    /// Cash available for trading, in account currency.
    pub available_cash: Amount,
    /// Cash available for trading, in EUR.
    pub available_cash_eur: Amount,
    /// Booked balance, in account currency.
    pub balance: Amount,
    /// Booked balance, in EUR.
    pub balance_eur: Amount,
}

/// One securities depot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepotRecord {
    /// Date the record was read.
    pub as_of: NaiveDate,
    /// Internal depot id used by the trading endpoints.
    pub depot_id: String,
    /// Display depot number.
    pub depot_display_id: String,
    /// Depot type.
    pub depot_type: String,
    /// Holder name.
    pub holder_name: Option<String>,
    /// Default settlement account.
    pub default_settlement_account_id: Option<String>,
    /// Client id.
    pub client_id: Option<String>,
}

/// Depot-level totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPositionRecord {
    /// Date the record was read.
    pub as_of: NaiveDate,
    /// Depot id.
    pub depot_id: String,
    /// Total purchase value.
    pub purchase_value: Amount,
    /// Total current value.
    pub current_value: Amount,
    /// Absolute P/L against purchase.
    pub profit_loss_purchase_abs: Option<Amount>,
    /// Relative P/L against purchase, in percent.
    pub profit_loss_purchase_rel: Option<Decimal>,
    /// Absolute P/L against the previous day.
    pub profit_loss_prev_day_abs: Option<Amount>,
    /// Relative P/L against the previous day, in percent.
    pub profit_loss_prev_day_rel: Option<Decimal>,
}

/// One instrument held in a depot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentPositionRecord {
    /// Date the record was read.
    pub as_of: NaiveDate,
    /// WKN of the instrument.
    pub wkn: String,
    /// Depot id.
    pub depot_id: String,
    /// Position id.
    pub position_id: String,
    /// Pieces held.
    pub quantity: Decimal,
    /// Pieces not blocked by open orders.
    pub available_quantity: Decimal,
    /// Purchase value of the position.
    pub purchase_value: Amount,
    /// Average purchase price.
    pub purchase_price: Amount,
    /// Current value of the position.
    pub current_value: Amount,
    /// Last price.
    pub current_price: Amount,
    /// Timestamp of the last price, as sent by the API.
    pub current_price_at: Option<String>,
    /// Hedgeability flag.
    pub hedgeability: Option<String>,
    /// Whether a current price could be determined.
    pub current_price_determinable: Option<bool>,
    /// Custody type.
    pub custody_type: Option<String>,
    /// Absolute P/L against purchase.
    pub profit_loss_purchase_abs: Option<Amount>,
    /// Relative P/L against purchase, in percent.
    pub profit_loss_purchase_rel: Option<Decimal>,
    /// Absolute P/L against the previous day.
    pub profit_loss_prev_day_abs: Option<Amount>,
    /// Relative P/L against the previous day, in percent.
    pub profit_loss_prev_day_rel: Option<Decimal>,
}

/// Depot totals plus per-instrument positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepotPosition {
    /// Depot totals.
    pub aggregated: AggregatedPositionRecord,
    /// One record per instrument.
    pub positions: Vec<InstrumentPositionRecord>,
}

/// One concrete order.
///
/// For flattened one-cancels-other groups `order_type` is
/// `ONE_CANCELS_OTHER` and `sub_order_type` names the leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    /// Date the record was read.
    pub as_of: NaiveDate,
    /// Order id.
    pub order_id: Option<String>,
    /// Instrument id.
    pub instrument_id: Option<String>,
    /// Venue id.
    pub venue_id: Option<String>,
    /// Order status (`OPEN`, `EXECUTED`, ...).
    pub order_status: String,
    /// Order type of the top-level order.
    pub order_type: String,
    /// Leg type inside a one-cancels-other group.
    pub sub_order_type: Option<String>,
    /// `BUY` or `SELL`.
    pub side: String,
    /// Validity type (`GFD`, `GTD`, ...).
    pub validity_type: String,
    /// Ordered pieces.
    pub quantity: Decimal,
    /// Limit, or trigger limit for stop legs.
    pub limit: Option<Amount>,
}

/// Orders of one depot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderBook {
    /// Emitted orders, in payload order.
    pub orders: Vec<OrderRecord>,
    /// Sub-orders of one-cancels-other groups that were not `STOP_MARKET` or `LIMIT`.
    pub skipped_sub_orders: usize,
}
