//! Account and depot payloads to tabular records.
//!
//! Pure functions: JSON in, records out. The caller supplies the `as_of`
//! date. A payload that does not have the expected shape is a
//! `ProtocolViolation`.

mod records;
mod wire;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use records::{
    AccountBalanceRecord, AggregatedPositionRecord, Amount, DepotPosition, DepotRecord,
    InstrumentPositionRecord, OrderBook, OrderRecord,
};

use crate::error::{Failure, Outcome};

/// Order type of a one-cancels-other group.
pub const ONE_CANCELS_OTHER: &str = "ONE_CANCELS_OTHER";
const STOP_MARKET: &str = "STOP_MARKET";
const LIMIT: &str = "LIMIT";

fn decode<T: DeserializeOwned>(json: &Value, what: &str) -> Outcome<T> {
    T::deserialize(json)
        .map_err(|e| Failure::protocol_violation(format!("unexpected {what} payload: {e}")))
}

/// Cash accounts from the balances payload.
pub fn balance(json: &Value, as_of: NaiveDate) -> Outcome<Vec<AccountBalanceRecord>> {
    let payload: wire::Values<wire::Balance> = decode(json, "account balance")?;
    Ok(payload
        .values
        .into_iter()
        .map(|item| AccountBalanceRecord {
            as_of,
            account_id: item.account.account_id,
            account_display_id: item.account.account_display_id,
            currency: item.account.currency,
            iban: item.account.iban,
            available_cash: item.available_cash_amount,
            available_cash_eur: item.available_cash_amount_eur,
            balance: item.balance,
            balance_eur: item.balance_eur,
        })
        .collect())
}

/// Depots from the depot listing.
pub fn depots(json: &Value, as_of: NaiveDate) -> Outcome<Vec<DepotRecord>> {
    let payload: wire::Values<wire::Depot> = decode(json, "depot")?;
    Ok(payload
        .values
        .into_iter()
        .map(|item| DepotRecord {
            as_of,
            depot_id: item.depot_id,
            depot_display_id: item.depot_display_id,
            depot_type: item.depot_type,
            holder_name: item.holder_name,
            default_settlement_account_id: item.default_settlement_account_id,
            client_id: item.client_id,
        })
        .collect())
}

/// Depot totals and instrument positions.
pub fn position(json: &Value, as_of: NaiveDate) -> Outcome<DepotPosition> {
    let payload: wire::Positions = decode(json, "depot position")?;
    let totals = payload.aggregated;
    let aggregated = AggregatedPositionRecord {
        as_of,
        depot_id: totals.depot.depot_id,
        purchase_value: totals.purchase_value,
        current_value: totals.current_value,
        profit_loss_purchase_abs: totals.profit_loss_purchase_abs,
        profit_loss_purchase_rel: totals.profit_loss_purchase_rel,
        profit_loss_prev_day_abs: totals.profit_loss_prev_day_abs,
        profit_loss_prev_day_rel: totals.profit_loss_prev_day_rel,
    };

    let positions = payload
        .values
        .into_iter()
        .map(|item| InstrumentPositionRecord {
            as_of,
            wkn: item.wkn,
            depot_id: item.depot_id,
            position_id: item.position_id,
            quantity: item.quantity.value,
            available_quantity: item.available_quantity.value,
            purchase_value: item.purchase_value,
            purchase_price: item.purchase_price,
            current_value: item.current_value,
            current_price: item.current_price.price,
            current_price_at: item.current_price.price_date_time,
            hedgeability: item.hedgeability,
            current_price_determinable: item.current_price_determinable,
            custody_type: item.custody_type,
            profit_loss_purchase_abs: item.profit_loss_purchase_abs,
            profit_loss_purchase_rel: item.profit_loss_purchase_rel,
            profit_loss_prev_day_abs: item.profit_loss_prev_day_abs,
            profit_loss_prev_day_rel: item.profit_loss_prev_day_rel,
        })
        .collect();

    Ok(DepotPosition {
        aggregated,
        positions,
    })
}

/// Order book of a depot.
///
/// Top-level orders emit one record each. One-cancels-other groups are
/// flattened into their `STOP_MARKET` and `LIMIT` legs; any other leg is
/// skipped and counted in [`OrderBook::skipped_sub_orders`].
pub fn orders(json: &Value, as_of: NaiveDate) -> Outcome<OrderBook> {
    let payload: wire::Values<wire::Order> = decode(json, "order book")?;
    let mut book = OrderBook::default();

    for order in payload.values {
        if order.order_type != ONE_CANCELS_OTHER {
            let limit = order.limit.clone().or_else(|| {
                order
                    .order_type
                    .starts_with("STOP")
                    .then(|| order.trigger_limit.clone())
                    .flatten()
            });
            let record = order_record(&order, order.order_type.clone(), None, limit, as_of)?;
            book.orders.push(record);
            continue;
        }

        for leg in &order.sub_orders {
            let limit = match leg.order_type.as_str() {
                STOP_MARKET => leg.trigger_limit.clone(),
                LIMIT => leg.limit.clone(),
                other => {
                    tracing::debug!(
                        order_id = ?order.order_id,
                        sub_order_type = other,
                        "Skipping unsupported one-cancels-other leg"
                    );
                    book.skipped_sub_orders += 1;
                    continue;
                }
            };
            let record = order_record(
                leg,
                ONE_CANCELS_OTHER.to_string(),
                Some(leg.order_type.clone()),
                limit,
                as_of,
            )?;
            book.orders.push(record);
        }
    }

    Ok(book)
}

fn order_record(
    order: &wire::Order,
    order_type: String,
    sub_order_type: Option<String>,
    limit: Option<Amount>,
    as_of: NaiveDate,
) -> Outcome<OrderRecord> {
    let quantity = order
        .quantity
        .as_ref()
        .map(|q| q.value)
        .ok_or_else(|| {
            Failure::protocol_violation(format!(
                "order {} has no quantity",
                order.order_id.as_deref().unwrap_or("<unknown>")
            ))
        })?;

    Ok(OrderRecord {
        as_of,
        order_id: order.order_id.clone(),
        instrument_id: order.instrument_id.clone(),
        venue_id: order.venue_id.clone(),
        order_status: order.order_status.clone(),
        order_type,
        sub_order_type,
        side: order.side.clone(),
        validity_type: order.validity_type.clone(),
        quantity,
        limit,
    })
}
