//! Order parameters and results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapper::Amount;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl OrderSide {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop market order.
    StopMarket,
    /// Stop limit order.
    StopLimit,
}

impl OrderType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopMarket => "STOP_MARKET",
            Self::StopLimit => "STOP_LIMIT",
        }
    }
}

/// Order validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidityType {
    /// Good for the day.
    Gfd,
    /// Good till the given date.
    Gtd,
}

impl ValidityType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gfd => "GFD",
            Self::Gtd => "GTD",
        }
    }
}

/// An order to place at the best quoting venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument id (WKN).
    pub instrument_id: String,
    /// Order type.
    pub order_type: OrderType,
    /// Side.
    pub side: OrderSide,
    /// Pieces.
    pub quantity: Decimal,
    /// Validity type.
    pub validity_type: ValidityType,
    /// Expiry for `GTD`; today when absent.
    pub validity: Option<NaiveDate>,
}

impl OrderRequest {
    /// Good-for-day order.
    #[must_use]
    pub fn new(
        instrument_id: impl Into<String>,
        order_type: OrderType,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            order_type,
            side,
            quantity,
            validity_type: ValidityType::Gfd,
            validity: None,
        }
    }

    /// Make the order good till `date`.
    #[must_use]
    pub const fn good_till(mut self, date: NaiveDate) -> Self {
        self.validity_type = ValidityType::Gtd;
        self.validity = Some(date);
        self
    }
}

/// A venue offered by the order dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue id.
    pub venue_id: String,
    /// Display name, matched against the allow-list.
    pub name: String,
}

/// Price quoted by one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueQuote {
    /// Instrument id.
    pub instrument_id: String,
    /// Venue id.
    pub venue_id: String,
    /// Venue display name.
    pub venue_name: String,
    /// Quoted price.
    pub price: Amount,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlacement {
    /// Venue and price the order was routed with.
    pub quote: VenueQuote,
    /// Type of the order challenge (`TAN_FREI` when no TAN was needed).
    pub challenge_type: String,
    /// Order id, when the placement response carries one.
    pub order_id: Option<String>,
    /// Placement response body.
    pub response: Value,
}
