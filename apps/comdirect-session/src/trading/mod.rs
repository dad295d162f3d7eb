//! Cross-venue quote survey and TAN-authorized order placement.
//!
//! # Order Flow
//!
//! 1. Order dimensions list the venues for the instrument
//! 2. Each allowed venue is quoted (ticket, then quote)
//! 3. The lowest positive price wins; ties keep the first venue listed
//! 4. Validation returns an order challenge in `x-once-authentication-info`
//! 5. Cost indication
//! 6. Placement with the challenge and the `TAN_FREI` marker

mod engine;
mod types;
mod venues;

pub use engine::{QuoteAndOrderEngine, order_payload};
pub use types::{
    OrderPlacement, OrderRequest, OrderSide, OrderType, ValidityType, Venue, VenueQuote,
};
pub use venues::{eligible_venues, quote_price, select_lowest};
