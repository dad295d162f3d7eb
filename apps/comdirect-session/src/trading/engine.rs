//! Cross-venue quoting and order placement.

use chrono::{Local, NaiveDate};
use reqwest::Method;
use serde_json::{Value, json};

use super::types::{
    OrderPlacement, OrderRequest, OrderSide, OrderType, ValidityType, Venue, VenueQuote,
};
use super::venues::{eligible_venues, quote_price, select_lowest};
use crate::config::endpoints::{SIDE, TYPE, WKN, resolve};
use crate::error::{Failure, FailureKind, Outcome};
use crate::session::{DepotHandle, SessionProtocol, parse_challenge};
use crate::signer::HeaderFlavor;
use crate::transport::RequestBody;

const ORDER_DIMENSIONS: &str = "order-dimensions";
const QUOTE_TICKET: &str = "quote-ticket";
const QUOTE: &str = "quote";
const ORDER_VALIDATION: &str = "order-validation";
const ORDER_COST_INDICATION: &str = "order-cost-indication";
const ORDER_PLACEMENT: &str = "order-placement";

/// Piece unit used by the brokerage API for quantities.
const PIECES: &str = "XXX";

/// Quotes and orders against one depot of a connected session.
///
/// Borrows the session mutably for its lifetime. Nothing is kept between
/// calls: every order attempt surveys the venues again and uses its own
/// order challenge.
#[derive(Debug)]
pub struct QuoteAndOrderEngine<'s> {
    session: &'s mut SessionProtocol,
    depot: DepotHandle,
}

impl<'s> QuoteAndOrderEngine<'s> {
    /// Engine trading on `depot`.
    pub const fn new(session: &'s mut SessionProtocol, depot: DepotHandle) -> Self {
        Self { session, depot }
    }

    /// Depot orders are placed on.
    #[must_use]
    pub const fn depot(&self) -> &DepotHandle {
        &self.depot
    }

    /// Lowest positive quote across the eligible venues.
    ///
    /// Venues come from the order dimensions, filtered by the configured
    /// allow-list and by `validity_type`. A venue that rejects the quote
    /// with a 422 is logged and skipped; any other failure ends the survey
    /// and is returned as is. Returns `NoQuotationAvailable` when nothing
    /// quoted.
    pub async fn best_quote(
        &mut self,
        instrument_id: &str,
        order_type: OrderType,
        side: OrderSide,
        validity_type: ValidityType,
    ) -> Outcome<VenueQuote> {
        self.session.ensure_connected()?;

        let url = resolve(
            &self.session.config().endpoints.order_dimensions,
            &[
                (WKN, instrument_id),
                (TYPE, order_type.as_str()),
                (SIDE, side.as_str()),
            ],
        );
        let reply = self.send_standard(ORDER_DIMENSIONS, Method::GET, &url, None).await?;
        let venues = eligible_venues(
            &reply,
            &self.session.config().trading.possible_venues,
            validity_type,
        )?;

        let mut quotes = Vec::with_capacity(venues.len());
        for venue in venues {
            tracing::info!(instrument_id, venue = %venue.name, "Requesting quote");
            match self.quote_venue(instrument_id, side, &venue).await {
                Ok(Some(quote)) => {
                    tracing::info!(
                        instrument_id,
                        venue = %venue.name,
                        price = %quote.price.value,
                        "Quote received"
                    );
                    quotes.push(quote);
                }
                Ok(None) => {
                    tracing::info!(instrument_id, venue = %venue.name, "Venue returned no price");
                }
                Err(failure) if matches!(failure.kind, FailureKind::UnprocessableEntity(_)) => {
                    tracing::warn!(
                        instrument_id,
                        venue = %venue.name,
                        reason = failure.kind.reason(),
                        error = %failure.message,
                        "Quote rejected, skipping venue"
                    );
                }
                Err(failure) => return Err(failure),
            }
        }

        let best = select_lowest(quotes).ok_or_else(|| {
            Failure::new(
                FailureKind::NoQuotationAvailable,
                format!("No venue quoted {instrument_id}"),
            )
        })?;
        tracing::info!(
            instrument_id,
            venue = %best.venue_name,
            venue_id = %best.venue_id,
            price = %best.price.value,
            "Lowest quote selected"
        );
        Ok(best)
    }

    /// Route an order to the best quoting venue.
    ///
    /// Validation, cost indication and placement run in sequence with the
    /// same payload. The first failing step aborts the rest.
    pub async fn place_order(&mut self, request: &OrderRequest) -> Outcome<OrderPlacement> {
        self.session.ensure_connected()?;

        let quote = self
            .best_quote(
                &request.instrument_id,
                request.order_type,
                request.side,
                request.validity_type,
            )
            .await?;
        let payload = order_payload(&self.depot, request, &quote, Local::now().date_naive());

        let url = self.session.config().endpoints.order_validation.clone();
        let validation = self
            .session
            .call(
                ORDER_VALIDATION,
                Method::POST,
                &url,
                RequestBody::Json(payload.clone()),
                HeaderFlavor::Standard,
                None,
            )
            .await?;
        let challenge = parse_challenge(&validation, ORDER_VALIDATION)?;
        tracing::info!(
            challenge_id = %challenge.id,
            challenge_type = %challenge.challenge_type,
            "Order validated"
        );

        let url = self.session.config().endpoints.order_cost_indication.clone();
        self.send_standard(ORDER_COST_INDICATION, Method::POST, &url, Some(payload.clone()))
            .await?;

        let url = self.session.config().endpoints.orders.clone();
        let placed = self
            .session
            .call(
                ORDER_PLACEMENT,
                Method::POST,
                &url,
                RequestBody::Json(payload),
                HeaderFlavor::TanOrder,
                Some(&challenge),
            )
            .await?;

        let order_id = placed
            .body
            .get("orderId")
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::info!(
            order_id = ?order_id,
            instrument_id = %request.instrument_id,
            venue_id = %quote.venue_id,
            "Order placed"
        );

        Ok(OrderPlacement {
            quote,
            challenge_type: challenge.challenge_type,
            order_id,
            response: placed.body,
        })
    }

    /// Ticket then quote for one venue.
    async fn quote_venue(
        &mut self,
        instrument_id: &str,
        side: OrderSide,
        venue: &Venue,
    ) -> Outcome<Option<VenueQuote>> {
        let ticket = json!({
            "depotId": self.depot.as_str(),
            "orderType": "QUOTE",
            "side": side.as_str(),
            "instrumentId": instrument_id,
            "quantity": {"value": "1", "unit": PIECES},
            "venueId": venue.venue_id,
        });

        let url = self.session.config().endpoints.quote_ticket.clone();
        let issued = self
            .send_standard(QUOTE_TICKET, Method::POST, &url, Some(ticket.clone()))
            .await?;

        let mut request = ticket;
        if let Some(ticket_id) = issued.get("quoteTicketId").and_then(Value::as_str) {
            request["quoteTicketId"] = json!(ticket_id);
        }

        let url = self.session.config().endpoints.quotes.clone();
        let quoted = self
            .send_standard(QUOTE, Method::POST, &url, Some(request))
            .await?;

        Ok(quote_price(&quoted).map(|price| VenueQuote {
            instrument_id: instrument_id.to_string(),
            venue_id: venue.venue_id.clone(),
            venue_name: venue.name.clone(),
            price,
        }))
    }

    async fn send_standard(
        &mut self,
        label: &str,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Outcome<Value> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        self.session
            .call(label, method, url, body, HeaderFlavor::Standard, None)
            .await
            .map(|reply| reply.body)
    }
}

/// Payload shared by validation, cost indication and placement.
///
/// The limit is the quoted price rounded to cents.
pub fn order_payload(
    depot: &DepotHandle,
    request: &OrderRequest,
    quote: &VenueQuote,
    today: NaiveDate,
) -> Value {
    let limit = quote.price.value.round_dp(2);
    let mut payload = json!({
        "depotId": depot.as_str(),
        "side": request.side.as_str(),
        "instrumentId": request.instrument_id,
        "orderType": request.order_type.as_str(),
        "quantity": {"value": request.quantity.to_string(), "unit": PIECES},
        "venueId": quote.venue_id,
        "limit": {"value": format!("{limit:.2}"), "unit": "EUR"},
        "validityType": request.validity_type.as_str(),
    });
    if request.validity_type == ValidityType::Gtd {
        let expiry = request.validity.unwrap_or(today);
        payload["validity"] = json!(expiry.format("%Y-%m-%d").to_string());
    }
    payload
}

impl SessionProtocol {
    /// Trading engine on the cached depot.
    ///
    /// Lists the depots first when none is cached yet.
    pub async fn trading(&mut self) -> Outcome<QuoteAndOrderEngine<'_>> {
        self.ensure_connected()?;

        let cached = self.depot_handle().cloned();
        let depot = if let Some(depot) = cached {
            depot
        } else {
            self.depots().await?;
            self.depot_handle()
                .cloned()
                .ok_or_else(|| Failure::protocol_violation("no depot available for trading"))?
        };
        Ok(QuoteAndOrderEngine::new(self, depot))
    }
}
