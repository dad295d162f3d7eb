//! Venue selection and quote parsing.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::types::{ValidityType, Venue, VenueQuote};
use crate::error::{Failure, Outcome};
use crate::mapper::Amount;

#[derive(Debug, Deserialize)]
struct Dimensions {
    values: Vec<Dimension>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    #[serde(default)]
    venues: Vec<DimensionVenue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DimensionVenue {
    venue_id: String,
    name: String,
    #[serde(default)]
    validity_types: Vec<String>,
}

/// Venues from an order-dimensions payload that are on the allow-list and
/// accept `validity_type`, in listed order.
pub fn eligible_venues(
    dimensions: &Value,
    allowed: &[String],
    validity_type: ValidityType,
) -> Outcome<Vec<Venue>> {
    let parsed = Dimensions::deserialize(dimensions).map_err(|e| {
        Failure::protocol_violation(format!("unexpected order dimensions payload: {e}"))
    })?;

    let Some(first) = parsed.values.into_iter().next() else {
        return Ok(Vec::new());
    };

    Ok(first
        .venues
        .into_iter()
        .filter(|v| allowed.iter().any(|name| name == &v.name))
        .filter(|v| v.validity_types.iter().any(|t| t == validity_type.as_str()))
        .map(|v| Venue {
            venue_id: v.venue_id,
            name: v.name,
        })
        .collect())
}

/// Price from a quote response: `price`, or `values[0].price`.
///
/// Missing or non-positive prices mean the venue did not quote.
#[must_use]
pub fn quote_price(body: &Value) -> Option<Amount> {
    let price = body
        .get("price")
        .or_else(|| body.get("values")?.get(0)?.get("price"))?;
    Amount::deserialize(price)
        .ok()
        .filter(|amount| amount.value > Decimal::ZERO)
}

/// Lowest positive quote. Ties keep the first one seen.
pub fn select_lowest<I>(quotes: I) -> Option<VenueQuote>
where
    I: IntoIterator<Item = VenueQuote>,
{
    quotes
        .into_iter()
        .filter(|q| q.price.value > Decimal::ZERO)
        .fold(None, |best, candidate| match best {
            Some(current) if current.price.value <= candidate.price.value => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::error::FailureKind;

    fn quote(venue: &str, price: Decimal) -> VenueQuote {
        VenueQuote {
            instrument_id: "A0RGCS".to_string(),
            venue_id: venue.to_string(),
            venue_name: format!("Venue {venue}"),
            price: Amount::new(price, "EUR"),
        }
    }

    #[test]
    fn lowest_takes_first_of_equal_minimums() {
        let best = select_lowest(vec![
            quote("V1", dec!(12.50)),
            quote("V2", dec!(11.90)),
            quote("V3", dec!(11.90)),
        ])
        .unwrap();
        assert_eq!(best.venue_id, "V2");
        assert_eq!(best.price.value, dec!(11.90));
    }

    #[test]
    fn lowest_ignores_non_positive_prices() {
        let best = select_lowest(vec![quote("V1", dec!(0)), quote("V2", dec!(3.10))]).unwrap();
        assert_eq!(best.venue_id, "V2");
    }

    #[test]
    fn lowest_of_nothing_is_none() {
        assert!(select_lowest(Vec::new()).is_none());
        assert!(select_lowest(vec![quote("V1", dec!(-1))]).is_none());
    }

    #[test]
    fn venues_filtered_by_name_and_validity() {
        let payload = json!({"values": [{"venues": [
            {"venueId": "X1", "name": "Xetra", "validityTypes": ["GFD", "GTD"]},
            {"venueId": "T1", "name": "Tradegate", "validityTypes": ["GFD"]},
            {"venueId": "L1", "name": "LT Lang & Schwarz", "validityTypes": ["GTD"]}
        ]}]});
        let allowed = vec!["Xetra".to_string(), "Tradegate".to_string()];

        let gtd = eligible_venues(&payload, &allowed, ValidityType::Gtd).unwrap();
        assert_eq!(
            gtd,
            vec![Venue {
                venue_id: "X1".to_string(),
                name: "Xetra".to_string()
            }]
        );

        let gfd = eligible_venues(&payload, &allowed, ValidityType::Gfd).unwrap();
        assert_eq!(gfd.len(), 2);
        assert_eq!(gfd[1].venue_id, "T1");
    }

    #[test]
    fn empty_dimensions_yield_no_venues() {
        let venues = eligible_venues(&json!({"values": []}), &[], ValidityType::Gfd).unwrap();
        assert!(venues.is_empty());
    }

    #[test]
    fn malformed_dimensions_are_protocol_violation() {
        let failure = eligible_venues(&json!({"venues": []}), &[], ValidityType::Gfd).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ProtocolViolation);
    }

    #[test]
    fn quote_price_locations() {
        let flat = json!({"price": {"value": "11.90", "unit": "EUR"}});
        assert_eq!(quote_price(&flat).unwrap().value, dec!(11.90));

        let nested = json!({"values": [{"price": {"value": "7.5", "unit": "EUR"}}]});
        assert_eq!(quote_price(&nested).unwrap().value, dec!(7.5));

        assert!(quote_price(&json!({})).is_none());
        assert!(quote_price(&json!({"price": {"value": "0", "unit": "EUR"}})).is_none());
    }
}
