//! Endpoint URL table.
//!
//! One URL per logical operation. Some URLs carry `[IDENTIFIER]`,
//! `[DEPOT_ID]`, `[WKN]`, `[TYPE]` or `[SIDE]` placeholders that are
//! resolved by plain substring substitution right before the call.

use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://api.comdirect.de";

/// Placeholder for the session identifier.
pub const IDENTIFIER: &str = "IDENTIFIER";
/// Placeholder for the depot id.
pub const DEPOT_ID: &str = "DEPOT_ID";
/// Placeholder for the instrument (WKN).
pub const WKN: &str = "WKN";
/// Placeholder for the order type.
pub const TYPE: &str = "TYPE";
/// Placeholder for the order side.
pub const SIDE: &str = "SIDE";

/// Endpoint URLs for every operation the engine performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTable {
    /// OAuth token endpoint (password grant and secondary flow).
    pub oauth_token: String,
    /// Session status (step B).
    pub session_status: String,
    /// Session TAN validation (step C). Contains `[IDENTIFIER]`.
    pub session_validate: String,
    /// Session TAN activation (step D). Contains `[IDENTIFIER]`.
    pub session_tan: String,
    /// Token revocation.
    pub session_revoke: String,
    /// Account balances.
    pub accounts_balance: String,
    /// Depot listing.
    pub depots: String,
    /// Depot positions. Contains `[DEPOT_ID]`.
    pub depot_position: String,
    /// Order book. Contains `[DEPOT_ID]`.
    pub orderbook: String,
    /// Order dimensions (eligible venues). Contains `[WKN]`.
    pub order_dimensions: String,
    /// Order pre-validation.
    pub order_validation: String,
    /// Ex-ante cost indication.
    pub order_cost_indication: String,
    /// Order placement.
    pub orders: String,
    /// Quote ticket creation.
    pub quote_ticket: String,
    /// Quote retrieval.
    pub quotes: String,
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::with_base(API_BASE)
    }
}

impl EndpointTable {
    /// Build the standard path layout under a different host.
    ///
    /// Useful for sandboxes and scripted test servers.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            oauth_token: format!("{base}/oauth/token"),
            session_status: format!("{base}/api/session/clients/user/v1/sessions"),
            session_validate: format!(
                "{base}/api/session/clients/user/v1/sessions/[IDENTIFIER]/validate"
            ),
            session_tan: format!("{base}/api/session/clients/user/v1/sessions/[IDENTIFIER]"),
            session_revoke: format!("{base}/oauth/revoke"),
            accounts_balance: format!("{base}/api/banking/clients/user/v2/accounts/balances"),
            depots: format!("{base}/api/brokerage/clients/user/v3/depots"),
            depot_position: format!("{base}/api/brokerage/v3/depots/[DEPOT_ID]/positions"),
            orderbook: format!("{base}/api/brokerage/depots/[DEPOT_ID]/v3/orders"),
            order_dimensions: format!(
                "{base}/api/brokerage/v3/orders/dimensions?instrumentId=[WKN]&orderType=[TYPE]&side=[SIDE]"
            ),
            order_validation: format!("{base}/api/brokerage/v3/orders/validation"),
            order_cost_indication: format!("{base}/api/brokerage/v3/orders/costindicationexante"),
            orders: format!("{base}/api/brokerage/v3/orders"),
            quote_ticket: format!("{base}/api/brokerage/v3/quoteticket"),
            quotes: format!("{base}/api/brokerage/v3/quotes"),
        }
    }

    /// All endpoints with their field names.
    pub(crate) fn entries(&self) -> [(&'static str, &str); 15] {
        [
            ("oauth_token", &self.oauth_token),
            ("session_status", &self.session_status),
            ("session_validate", &self.session_validate),
            ("session_tan", &self.session_tan),
            ("session_revoke", &self.session_revoke),
            ("accounts_balance", &self.accounts_balance),
            ("depots", &self.depots),
            ("depot_position", &self.depot_position),
            ("orderbook", &self.orderbook),
            ("order_dimensions", &self.order_dimensions),
            ("order_validation", &self.order_validation),
            ("order_cost_indication", &self.order_cost_indication),
            ("orders", &self.orders),
            ("quote_ticket", &self.quote_ticket),
            ("quotes", &self.quotes),
        ]
    }

    /// Placeholders each templated endpoint must contain.
    pub(crate) fn required_placeholders(&self) -> [(&'static str, &str, &'static str); 5] {
        [
            ("session_validate", &self.session_validate, IDENTIFIER),
            ("session_tan", &self.session_tan, IDENTIFIER),
            ("depot_position", &self.depot_position, DEPOT_ID),
            ("orderbook", &self.orderbook, DEPOT_ID),
            ("order_dimensions", &self.order_dimensions, WKN),
        ]
    }
}

/// Substitute `[KEY]` placeholders in a URL template.
#[must_use]
pub fn resolve(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |url, (key, value)| {
            url.replace(&format!("[{key}]"), value)
        })
}
