//! Read operations on a connected session.

use chrono::{Local, NaiveDate};
use reqwest::Method;

use super::protocol::SessionProtocol;
use super::state::DepotHandle;
use crate::config::endpoints::{DEPOT_ID, resolve};
use crate::error::{Failure, Outcome};
use crate::mapper::{self, AccountBalanceRecord, DepotPosition, DepotRecord, OrderBook};
use crate::signer::HeaderFlavor;
use crate::transport::RequestBody;

const DEPOTS: &str = "depots";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl SessionProtocol {
    /// Balances of all cash accounts.
    pub async fn account_balances(&mut self) -> Outcome<Vec<AccountBalanceRecord>> {
        self.ensure_connected()?;
        let url = self.config().endpoints.accounts_balance.clone();
        let reply = self.get("account-balances", &url).await?;
        mapper::balance(&reply, today())
    }

    /// All depots. Caches the first depot id as the [`DepotHandle`].
    ///
    /// An empty listing is a `ProtocolViolation` and leaves the handle unset.
    pub async fn depots(&mut self) -> Outcome<Vec<DepotRecord>> {
        self.ensure_connected()?;
        let url = self.config().endpoints.depots.clone();
        let reply = self.get(DEPOTS, &url).await?;
        let depots = mapper::depots(&reply, today())?;

        let Some(first) = depots.first() else {
            return Err(Failure::protocol_violation("depot listing is empty").for_request(DEPOTS));
        };
        tracing::info!(depot_id = %first.depot_id, count = depots.len(), "Depots listed");
        self.cache_depot(DepotHandle::new(first.depot_id.clone()));
        Ok(depots)
    }

    /// Totals and positions of one depot.
    pub async fn depot_position(&mut self, depot: &DepotHandle) -> Outcome<DepotPosition> {
        self.ensure_connected()?;
        let url = resolve(
            &self.config().endpoints.depot_position,
            &[(DEPOT_ID, depot.as_str())],
        );
        let reply = self.get("depot-position", &url).await?;
        mapper::position(&reply, today())
    }

    /// Order book of one depot.
    pub async fn orders(&mut self, depot: &DepotHandle) -> Outcome<OrderBook> {
        self.ensure_connected()?;
        let url = resolve(&self.config().endpoints.orderbook, &[(DEPOT_ID, depot.as_str())]);
        let reply = self.get("orderbook", &url).await?;
        mapper::orders(&reply, today())
    }

    async fn get(&mut self, label: &str, url: &str) -> Outcome<serde_json::Value> {
        self.call(
            label,
            Method::GET,
            url,
            RequestBody::Empty,
            HeaderFlavor::Standard,
            None,
        )
        .await
        .map(|reply| reply.body)
    }
}
