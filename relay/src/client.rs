//! HTTP client for the Safe transaction-relay service.
//!
//! The relay's REST protocol is an external contract consumed here, not
//! defined: pending and historical transaction feeds, safe metadata,
//! delegates, token metadata, and proposal/confirmation submission.
//! No retry lives in this client; the watcher polls, and a failed poll
//! simply leaves the previous state in place.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use stakinghub_core::{
    HistoryTransaction, MultisigTransaction, Page, SafeDelegate, SafeInfo, TokenDetails,
};

/// Errors from the relay boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("could not decode relay response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Safes owned by one address, from `/api/v1/owners/{owner}/safes/`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedSafes {
    pub safes: Vec<Address>,
}

/// A transaction proposal submitted to the relay.
///
/// The contract transaction hash and signature are produced wallet-side;
/// this type only carries them through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedTransaction {
    pub to: Address,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub operation: u8,
    pub nonce: u64,
    pub safe_tx_gas: u64,
    pub base_gas: u64,
    pub gas_price: String,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub contract_transaction_hash: String,
    pub sender: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ProposedTransaction {
    /// A rejection placeholder competing for `nonce`: self-addressed,
    /// zero value, no data.
    pub fn rejection(
        safe: Address,
        nonce: u64,
        contract_transaction_hash: String,
        sender: Address,
        signature: Option<String>,
    ) -> Self {
        Self {
            to: safe,
            value: "0".to_string(),
            data: None,
            operation: 0,
            nonce,
            safe_tx_gas: 0,
            base_gas: 0,
            gas_price: "0".to_string(),
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            contract_transaction_hash,
            sender,
            signature,
            origin: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfirmationRequest<'a> {
    signature: &'a str,
}

/// Client for one relay deployment.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, RelayError> {
        debug!(%url, "relay GET");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status { status, url });
        }
        response.json::<T>().await.map_err(RelayError::Decode)
    }

    async fn post_json<B: Serialize>(&self, url: String, body: &B) -> Result<(), RelayError> {
        debug!(%url, "relay POST");
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status { status, url });
        }
        Ok(())
    }

    /// Safes the given address owns.
    pub async fn safes_by_owner(&self, owner: Address) -> Result<Vec<Address>, RelayError> {
        let url = format!("{}/api/v1/owners/{owner}/safes/", self.base_url);
        let owned: OwnedSafes = self.get_json(url).await?;
        Ok(owned.safes)
    }

    /// Safe metadata: owners, threshold, nonce, enabled modules.
    pub async fn safe_info(&self, safe: Address) -> Result<SafeInfo, RelayError> {
        let url = format!("{}/api/v1/safes/{safe}/", self.base_url);
        self.get_json(url).await
    }

    /// Proposed transactions still awaiting execution at or above the
    /// safe's current nonce.
    pub async fn pending_transactions(
        &self,
        safe: Address,
        current_nonce: u64,
    ) -> Result<Page<MultisigTransaction>, RelayError> {
        let url = format!(
            "{}/api/v1/safes/{safe}/multisig-transactions/?executed=false&nonce__gte={current_nonce}",
            self.base_url
        );
        self.get_json(url).await
    }

    /// One page of the combined history feed.
    pub async fn all_transactions(
        &self,
        safe: Address,
        limit: u64,
        offset: u64,
    ) -> Result<Page<HistoryTransaction>, RelayError> {
        let url = format!(
            "{}/api/v1/safes/{safe}/all-transactions/?limit={limit}&offset={offset}",
            self.base_url
        );
        self.get_json(url).await
    }

    /// Delegates authorized to propose for the safe.
    pub async fn delegates(&self, safe: Address) -> Result<Page<SafeDelegate>, RelayError> {
        let url = format!("{}/api/v1/delegates/?safe={safe}", self.base_url);
        self.get_json(url).await
    }

    /// Metadata for one token tracked by the relay.
    pub async fn token_info(&self, token: Address) -> Result<TokenDetails, RelayError> {
        let url = format!("{}/api/v1/tokens/{token}/", self.base_url);
        self.get_json(url).await
    }

    /// Submits a new proposal for signature collection.
    pub async fn propose_transaction(
        &self,
        safe: Address,
        proposal: &ProposedTransaction,
    ) -> Result<(), RelayError> {
        let url = format!("{}/api/v1/safes/{safe}/multisig-transactions/", self.base_url);
        self.post_json(url, proposal).await
    }

    /// Proposes a rejection placeholder competing for `nonce`.
    pub async fn propose_rejection(
        &self,
        safe: Address,
        nonce: u64,
        contract_transaction_hash: String,
        sender: Address,
        signature: Option<String>,
    ) -> Result<(), RelayError> {
        let proposal =
            ProposedTransaction::rejection(safe, nonce, contract_transaction_hash, sender, signature);
        self.propose_transaction(safe, &proposal).await
    }

    /// Adds a co-signature to an existing proposal.
    pub async fn confirm_transaction(
        &self,
        safe_tx_hash: &str,
        signature: &str,
    ) -> Result<(), RelayError> {
        let url = format!(
            "{}/api/v1/multisig-transactions/{safe_tx_hash}/confirmations/",
            self.base_url
        );
        self.post_json(url, &ConfirmationRequest { signature }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = RelayClient::new("https://relay.example.org/");
        assert_eq!(client.base_url(), "https://relay.example.org");
    }

    #[test]
    fn rejection_proposal_is_self_addressed_and_empty() {
        let safe: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let sender: Address = "0x1111111111111111111111111111111111111111".parse().unwrap();
        let proposal =
            ProposedTransaction::rejection(safe, 12, "0xhash".to_string(), sender, None);

        assert_eq!(proposal.to, safe);
        assert_eq!(proposal.value, "0");
        assert_eq!(proposal.data, None);
        assert_eq!(proposal.nonce, 12);

        let body = serde_json::to_value(&proposal).unwrap();
        assert!(body.get("data").is_none());
        assert_eq!(body["nonce"], 12);
        assert_eq!(body["gasPrice"], "0");
    }
}
