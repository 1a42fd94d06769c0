//! Blocking HTTP backend for the order store.
//!
//! Maps the [`OrderStore`] trait onto the store service's REST surface.
//! The commit and unmerge endpoints are atomic server-side; this client
//! only translates statuses into typed errors.

use std::time::Duration;

use serde::Serialize;

use crate::model::order::TransportOrder;
use crate::model::types::OrderId;
use crate::store::{MergeCommitPayload, OrderStore, StoreError, UnmergeOutcome};

/// HTTP client for the order store service.
pub struct HttpOrderStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnmergeRequest<'a> {
    primary_order_id: &'a OrderId,
}

impl HttpOrderStore {
    /// Build a client with a bounded request timeout.
    ///
    /// # Errors
    /// Returns [`StoreError::Transport`] if the underlying client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn status_error(response: reqwest::blocking::Response) -> StoreError {
    let code = response.status().as_u16();
    let detail = response.text().unwrap_or_default();
    StoreError::Status { code, detail }
}

impl OrderStore for HttpOrderStore {
    fn list_new(&self) -> Result<Vec<TransportOrder>, StoreError> {
        let response = self
            .client
            .get(self.url("orders"))
            .query(&[("status", "new")])
            .send()?;
        if !response.status().is_success() {
            return Err(status_error(response));
        }
        response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn get(&self, id: &OrderId) -> Result<TransportOrder, StoreError> {
        let response = self.client.get(self.url(&format!("order/{id}"))).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::OrderNotFound { order: id.clone() });
        }
        if !response.status().is_success() {
            return Err(status_error(response));
        }
        response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn commit_merge(
        &self,
        primary: &OrderId,
        payload: &MergeCommitPayload,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(&format!("order/{primary}")))
            .json(payload)
            .send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(StoreError::OrderNotFound {
                order: primary.clone(),
            })
        } else if status == reqwest::StatusCode::CONFLICT {
            // The store re-validates donors inside its transaction; a
            // conflict means some donor was taken since the draft was built.
            let detail = response.text().unwrap_or_default();
            Err(StoreError::DonorUnavailable {
                order: primary.clone(),
                status: if detail.is_empty() {
                    "store reported a donor conflict".to_owned()
                } else {
                    detail
                },
            })
        } else {
            Err(status_error(response))
        }
    }

    fn unmerge(&self, primary: &OrderId) -> Result<UnmergeOutcome, StoreError> {
        let response = self
            .client
            .post(self.url("unmerge"))
            .json(&UnmergeRequest {
                primary_order_id: primary,
            })
            .send()?;
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .map_err(|e| StoreError::Decode(e.to_string()))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(StoreError::NotMerged {
                order: primary.clone(),
            })
        } else {
            Err(status_error(response))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let store =
            HttpOrderStore::new("http://localhost:8080///", Duration::from_secs(5)).unwrap();
        assert_eq!(store.url("orders"), "http://localhost:8080/orders");
        assert_eq!(
            store.url("order/TR-1001"),
            "http://localhost:8080/order/TR-1001"
        );
    }

    #[test]
    fn unmerge_request_wire_shape() {
        let id = OrderId::new("TR-1001").unwrap();
        let json = serde_json::to_string(&UnmergeRequest {
            primary_order_id: &id,
        })
        .unwrap();
        assert_eq!(json, "{\"primaryOrderId\":\"TR-1001\"}");
    }
}
