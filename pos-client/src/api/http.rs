//! HTTP implementation of the backend API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{
    BillStatusUpdate, BillSwap, DiscountUpdate, Dish, OrderLinesUpsert, PaymentCancel,
    PaymentFinalize, PriceRule, QrCreate, QrCreated, RoomBill, RuleAttach,
};

use super::BackendApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Network HTTP client for the POS backend
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(text)),
            };
        }
        Ok(response.json().await?)
    }

    async fn handle_empty(&self, response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(text)),
            };
        }
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn post_empty<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        self.handle_empty(response).await
    }

    async fn put_empty<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        self.handle_empty(response).await
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn fetch_rooms(&self) -> ClientResult<Vec<RoomBill>> {
        self.get("boxes").await
    }

    async fn fetch_price_rules(&self) -> ClientResult<Vec<PriceRule>> {
        self.get("price-rules").await
    }

    async fn fetch_dishes(&self) -> ClientResult<Vec<Dish>> {
        self.get("dishes").await
    }

    async fn upsert_order_lines(&self, payload: &OrderLinesUpsert) -> ClientResult<()> {
        self.put_empty(&format!("boxes/{}/orders", payload.room_id), payload)
            .await
    }

    async fn attach_rule(&self, payload: &RuleAttach) -> ClientResult<()> {
        self.post_empty(&format!("boxes/{}/price-rule", payload.room_id), payload)
            .await
    }

    async fn update_bill_status(&self, payload: &BillStatusUpdate) -> ClientResult<()> {
        self.put_empty(&format!("boxes/{}/status", payload.room_id), payload)
            .await
    }

    async fn delete_order_line(&self, room_id: i64, dish_id: i64) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("boxes/{room_id}/orders/{dish_id}")))
            .send()
            .await?;
        self.handle_empty(response).await
    }

    async fn update_discount(&self, payload: &DiscountUpdate) -> ClientResult<()> {
        self.put_empty(&format!("boxes/{}/discount", payload.room_id), payload)
            .await
    }

    async fn swap_bill(&self, payload: &BillSwap) -> ClientResult<()> {
        self.post_empty("boxes/swap", payload).await
    }

    async fn finalize_payment(&self, payload: &PaymentFinalize) -> ClientResult<()> {
        self.post_empty(&format!("boxes/{}/finalize", payload.room_id), payload)
            .await
    }

    async fn cancel_payment(&self, payload: &PaymentCancel) -> ClientResult<()> {
        self.post_empty(&format!("boxes/{}/cancel-payment", payload.room_id), payload)
            .await
    }

    async fn create_payment_qr(&self, payload: &QrCreate) -> ClientResult<QrCreated> {
        let response = self
            .client
            .post(self.url("payos/create-payment"))
            .json(payload)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
