//! `QuickOrderApi` over HTTP.

use async_trait::async_trait;
use quickorder_store::QuickOrder;
use quickorder_sync::{
    ApiEnvelope, AttachmentUpload, MasterDataRequest, PersonalizationRequest, QuickOrderApi,
    TransportError,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::ClientConfig;

pub struct HttpQuickOrderApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpQuickOrderApi {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.post(self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiEnvelope, TransportError> {
        tracing::debug!(path, "api call");
        let resp = self
            .post(path)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_envelope(resp).await
    }
}

async fn read_envelope(resp: reqwest::Response) -> Result<ApiEnvelope, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Api {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    let body: Value = resp.json().await.map_err(|e| TransportError::parse(e.to_string()))?;
    unwrap_envelope(body)
}

/// Responses arrive either bare or wrapped in `{ "data": ... }`.
fn unwrap_envelope(body: Value) -> Result<ApiEnvelope, TransportError> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("ResponseData") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| TransportError::parse(e.to_string()))
}

#[async_trait]
impl QuickOrderApi for HttpQuickOrderApi {
    async fn get_quick_order(&self, order_id: i64) -> Result<ApiEnvelope, TransportError> {
        self.post_json("quickorder/get", &json!({ "QuickUniqueID": order_id })).await
    }

    async fn update_quick_order_resource(&self, order: &QuickOrder) -> Result<ApiEnvelope, TransportError> {
        self.post_json("quickorder/update", order).await
    }

    async fn get_master_common_data(&self, request: &MasterDataRequest) -> Result<ApiEnvelope, TransportError> {
        self.post_json("masterdata/common", request).await
    }

    async fn get_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError> {
        self.post_json("personalization/get", request).await
    }

    async fn save_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError> {
        self.post_json("personalization/save", request).await
    }

    async fn upload_attachment(&self, upload: AttachmentUpload) -> Result<ApiEnvelope, TransportError> {
        let size = upload.content.len();
        let part = Part::bytes(upload.content)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| TransportError::parse(format!("mime type '{}': {e}", upload.mime_type)))?;
        let form = Form::new()
            .text("AttachmentType", upload.category)
            .text("AttachName", upload.file_name)
            .part("file", part);

        tracing::debug!(size, "uploading attachment");
        let resp = self
            .post("attachments/upload")
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_envelope(resp).await
    }

    async fn download_attachment(&self, unique_name: &str) -> Result<ApiEnvelope, TransportError> {
        self.post_json("attachments/download", &json!({ "AttachUniqueName": unique_name }))
            .await
    }
}
