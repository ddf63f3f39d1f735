//! Backend contract.

use async_trait::async_trait;
use quickorder_core::{EntityId, ModeFlag};
use quickorder_store::QuickOrder;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// Outer shape of every response. `ResponseData` is itself JSON, encoded as
/// a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "ResponseData", default)]
    pub response_data: String,
    #[serde(
        rename = "IsSuccess",
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_success: Option<bool>,
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn new(response_data: impl Into<String>) -> Self {
        Self {
            response_data: response_data.into(),
            ..Self::default()
        }
    }

    /// Envelope around a value serialized into `ResponseData`.
    pub fn with_data<T: Serialize>(data: &T) -> Result<Self, TransportError> {
        serde_json::to_string(data)
            .map(Self::new)
            .map_err(|e| TransportError::parse(e.to_string()))
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            response_data: String::new(),
            is_success: Some(false),
            message: Some(message.into()),
        }
    }

    pub fn reported_failure(&self) -> bool {
        self.is_success == Some(false)
    }

    /// Decode `ResponseData`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.response_data).map_err(|e| TransportError::parse(e.to_string()))
    }
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            "" => Ok(None),
            other => Err(de::Error::custom(format!("invalid IsSuccess flag '{other}'"))),
        },
        Some(other) => Err(de::Error::custom(format!("invalid IsSuccess flag {other}"))),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("expected a string or number, got {other}"))),
    }
}

/// `ResponseData` of `get_quick_order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickOrderResponse {
    #[serde(rename = "ResponseResult", default)]
    pub response_result: Vec<QuickOrder>,
}

/// One row of the `update_quick_order_resource` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    #[serde(rename = "QuickUniqueID", default)]
    pub quick_unique_id: EntityId,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Error_msg", default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl SubmitResult {
    /// `"Success"`/`"SUCCESS"` is the only success signal.
    pub fn is_success(&self) -> bool {
        matches!(self.status.as_str(), "Success" | "SUCCESS")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterDataRequest {
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// One lookup row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterDataRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonalizationRequest {
    pub level_type: String,
    pub screen_name: String,
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_flag: Option<ModeFlag>,
}

/// One saved layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonalizationRow {
    #[serde(default)]
    pub level_type: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub json_data: Option<String>,
}

/// Multipart upload of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub category: String,
    pub content: Vec<u8>,
    pub mime_type: String,
}

/// Where the file service stored an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "AttachUniqueName")]
    pub unique_name: String,
    #[serde(rename = "AttachRelPath", default)]
    pub rel_path: String,
}

/// Quick-order backend. One method per remote call.
#[async_trait]
pub trait QuickOrderApi: Send + Sync {
    async fn get_quick_order(&self, order_id: i64) -> Result<ApiEnvelope, TransportError>;

    async fn update_quick_order_resource(&self, order: &QuickOrder) -> Result<ApiEnvelope, TransportError>;

    async fn get_master_common_data(&self, request: &MasterDataRequest) -> Result<ApiEnvelope, TransportError>;

    async fn get_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError>;

    async fn save_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError>;

    async fn upload_attachment(&self, upload: AttachmentUpload) -> Result<ApiEnvelope, TransportError>;

    /// `ResponseData` carries the base64 file body.
    async fn download_attachment(&self, unique_name: &str) -> Result<ApiEnvelope, TransportError>;
}
