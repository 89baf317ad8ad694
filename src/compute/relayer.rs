// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the confidential-compute relayer.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET`  | `/v1/keyurl` | Public key material (initialization) |
//! | `POST` | `/v1/input-proof` | Encrypt a value and prove the input |
//! | `POST` | `/v1/public-decrypt` | Verifiable public decryption |

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ComputeError, ConfidentialCompute, DecryptionResult, EncryptedInput};

/// Bit width of the encrypted salary type in the payroll contract.
pub const SALARY_CIPHERTEXT_BITS: u8 = 32;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyUrlResponse {
    public_key_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest<'a> {
    contract_address: &'a str,
    user_address: &'a str,
    value: u64,
    bits: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProofResponse {
    handle: String,
    input_proof: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptRequest<'a> {
    handles: &'a [String],
    contract_address: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptResponse {
    clear_values: HashMap<String, Value>,
    abi_encoded_clear_values: String,
    decryption_proof: String,
}

/// Relayer-backed [`ConfidentialCompute`] implementation.
pub struct RelayerClient {
    base_url: String,
    http: Client,
    /// Key id fetched by `initialize`
    public_key_id: RwLock<Option<String>>,
}

impl RelayerClient {
    /// Create a new relayer client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ComputeError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ComputeError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
            public_key_id: RwLock::new(None),
        })
    }

    /// Key id of the loaded public key, if initialized.
    pub async fn public_key_id(&self) -> Option<String> {
        self.public_key_id.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn ensure_initialized(&self) -> Result<(), ComputeError> {
        if self.public_key_id.read().await.is_some() {
            Ok(())
        } else {
            Err(ComputeError::NotInitialized)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ComputeError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ComputeError::Request(format!("GET {path} failed: {e}")))?;
        read_json(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ComputeError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ComputeError::Request(format!("POST {path} failed: {e}")))?;
        read_json(path, response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ComputeError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ComputeError::Http { status, body });
    }

    response
        .json()
        .await
        .map_err(|e| ComputeError::InvalidResponse(format!("{path} invalid JSON: {e}")))
}

/// Coerce a clear value reported as a JSON number, decimal string or hex
/// string.
fn clear_value_from_json(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

fn decode_decryption(response: PublicDecryptResponse) -> Result<DecryptionResult, ComputeError> {
    let mut clear_values = HashMap::with_capacity(response.clear_values.len());
    for (handle, raw) in &response.clear_values {
        let value = clear_value_from_json(raw).ok_or_else(|| {
            ComputeError::InvalidResponse(format!("clear value for {handle} is not an integer"))
        })?;
        clear_values.insert(handle.clone(), value);
    }

    Ok(DecryptionResult {
        clear_values,
        abi_encoded_clear_values: response.abi_encoded_clear_values,
        decryption_proof: response.decryption_proof,
    })
}

#[async_trait]
impl ConfidentialCompute for RelayerClient {
    async fn initialize(&self) -> Result<(), ComputeError> {
        if self.public_key_id.read().await.is_some() {
            return Ok(());
        }

        let keys: KeyUrlResponse = self.get_json("/v1/keyurl").await?;
        if keys.public_key_id.trim().is_empty() {
            return Err(ComputeError::InvalidResponse(
                "keyurl response did not include publicKeyId".to_string(),
            ));
        }

        tracing::info!(public_key_id = %keys.public_key_id, "Confidential compute relayer initialized");
        *self.public_key_id.write().await = Some(keys.public_key_id);
        Ok(())
    }

    async fn encrypt(
        &self,
        target: &str,
        identity: &str,
        value: u64,
    ) -> Result<EncryptedInput, ComputeError> {
        self.ensure_initialized().await?;

        let request = InputProofRequest {
            contract_address: target,
            user_address: identity,
            value,
            bits: SALARY_CIPHERTEXT_BITS,
        };
        let response: InputProofResponse = self.post_json("/v1/input-proof", &request).await?;

        Ok(EncryptedInput {
            handle: response.handle,
            proof: response.input_proof,
        })
    }

    async fn request_verifiable_decryption(
        &self,
        handles: &[String],
        target: &str,
    ) -> Result<DecryptionResult, ComputeError> {
        self.ensure_initialized().await?;

        let request = PublicDecryptRequest {
            handles,
            contract_address: target,
        };
        let response: PublicDecryptResponse =
            self.post_json("/v1/public-decrypt", &request).await?;

        decode_decryption(response)
    }
}
