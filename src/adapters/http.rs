use crate::utils::error::{LearnPathError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("learnpath/", env!("CARGO_PKG_VERSION"));

/// 每個外部來源各自持有一個 client，逾時上限在建立時就固定
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LearnPathError::ConfigValidationError {
            field: "http_client".to_string(),
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// Sends `request` and decodes a successful JSON body as `T`.
///
/// Non-2xx statuses become `HttpStatus`, undecodable bodies become `Parse`.
pub async fn send_json<T: DeserializeOwned>(source_name: &str, request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| LearnPathError::transport(source_name, e))?;

    let status = response.status();
    tracing::debug!("{} responded with status {}", source_name, status);

    if !status.is_success() {
        return Err(LearnPathError::HttpStatus {
            source_name: source_name.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| LearnPathError::transport(source_name, e))?;

    serde_json::from_str(&body).map_err(|e| LearnPathError::parse(source_name, e.to_string()))
}
