// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Control API client implementation

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::config::EngineConfig;
use super::response::ApiErrorDocument;
use super::API_KEY_HEADER;
use crate::error::{Error, Result};

/// Thin client over the engine's JSON/OTHER control API
#[derive(Clone)]
pub struct EngineClient {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("base", &self.base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl EngineClient {
    /// Create a client for the engine described by `config`
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut base = Url::parse(&config.api_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API URL cannot be used as a base: {}",
                config.api_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
        })
    }

    /// Control API base URL
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Invoke an action and decode its JSON result document
    pub async fn action(&self, component: &str, name: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.json(component, "action", name, params).await
    }

    /// Invoke a view and decode its JSON result document
    pub async fn view(&self, component: &str, name: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.json(component, "view", name, params).await
    }

    /// Invoke an "other" endpoint and return the raw body
    pub async fn other(&self, component: &str, name: &str, params: &[(&str, &str)]) -> Result<Bytes> {
        let operation = format!("{}/other/{}", component, name);
        let url = self.endpoint("OTHER", component, "other", name)?;
        debug!(%operation, "Engine call");

        let response = self.authorize(self.client.get(url).query(params)).send().await?;
        Self::check(&operation, response).await
    }

    /// Invoke an "other" endpoint with the parameters sent as a form body.
    /// Used for payloads too large for a query string.
    pub async fn other_form(
        &self,
        component: &str,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<Bytes> {
        let operation = format!("{}/other/{}", component, name);
        let url = self.endpoint("OTHER", component, "other", name)?;
        debug!(%operation, "Engine call (form)");

        let response = self.authorize(self.client.post(url).form(params)).send().await?;
        Self::check(&operation, response).await
    }

    async fn json(
        &self,
        component: &str,
        kind: &str,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<Value> {
        let operation = format!("{}/{}/{}", component, kind, name);
        let url = self.endpoint("JSON", component, kind, name)?;
        debug!(%operation, params = params.len(), "Engine call");

        let response = self.authorize(self.client.get(url).query(params)).send().await?;
        let body = Self::check(&operation, response).await?;

        serde_json::from_slice(&body).map_err(|e| Error::unexpected(operation, e.to_string()))
    }

    fn endpoint(&self, format: &str, component: &str, kind: &str, name: &str) -> Result<Url> {
        Ok(self
            .base
            .join(&format!("{}/{}/{}/{}/", format, component, kind, name))?)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.api_key {
            Some(ref key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn check(operation: &str, response: Response) -> Result<Bytes> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(body);
        }

        let (code, message) = match serde_json::from_slice::<ApiErrorDocument>(&body) {
            Ok(doc) => (
                doc.code,
                doc.message.unwrap_or_else(|| status.to_string()),
            ),
            Err(_) if body.is_empty() => (None, status.to_string()),
            Err(_) => (None, String::from_utf8_lossy(&body).into_owned()),
        };

        Err(Error::Api {
            operation: operation.to_string(),
            status: Some(status.as_u16()),
            code,
            message,
        })
    }
}
