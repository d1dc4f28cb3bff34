//! End-to-end request flow.
//!
//! # Steps
//! ```text
//! load source → connect signer → prepare secrets
//!     → [anchor + spawn listener → submit → rendezvous] (raced with Ctrl-C)
//!     → stop listener → delete gist → report
//! ```
//!
//! The gist holding inline secrets is deleted on every exit path after it was
//! created. A failed deletion is logged and does not change the result.

use alloy::primitives::{Address, Bytes, U256};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;

use crate::blockchain::TxBuilder;
use crate::config::{env, required_address, ClientConfig, SecretsConfig, SecretsMode};
use crate::error::{CallbackError, Error};
use crate::fulfillment::{
    EventListener, FulfillmentOutcome, FulfillmentResult, Rendezvous, Request, RequestId,
};
use crate::lifecycle::{signals, startup, Shutdown};
use crate::request::submitter::{RequestSubmitter, ReviewRequest};
use crate::secrets::{EncryptedSecrets, Secrets, SecretsManager};

/// Successful fulfillment as reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub request_id: RequestId,
    /// Raw response bytes.
    pub response: Bytes,
    /// Response read as a big-endian uint256, when it fits.
    pub value: Option<U256>,
}

/// Runs one review request against the configured consumer.
pub struct RequestRunner {
    config: ClientConfig,
    secrets: SecretsManager,
}

impl RequestRunner {
    pub fn new(config: ClientConfig) -> crate::Result<Self> {
        let secrets = SecretsManager::new(config.secrets.clone())?;
        Ok(Self { config, secrets })
    }

    /// Submit the request and wait for its fulfillment.
    pub async fn run(&self) -> crate::Result<Fulfillment> {
        let functions = &self.config.functions;
        let oracle = required_address("functions.oracle_address", &functions.oracle_address)?;
        let consumer = required_address("functions.consumer_address", &functions.consumer_address)?;

        let source = load_source(Path::new(&functions.source_path)).await?;
        let secrets = secrets_from_config(&self.config.secrets)?;

        let (tx, wallet) = startup::connect_signer(&self.config.blockchain).await?;
        let encrypted = self
            .secrets
            .prepare(&secrets, tx.client(), oracle, Some(&wallet))
            .await?;
        tracing::info!(
            mode = secrets.mode(),
            bytes = encrypted.bytes.len(),
            "Secrets prepared"
        );

        let shutdown = Shutdown::new();
        let result = signals::until_interrupted(
            self.execute(tx, oracle, consumer, source, &encrypted, &shutdown),
            signals::interrupted(),
        )
        .await;
        shutdown.trigger();

        if let Some(gist_url) = &encrypted.gist_url {
            self.cleanup_gist(gist_url).await;
        }

        describe_outcome(result?)
    }

    async fn execute(
        &self,
        tx: TxBuilder,
        oracle: Address,
        consumer: Address,
        source: String,
        secrets: &EncryptedSecrets,
        shutdown: &Shutdown,
    ) -> crate::Result<FulfillmentResult> {
        let rendezvous = Rendezvous::from_config(&self.config.rendezvous);

        let mut listener = EventListener::new(
            tx.client().clone(),
            oracle,
            consumer,
            rendezvous.store().clone(),
            Duration::from_millis(self.config.rendezvous.listener_interval_ms),
        );
        listener.anchor().await?;

        tokio::spawn(listener.run(shutdown.subscribe()));

        let functions = &self.config.functions;
        let request = ReviewRequest {
            subject_id: functions.subject_id,
            review_text: functions.review_text.clone(),
            source,
            secrets: secrets.bytes.clone(),
            subscription_id: functions.subscription_id,
            callback_gas_limit: functions.callback_gas_limit,
        };
        let submitter = RequestSubmitter::new(tx, consumer);

        let request_id = submitter
            .submit(
                &request,
                self.config.functions.request_gas_limit,
                self.config.blockchain.confirmation_blocks,
            )
            .await?;

        let mut pending = Request::new(request_id);
        Ok(rendezvous.wait(&mut pending).await?)
    }

    async fn cleanup_gist(&self, gist_url: &str) {
        if !self.config.secrets.cleanup_gist {
            tracing::info!(gist_url, "Gist cleanup disabled, leaving secrets Gist in place");
            return;
        }

        let deleted = match self.secrets.gist_client() {
            Ok(gist) => gist.delete(gist_url).await,
            Err(e) => Err(e),
        };
        if let Err(e) = deleted {
            tracing::warn!(gist_url, error = %e, "Failed to delete secrets Gist");
        }
    }
}

/// Read the oracle source file.
pub async fn load_source(path: &Path) -> crate::Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Configuration(format!("Cannot read source file {}: {}", path.display(), e))
    })
}

/// Secrets the configured mode attaches to the request.
///
/// Inline mode carries the completion API key under `apiKey`.
pub fn secrets_from_config(config: &SecretsConfig) -> crate::Result<Secrets> {
    match config.mode {
        SecretsMode::None => Ok(Secrets::None),
        SecretsMode::Inline => {
            let api_key = env::require(env::OPENAI_API_KEY)?;
            let mut map = Map::new();
            map.insert("apiKey".to_string(), Value::String(api_key));
            Ok(Secrets::Inline(map))
        }
        SecretsMode::Remote => Ok(Secrets::Remote(config.urls.clone())),
    }
}

/// Turn a fulfillment into the operator-facing result.
///
/// Anything other than a response is an error.
pub fn describe_outcome(result: FulfillmentResult) -> crate::Result<Fulfillment> {
    match result.outcome {
        FulfillmentOutcome::Response(response) => {
            let value = U256::try_from_be_slice(&response);
            Ok(Fulfillment {
                request_id: result.request_id,
                response,
                value,
            })
        }
        FulfillmentOutcome::Error(message) => {
            Err(Error::Remote(format!("Error in response: {}", message)))
        }
        FulfillmentOutcome::UserCallbackError(reason) => {
            Err(Error::Callback(CallbackError::Formatted(reason)))
        }
        FulfillmentOutcome::UserCallbackRawError(data) => {
            Err(Error::Callback(CallbackError::Raw(data)))
        }
    }
}

impl Fulfillment {
    /// Structured summary for printing.
    pub fn to_json(&self) -> Value {
        json!({
            "request_id": self.request_id.to_string(),
            "response": self.response.to_string(),
            "value": self.value.map(|v| v.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn id() -> RequestId {
        RequestId(B256::repeat_byte(0x11))
    }

    #[test]
    fn test_response_read_as_uint256() {
        let response = Bytes::from(U256::from(73).to_be_bytes::<32>().to_vec());
        let result = FulfillmentResult::new(id(), FulfillmentOutcome::Response(response.clone()));

        let fulfillment = describe_outcome(result).unwrap();
        assert_eq!(fulfillment.value, Some(U256::from(73)));
        assert_eq!(fulfillment.response, response);
        assert_eq!(fulfillment.to_json()["value"], "73");
    }

    #[test]
    fn test_oversized_response_has_no_value() {
        let response = Bytes::from(vec![0xff; 40]);
        let result = FulfillmentResult::new(id(), FulfillmentOutcome::Response(response));

        let fulfillment = describe_outcome(result).unwrap();
        assert_eq!(fulfillment.value, None);
    }

    #[test]
    fn test_error_outcomes() {
        let err = describe_outcome(FulfillmentResult::new(
            id(),
            FulfillmentOutcome::Error("Request failed".into()),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "remote");
        assert!(err.to_string().contains("Request failed"));

        let err = describe_outcome(FulfillmentResult::new(
            id(),
            FulfillmentOutcome::UserCallbackError("out of gas".into()),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "callback");
        assert!(err.to_string().contains("callback gas limit"));

        let err = describe_outcome(FulfillmentResult::new(
            id(),
            FulfillmentOutcome::UserCallbackRawError(Bytes::from(b"revert".to_vec())),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Callback(CallbackError::Raw(_))));
    }

    #[test]
    fn test_secrets_modes() {
        let config = SecretsConfig {
            mode: SecretsMode::None,
            ..SecretsConfig::default()
        };
        assert_eq!(secrets_from_config(&config).unwrap(), Secrets::None);

        let config = SecretsConfig {
            mode: SecretsMode::Remote,
            urls: vec!["https://example.com/a.json".into()],
            ..SecretsConfig::default()
        };
        assert_eq!(
            secrets_from_config(&config).unwrap(),
            Secrets::Remote(vec!["https://example.com/a.json".into()])
        );
    }

    #[tokio::test]
    async fn test_missing_source_file() {
        let err = load_source(Path::new("does/not/exist.js")).await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn test_bundled_source_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("sources/ai-review-request.js");
        let source = load_source(&path).await.unwrap();
        assert!(source.contains("<|disc_score|>"));
        // same integer rule as score_from_logprob
        assert!(source.contains("Math.abs(raw - score) > 1e-6"));
        assert!(source.contains("!Number.isFinite(raw)"));
        assert!(source.contains(r#"typeof logprob !== "number""#));
        assert!(!source.contains("Number.isInteger"));
    }
}
