//! Verification of user-hosted secrets documents.
//!
//! Every URL must serve the same JSON object, and that object must hold an
//! entry for every DON node (lowercase address) or a `"0x0"` default.

use alloy::primitives::Address;
use reqwest::Client;
use serde_json::Value;

use crate::secrets::types::SecretsError;

/// Key of the entry shared by all nodes.
pub const DEFAULT_NODE_KEY: &str = "0x0";

/// A fetched secrets document.
#[derive(Debug, Clone)]
pub struct FetchedSecrets {
    pub url: String,
    pub secrets: Value,
}

/// Fetch one secrets document, bounded in size.
pub async fn fetch_secrets(
    http: &Client,
    url: &str,
    max_content_length: usize,
) -> Result<FetchedSecrets, SecretsError> {
    let fail = |reason: String| SecretsError::Fetch {
        url: url.to_string(),
        reason,
    };

    let res = http.get(url).send().await.map_err(|e| fail(e.to_string()))?;
    let status = res.status();
    if !status.is_success() {
        return Err(fail(format!("status {}", status)));
    }
    if res.content_length().is_some_and(|len| len as usize > max_content_length) {
        return Err(fail(format!("body exceeds {} bytes", max_content_length)));
    }

    let body = res.bytes().await.map_err(|e| fail(e.to_string()))?;
    if body.len() > max_content_length {
        return Err(fail(format!("body exceeds {} bytes", max_content_length)));
    }

    let secrets = serde_json::from_slice(&body).map_err(|e| fail(format!("invalid JSON: {}", e)))?;
    Ok(FetchedSecrets {
        url: url.to_string(),
        secrets,
    })
}

/// Check already fetched documents against the DON node list.
pub fn check_documents(documents: &[FetchedSecrets], nodes: &[Address]) -> Result<(), SecretsError> {
    let Some(first) = documents.first() else {
        return Ok(());
    };

    for doc in documents {
        if doc.secrets != first.secrets {
            return Err(SecretsError::Mismatch {
                url: doc.url.clone(),
                first_url: first.url.clone(),
            });
        }

        for node in nodes {
            let node = node.to_string().to_lowercase();
            if !is_truthy(doc.secrets.get(&node)) && !is_truthy(doc.secrets.get(DEFAULT_NODE_KEY)) {
                return Err(SecretsError::MissingNodeSecrets { node });
            }
        }
    }
    Ok(())
}

/// Fetch every URL and verify the documents.
pub async fn verify_remote_secrets(
    http: &Client,
    urls: &[String],
    nodes: &[Address],
    max_content_length: usize,
) -> Result<(), SecretsError> {
    let mut documents = Vec::with_capacity(urls.len());
    for url in urls {
        documents.push(fetch_secrets(http, url, max_content_length).await?);
    }
    check_documents(&documents, nodes)?;

    tracing::info!(urls = urls.len(), nodes = nodes.len(), "Off-chain secrets verified");
    Ok(())
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(url: &str, secrets: Value) -> FetchedSecrets {
        FetchedSecrets {
            url: url.to_string(),
            secrets,
        }
    }

    #[test]
    fn test_node_specific_entry() {
        let node = Address::repeat_byte(0xab);
        let key = node.to_string().to_lowercase();
        let docs = vec![doc("https://a", json!({ key: "c2VjcmV0" }))];
        assert!(check_documents(&docs, &[node]).is_ok());
    }

    #[test]
    fn test_empty_entry_falls_back_to_default() {
        let node = Address::repeat_byte(0xab);
        let key = node.to_string().to_lowercase();

        let docs = vec![doc("https://a", json!({ key.clone(): "" }))];
        assert!(check_documents(&docs, &[node]).is_err());

        let docs = vec![doc("https://a", json!({ key: "", "0x0": "ZGVmYXVsdA==" }))];
        assert!(check_documents(&docs, &[node]).is_ok());
    }

    #[test]
    fn test_no_documents() {
        assert!(check_documents(&[], &[Address::ZERO]).is_ok());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!({}))));
    }
}
