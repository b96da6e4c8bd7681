//! CLI command definitions and handlers

use clap::Subcommand;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::config::ProxyConfig;
use crate::core::handler::TranslationProxy;

/// Commands for the quota translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Lambda runtime loop (default when no command is given)
    Lambda,

    /// Run a single invocation locally from an event file
    Invoke {
        /// Path to a gateway proxy event JSON file
        #[arg(short, long)]
        event: PathBuf,
    },

    /// Start a local HTTP server in front of the proxy
    Server {
        /// Bind address (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port (default: 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

/// Build the proxy from environment configuration
async fn build_proxy() -> anyhow::Result<TranslationProxy> {
    let config = ProxyConfig::from_env()?;
    Ok(TranslationProxy::from_env(&config).await)
}

/// Handle the Lambda runtime command
pub async fn handle_lambda() -> anyhow::Result<()> {
    let proxy = build_proxy().await?;
    let proxy = &proxy;

    info!("Starting Lambda runtime");

    // Raw JSON payload: a malformed event still gets an envelope after the quota gate
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, lambda_runtime::Error>(proxy.handle_payload(&event.payload).await)
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}

/// Read an invocation payload from a JSON file
pub fn load_event(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let event = serde_json::from_str(&content)?;
    Ok(event)
}

/// Handle the local invoke command
pub async fn handle_invoke(event: PathBuf) -> anyhow::Result<()> {
    let event = load_event(&event)?;
    let proxy = build_proxy().await?;

    let response = proxy.handle_payload(&event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

/// Handle the local server command
pub async fn handle_server(host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let proxy = build_proxy().await?;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}/translate", host, port);

    run_server(proxy, host, port).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::InvocationEvent;
    use std::io::Write;

    #[test]
    fn test_load_event_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"httpMethod":"POST","isBase64Encoded":false,"body":"{{\"Text\":\"hi\"}}"}}"#
        )
        .unwrap();

        let event = InvocationEvent::from_payload(&load_event(file.path()).unwrap());
        assert_eq!(event.is_base64_encoded, Some(Value::Bool(false)));
        assert_eq!(event.body, Some(Value::String(r#"{"Text":"hi"}"#.to_string())));
    }

    #[test]
    fn test_load_event_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_event(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_load_event_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_event(file.path()).is_err());
    }
}
