//! Waitline CLI - Command-line interface for the Waitline daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "waitline")]
#[command(about = "Waitline virtual queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WAITLINE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new store
    CreateStore {
        /// Store name (unique, exact match)
        name: String,
    },

    /// Delete a store and its queue
    RemoveStore {
        /// Store ID
        store_id: String,
    },

    /// List registered store names
    Stores,

    /// Show one store
    Store {
        /// Look up by exact name
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        name: Option<String>,

        /// Look up by ID
        #[arg(long)]
        id: Option<String>,
    },

    /// Put a consumer at the end of a store's line
    Enqueue {
        /// Store ID
        #[arg(short, long)]
        store: String,

        /// Consumer name
        #[arg(short, long)]
        name: String,

        /// Consumer phone (unique within the store)
        #[arg(short, long)]
        phone: String,

        /// Status label
        #[arg(long, default_value = "waiting")]
        status: String,
    },

    /// Take a consumer out of a store's line
    Dequeue {
        /// Store ID
        #[arg(short, long)]
        store: String,

        /// Consumer phone
        #[arg(short, long)]
        phone: String,
    },

    /// Show a consumer's position by phone
    Position {
        /// Store ID
        #[arg(short, long)]
        store: String,

        /// Consumer phone
        #[arg(short, long)]
        phone: String,
    },

    /// List a store's line in order
    Consumers {
        /// Store ID
        store: String,
    },

    /// Check an access key and show the holder's position
    Validate {
        /// Store name
        #[arg(short, long)]
        store_name: String,

        /// Access key from the ticket URL
        #[arg(short, long)]
        key: String,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct StoreRow {
    id: String,
    name: String,
    #[serde(rename = "accessURL")]
    #[tabled(rename = "access_url")]
    access_url: String,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct PositionRow {
    position: usize,
    name: String,
    phone: String,
    access_key: String,
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsumerEntry {
    name: String,
    phone: String,
    access_key: String,
    status: String,
}

#[derive(Tabled)]
struct LineRow {
    position: usize,
    name: String,
    phone: String,
    access_key: String,
    status: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    into_result(response)
}

/// An error reply becomes `Err`, so the process exits non-zero
fn into_result(response: JsonRpcResponse) -> Result<serde_json::Value> {
    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Attach 0-based positions to an ordered consumer list
fn line_rows(consumers: Vec<ConsumerEntry>) -> Vec<LineRow> {
    consumers
        .into_iter()
        .enumerate()
        .map(|(position, c)| LineRow {
            position,
            name: c.name,
            phone: c.phone,
            access_key: c.access_key,
            status: c.status,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::CreateStore { name } => {
            let result = call_rpc(url, "store.create.v1", json!({ "name": name })).await?;
            let store: StoreRow = serde_json::from_value(result)?;

            println!("{}", "✓ Store created".green().bold());
            println!();
            println!("{}", Table::new(vec![store]));
        }

        Commands::RemoveStore { store_id } => {
            call_rpc(url, "store.remove.v1", json!({ "store_id": store_id })).await?;

            println!("{}", format!("✓ Store {} removed", store_id).green().bold());
        }

        Commands::Stores => {
            let result = call_rpc(url, "store.list.v1", json!({})).await?;
            let names: Vec<String> = serde_json::from_value(result["names"].clone())?;

            if names.is_empty() {
                println!("{}", "No stores registered".yellow());
            }
            for name in names {
                println!("  {} {}", "•".bold(), name);
            }
        }

        Commands::Store { name, id } => {
            let result = match (name, id) {
                (Some(name), _) => call_rpc(url, "store.get.v1", json!({ "name": name })).await?,
                (None, Some(id)) => {
                    call_rpc(url, "store.get_by_id.v1", json!({ "store_id": id })).await?
                }
                (None, None) => anyhow::bail!("--name or --id required"),
            };
            let store: StoreRow = serde_json::from_value(result)?;

            println!("{}", Table::new(vec![store]));
        }

        Commands::Enqueue {
            store,
            name,
            phone,
            status,
        } => {
            let params = json!({
                "store_id": store,
                "name": name,
                "phone": phone,
                "status": status,
            });
            let result = call_rpc(url, "consumer.add.v1", params).await?;

            println!("{}", "✓ Consumer enqueued".green().bold());
            println!(
                "  {} {}",
                "Ticket:".bold(),
                result["access_url"].as_str().unwrap_or_default()
            );
        }

        Commands::Dequeue { store, phone } => {
            let params = json!({ "store_id": store, "phone": phone });
            call_rpc(url, "consumer.remove.v1", params).await?;

            println!("{}", format!("✓ Consumer {} dequeued", phone).green().bold());
        }

        Commands::Position { store, phone } => {
            let params = json!({ "store_id": store, "phone": phone });
            let result = call_rpc(url, "consumer.get.v1", params).await?;
            let row: PositionRow = serde_json::from_value(result)?;

            println!("{}", Table::new(vec![row]));
        }

        Commands::Consumers { store } => {
            let result = call_rpc(url, "consumer.list.v1", json!({ "store_id": store })).await?;
            let consumers: Vec<ConsumerEntry> =
                serde_json::from_value(result["consumers"].clone())?;

            if consumers.is_empty() {
                println!("{}", "Queue is empty".yellow());
            } else {
                println!("{}", Table::new(line_rows(consumers)));
            }
        }

        Commands::Validate { store_name, key } => {
            let params = json!({ "store_name": store_name, "access_key": key });
            let result = call_rpc(url, "consumer.validate.v1", params)
                .await
                .context("Access key rejected")?;
            let row: PositionRow = serde_json::from_value(result)?;

            println!("{}", "✓ Access key valid".green().bold());
            println!("{}", Table::new(vec![row]));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_lookup_needs_name_or_id() {
        assert!(Cli::try_parse_from(["waitline", "store"]).is_err());
        assert!(Cli::try_parse_from(["waitline", "store", "--name", "Outback"]).is_ok());
        assert!(
            Cli::try_parse_from(["waitline", "store", "--name", "a", "--id", "b"]).is_err()
        );
    }

    #[test]
    fn test_enqueue_defaults_status() {
        let cli = Cli::try_parse_from([
            "waitline", "enqueue", "-s", "store-1", "-n", "Fulano", "-p", "011998989898",
        ])
        .unwrap();
        match cli.command {
            Commands::Enqueue { status, .. } => assert_eq!(status, "waiting"),
            _ => panic!("expected enqueue"),
        }
    }

    #[test]
    fn test_rejected_access_key_is_an_error() {
        let reply: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 4001, "message": "Not found: access key not valid for Outback" }
        }))
        .unwrap();

        let err = into_result(reply).unwrap_err();
        assert!(err.to_string().contains("4001"));
    }

    #[test]
    fn test_result_reply_passes_through() {
        let reply: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "names": ["Outback"] }
        }))
        .unwrap();

        assert_eq!(into_result(reply).unwrap()["names"][0], "Outback");
    }

    #[test]
    fn test_line_rows_number_from_zero() {
        let rows = line_rows(vec![
            ConsumerEntry {
                name: "Fulano".into(),
                phone: "1".into(),
                access_key: "k1".into(),
                status: "waiting".into(),
            },
            ConsumerEntry {
                name: "Ciclano".into(),
                phone: "2".into(),
                access_key: "k2".into(),
                status: "waiting".into(),
            },
        ]);
        assert_eq!(rows[0].position, 0);
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].name, "Ciclano");
    }
}
