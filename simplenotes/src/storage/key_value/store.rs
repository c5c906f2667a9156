use std::collections::HashMap;
use async_trait::async_trait;
use log::{error, trace};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::storage::errors::StorageError;

/// Hash-map commands of a Redis-like store. Each call is atomic on the
/// store side.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn hash_get_all(
        &self,
        key: &str,
    ) -> Result<Vec<(String, String)>, StorageError>;

    async fn hash_get(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), StorageError>;

    /// Sets the field only if it is already there. Returns whether it was.
    async fn hash_replace(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StorageError>;

    /// Returns whether the field existed.
    async fn hash_delete(
        &self,
        key: &str,
        field: &str,
    ) -> Result<bool, StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        MemoryKeyValueStore::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn hash_get_all(
        &self,
        key: &str,
    ) -> Result<Vec<(String, String)>, StorageError> {
        Ok(
            self.hashes.read().await
                .get(key)
                .map(|hash| hash
                    .iter()
                    .map(|(f, v)| (f.clone(), v.clone()))
                    .collect()
                )
                .unwrap_or_default()
        )
    }

    async fn hash_get(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(
            self.hashes.read().await
                .get(key)
                .and_then(|hash| hash.get(field))
                .cloned()
        )
    }

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        self.hashes.write().await
            .entry(key.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
        Ok(())
    }

    async fn hash_replace(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StorageError> {
        let mut hashes = self.hashes.write().await;
        let Some(existing) = hashes
            .get_mut(key)
            .and_then(|hash| hash.get_mut(field))
        else {
            return Ok(false);
        };
        value.clone_into(existing);
        Ok(true)
    }

    async fn hash_delete(
        &self,
        key: &str,
        field: &str,
    ) -> Result<bool, StorageError> {
        let mut hashes = self.hashes.write().await;
        let Some(hash) = hashes.get_mut(key) else {
            return Ok(false);
        };
        let existed = hash.remove(field).is_some();
        if hash.is_empty() {
            hashes.remove(key);
        }
        Ok(existed)
    }
}

/// A store speaking the Redis-over-REST dialect: every command is a JSON
/// array posted to the base url, answered with `{"result": ...}` or
/// `{"error": "..."}`.
#[derive(Debug)]
pub struct RestKeyValueStore {
    client: Client,
    url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommandAnswer {
    #[serde(default)]
    result: Value,

    #[serde(default)]
    error: Option<String>,
}

impl RestKeyValueStore {
    pub fn new(
        url: &str,
        token: Option<String>,
    ) -> Result<RestKeyValueStore, StorageError> {
        let url = Url::parse(url)
            .map_err(|e|
                StorageError::Backend(format!("invalid store url \"{url}\": {e}"))
            )?;
        Ok(RestKeyValueStore {
            client: Client::new(),
            url,
            token,
        })
    }

    async fn command(&self, command: &[&str]) -> Result<Value, StorageError> {
        trace!("sending {} to the key-value store", command[0]);
        let mut request = self.client
            .post(self.url.clone())
            .json(command);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await
            .inspect_err(|e| error!("key-value store request failed: {e}"))?;
        let status = response.status();
        let body = response.bytes().await?;
        let answer: CommandAnswer = serde_json::from_slice(&body)
            .map_err(|e| {
                error!(
                    "unexpected answer from the key-value store \
                        with status {status}: {e}"
                );
                StorageError::Backend(format!("unexpected answer with status {status}"))
            })?;
        if let Some(message) = answer.error {
            error!("key-value store rejected {}: {message}", command[0]);
            return Err(StorageError::Backend(message));
        }
        if !status.is_success() {
            return Err(StorageError::Backend(format!("status {status}")));
        }
        Ok(answer.result)
    }
}

/// Redis has no "set if the field exists" command, so the check and the
/// write run as one server-side script.
const HASH_REPLACE_SCRIPT: &str = "\
    if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then \
        redis.call('HSET', KEYS[1], ARGV[1], ARGV[2]) \
        return 1 \
    end \
    return 0";

fn unexpected(command: &str, value: &Value) -> StorageError {
    error!("unexpected {command} result from the key-value store: {value}");
    StorageError::Backend(format!("unexpected {command} result"))
}

#[async_trait]
impl KeyValueStore for RestKeyValueStore {
    async fn hash_get_all(
        &self,
        key: &str,
    ) -> Result<Vec<(String, String)>, StorageError> {
        let result = self.command(&["HGETALL", key]).await?;
        let Value::Array(items) = &result else {
            return Err(unexpected("HGETALL", &result));
        };
        if items.len() % 2 != 0 {
            return Err(unexpected("HGETALL", &result));
        }
        items
            .chunks(2)
            .map(|pair| match pair {
                [Value::String(field), Value::String(value)] =>
                    Ok((field.clone(), value.clone())),
                _ => Err(unexpected("HGETALL", &result)),
            })
            .collect()
    }

    async fn hash_get(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<String>, StorageError> {
        match self.command(&["HGET", key, field]).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Err(unexpected("HGET", &other)),
        }
    }

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        match self.command(&["HSET", key, field, value]).await? {
            Value::Number(_) => Ok(()),
            other => Err(unexpected("HSET", &other)),
        }
    }

    async fn hash_replace(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StorageError> {
        match self.command(&["EVAL", HASH_REPLACE_SCRIPT, "1", key, field, value]).await? {
            Value::Number(n) => Ok(n.as_u64() == Some(1)),
            other => Err(unexpected("EVAL", &other)),
        }
    }

    async fn hash_delete(
        &self,
        key: &str,
        field: &str,
    ) -> Result<bool, StorageError> {
        match self.command(&["HDEL", key, field]).await? {
            Value::Number(n) => Ok(n.as_u64().is_some_and(|n| n > 0)),
            other => Err(unexpected("HDEL", &other)),
        }
    }
}
