use lpa_domain::lpa::Lpa;
use lpa_domain::ports::BoxFuture;
use lpa_domain::ports::store::{LpaStore, StoreError};
use redis::aio::ConnectionManager;

const DEFAULT_PREFIX: &str = "lpa:donor";

/// Compare-and-set on a hash holding `version` and `data`. Returns
/// `{1, new_version}` on success and `{0, stored_version}` on a mismatch.
const PUT_SCRIPT: &str = r#"
    local stored = tonumber(redis.call('HGET', KEYS[1], 'version') or '0')
    if stored ~= tonumber(ARGV[1]) then
        return {0, stored}
    end
    local next_version = stored + 1
    redis.call('HSET', KEYS[1], 'version', next_version, 'data', ARGV[2])
    return {1, next_version}
"#;

#[derive(Clone)]
pub struct RedisLpaStore {
    manager: ConnectionManager,
    prefix: String,
}

impl RedisLpaStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Self::connect_with_prefix(redis_url, DEFAULT_PREFIX).await
    }

    pub async fn connect_with_prefix(
        redis_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self {
            manager,
            prefix: prefix.into(),
        })
    }

    fn key(&self, session_id: &str) -> String {
        session_key(&self.prefix, session_id)
    }
}

fn session_key(prefix: &str, session_id: &str) -> String {
    format!("{prefix}:{session_id}")
}

fn serialize(lpa: &Lpa) -> Result<String, StoreError> {
    serde_json::to_string(lpa).map_err(|err| StoreError::Serialization(err.to_string()))
}

fn deserialize(payload: &str, version: u64) -> Result<Lpa, StoreError> {
    let mut lpa: Lpa =
        serde_json::from_str(payload).map_err(|err| StoreError::Serialization(err.to_string()))?;
    // the hash field is authoritative; the payload was written one version behind
    lpa.version = version;
    Ok(lpa)
}

fn put_outcome(reply: &[u64], expected: u64) -> Result<u64, StoreError> {
    match reply {
        [1, version] => Ok(*version),
        [0, found] => Err(StoreError::Conflict {
            expected,
            found: *found,
        }),
        other => Err(StoreError::Operation(format!(
            "unexpected put reply: {other:?}"
        ))),
    }
}

impl LpaStore for RedisLpaStore {
    fn get(&self, session_id: &str) -> BoxFuture<'_, Result<Option<Lpa>, StoreError>> {
        let key = self.key(session_id);
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let (version, data): (Option<u64>, Option<String>) = redis::cmd("HMGET")
                .arg(&key)
                .arg("version")
                .arg("data")
                .query_async(&mut conn)
                .await
                .map_err(|err| StoreError::Operation(err.to_string()))?;
            match (version, data) {
                (Some(version), Some(payload)) => Ok(Some(deserialize(&payload, version)?)),
                _ => Ok(None),
            }
        })
    }

    fn put(&self, session_id: &str, lpa: &Lpa) -> BoxFuture<'_, Result<u64, StoreError>> {
        let key = self.key(session_id);
        let expected = lpa.version;
        let payload = serialize(lpa);
        Box::pin(async move {
            let payload = payload?;
            let mut conn = self.manager.clone();
            let reply: Vec<u64> = redis::Script::new(PUT_SCRIPT)
                .key(&key)
                .arg(expected)
                .arg(payload)
                .invoke_async(&mut conn)
                .await
                .map_err(|err| StoreError::Operation(err.to_string()))?;
            let outcome = put_outcome(&reply, expected);
            if let Err(StoreError::Conflict { found, .. }) = &outcome {
                tracing::warn!(expected, found, "lpa version conflict");
            }
            outcome
        })
    }
}
