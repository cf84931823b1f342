use bytes::Bytes;
use glob_match::glob_match;
use redis::{ErrorKind, RedisError, RedisResult};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::executor::{NativeStore, ScriptStore};
use crate::frame::Frame;
use crate::procedure::{Procedure, Script};

mod eval;

/// An in-process stand-in for a Redis endpoint. It holds typed values with optional
/// expirations, remembers the procedures submitted to it by fingerprint, and runs each procedure
/// under a single lock so no other caller observes it half done.
///
/// Expired keys are purged lazily whenever the store is locked. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn lock(&self) -> Locked<'_> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut locked = Locked { state };
        locked.remove_expired_keys();
        locked
    }

    /// Forgets every submitted procedure, as `SCRIPT FLUSH` does.
    pub fn flush_scripts(&self) {
        self.lock().state.scripts.clear();
    }

    pub fn is_script_loaded(&self, fingerprint: &str) -> bool {
        self.lock().state.scripts.contains_key(fingerprint)
    }
}

#[derive(Default)]
struct State {
    keys: HashMap<Key, Entry>,
    ttls: BTreeSet<(Instant, Key)>,
    scripts: HashMap<String, Procedure>,
}

type Key = String;

pub struct Entry {
    pub value: Value,
    pub expires_at: Option<Instant>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(Bytes),
    List(VecDeque<Bytes>),
    Set(BTreeSet<Bytes>),
    /// Members ordered by score, then by member.
    SortedSet(Vec<(Bytes, f64)>),
    Hash(BTreeMap<Bytes, Bytes>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "zset",
            Value::Hash(_) => "hash",
        }
    }
}

pub struct Locked<'a> {
    state: MutexGuard<'a, State>,
}

impl<'a> Locked<'a> {
    pub fn set(&mut self, key: String, value: Value) {
        self.remove(&key);
        self.state.keys.insert(
            key,
            Entry {
                value,
                expires_at: None,
            },
        );
    }

    pub fn set_with_ttl(&mut self, key: String, value: Value, ttl: Duration) -> RedisResult<()> {
        self.set(key.clone(), value);
        self.expire_in(&key, ttl)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.keys.get(key).map(|entry| &entry.value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.state.keys.remove(key)?;
        if let Some(when) = entry.expires_at {
            self.state.ttls.remove(&(when, key.to_string()));
        }
        Some(entry)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.state.keys.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.state.keys.len()
    }

    /// Existing keys matching a glob pattern, sorted.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .state
            .keys
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Remaining time to live in milliseconds; -2 when the key is missing, -1 when it does not
    /// expire.
    pub fn pttl(&self, key: &str) -> i64 {
        match self.state.keys.get(key) {
            None => -2,
            Some(Entry {
                expires_at: None, ..
            }) => -1,
            Some(Entry {
                expires_at: Some(when),
                ..
            }) => when.saturating_duration_since(Instant::now()).as_millis() as i64,
        }
    }

    /// Remaining time to live in seconds, rounded like `TTL` does.
    pub fn ttl(&self, key: &str) -> i64 {
        match self.pttl(key) {
            ms if ms < 0 => ms,
            ms => (ms + 500) / 1000,
        }
    }

    /// Sets the key to expire after `ttl`. A zero duration deletes it right away. Returns false
    /// when the key does not exist, and an error when the deadline cannot be represented.
    pub fn expire_in(&mut self, key: &str, ttl: Duration) -> RedisResult<bool> {
        let when = deadline(ttl)?;
        if !self.exists(key) {
            return Ok(false);
        }
        if ttl.is_zero() {
            self.remove(key);
            return Ok(true);
        }

        self.persist(key);
        if let Some(entry) = self.state.keys.get_mut(key) {
            entry.expires_at = Some(when);
        }
        self.state.ttls.insert((when, key.to_string()));
        Ok(true)
    }

    /// Removes the key's expiration. Returns true when there was one.
    pub fn persist(&mut self, key: &str) -> bool {
        let when = match self.state.keys.get_mut(key) {
            Some(entry) => entry.expires_at.take(),
            None => None,
        };

        match when {
            Some(when) => {
                self.state.ttls.remove(&(when, key.to_string()));
                true
            }
            None => false,
        }
    }

    pub fn remove_expired_keys(&mut self) -> Option<Instant> {
        let now = Instant::now();

        let expired_keys: Vec<(Instant, String)> = self
            .state
            .ttls
            .iter()
            .take_while(|(expires_at, _)| expires_at <= &now)
            .cloned()
            .collect();

        for (when, key) in expired_keys {
            self.state.ttls.remove(&(when, key.clone()));
            let current = self.state.keys.get(&key).and_then(|entry| entry.expires_at);
            if current == Some(when) {
                debug!(key = %key, "key expired");
                self.state.keys.remove(&key);
            }
        }

        self.state
            .ttls
            .iter()
            .next()
            .map(|&(expires_at, _)| expires_at)
    }

    fn load_script(&mut self, script: &Script) {
        self.state
            .scripts
            .insert(script.fingerprint().to_string(), *script.procedure());
    }

    fn loaded_script(&self, fingerprint: &str) -> Option<Procedure> {
        self.state.scripts.get(fingerprint).copied()
    }

    /// Mutable access to a value of the expected type, created empty when the key is missing.
    fn entry_mut(&mut self, key: &str, empty: fn() -> Value) -> RedisResult<&mut Value> {
        let entry = self.state.keys.entry(key.to_string()).or_insert_with(|| Entry {
            value: empty(),
            expires_at: None,
        });

        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&empty()) {
            return Err(wrong_type());
        }
        Ok(&mut entry.value)
    }
}

/// Expirations must fit in signed milliseconds, as on a Redis server.
fn deadline(ttl: Duration) -> RedisResult<Instant> {
    i64::try_from(ttl.as_millis())
        .ok()
        .and_then(|_| Instant::now().checked_add(ttl))
        .ok_or_else(invalid_expire)
}

fn invalid_expire() -> RedisError {
    RedisError::from((
        ErrorKind::ResponseError,
        "ERR",
        "invalid expire time".to_string(),
    ))
}

pub(crate) fn wrong_type() -> RedisError {
    RedisError::from((
        ErrorKind::TypeError,
        "WRONGTYPE",
        "Operation against a key holding the wrong kind of value".to_string(),
    ))
}

fn no_script() -> RedisError {
    RedisError::from((
        ErrorKind::NoScriptError,
        "NOSCRIPT",
        "No matching script. Please use EVAL.".to_string(),
    ))
}

impl ScriptStore for MemoryStore {
    fn eval_sha(&mut self, fingerprint: &str, keys: &[String], args: &[Bytes]) -> RedisResult<Frame> {
        let mut store = self.lock();
        let procedure = store.loaded_script(fingerprint).ok_or_else(no_script)?;
        store.run(&procedure, keys, args)
    }

    fn eval(&mut self, script: &Script, keys: &[String], args: &[Bytes]) -> RedisResult<Frame> {
        let mut store = self.lock();
        store.load_script(script);
        store.run(script.procedure(), keys, args)
    }
}

impl NativeStore for MemoryStore {
    fn exists(&mut self, key: &str) -> RedisResult<bool> {
        Ok(self.lock().exists(key))
    }

    fn ttl(&mut self, key: &str) -> RedisResult<i64> {
        Ok(self.lock().ttl(key))
    }

    fn pttl(&mut self, key: &str) -> RedisResult<i64> {
        Ok(self.lock().pttl(key))
    }

    fn expire(&mut self, key: &str, seconds: u64) -> RedisResult<bool> {
        self.lock().expire_in(key, Duration::from_secs(seconds))
    }

    fn persist(&mut self, key: &str) -> RedisResult<bool> {
        Ok(self.lock().persist(key))
    }

    fn key_type(&mut self, key: &str) -> RedisResult<String> {
        let store = self.lock();
        Ok(store
            .get(key)
            .map(Value::type_name)
            .unwrap_or("none")
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    fn string(s: &'static str) -> Value {
        Value::String(Bytes::from(s))
    }

    #[tokio::test(start_paused = true)]
    async fn ttl() {
        let store = MemoryStore::new();

        {
            let mut store = store.lock();
            store
                .set_with_ttl("key1".to_string(), string("value1"), Duration::from_secs(10))
                .unwrap();
            store
                .set_with_ttl("key2".to_string(), string("value2"), Duration::from_secs(20))
                .unwrap();
        }

        assert_eq!(store.lock().size(), 2);

        time::advance(Duration::from_secs(10)).await;

        assert_eq!(store.lock().size(), 1);
        assert!(store.lock().exists("key2"));
        assert_eq!(store.lock().ttl("key2"), 10);

        time::advance(Duration::from_secs(20)).await;
        assert_eq!(store.lock().size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_drops_stale_expiration() {
        let store = MemoryStore::new();

        store
            .lock()
            .set_with_ttl("key".to_string(), string("old"), Duration::from_secs(5))
            .unwrap();
        store.lock().set("key".to_string(), string("new"));

        time::advance(Duration::from_secs(6)).await;

        assert_eq!(store.lock().get("key"), Some(&string("new")));
        assert_eq!(store.lock().pttl("key"), -1);
    }

    #[test]
    fn pttl_of_missing_and_persistent_keys() {
        let store = MemoryStore::new();
        store.lock().set("key".to_string(), string("v"));

        assert_eq!(store.lock().pttl("missing"), -2);
        assert_eq!(store.lock().pttl("key"), -1);
        assert_eq!(store.lock().ttl("missing"), -2);
    }

    #[test]
    fn persist_and_expire() {
        let mut store = MemoryStore::new();
        store.lock().set("key".to_string(), string("v"));

        assert!(store.expire("key", 100).unwrap());
        assert!(store.ttl("key").unwrap() > 0);
        assert!(store.persist("key").unwrap());
        assert_eq!(store.ttl("key").unwrap(), -1);
        assert!(!store.persist("key").unwrap());
        assert!(!store.expire("missing", 100).unwrap());
        assert!(store.expire("key", 0).unwrap());
        assert!(!store.exists("key").unwrap());
    }

    #[test]
    fn expiration_out_of_range() {
        let mut store = MemoryStore::new();
        store.lock().set("key".to_string(), string("v"));

        let err = store.expire("key", u64::MAX).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResponseError);
        assert_eq!(store.ttl("key").unwrap(), -1);
        assert!(store.expire("missing", u64::MAX).is_err());
    }

    #[test]
    fn keys_match_glob_patterns() {
        let store = MemoryStore::new();
        {
            let mut store = store.lock();
            store.set("log:2023:01".to_string(), string("a"));
            store.set("log:2023:02".to_string(), string("b"));
            store.set("log:2024:01".to_string(), string("c"));
        }

        assert_eq!(
            store.lock().keys("log:2023:*"),
            vec!["log:2023:01".to_string(), "log:2023:02".to_string()]
        );
        assert_eq!(store.lock().keys("log:*:01").len(), 2);
        assert!(store.lock().keys("nope:*").is_empty());
    }

    #[test]
    fn key_type() {
        let mut store = MemoryStore::new();
        store
            .lock()
            .set("h".to_string(), Value::Hash(BTreeMap::new()));

        assert_eq!(store.key_type("h").unwrap(), "hash");
        assert_eq!(store.key_type("missing").unwrap(), "none");
    }

    #[test]
    fn unknown_fingerprint() {
        let mut store = MemoryStore::new();
        let err = store.eval_sha("deadbeef", &[], &[]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoScriptError);
    }
}
