use bytes::Bytes;
use redis::{ErrorKind, RedisResult};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::commands::response::Response;
use crate::commands::Command;
use crate::frame::Frame;
use crate::procedure::Script;
use crate::Result;

/// A store able to run atomic procedures, by fingerprint or by full body.
pub trait ScriptStore {
    /// `EVALSHA fingerprint numkeys key... arg...`
    fn eval_sha(&mut self, fingerprint: &str, keys: &[String], args: &[Bytes]) -> RedisResult<Frame>;

    /// `EVAL body numkeys key... arg...`. The store remembers the body under its fingerprint.
    fn eval(&mut self, script: &Script, keys: &[String], args: &[Bytes]) -> RedisResult<Frame>;
}

/// The native single-key operations exposed next to the scripted ones.
pub trait NativeStore {
    fn exists(&mut self, key: &str) -> RedisResult<bool>;
    fn ttl(&mut self, key: &str) -> RedisResult<i64>;
    fn pttl(&mut self, key: &str) -> RedisResult<i64>;
    fn expire(&mut self, key: &str, seconds: u64) -> RedisResult<bool>;
    fn persist(&mut self, key: &str) -> RedisResult<bool>;
    /// `TYPE`; `none` for a missing key.
    fn key_type(&mut self, key: &str) -> RedisResult<String>;
}

/// What this client believes the store has cached. Best effort only: a fingerprint marked known
/// may have been flushed on the server since.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    known: HashMap<String, bool>,
}

impl ScriptRegistry {
    pub fn is_known(&self, fingerprint: &str) -> bool {
        self.known.get(fingerprint).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    fn mark(&mut self, fingerprint: &str, known: bool) {
        self.known.insert(fingerprint.to_string(), known);
    }
}

/// Runs commands against a store, invoking cached procedures by fingerprint and shipping the
/// body only when the store does not know it.
pub struct Executor<S> {
    store: S,
    registry: ScriptRegistry,
}

impl<S: ScriptStore> Executor<S> {
    pub fn new(store: S) -> Executor<S> {
        Executor {
            store,
            registry: ScriptRegistry::default(),
        }
    }

    /// Runs the command and decodes the reply.
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        let reply = self.run(&command)?;
        command.parse_response(reply)
    }

    /// Runs the command and returns the raw reply.
    ///
    /// A `NOSCRIPT` reply to `EVALSHA` is answered with exactly one `EVAL` carrying the body.
    /// Every other failure is returned as is.
    #[instrument(
        name = "execute",
        skip(self, command),
        fields(operation = %command.operation(), keys = command.keys_count())
    )]
    pub fn run(&mut self, command: &Command) -> Result<Frame> {
        let script = command.script();
        let fingerprint = script.fingerprint();
        let argv = command.argv();

        match self.store.eval_sha(fingerprint, command.keys(), &argv) {
            Ok(reply) => {
                debug!(fingerprint, "procedure cache hit");
                self.registry.mark(fingerprint, true);
                Ok(reply)
            }
            Err(e) if e.kind() == ErrorKind::NoScriptError => {
                debug!(fingerprint, "procedure unknown to the store, sending body");
                self.registry.mark(fingerprint, false);

                let reply = self.store.eval(&script, command.keys(), &argv)?;
                self.registry.mark(fingerprint, true);
                Ok(reply)
            }
            Err(e) => {
                warn!(fingerprint, error = %e, "procedure failed");
                Err(e.into())
            }
        }
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
