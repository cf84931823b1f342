use bytes::Bytes;
use redis::{ConnectionLike, RedisResult};
use tracing::debug;

use crate::executor::{NativeStore, ScriptStore};
use crate::frame::Frame;
use crate::procedure::Script;

/// Runs procedures and native commands over a live Redis connection.
///
/// Any `redis::ConnectionLike` works, so a pooled or cluster-routed connection can be passed in
/// place of a plain one.
pub struct RedisConnection<C = redis::Connection> {
    conn: C,
}

impl RedisConnection<redis::Connection> {
    /// Connects to `url`, e.g. `redis://127.0.0.1:6379/`.
    pub fn open(url: &str) -> RedisResult<RedisConnection> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        debug!(url, "connected");

        Ok(RedisConnection { conn })
    }
}

impl<C: ConnectionLike> RedisConnection<C> {
    pub fn new(conn: C) -> RedisConnection<C> {
        RedisConnection { conn }
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    fn script_call(
        &mut self,
        name: &str,
        head: &str,
        keys: &[String],
        args: &[Bytes],
    ) -> RedisResult<Frame> {
        let mut cmd = redis::cmd(name);
        cmd.arg(head).arg(keys.len());
        for key in keys {
            cmd.arg(key);
        }
        for arg in args {
            cmd.arg(arg.as_ref());
        }

        let value: redis::Value = cmd.query(&mut self.conn)?;
        Ok(Frame::from(value))
    }
}

impl<C: ConnectionLike> ScriptStore for RedisConnection<C> {
    fn eval_sha(&mut self, fingerprint: &str, keys: &[String], args: &[Bytes]) -> RedisResult<Frame> {
        self.script_call("EVALSHA", fingerprint, keys, args)
    }

    fn eval(&mut self, script: &Script, keys: &[String], args: &[Bytes]) -> RedisResult<Frame> {
        self.script_call("EVAL", script.body(), keys, args)
    }
}

impl<C: ConnectionLike> NativeStore for RedisConnection<C> {
    fn exists(&mut self, key: &str) -> RedisResult<bool> {
        redis::cmd("EXISTS").arg(key).query(&mut self.conn)
    }

    fn ttl(&mut self, key: &str) -> RedisResult<i64> {
        redis::cmd("TTL").arg(key).query(&mut self.conn)
    }

    fn pttl(&mut self, key: &str) -> RedisResult<i64> {
        redis::cmd("PTTL").arg(key).query(&mut self.conn)
    }

    fn expire(&mut self, key: &str, seconds: u64) -> RedisResult<bool> {
        redis::cmd("EXPIRE").arg(key).arg(seconds).query(&mut self.conn)
    }

    fn persist(&mut self, key: &str) -> RedisResult<bool> {
        redis::cmd("PERSIST").arg(key).query(&mut self.conn)
    }

    fn key_type(&mut self, key: &str) -> RedisResult<String> {
        redis::cmd("TYPE").arg(key).query(&mut self.conn)
    }
}
