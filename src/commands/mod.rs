pub mod count;
pub mod del;
pub mod delete;
pub mod factory;
pub mod get;
pub mod getset;
pub mod hgetall;
pub mod hmset;
pub mod keys;
pub mod lpush;
pub mod lrange;
pub mod response;
pub mod rpush;
pub mod sadd;
pub mod scripted;
pub mod set;
pub mod smembers;
pub mod zadd;
pub mod zrange;

use bytes::Bytes;
use itertools::Itertools;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::commands::scripted::Scripted;
use crate::frame::Frame;
use crate::procedure::{Plan, Precondition, Procedure, Script, Ttl};
use crate::Error;

pub use response::{Data, KeyedValues, Response};

use count::Count;
use del::Del;
use delete::Delete;
use get::Get;
use hgetall::Hgetall;
use hmset::Hmset;
use keys::Keys;
use lpush::Lpush;
use lrange::Lrange;
use rpush::Rpush;
use sadd::Sadd;
use set::Set;
use smembers::Smembers;
use zadd::Zadd;
use zrange::Zrange;

/// Every operation the factory knows. Names parse case-insensitively.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Operation {
    Get,
    Lrange,
    Smembers,
    Zrange,
    Hgetall,

    Set,
    Rpush,
    Lpush,
    Sadd,
    Zadd,
    Hmset,

    GetsetString,
    GetsetList,
    GetsetSet,
    GetsetZset,
    GetsetHash,

    Keys,
    Count,
    Delete,
    Del,
}

impl Operation {
    fn scripted(self) -> &'static dyn Scripted {
        match self {
            Operation::Get => &Get,
            Operation::Lrange => &Lrange,
            Operation::Smembers => &Smembers,
            Operation::Zrange => &Zrange,
            Operation::Hgetall => &Hgetall,
            Operation::Set => &Set,
            Operation::Rpush => &Rpush,
            Operation::Lpush => &Lpush,
            Operation::Sadd => &Sadd,
            Operation::Zadd => &Zadd,
            Operation::Hmset => &Hmset,
            Operation::GetsetString => &getset::STRING,
            Operation::GetsetList => &getset::LIST,
            Operation::GetsetSet => &getset::SET,
            Operation::GetsetZset => &getset::ZSET,
            Operation::GetsetHash => &getset::HASH,
            Operation::Keys => &Keys,
            Operation::Count => &Count,
            Operation::Delete => &Delete,
            Operation::Del => &Del,
        }
    }

    pub fn plan(self) -> Plan {
        self.scripted().plan()
    }
}

/// One atomic operation over a set of keys, built fresh for a single call.
///
/// The precondition, delete-before-write flag and expiration directive are plain fields set
/// through the builder methods; they shape the procedure returned by [`Command::procedure`].
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    operation: Operation,
    keys: Vec<String>,
    args: Vec<Bytes>,
    ttl: Ttl,
    precondition: Precondition,
    delete_before_write: bool,
}

impl Command {
    /// Repeated keys are dropped, keeping the first occurrence.
    pub fn new(operation: Operation, keys: Vec<String>, args: Vec<Bytes>) -> Result<Command, Error> {
        operation
            .scripted()
            .check_arguments(&args)
            .map_err(|reason| Error::arguments(operation, reason))?;

        Ok(Command {
            operation,
            keys: keys.into_iter().unique().collect(),
            args,
            ttl: Ttl::Unset,
            precondition: Precondition::None,
            delete_before_write: false,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn keys_count(&self) -> usize {
        self.keys.len()
    }

    /// Positional arguments as the procedure receives them: the payload, then the expiration in
    /// seconds when one is set.
    pub fn argv(&self) -> Vec<Bytes> {
        let mut argv = self.args.clone();
        if let Ttl::ExpireIn(seconds) = self.ttl {
            argv.push(Bytes::from(seconds.to_string()));
        }
        argv
    }

    /// Keys followed by the positional arguments, as they are sent to the store.
    pub fn arguments(&self) -> Vec<Bytes> {
        self.keys
            .iter()
            .map(|key| Bytes::from(key.clone()))
            .chain(self.argv())
            .collect()
    }

    /// An expiration of zero seconds means no directive, so the key keeps its prior expiration.
    pub fn set_ttl(mut self, ttl: Ttl) -> Command {
        self.ttl = match ttl {
            Ttl::ExpireIn(0) => Ttl::Unset,
            ttl => ttl,
        };
        self
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub fn require_exists(mut self) -> Command {
        self.precondition = Precondition::MustExist;
        self
    }

    pub fn require_not_exists(mut self) -> Command {
        self.precondition = Precondition::MustNotExist;
        self
    }

    pub fn precondition(&self) -> Precondition {
        self.precondition
    }

    pub fn delete_before_write(mut self) -> Command {
        self.delete_before_write = true;
        self
    }

    pub fn deletes_before_write(&self) -> bool {
        self.delete_before_write
    }

    pub fn procedure(&self) -> Procedure {
        let plan = match self.operation.plan() {
            Plan::PerKey(mut step) => {
                step.clear |= self.delete_before_write && step.preserves_ttl();
                step.ttl = self.ttl;
                Plan::PerKey(step)
            }
            scan => scan,
        };

        Procedure::new(plan).guard(self.precondition)
    }

    pub fn script(&self) -> Script {
        Script::new(self.procedure())
    }

    pub fn parse_response(&self, reply: Frame) -> Result<Response, Error> {
        response::resolve(self, reply)
    }
}
