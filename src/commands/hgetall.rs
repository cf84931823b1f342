use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Plan, Read, Step};

/// All fields and values of each hash, decoded into a map per key.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall/>
#[derive(Debug, PartialEq)]
pub struct Hgetall;

impl Scripted for Hgetall {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::read(Read::HashAll))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}
