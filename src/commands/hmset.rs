use bytes::Bytes;

use crate::commands::scripted::{pairs, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Set fields of every hash from alternating field/value arguments. Runs `HSET`, which took
/// over multi-field writes from `HMSET`.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hmset;

impl Scripted for Hmset {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::HashSet))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        pairs(args)
    }
}
