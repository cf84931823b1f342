use bytes::Bytes;

use crate::commands::scripted::{at_least_one, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Append the values to the tail of every list. Replies with each list's new length.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct Rpush;

impl Scripted for Rpush {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::RightPush))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        at_least_one(args)
    }
}
