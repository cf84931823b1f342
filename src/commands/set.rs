use bytes::Bytes;

use crate::commands::scripted::{exactly_one, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Set every key to hold the same string value.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set;

impl Scripted for Set {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::Set))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        exactly_one(args)
    }
}
