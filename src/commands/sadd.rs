use bytes::Bytes;

use crate::commands::scripted::{at_least_one, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct Sadd;

impl Scripted for Sadd {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::Add))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        at_least_one(args)
    }
}
