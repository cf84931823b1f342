use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Plan, Read, Step};

/// Every element of each list.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange;

impl Scripted for Lrange {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::read(Read::ListRange))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}
