use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Plan, Read, Step};

/// Every member of each sorted set, lowest score first. Scores are not returned.
///
/// Ref: <https://redis.io/docs/latest/commands/zrange/>
#[derive(Debug, PartialEq)]
pub struct Zrange;

impl Scripted for Zrange {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::read(Read::SortedRange))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}
