use bytes::Bytes;

use crate::commands::scripted::{score_pairs, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Add members with scores to every sorted set. Arguments alternate score and member, the way
/// `ZADD` takes them.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct Zadd;

impl Scripted for Zadd {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::SortedAdd))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        score_pairs(args)
    }
}
