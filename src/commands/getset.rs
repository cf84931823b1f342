use bytes::Bytes;

use crate::commands::scripted::{at_least_one, exactly_one, pairs, score_pairs, Scripted};
use crate::procedure::{Plan, Read, Step, Write};

/// Read each key's whole value, rewrite the key from scratch with the arguments and reply with
/// the value it held before. The key keeps its expiration unless one is set on the command.
pub struct Getset {
    prior: Read,
    write: Write,
    check: fn(&[Bytes]) -> Result<(), String>,
}

pub const STRING: Getset = Getset {
    prior: Read::Get,
    write: Write::Set,
    check: exactly_one,
};

pub const LIST: Getset = Getset {
    prior: Read::ListRange,
    write: Write::RightPush,
    check: at_least_one,
};

pub const SET: Getset = Getset {
    prior: Read::Members,
    write: Write::Add,
    check: at_least_one,
};

pub const ZSET: Getset = Getset {
    prior: Read::SortedRange,
    write: Write::SortedAdd,
    check: score_pairs,
};

pub const HASH: Getset = Getset {
    prior: Read::HashAll,
    write: Write::HashSet,
    check: pairs,
};

impl Scripted for Getset {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::replace(self.prior, self.write))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        (self.check)(args)
    }
}
