use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Pattern, Plan};

/// Total number of existing keys. A key holding the wildcard counts every key matching it.
#[derive(Debug, PartialEq)]
pub struct Count;

impl Scripted for Count {
    fn plan(&self) -> Plan {
        Plan::Scan(Pattern::Count)
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}
