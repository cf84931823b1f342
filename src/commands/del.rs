use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Pattern, Plan};

/// Delete every key exactly as given. A key holding the wildcard glyph names only itself.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del;

impl Scripted for Del {
    fn plan(&self) -> Plan {
        Plan::Scan(Pattern::Remove)
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}
