use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Pattern, Plan};

/// Delete every key, expanding wildcard keys to the keys matching them first. Replies with the
/// number of keys removed.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Delete;

impl Scripted for Delete {
    fn plan(&self) -> Plan {
        Plan::Scan(Pattern::Delete)
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{run, seed};
    use crate::commands::Operation;
    use crate::store::MemoryStore;

    #[test]
    fn fuzzy_and_exact_keys() {
        let store = MemoryStore::new();
        for key in ["log:2023:01", "log:2023:02", "log:2024:01", "other"] {
            seed(&store, Operation::Set, key, &["x"]);
        }

        let deleted = run(&store, Operation::Delete, &["log:2023:*", "other", "missing"], &[])
            .unwrap()
            .count();

        assert_eq!(deleted, 3);
        assert_eq!(store.lock().keys("*"), vec!["log:2024:01".to_string()]);
    }
}
