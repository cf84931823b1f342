use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Pattern, Plan};

/// Existing keys matching each pattern, merged into one list without duplicates.
///
/// Ref: <https://redis.io/docs/latest/commands/keys/>
#[derive(Debug, PartialEq)]
pub struct Keys;

impl Scripted for Keys {
    fn plan(&self) -> Plan {
        Plan::Scan(Pattern::Keys)
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
    fn overlapping_patterns() {
        let store = MemoryStore::new();
        seed(&store, Operation::Set, "user:1:name", &["a"]);
        seed(&store, Operation::Set, "user:2:name", &["b"]);
        seed(&store, Operation::Set, "user:2:age", &["3"]);

        let keys = run(&store, Operation::Keys, &["user:*:name", "user:2:*"], &[])
            .unwrap()
            .into_keys();

        assert_eq!(
            keys,
            vec![
                "user:1:name".to_string(),
                "user:2:name".to_string(),
                "user:2:age".to_string(),
            ]
        );
    }
}
