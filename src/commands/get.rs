use bytes::Bytes;

use crate::commands::scripted::{no_arguments, Scripted};
use crate::procedure::{Plan, Read, Step};

/// Get the value of every string key. Missing keys yield `nil` and are left out of the decoded
/// response.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get;

impl Scripted for Get {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::read(Read::Get))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        no_arguments(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{run, seed};
    use crate::commands::{Data, Operation};
    use crate::store::MemoryStore;

    #[test]
    fn existing_and_missing_keys() {
        let store = MemoryStore::new();
        seed(&store, Operation::Set, "key1", &["1"]);

        let values = run(&store, Operation::Get, &["key1", "key2"], &[])
            .unwrap()
            .into_keyed();

        assert_eq!(values.len(), 1);
        assert_eq!(values.get("key1"), Some(&Data::Bytes("1".into())));
        assert_eq!(values.get("key2"), None);
    }

    #[test]
    fn positional_arguments_are_rejected() {
        let store = MemoryStore::new();

        assert!(run(&store, Operation::Get, &["key1"], &["x"]).is_err());
    }
}
