use bytes::Bytes;

use crate::commands::scripted::{at_least_one, Scripted};
use crate::procedure::{Plan, Step, Write};

/// Prepend the values to the head of every list, one after another, so the last value ends up
/// first.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct Lpush;

impl Scripted for Lpush {
    fn plan(&self) -> Plan {
        Plan::PerKey(Step::write(Write::LeftPush))
    }

    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String> {
        at_least_one(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::run;
    use crate::commands::{Command, Data, Operation};
    use crate::executor::Executor;
    use crate::store::MemoryStore;

    #[test]
    fn replacing_a_list() {
        let store = MemoryStore::new();
        run(&store, Operation::Rpush, &["l"], &["old"]).unwrap();

        let mut executor = Executor::new(store.clone());
        let command = Command::new(
            Operation::Lpush,
            vec!["l".to_string()],
            vec!["a".into(), "b".into()],
        )
        .unwrap()
        .delete_before_write();
        executor.execute(command).unwrap();

        let values = run(&store, Operation::Lrange, &["l"], &[])
            .unwrap()
            .into_keyed();
        assert_eq!(
            values.get("l"),
            Some(&Data::Members(vec!["b".into(), "a".into()]))
        );
    }
}
