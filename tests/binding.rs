use std::collections::BTreeSet;

use proptest::prelude::*;
use redmodel::store::Value;
use redmodel::{KeyTemplate, MemoryStore};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

fn values() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(segment(), 1..6)
}

proptest! {
    #[test]
    fn literal_template_binds_to_itself(
        segments in prop::collection::vec(segment(), 1..5),
        field in segment(),
        bound in values(),
    ) {
        let pattern = segments.join(":");
        let query = KeyTemplate::new(pattern.as_str()).query().where_in(&field, &bound);

        prop_assert_eq!(query.all_keys(), vec![pattern]);
    }

    #[test]
    fn two_fields_multiply(first in values(), second in values()) {
        let query = KeyTemplate::new("t:{a}:{b}")
            .query()
            .where_in("a", &first)
            .where_in("b", &second);
        let keys = query.all_keys();

        prop_assert_eq!(keys.len(), first.len() * second.len());
        prop_assert_eq!(keys.iter().collect::<BTreeSet<_>>().len(), keys.len());
    }

    #[test]
    fn repeated_binding_is_a_union(first in values(), second in values()) {
        let query = KeyTemplate::new("t:{a}")
            .query()
            .where_in("a", &first)
            .where_in("a", &second);

        prop_assert_eq!(query.all_keys().len(), first.union(&second).count());
    }

    #[test]
    fn marked_keys_match_what_was_stored(
        schools in values(),
        ids in values(),
        decoys in values(),
    ) {
        let template = KeyTemplate::new("school:{school}:student:{id}");
        let partial = template.query().where_in("school", &schools);

        let store = MemoryStore::new();
        let mut stored = BTreeSet::new();
        {
            let mut store = store.lock();
            for key in partial.all_keys() {
                for id in &ids {
                    let concrete = key.replace(&template.placeholder("id"), id);
                    store.set(concrete.clone(), Value::String(id.clone().into()));
                    stored.insert(concrete);
                }
            }
            for decoy in &decoys {
                store.set(format!("school:{decoy}!:student:1"), Value::String("x".into()));
            }
        }

        let mut found = BTreeSet::new();
        for pattern in partial.patterns() {
            found.extend(store.lock().keys(&pattern));
        }

        prop_assert_eq!(found, stored);
    }
}
