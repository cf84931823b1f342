//! A key family of one data type, addressed through a [`KeyTemplate`].
//!
//! `Model` is a thin layer over the command engine: it turns queries into keys, picks the
//! operation matching the data type and shapes typed payloads into positional arguments.

use bytes::Bytes;
use std::collections::HashMap;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::commands::factory::Factory;
use crate::commands::{Command, Data, KeyedValues, Operation};
use crate::executor::{Executor, NativeStore, ScriptStore};
use crate::procedure::{Precondition, Ttl};
use crate::template::{KeyTemplate, Query};
use crate::{Error, Result};

const DEFAULT_PRIMARY_FIELD: &str = "id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataType {
    String,
    List,
    Set,
    #[strum(serialize = "zset")]
    SortedSet,
    Hash,
}

impl DataType {
    fn read(self) -> Operation {
        match self {
            DataType::String => Operation::Get,
            DataType::List => Operation::Lrange,
            DataType::Set => Operation::Smembers,
            DataType::SortedSet => Operation::Zrange,
            DataType::Hash => Operation::Hgetall,
        }
    }

    fn getset(self) -> Operation {
        match self {
            DataType::String => Operation::GetsetString,
            DataType::List => Operation::GetsetList,
            DataType::Set => Operation::GetsetSet,
            DataType::SortedSet => Operation::GetsetZset,
            DataType::Hash => Operation::GetsetHash,
        }
    }
}

/// A value to write, in the shape of its data type.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    String(Bytes),
    List(Vec<Bytes>),
    Set(Vec<Bytes>),
    /// Members with their scores.
    SortedSet(Vec<(Bytes, f64)>),
    /// Fields with their values.
    Hash(Vec<(Bytes, Bytes)>),
}

impl Payload {
    pub fn string(value: impl Into<Bytes>) -> Payload {
        Payload::String(value.into())
    }

    pub fn list<V: Into<Bytes>>(values: impl IntoIterator<Item = V>) -> Payload {
        Payload::List(values.into_iter().map(Into::into).collect())
    }

    pub fn set<V: Into<Bytes>>(values: impl IntoIterator<Item = V>) -> Payload {
        Payload::Set(values.into_iter().map(Into::into).collect())
    }

    pub fn sorted_set<V: Into<Bytes>>(members: impl IntoIterator<Item = (V, f64)>) -> Payload {
        Payload::SortedSet(
            members
                .into_iter()
                .map(|(member, score)| (member.into(), score))
                .collect(),
        )
    }

    pub fn hash<F: Into<Bytes>, V: Into<Bytes>>(pairs: impl IntoIterator<Item = (F, V)>) -> Payload {
        Payload::Hash(
            pairs
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Payload::String(_) => DataType::String,
            Payload::List(_) => DataType::List,
            Payload::Set(_) => DataType::Set,
            Payload::SortedSet(_) => DataType::SortedSet,
            Payload::Hash(_) => DataType::Hash,
        }
    }

    /// Positional arguments in the order the write commands take them. Sorted set members go
    /// after their score.
    pub fn into_args(self) -> Vec<Bytes> {
        match self {
            Payload::String(value) => vec![value],
            Payload::List(values) | Payload::Set(values) => values,
            Payload::SortedSet(members) => members
                .into_iter()
                .flat_map(|(member, score)| [Bytes::from(score.to_string()), member])
                .collect(),
            Payload::Hash(pairs) => pairs
                .into_iter()
                .flat_map(|(field, value)| [field, value])
                .collect(),
        }
    }
}

pub struct Model {
    data_type: DataType,
    template: KeyTemplate,
    primary_field: String,
    list_push: Operation,
    factory: Factory,
}

impl Model {
    pub fn new(data_type: DataType, template: KeyTemplate) -> Model {
        Model {
            data_type,
            template,
            primary_field: DEFAULT_PRIMARY_FIELD.to_string(),
            list_push: Operation::Rpush,
            factory: Factory::new(),
        }
    }

    /// The field that `find`, `create`, `destroy` and the batch methods bind ids to.
    pub fn with_primary_field(mut self, field: impl Into<String>) -> Model {
        self.primary_field = field.into();
        self
    }

    /// Push used to write list models, `rpush` unless changed.
    pub fn with_list_push(mut self, push: Operation) -> Result<Model> {
        if !matches!(push, Operation::Rpush | Operation::Lpush) {
            return Err(Error::arguments(push, "is not a list push"));
        }
        self.list_push = push;
        Ok(self)
    }

    pub fn with_factory(mut self, factory: Factory) -> Model {
        self.factory = factory;
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn template(&self) -> &KeyTemplate {
        &self.template
    }

    pub fn query(&self) -> Query {
        self.template.query()
    }

    pub fn find<S: ScriptStore>(&self, exec: &mut Executor<S>, id: impl ToString) -> Result<Option<Data>> {
        let key = self.primary_key(&id.to_string())?;
        let mut values = self.read(exec, vec![key])?;
        Ok(values.next().map(|(_, data)| data))
    }

    /// Values of the given ids that exist, keyed by id.
    pub fn find_batch<S, I, V>(&self, exec: &mut Executor<S>, ids: I) -> Result<Vec<(String, Data)>>
    where
        S: ScriptStore,
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let ids: HashMap<String, String> = ids
            .into_iter()
            .map(|id| {
                let id = id.to_string();
                (self.template.key_for(&self.primary_field, &id), id)
            })
            .collect();

        let keys = self
            .query()
            .where_in(&self.primary_field, ids.values())
            .complete_keys();
        if keys.is_empty() {
            return Ok(vec![]);
        }

        Ok(self
            .read(exec, keys)?
            .filter_map(|(key, data)| ids.get(&key).map(|id| (id.clone(), data)))
            .collect())
    }

    /// Values of every existing key the query can denote. An unconstrained query reads the
    /// whole family.
    pub fn get<S: ScriptStore>(&self, exec: &mut Executor<S>, query: &Query) -> Result<KeyedValues> {
        let keys = self.keys(exec, query)?;
        if keys.is_empty() {
            return Ok(KeyedValues::default());
        }

        let command = self.command(self.data_type.read(), keys, vec![])?;
        Ok(exec.execute(command)?.into_keyed())
    }

    /// Existing keys the query can denote, asking the store to match any field left unbound.
    pub fn keys<S: ScriptStore>(&self, exec: &mut Executor<S>, query: &Query) -> Result<Vec<String>> {
        let patterns = query.patterns();
        if patterns.is_empty() {
            return Ok(vec![]);
        }

        let command = self.command(Operation::Keys, patterns, vec![])?;
        Ok(exec.execute(command)?.into_keys())
    }

    pub fn count<S: ScriptStore>(&self, exec: &mut Executor<S>, query: &Query) -> Result<usize> {
        Ok(self.keys(exec, query)?.len())
    }

    /// Writes the item with primary key `id`, replacing whatever it held.
    pub fn create<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        id: impl ToString,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.primary_key(&id.to_string())?;
        self.write_one(exec, key, payload, ttl, Precondition::None)
    }

    /// Like [`Model::create`], only when the item already exists.
    pub fn create_exists<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        id: impl ToString,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.primary_key(&id.to_string())?;
        self.write_one(exec, key, payload, ttl, Precondition::MustExist)
    }

    /// Like [`Model::create`], only when the item does not exist yet.
    pub fn create_not_exists<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        id: impl ToString,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.primary_key(&id.to_string())?;
        self.write_one(exec, key, payload, ttl, Precondition::MustNotExist)
    }

    /// Writes the item whose key is fully bound by `bindings`.
    pub fn insert<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        bindings: &[(&str, &str)],
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.bound_key(bindings)?;
        self.write_one(exec, key, payload, ttl, Precondition::None)
    }

    pub fn insert_exists<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        bindings: &[(&str, &str)],
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.bound_key(bindings)?;
        self.write_one(exec, key, payload, ttl, Precondition::MustExist)
    }

    pub fn insert_not_exists<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        bindings: &[(&str, &str)],
        payload: Payload,
        ttl: Ttl,
    ) -> Result<bool> {
        let key = self.bound_key(bindings)?;
        self.write_one(exec, key, payload, ttl, Precondition::MustNotExist)
    }

    /// Rewrites every existing key the query denotes with the same payload.
    pub fn update<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        query: &Query,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<KeyedValues> {
        let keys = self.keys(exec, query)?;
        self.write_many(exec, keys, payload, ttl)
    }

    /// Writes the payload to the items with the given primary keys, existing or not.
    pub fn update_batch<S, I, V>(
        &self,
        exec: &mut Executor<S>,
        ids: I,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<KeyedValues>
    where
        S: ScriptStore,
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let keys = self.query().where_in(&self.primary_field, ids).complete_keys();
        self.write_many(exec, keys, payload, ttl)
    }

    /// Replaces the value of the single key the query denotes and returns what it held.
    pub fn get_and_set<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        query: &Query,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<Option<Data>> {
        let key = self.single_key(query)?;
        let command = self
            .command(self.data_type.getset(), vec![key], self.args(payload)?)?
            .set_ttl(ttl);

        let values = exec.execute(command)?.into_keyed();
        Ok(values.into_iter().next().map(|(_, data)| data))
    }

    /// Deletes every key matching the query, unbound fields included, in one procedure. Returns
    /// the number of keys removed.
    pub fn delete<S: ScriptStore>(&self, exec: &mut Executor<S>, query: &Query) -> Result<i64> {
        let patterns = query.patterns();
        if patterns.is_empty() {
            return Ok(0);
        }

        let command = self.command(Operation::Delete, patterns, vec![])?;
        Ok(exec.execute(command)?.count())
    }

    /// Deletes the item with primary key `id`. The key is taken as written, wildcard glyphs
    /// included.
    pub fn destroy<S: ScriptStore>(&self, exec: &mut Executor<S>, id: impl ToString) -> Result<bool> {
        let key = self.primary_key(&id.to_string())?;
        let command = self.command(Operation::Del, vec![key], vec![])?;
        Ok(exec.execute(command)?.count() > 0)
    }

    pub fn destroy_batch<S, I, V>(&self, exec: &mut Executor<S>, ids: I) -> Result<i64>
    where
        S: ScriptStore,
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let keys = self.query().where_in(&self.primary_field, ids).complete_keys();
        if keys.is_empty() {
            return Ok(0);
        }

        let command = self.command(Operation::Del, keys, vec![])?;
        Ok(exec.execute(command)?.count())
    }

    /// Native single-key commands on the key the query denotes. Fails unless the query denotes
    /// exactly one complete key.
    pub fn native<'a, S: NativeStore>(&self, store: &'a mut S, query: &Query) -> Result<Native<'a, S>> {
        let key = self.single_key(query)?;
        Ok(Native { store, key })
    }

    fn command(&self, operation: Operation, keys: Vec<String>, args: Vec<Bytes>) -> Result<Command> {
        self.factory.get_command(operation.as_ref(), keys, args)
    }

    fn write_operation(&self) -> Operation {
        match self.data_type {
            DataType::String => Operation::Set,
            DataType::List => self.list_push,
            DataType::Set => Operation::Sadd,
            DataType::SortedSet => Operation::Zadd,
            DataType::Hash => Operation::Hmset,
        }
    }

    fn args(&self, payload: Payload) -> Result<Vec<Bytes>> {
        if payload.data_type() != self.data_type {
            return Err(Error::arguments(
                self.write_operation(),
                format!(
                    "a {} payload cannot be written to a {} model",
                    payload.data_type(),
                    self.data_type
                ),
            ));
        }
        Ok(payload.into_args())
    }

    fn read<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        keys: Vec<String>,
    ) -> Result<impl Iterator<Item = (String, Data)>> {
        let command = self.command(self.data_type.read(), keys, vec![])?;
        Ok(exec.execute(command)?.into_keyed().into_iter())
    }

    fn write_one<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        key: String,
        payload: Payload,
        ttl: Ttl,
        precondition: Precondition,
    ) -> Result<bool> {
        let mut command = self
            .command(self.write_operation(), vec![key.clone()], self.args(payload)?)?
            .delete_before_write()
            .set_ttl(ttl);
        command = match precondition {
            Precondition::None => command,
            Precondition::MustExist => command.require_exists(),
            Precondition::MustNotExist => command.require_not_exists(),
        };

        let values = exec.execute(command)?.into_keyed();
        Ok(match values.get(&key) {
            Some(Data::Integer(n)) => *n != 0,
            Some(_) => true,
            None => false,
        })
    }

    fn write_many<S: ScriptStore>(
        &self,
        exec: &mut Executor<S>,
        keys: Vec<String>,
        payload: Payload,
        ttl: Ttl,
    ) -> Result<KeyedValues> {
        if keys.is_empty() {
            return Ok(KeyedValues::default());
        }

        let command = self
            .command(self.write_operation(), keys, self.args(payload)?)?
            .delete_before_write()
            .set_ttl(ttl);
        Ok(exec.execute(command)?.into_keyed())
    }

    fn primary_key(&self, id: &str) -> Result<String> {
        let key = self.template.key_for(&self.primary_field, id);
        self.complete(key)
    }

    fn bound_key(&self, bindings: &[(&str, &str)]) -> Result<String> {
        let query = bindings
            .iter()
            .fold(self.query(), |query, (field, value)| query.where_equal(field, value));
        let key = query.first_key().ok_or(Error::NoKeys)?;
        self.complete(key)
    }

    fn single_key(&self, query: &Query) -> Result<String> {
        let mut keys = query.all_keys();
        match keys.len() {
            0 => Err(Error::NoKeys),
            1 => self.complete(keys.remove(0)),
            count => Err(Error::TooManyKeys { count }),
        }
    }

    fn complete(&self, key: String) -> Result<String> {
        if self.template.is_complete(&key) {
            Ok(key)
        } else {
            Err(Error::IncompleteKey { key })
        }
    }
}

/// Native commands on a single key.
pub struct Native<'a, S> {
    store: &'a mut S,
    key: String,
}

impl<S: NativeStore> Native<'_, S> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn exists(&mut self) -> Result<bool> {
        Ok(self.store.exists(&self.key)?)
    }

    pub fn ttl(&mut self) -> Result<i64> {
        Ok(self.store.ttl(&self.key)?)
    }

    pub fn pttl(&mut self) -> Result<i64> {
        Ok(self.store.pttl(&self.key)?)
    }

    pub fn expire(&mut self, seconds: u64) -> Result<bool> {
        Ok(self.store.expire(&self.key, seconds)?)
    }

    pub fn persist(&mut self) -> Result<bool> {
        Ok(self.store.persist(&self.key)?)
    }

    pub fn key_type(&mut self) -> Result<String> {
        Ok(self.store.key_type(&self.key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn users() -> Model {
        Model::new(DataType::Hash, KeyTemplate::new("user:{id}:profile"))
    }

    fn executor() -> Executor<MemoryStore> {
        Executor::new(MemoryStore::new())
    }

    fn profile(name: &'static str) -> Payload {
        Payload::hash([("name", name)])
    }

    #[test]
    fn data_type_names() {
        assert_eq!(DataType::SortedSet.to_string(), "zset");
        assert_eq!(DataType::from_str("HASH").unwrap(), DataType::Hash);
    }

    #[test]
    fn payload_arguments() {
        assert_eq!(
            Payload::sorted_set([("a", 1.5), ("b", 2.0)]).into_args(),
            vec![
                Bytes::from("1.5"),
                Bytes::from("a"),
                Bytes::from("2"),
                Bytes::from("b"),
            ]
        );
        assert_eq!(
            Payload::hash([("f", "v")]).into_args(),
            vec![Bytes::from("f"), Bytes::from("v")]
        );
    }

    #[test]
    fn create_and_find() {
        let mut exec = executor();
        let model = users();

        assert!(model.create(&mut exec, 1, profile("ann"), Ttl::Unset).unwrap());
        assert!(!model.create_not_exists(&mut exec, 1, profile("bob"), Ttl::Unset).unwrap());
        assert!(!model.create_exists(&mut exec, 2, profile("cid"), Ttl::Unset).unwrap());

        let found = model.find(&mut exec, 1).unwrap();
        assert_eq!(found, Some(Data::Hash(BTreeMap::from([(Bytes::from("name"), Bytes::from("ann"))]))));
        assert_eq!(model.find(&mut exec, 2).unwrap(), None);
    }

    #[test]
    fn create_replaces_the_whole_value() {
        let mut exec = executor();
        let model = users();

        model
            .create(&mut exec, 1, Payload::hash([("name", "ann"), ("age", "30")]), Ttl::Unset)
            .unwrap();
        model.create(&mut exec, 1, profile("bob"), Ttl::Unset).unwrap();

        assert_eq!(
            model.find(&mut exec, 1).unwrap(),
            Some(Data::Hash(BTreeMap::from([(Bytes::from("name"), Bytes::from("bob"))])))
        );
    }

    #[test]
    fn payload_of_the_wrong_type() {
        let mut exec = executor();
        let err = users()
            .create(&mut exec, 1, Payload::string("ann"), Ttl::Unset)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArguments { .. }));
        assert_eq!(exec.store().lock().size(), 0);
    }

    #[test]
    fn find_batch_by_id() {
        let mut exec = executor();
        let model = users();
        model.create(&mut exec, 1, profile("ann"), Ttl::Unset).unwrap();
        model.create(&mut exec, 3, profile("cid"), Ttl::Unset).unwrap();

        let mut found = model.find_batch(&mut exec, [1, 2, 3]).unwrap();
        found.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            found.into_iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec!["1".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn queries() {
        let mut exec = executor();
        let model = Model::new(DataType::String, KeyTemplate::new("city:{country}:{id}"));
        model
            .insert(&mut exec, &[("country", "fr"), ("id", "1")], Payload::string("paris"), Ttl::Unset)
            .unwrap();
        model
            .insert(&mut exec, &[("country", "fr"), ("id", "2")], Payload::string("lyon"), Ttl::Unset)
            .unwrap();
        model
            .insert(&mut exec, &[("country", "it"), ("id", "1")], Payload::string("rome"), Ttl::Unset)
            .unwrap();

        let france = model.query().where_equal("country", "fr");
        assert_eq!(model.count(&mut exec, &france).unwrap(), 2);
        assert_eq!(model.count(&mut exec, &model.query()).unwrap(), 3);
        assert_eq!(
            model.get(&mut exec, &france).unwrap().get("city:fr:2"),
            Some(&Data::Bytes("lyon".into()))
        );

        let nowhere = model.query().where_in("country", Vec::<String>::new());
        assert_eq!(model.count(&mut exec, &nowhere).unwrap(), 0);

        assert_eq!(model.delete(&mut exec, &france).unwrap(), 2);
        assert_eq!(model.keys(&mut exec, &model.query()).unwrap(), vec!["city:it:1".to_string()]);
    }

    #[test]
    fn insert_needs_a_complete_key() {
        let mut exec = executor();
        let model = Model::new(DataType::String, KeyTemplate::new("city:{country}:{id}"));

        let err = model
            .insert(&mut exec, &[("country", "fr")], Payload::string("x"), Ttl::Unset)
            .unwrap_err();

        assert!(matches!(err, Error::IncompleteKey { ref key } if key == "city:fr:{id}"));
    }

    #[test]
    fn update_touches_existing_keys_only() {
        let mut exec = executor();
        let model = Model::new(DataType::Set, KeyTemplate::new("tags:{id}"));
        model.create(&mut exec, 1, Payload::set(["a"]), Ttl::Unset).unwrap();

        let query = model.query().where_in("id", [1, 2]);
        let written = model
            .update(&mut exec, &query, Payload::set(["b", "c"]), Ttl::Unset)
            .unwrap();

        assert_eq!(written.keys().collect::<Vec<_>>(), vec!["tags:1"]);
        assert!(!exec.store().lock().exists("tags:2"));

        let batch = model
            .update_batch(&mut exec, [2, 3], Payload::set(["z"]), Ttl::Unset)
            .unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn get_and_set_single_key() {
        let mut exec = executor();
        let model = Model::new(DataType::List, KeyTemplate::new("queue:{id}"))
            .with_list_push(Operation::Lpush)
            .unwrap();
        model.create(&mut exec, 1, Payload::list(["a", "b"]), Ttl::Unset).unwrap();

        let prior = model
            .get_and_set(&mut exec, &model.query().where_equal("id", 1), Payload::list(["c"]), Ttl::Unset)
            .unwrap();
        assert_eq!(prior, Some(Data::Members(vec!["b".into(), "a".into()])));

        let many = model.query().where_in("id", [1, 2]);
        assert!(matches!(
            model.get_and_set(&mut exec, &many, Payload::list(["c"]), Ttl::Unset),
            Err(Error::TooManyKeys { count: 2 })
        ));
    }

    #[test]
    fn list_push_must_be_a_push() {
        let model = Model::new(DataType::List, KeyTemplate::new("queue:{id}"));

        assert!(model.with_list_push(Operation::Sadd).is_err());
    }

    #[test]
    fn destroy() {
        let mut exec = executor();
        let model = users();
        for id in 1..=3 {
            model.create(&mut exec, id, profile("x"), Ttl::Unset).unwrap();
        }

        assert!(model.destroy(&mut exec, 1).unwrap());
        assert!(!model.destroy(&mut exec, 1).unwrap());
        assert_eq!(model.destroy_batch(&mut exec, [2, 3, 4]).unwrap(), 2);
        assert_eq!(exec.store().lock().size(), 0);
    }

    #[test]
    fn destroy_never_matches_siblings() {
        let mut exec = executor();
        let model = users();
        for id in 1..=3 {
            model.create(&mut exec, id, profile("x"), Ttl::Unset).unwrap();
        }

        assert!(!model.destroy(&mut exec, "*").unwrap());
        assert_eq!(model.destroy_batch(&mut exec, ["*", "1?"]).unwrap(), 0);
        assert_eq!(exec.store().lock().size(), 3);

        model.create(&mut exec, "*", profile("star"), Ttl::Unset).unwrap();
        assert!(model.destroy(&mut exec, "*").unwrap());
        assert_eq!(exec.store().lock().size(), 3);
    }

    #[test]
    fn native_passthrough() {
        let mut exec = executor();
        let model = users().with_primary_field("id");
        model.create(&mut exec, 1, profile("ann"), Ttl::ExpireIn(60)).unwrap();

        let one = model.query().where_equal("id", 1);
        let mut native = model.native(exec.store_mut(), &one).unwrap();
        assert_eq!(native.key(), "user:1:profile");
        assert!(native.exists().unwrap());
        assert_eq!(native.key_type().unwrap(), "hash");
        assert!(native.persist().unwrap());
        assert_eq!(native.ttl().unwrap(), -1);

        let many = model.query().where_in("id", [1, 2]);
        assert!(matches!(
            model.native(exec.store_mut(), &many),
            Err(Error::TooManyKeys { count: 2 })
        ));

        let none = model.query().where_in("id", Vec::<i64>::new());
        assert!(matches!(model.native(exec.store_mut(), &none), Err(Error::NoKeys)));
    }
}
