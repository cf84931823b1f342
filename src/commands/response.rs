//! Decodes raw procedure replies into keyed values, key lists and counts.
//!
//! Per-key procedures reply with `{KEYS, values}`, two parallel arrays; they are zipped back
//! together here. Keys whose value is nil or an empty collection are left out, so a key with no
//! data reads the same as a missing one.

use bytes::Bytes;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

use crate::commands::Command;
use crate::frame::Frame;
use crate::procedure::{Pattern, Plan, Precondition, Shape};
use crate::Error;

/// One key's decoded value.
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    Integer(i64),
    Status(String),
    Bytes(Bytes),
    Members(Vec<Bytes>),
    Hash(BTreeMap<Bytes, Bytes>),
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Integer(i) => write!(f, "{}", i),
            Data::Status(s) => write!(f, "{}", s),
            Data::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Data::Members(members) => {
                let members = members.iter().map(|m| String::from_utf8_lossy(m)).join(", ");
                write!(f, "[{}]", members)
            }
            Data::Hash(hash) => {
                let pairs = hash
                    .iter()
                    .map(|(k, v)| format!("{}: {}", String::from_utf8_lossy(k), String::from_utf8_lossy(v)))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
        }
    }
}

/// Values in the order their keys were given to the command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyedValues(Vec<(String, Data)>);

impl KeyedValues {
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Data)> {
        self.0.iter()
    }
}

impl IntoIterator for KeyedValues {
    type Item = (String, Data);
    type IntoIter = std::vec::IntoIter<(String, Data)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Keyed(KeyedValues),
    Keys(Vec<String>),
    Count(i64),
    /// A precondition failed and the procedure touched nothing.
    Skipped,
}

impl Response {
    /// False only when a precondition stopped the procedure.
    pub fn applied(&self) -> bool {
        !matches!(self, Response::Skipped)
    }

    /// The keyed values; empty for any other kind of response, a skipped one included.
    pub fn into_keyed(self) -> KeyedValues {
        match self {
            Response::Keyed(values) => values,
            _ => KeyedValues::default(),
        }
    }

    pub fn into_keys(self) -> Vec<String> {
        match self {
            Response::Keys(keys) => keys,
            _ => vec![],
        }
    }

    pub fn count(&self) -> i64 {
        match self {
            Response::Count(n) => *n,
            Response::Keys(keys) => keys.len() as i64,
            Response::Keyed(values) => values.len() as i64,
            Response::Skipped => 0,
        }
    }
}

pub(crate) fn resolve(command: &Command, reply: Frame) -> Result<Response, Error> {
    match command.procedure().plan() {
        Plan::PerKey(step) => {
            if reply.is_null() {
                return Ok(match command.precondition() {
                    Precondition::None => Response::Keyed(KeyedValues::default()),
                    _ => Response::Skipped,
                });
            }
            keyed(command, step.shape(), reply).map(Response::Keyed)
        }
        Plan::Scan(Pattern::Keys) => keys(command, reply).map(Response::Keys),
        Plan::Scan(Pattern::Count | Pattern::Delete | Pattern::Remove) => match reply {
            Frame::Integer(n) => Ok(Response::Count(n)),
            Frame::Null => Ok(Response::Count(0)),
            reply => Err(Error::decode(command.operation(), reply)),
        },
    }
}

fn keyed(command: &Command, shape: Shape, reply: Frame) -> Result<KeyedValues, Error> {
    let (keys, values) = match reply {
        Frame::Array(mut parts) if parts.len() == 2 => {
            match (parts.pop(), parts.pop()) {
                (Some(Frame::Array(values)), Some(Frame::Array(keys)))
                    if keys.len() == values.len() && keys.len() == command.keys_count() =>
                {
                    (keys, values)
                }
                (values, keys) => {
                    let parts = keys.into_iter().chain(values).collect();
                    return Err(Error::decode(command.operation(), Frame::Array(parts)));
                }
            }
        }
        reply => return Err(Error::decode(command.operation(), reply)),
    };

    let mut decoded = vec![];
    for (key, value) in keys.into_iter().zip(values) {
        let Some(name) = key.to_text() else {
            return Err(Error::decode(command.operation(), key));
        };
        if let Some(data) = value_of(command, shape, value)? {
            decoded.push((name, data));
        }
    }

    Ok(KeyedValues(decoded))
}

/// `None` for nil and empty values.
fn value_of(command: &Command, shape: Shape, value: Frame) -> Result<Option<Data>, Error> {
    let data = match (shape, value) {
        (_, Frame::Null) => return Ok(None),
        (_, Frame::Array(items)) if items.is_empty() => return Ok(None),
        (Shape::Scalar, Frame::Bulk(bytes)) => Data::Bytes(bytes),
        (Shape::Scalar, Frame::Integer(i)) => Data::Integer(i),
        (Shape::Scalar, Frame::Simple(s)) => Data::Status(s),
        (Shape::Members, Frame::Array(items)) => Data::Members(
            items
                .into_iter()
                .map(|item| bulk(command, item))
                .collect::<Result<_, _>>()?,
        ),
        (Shape::Hash, Frame::Array(items)) if items.len() % 2 == 0 => {
            let mut hash = BTreeMap::new();
            for (field, value) in items.into_iter().tuples() {
                hash.insert(bulk(command, field)?, bulk(command, value)?);
            }
            Data::Hash(hash)
        }
        (_, value) => return Err(Error::decode(command.operation(), value)),
    };

    Ok(Some(data))
}

fn bulk(command: &Command, frame: Frame) -> Result<Bytes, Error> {
    match frame {
        Frame::Bulk(bytes) => Ok(bytes),
        Frame::Integer(i) => Ok(Bytes::from(i.to_string())),
        frame => Err(Error::decode(command.operation(), frame)),
    }
}

fn keys(command: &Command, reply: Frame) -> Result<Vec<String>, Error> {
    let lists = match reply {
        Frame::Null => return Ok(vec![]),
        Frame::Array(lists) => lists,
        reply => return Err(Error::decode(command.operation(), reply)),
    };

    let mut keys = vec![];
    for list in lists {
        let Frame::Array(matched) = list else {
            return Err(Error::decode(command.operation(), list));
        };
        for key in matched {
            match key.to_text() {
                Some(key) => keys.push(key),
                None => return Err(Error::decode(command.operation(), key)),
            }
        }
    }

    Ok(keys.into_iter().unique().collect())
}
