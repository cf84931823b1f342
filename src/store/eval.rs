//! Runs a [`Procedure`] against the locked store, stage by stage, with the same observable
//! behaviour as the Lua rendering on a live Redis.

use bytes::Bytes;
use redis::{ErrorKind, RedisError, RedisResult};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tokio::time::Duration;

use super::{wrong_type, Locked, Value};
use crate::frame::Frame;
use crate::procedure::{Action, Pattern, Plan, Precondition, Procedure, Read, Step, Ttl, Write};
use crate::template::WILDCARD;

impl Locked<'_> {
    pub(crate) fn run(
        &mut self,
        procedure: &Procedure,
        keys: &[String],
        args: &[Bytes],
    ) -> RedisResult<Frame> {
        let aborted = match procedure.precondition() {
            Precondition::None => false,
            Precondition::MustExist => keys.iter().any(|key| !self.exists(key)),
            Precondition::MustNotExist => keys.iter().any(|key| self.exists(key)),
        };
        if aborted {
            return Ok(Frame::Null);
        }

        match procedure.plan() {
            Plan::PerKey(step) => {
                let (step, args) = with_expiry(*step, args)?;
                let mut values = Vec::with_capacity(keys.len());
                for key in keys {
                    values.push(self.step(&step, key, args)?);
                }

                let keys = keys.iter().map(|key| Frame::bulk(key.clone())).collect();
                Ok(Frame::Array(vec![Frame::Array(keys), Frame::Array(values)]))
            }
            Plan::Scan(pattern) => Ok(self.scan(*pattern, keys)),
        }
    }

    fn step(&mut self, step: &Step, key: &str, args: &[Bytes]) -> RedisResult<Frame> {
        let write = match step.action {
            Action::Read(read) => {
                let value = self.read(read, key)?;
                self.resolve_ttl(step.ttl, key, None)?;
                return Ok(value);
            }
            Action::Write(write) => write,
        };

        let pttl = self.pttl(key);
        let prior = step.capture.map(|read| self.read(read, key)).transpose()?;
        if step.clear {
            self.remove(key);
        }
        let result = self.write(write, key, args)?;
        self.resolve_ttl(step.ttl, key, Some(pttl))?;

        Ok(prior.unwrap_or(result))
    }

    fn resolve_ttl(&mut self, ttl: Ttl, key: &str, prior_pttl: Option<i64>) -> RedisResult<()> {
        match (ttl, prior_pttl) {
            (Ttl::Persist, _) => {
                self.persist(key);
            }
            (Ttl::ExpireIn(seconds), _) => {
                self.expire_in(key, Duration::from_secs(seconds))?;
            }
            (Ttl::Unset, Some(ms)) if ms > 0 => {
                self.expire_in(key, Duration::from_millis(ms as u64))?;
            }
            (Ttl::Unset, _) => {}
        }
        Ok(())
    }

    fn read(&self, read: Read, key: &str) -> RedisResult<Frame> {
        let value = match self.get(key) {
            Some(value) => value,
            None if read == Read::Get => return Ok(Frame::Null),
            None => return Ok(Frame::Array(vec![])),
        };

        let frame = match (read, value) {
            (Read::Get, Value::String(data)) => Frame::Bulk(data.clone()),
            (Read::ListRange, Value::List(list)) => bulks(list.iter()),
            (Read::Members, Value::Set(set)) => bulks(set.iter()),
            (Read::SortedRange, Value::SortedSet(members)) => {
                bulks(members.iter().map(|(member, _)| member))
            }
            (Read::HashAll, Value::Hash(hash)) => Frame::Array(
                hash.iter()
                    .flat_map(|(field, value)| [Frame::Bulk(field.clone()), Frame::Bulk(value.clone())])
                    .collect(),
            ),
            _ => return Err(wrong_type()),
        };

        Ok(frame)
    }

    fn write(&mut self, write: Write, key: &str, args: &[Bytes]) -> RedisResult<Frame> {
        if args.is_empty() {
            return Err(arity(write));
        }

        match write {
            Write::Set => {
                self.set(key.to_string(), Value::String(args[0].clone()));
                Ok(Frame::Simple("OK".to_string()))
            }
            Write::RightPush | Write::LeftPush => {
                let Value::List(list) = self.entry_mut(key, || Value::List(VecDeque::new()))? else {
                    return Err(wrong_type());
                };
                for arg in args {
                    if write == Write::RightPush {
                        list.push_back(arg.clone());
                    } else {
                        list.push_front(arg.clone());
                    }
                }
                Ok(Frame::Integer(list.len() as i64))
            }
            Write::Add => {
                let Value::Set(set) = self.entry_mut(key, || Value::Set(BTreeSet::new()))? else {
                    return Err(wrong_type());
                };
                let added = args.iter().filter(|arg| set.insert((*arg).clone())).count();
                Ok(Frame::Integer(added as i64))
            }
            Write::SortedAdd => {
                if args.len() % 2 != 0 {
                    return Err(syntax_error());
                }
                let pairs = args
                    .chunks(2)
                    .map(|pair| Ok((parse_score(&pair[0])?, pair[1].clone())))
                    .collect::<RedisResult<Vec<_>>>()?;

                let Value::SortedSet(members) =
                    self.entry_mut(key, || Value::SortedSet(vec![]))?
                else {
                    return Err(wrong_type());
                };
                let mut added = 0;
                for (score, member) in pairs {
                    match members.iter_mut().find(|(m, _)| *m == member) {
                        Some(existing) => existing.1 = score,
                        None => {
                            members.push((member, score));
                            added += 1;
                        }
                    }
                }
                members.sort_by(|(a, x), (b, y)| x.total_cmp(y).then_with(|| a.cmp(b)));
                Ok(Frame::Integer(added))
            }
            Write::HashSet => {
                if args.len() % 2 != 0 {
                    return Err(arity(write));
                }
                let Value::Hash(hash) = self.entry_mut(key, || Value::Hash(BTreeMap::new()))? else {
                    return Err(wrong_type());
                };
                let added = args
                    .chunks(2)
                    .filter(|pair| hash.insert(pair[0].clone(), pair[1].clone()).is_none())
                    .count();
                Ok(Frame::Integer(added as i64))
            }
        }
    }

    fn scan(&mut self, pattern: Pattern, keys: &[String]) -> Frame {
        match pattern {
            Pattern::Keys => Frame::Array(
                keys.iter()
                    .map(|key| Frame::Array(self.keys(key).into_iter().map(Frame::bulk).collect()))
                    .collect(),
            ),
            Pattern::Count => {
                let count: usize = keys
                    .iter()
                    .map(|key| {
                        if key.contains(WILDCARD) {
                            self.keys(key).len()
                        } else {
                            usize::from(self.exists(key))
                        }
                    })
                    .sum();
                Frame::Integer(count as i64)
            }
            Pattern::Delete => {
                let mut count = 0;
                for key in keys {
                    let matched = if key.contains(WILDCARD) {
                        self.keys(key)
                    } else {
                        vec![key.clone()]
                    };
                    for key in matched {
                        if self.remove(&key).is_some() {
                            count += 1;
                        }
                    }
                }
                Frame::Integer(count)
            }
            Pattern::Remove => {
                let removed = keys.iter().filter(|key| self.remove(key).is_some()).count();
                Frame::Integer(removed as i64)
            }
        }
    }
}

/// An explicit expiration arrives as the last argument, after the payload.
fn with_expiry(mut step: Step, args: &[Bytes]) -> RedisResult<(Step, &[Bytes])> {
    if !matches!(step.ttl, Ttl::ExpireIn(_)) {
        return Ok((step, args));
    }

    let (seconds, payload) = args.split_last().ok_or_else(not_an_integer)?;
    let seconds = std::str::from_utf8(seconds)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(not_an_integer)?;
    step.ttl = Ttl::ExpireIn(seconds);

    Ok((step, payload))
}

fn bulks<'a>(items: impl Iterator<Item = &'a Bytes>) -> Frame {
    Frame::Array(items.map(|item| Frame::Bulk(item.clone())).collect())
}

fn parse_score(raw: &Bytes) -> RedisResult<f64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|score| !score.is_nan())
        .ok_or_else(|| {
            RedisError::from((
                ErrorKind::ResponseError,
                "ERR",
                "value is not a valid float".to_string(),
            ))
        })
}

fn arity(write: Write) -> RedisError {
    RedisError::from((
        ErrorKind::ResponseError,
        "ERR",
        format!("wrong number of arguments for '{}' command", write.command()),
    ))
}

fn not_an_integer() -> RedisError {
    RedisError::from((
        ErrorKind::ResponseError,
        "ERR",
        "value is not an integer or out of range".to_string(),
    ))
}

fn syntax_error() -> RedisError {
    RedisError::from((ErrorKind::ResponseError, "ERR", "syntax error".to_string()))
}
