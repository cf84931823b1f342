//! Atomic procedures: what a script does to every key it is given, as data.
//!
//! A [`Procedure`] is an ordered pipeline of stages. The guard runs first over every key; then,
//! per key, the prior expiration and value are captured, the key is optionally cleared, the
//! action runs and the expiration is resolved. The same structure is rendered to Lua for a live
//! store ([`lua`]) and interpreted directly by [`crate::store::MemoryStore`].

pub mod lua;

/// Required existence state of every key before anything is touched. When any key fails the
/// check the whole procedure returns nil and nothing is mutated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precondition {
    #[default]
    None,
    MustExist,
    MustNotExist,
}

/// Expiration to leave on each written key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Keep whatever expiration the key had before the write.
    #[default]
    Unset,
    /// Remove any expiration.
    Persist,
    /// Expire in the given number of seconds. The duration is passed to the procedure as its last
    /// argument, so every duration shares one script.
    ExpireIn(u64),
}

/// Fetches a key's whole value in its type-appropriate representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Read {
    /// `GET`
    Get,
    /// `LRANGE key 0 -1`
    ListRange,
    /// `SMEMBERS`
    Members,
    /// `ZRANGE key 0 -1`
    SortedRange,
    /// `HGETALL`
    HashAll,
}

impl Read {
    pub fn command(self) -> &'static str {
        match self {
            Read::Get => "get",
            Read::ListRange => "lrange",
            Read::Members => "smembers",
            Read::SortedRange => "zrange",
            Read::HashAll => "hgetall",
        }
    }

    /// Arguments following the key.
    pub fn trailing(self) -> &'static [i64] {
        match self {
            Read::ListRange | Read::SortedRange => &[0, -1],
            _ => &[],
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Read::Get => Shape::Scalar,
            Read::ListRange | Read::Members | Read::SortedRange => Shape::Members,
            Read::HashAll => Shape::Hash,
        }
    }
}

/// Mutates a key with every positional argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Write {
    /// `SET key ARGV[1]`
    Set,
    /// `RPUSH key ARGV...`
    RightPush,
    /// `LPUSH key ARGV...`
    LeftPush,
    /// `SADD key ARGV...`
    Add,
    /// `ZADD key score member ...`
    SortedAdd,
    /// `HSET key field value ...`
    HashSet,
}

impl Write {
    pub fn command(self) -> &'static str {
        match self {
            Write::Set => "set",
            Write::RightPush => "rpush",
            Write::LeftPush => "lpush",
            Write::Add => "sadd",
            Write::SortedAdd => "zadd",
            Write::HashSet => "hset",
        }
    }
}

/// Aggregate operations over every key. Except for `Remove`, a key holding the wildcard glyph is
/// first resolved to the keys currently matching it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Existing keys matching each pattern.
    Keys,
    /// Total number of existing keys.
    Count,
    /// Total number of deleted keys.
    Delete,
    /// Total number of deleted keys, each taken as written.
    Remove,
}

/// How a per-key reply value is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A bulk string, integer or status.
    Scalar,
    /// A flat array of members.
    Members,
    /// A flat array alternating field and value.
    Hash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Read(Read),
    Write(Write),
}

/// The stages applied to each key, in this order: capture, clear, action, expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    /// Value to read before anything changes; reported instead of the action's result.
    pub capture: Option<Read>,
    /// Delete the key before the action runs.
    pub clear: bool,
    pub action: Action,
    pub ttl: Ttl,
}

impl Step {
    pub fn read(read: Read) -> Step {
        Step {
            capture: None,
            clear: false,
            action: Action::Read(read),
            ttl: Ttl::Unset,
        }
    }

    pub fn write(write: Write) -> Step {
        Step {
            capture: None,
            clear: false,
            action: Action::Write(write),
            ttl: Ttl::Unset,
        }
    }

    /// Reads the prior value, rewrites the key from scratch and reports the prior value.
    pub fn replace(prior: Read, write: Write) -> Step {
        Step {
            capture: Some(prior),
            clear: true,
            action: Action::Write(write),
            ttl: Ttl::Unset,
        }
    }

    /// Writes capture the key's remaining expiration so it survives the rewrite.
    pub fn preserves_ttl(&self) -> bool {
        matches!(self.action, Action::Write(_))
    }

    pub fn shape(&self) -> Shape {
        match (self.capture, self.action) {
            (Some(read), _) | (None, Action::Read(read)) => read.shape(),
            (None, Action::Write(_)) => Shape::Scalar,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plan {
    /// Run a step on every key and reply with `{KEYS, values}`.
    PerKey(Step),
    /// Resolve patterns and reply with an aggregate.
    Scan(Pattern),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Procedure {
    precondition: Precondition,
    plan: Plan,
}

impl Procedure {
    pub fn new(plan: Plan) -> Procedure {
        Procedure {
            precondition: Precondition::None,
            plan,
        }
    }

    pub fn guard(mut self, precondition: Precondition) -> Procedure {
        self.precondition = precondition;
        self
    }

    pub fn precondition(&self) -> Precondition {
        self.precondition
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }
}

/// A rendered procedure together with the fingerprint the store caches it under.
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    procedure: Procedure,
    body: String,
    fingerprint: String,
}

impl Script {
    pub fn new(procedure: Procedure) -> Script {
        let body = lua::render(&procedure);
        let fingerprint = redis::Script::new(&body).get_hash().to_string();

        Script {
            procedure,
            body,
            fingerprint,
        }
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Hex SHA1 of the body, as `EVALSHA` expects it.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
