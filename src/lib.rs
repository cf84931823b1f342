pub mod commands;
pub mod connection;
pub mod error;
pub mod executor;
pub mod frame;
pub mod model;
pub mod procedure;
pub mod store;
pub mod template;

pub use commands::factory::Factory;
pub use commands::response::{Data, KeyedValues, Response};
pub use commands::{Command, Operation};
pub use connection::RedisConnection;
pub use error::Error;
pub use executor::{Executor, NativeStore, ScriptStore};
pub use model::{DataType, Model, Payload};
pub use procedure::{Precondition, Ttl};
pub use store::MemoryStore;
pub use template::{KeyTemplate, Query};

pub type Result<T> = std::result::Result<T, Error>;
