use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::commands::{Command, Operation};
use crate::Error;

type Builder = Box<dyn Fn(Vec<String>, Vec<Bytes>) -> Result<Command, Error> + Send + Sync>;

/// Resolves operation names to commands.
///
/// The built-in operations are always available. Extra names can be registered with a builder
/// of their own; each registration declares the operation its builder produces, and a builder
/// producing anything else is refused when it runs.
#[derive(Default)]
pub struct Factory {
    custom: HashMap<String, (Operation, Builder)>,
}

impl Factory {
    pub fn new() -> Factory {
        Factory::default()
    }

    /// Registers `builder` under `name`, matched case-insensitively. A registered name shadows
    /// a built-in operation of the same name.
    pub fn register<F>(&mut self, name: &str, operation: Operation, builder: F)
    where
        F: Fn(Vec<String>, Vec<Bytes>) -> Result<Command, Error> + Send + Sync + 'static,
    {
        self.custom
            .insert(name.to_ascii_lowercase(), (operation, Box::new(builder)));
    }

    pub fn get_command<K, A>(
        &self,
        name: &str,
        keys: impl IntoIterator<Item = K>,
        args: impl IntoIterator<Item = A>,
    ) -> Result<Command, Error>
    where
        K: Into<String>,
        A: Into<Bytes>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        let args = args.into_iter().map(Into::into).collect();

        if let Some((expected, builder)) = self.custom.get(&name.to_ascii_lowercase()) {
            let command = builder(keys, args)?;
            if command.operation() != *expected {
                return Err(Error::TypeMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    actual: command.operation().to_string(),
                });
            }
            return Ok(command);
        }

        let operation = Operation::from_str(name).map_err(|_| Error::UnknownOperation {
            name: name.to_string(),
        })?;
        Command::new(operation, keys, args)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}
