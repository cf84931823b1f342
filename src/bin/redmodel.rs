use clap::{Args, Parser, Subcommand};
use redmodel::{DataType, Error, Executor, Factory, KeyTemplate, Query, RedisConnection};
use tracing::debug;

const URL: &str = "redis://127.0.0.1:6379/";

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Redis server to connect to
    #[arg(short, long, env = "REDIS_URL", default_value = URL)]
    url: String,

    /// Separator between key segments
    #[arg(short, long, default_value_t = ':')]
    delimiter: char,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List existing keys matching the template
    Keys(Selection),
    /// Read the value of every existing key matching the template
    Get {
        #[command(flatten)]
        selection: Selection,

        /// Data type held by the keys: string, list, set, zset or hash
        #[arg(short = 't', long = "type")]
        data_type: DataType,
    },
    /// Count existing keys matching the template
    Count(Selection),
    /// Delete every key matching the template
    Delete(Selection),
}

#[derive(Args, Debug)]
struct Selection {
    /// Key template, e.g. `user:{id}:profile`
    template: String,

    /// Bind a field to one or more values: `field=v1,v2`
    #[arg(short = 'w', long = "where", value_parser = parse_where)]
    equal: Vec<(String, Vec<String>)>,

    /// Bind a field to an integer range: `field=low..high`
    #[arg(short, long, value_parser = parse_between)]
    between: Vec<(String, i64, i64)>,
}

impl Selection {
    fn query(&self, delimiter: char) -> Result<Query, Error> {
        let mut query = KeyTemplate::new(self.template.as_str())
            .with_delimiter(delimiter)
            .query();

        for (field, values) in &self.equal {
            query = query.where_in(field, values);
        }
        for (field, low, high) in &self.between {
            query = query.where_between(field, *low, *high)?;
        }

        Ok(query)
    }
}

fn parse_where(raw: &str) -> Result<(String, Vec<String>), String> {
    let (field, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value[,value...], got {raw}"))?;

    Ok((
        field.to_string(),
        values.split(',').map(str::to_string).collect(),
    ))
}

fn parse_between(raw: &str) -> Result<(String, i64, i64), String> {
    let (field, range) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=low..high, got {raw}"))?;
    let (low, high) = range
        .split_once("..")
        .ok_or_else(|| format!("expected low..high, got {range}"))?;

    let bound = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid bound {s}: {e}"))
    };

    Ok((field.to_string(), bound(low)?, bound(high)?))
}

fn main() -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let cli = Cli::parse();
    let factory = Factory::new();
    let mut executor = Executor::new(RedisConnection::open(&cli.url)?);

    match cli.command {
        Action::Keys(selection) => {
            let patterns = selection.query(cli.delimiter)?.patterns();
            let command = factory.get_command("keys", patterns, Vec::<String>::new())?;
            for key in executor.execute(command)?.into_keys() {
                println!("{key}");
            }
        }
        Action::Get {
            selection,
            data_type,
        } => {
            let patterns = selection.query(cli.delimiter)?.patterns();
            let keys = factory.get_command("keys", patterns, Vec::<String>::new())?;
            let keys = executor.execute(keys)?.into_keys();
            if keys.is_empty() {
                return Ok(());
            }

            let read = match data_type {
                DataType::String => "get",
                DataType::List => "lrange",
                DataType::Set => "smembers",
                DataType::SortedSet => "zrange",
                DataType::Hash => "hgetall",
            };
            let command = factory.get_command(read, keys, Vec::<String>::new())?;
            for (key, value) in executor.execute(command)?.into_keyed() {
                println!("{key}\t{value}");
            }
        }
        Action::Count(selection) => {
            let patterns = selection.query(cli.delimiter)?.patterns();
            let command = factory.get_command("count", patterns, Vec::<String>::new())?;
            println!("{}", executor.execute(command)?.count());
        }
        Action::Delete(selection) => {
            let patterns = selection.query(cli.delimiter)?.patterns();
            let command = factory.get_command("delete", patterns, Vec::<String>::new())?;
            println!("{}", executor.execute(command)?.count());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_values() {
        assert_eq!(
            parse_where("id=1,2").unwrap(),
            ("id".to_string(), vec!["1".to_string(), "2".to_string()])
        );
        assert!(parse_where("id").is_err());
    }

    #[test]
    fn between_bounds() {
        assert_eq!(
            parse_between("year=2021..2023").unwrap(),
            ("year".to_string(), 2021, 2023)
        );
        assert!(parse_between("year=2021").is_err());
        assert!(parse_between("year=a..b").is_err());
    }

    #[test]
    fn cli_shape() {
        let cli = Cli::try_parse_from([
            "redmodel",
            "count",
            "log:{year}:{month}",
            "--between",
            "year=2021..2022",
            "--where",
            "month=01",
        ])
        .unwrap();

        let Action::Count(selection) = cli.command else {
            panic!("expected count");
        };
        let query = selection.query(cli.delimiter).unwrap();
        assert_eq!(
            query.patterns(),
            vec!["log:2021:01".to_string(), "log:2022:01".to_string()]
        );
    }
}
