use bytes::Bytes;

use crate::procedure::Plan;

/// An operation that can be run as an atomic procedure.
pub trait Scripted {
    fn plan(&self) -> Plan;

    /// Rejects positional arguments the procedure cannot use, with a reason.
    fn check_arguments(&self, args: &[Bytes]) -> Result<(), String>;
}

pub(crate) fn no_arguments(args: &[Bytes]) -> Result<(), String> {
    match args.len() {
        0 => Ok(()),
        n => Err(format!("takes no arguments, got {}", n)),
    }
}

pub(crate) fn exactly_one(args: &[Bytes]) -> Result<(), String> {
    match args.len() {
        1 => Ok(()),
        n => Err(format!("takes exactly one value, got {}", n)),
    }
}

pub(crate) fn at_least_one(args: &[Bytes]) -> Result<(), String> {
    if args.is_empty() {
        return Err("needs at least one value".to_string());
    }
    Ok(())
}

pub(crate) fn pairs(args: &[Bytes]) -> Result<(), String> {
    at_least_one(args)?;
    if args.len() % 2 != 0 {
        return Err(format!("needs field/value pairs, got {} values", args.len()));
    }
    Ok(())
}

/// Score/member pairs; every score must parse as a float.
pub(crate) fn score_pairs(args: &[Bytes]) -> Result<(), String> {
    pairs(args)?;
    for score in args.iter().step_by(2) {
        let parsed = std::str::from_utf8(score)
            .ok()
            .and_then(|s| s.parse::<f64>().ok());
        if parsed.map_or(true, f64::is_nan) {
            return Err(format!(
                "score {} is not a number",
                String::from_utf8_lossy(score)
            ));
        }
    }
    Ok(())
}
