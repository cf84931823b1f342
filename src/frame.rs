// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Bytes;

/// A reply as the store hands it back: the RESP2 shapes a Lua script can return.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

impl Frame {
    pub fn bulk(data: impl Into<Bytes>) -> Frame {
        Frame::Bulk(data.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Frame::Null)
    }

    /// Strings the store may hand back for a key or a member. Lua turns integers into `Integer`
    /// frames, so those are accepted too.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Frame::Simple(s) => Some(s.clone()),
            Frame::Bulk(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Frame::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

impl From<redis::Value> for Frame {
    fn from(value: redis::Value) -> Self {
        match value {
            redis::Value::Nil => Frame::Null,
            redis::Value::Int(i) => Frame::Integer(i),
            redis::Value::Data(data) => Frame::Bulk(Bytes::from(data)),
            redis::Value::Bulk(values) => {
                Frame::Array(values.into_iter().map(Frame::from).collect())
            }
            redis::Value::Status(s) => Frame::Simple(s),
            redis::Value::Okay => Frame::Simple("OK".to_string()),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}[", arr.len())?;
                for (i, frame) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_redis_value_nested() {
        let value = redis::Value::Bulk(vec![
            redis::Value::Bulk(vec![redis::Value::Data(b"k1".to_vec())]),
            redis::Value::Bulk(vec![redis::Value::Nil]),
        ]);

        assert_eq!(
            Frame::from(value),
            Frame::Array(vec![
                Frame::Array(vec![Frame::Bulk(Bytes::from("k1"))]),
                Frame::Array(vec![Frame::Null]),
            ])
        );
    }

    #[test]
    fn from_redis_value_status() {
        assert_eq!(Frame::from(redis::Value::Okay), Frame::Simple("OK".to_string()));
        assert_eq!(
            Frame::from(redis::Value::Status("QUEUED".to_string())),
            Frame::Simple("QUEUED".to_string())
        );
        assert_eq!(Frame::from(redis::Value::Int(-2)), Frame::Integer(-2));
    }

    #[test]
    fn to_text() {
        assert_eq!(Frame::bulk("user:1").to_text(), Some("user:1".to_string()));
        assert_eq!(Frame::Integer(7).to_text(), Some("7".to_string()));
        assert_eq!(Frame::Null.to_text(), None);
    }

    #[test]
    fn display_array() {
        let frame = Frame::Array(vec![Frame::bulk("a"), Frame::Null, Frame::Integer(3)]);

        assert_eq!(frame.to_string(), "*3[$a $-1 :3]");
    }
}
