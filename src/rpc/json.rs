//! JSON mapping helpers matching the proto3 JSON conventions of the service:
//! 64-bit integers travel as strings and bytes as base64.

use base64::Engine;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Serializer;
use std::fmt;
use std::str::FromStr;

/// (De)serialize `i64`/`u64` as a JSON string, accepting bare numbers on input.
pub mod int_string {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: fmt::Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + TryFrom<i64> + TryFrom<u64>,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IntVisitor(std::marker::PhantomData))
    }

    struct IntVisitor<T>(std::marker::PhantomData<T>);

    impl<'de, T> Visitor<'de> for IntVisitor<T>
    where
        T: FromStr + TryFrom<i64> + TryFrom<u64>,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a decimal integer string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
            <T as TryFrom<i64>>::try_from(v)
                .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
            <T as TryFrom<u64>>::try_from(v)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
            v.parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

/// (De)serialize raw bytes as standard base64.
pub mod base64_bytes {
    use super::*;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::int_string")]
        n: i64,
        #[serde(with = "super::base64_bytes")]
        payload: Vec<u8>,
    }

    #[test]
    fn integers_are_written_as_strings() {
        let json = serde_json::to_string(&Wrapper {
            n: -42,
            payload: b"hi".to_vec(),
        })
        .unwrap();
        assert_eq!(json, r#"{"n":"-42","payload":"aGk="}"#);
    }

    #[test]
    fn integers_accept_numbers_or_strings() {
        let a: Wrapper = serde_json::from_str(r#"{"n":7,"payload":""}"#).unwrap();
        let b: Wrapper = serde_json::from_str(r#"{"n":"7","payload":""}"#).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Wrapper>(r#"{"n":"seven","payload":""}"#).is_err());
    }
}
