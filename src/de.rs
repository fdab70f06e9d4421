use serde::de::{Deserialize, Deserializer, Error};

/// The loose shapes an identifier or text field may arrive in from callers.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Int(u64),
    Bool(bool),
}

/// Deserialize an optional string, treating every "falsy" value (`null`,
/// `false`, `0`, `""`) as absent. Non-zero integers are accepted as their
/// decimal representation since Discord snowflakes are often sent as numbers.
pub fn truthy_string<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    Option::<Loose>::deserialize(deserializer).and_then(|x| match x {
        None | Some(Loose::Bool(false)) | Some(Loose::Int(0)) => Ok(None),
        Some(Loose::Str(s)) if s.is_empty() => Ok(None),
        Some(Loose::Str(s)) => Ok(Some(s)),
        Some(Loose::Int(n)) => Ok(Some(n.to_string())),
        Some(Loose::Bool(true)) => Err(Error::custom("invalid value: true, expected a string")),
    })
}

#[test]
fn test_truthy_string() {
    #[derive(Debug, PartialEq, Eq, serde::Deserialize)]
    struct T {
        #[serde(default, deserialize_with = "truthy_string")]
        val: Option<String>,
    }

    let t = |raw: &str| serde_json::from_str::<T>(raw).map(|x| x.val);

    assert_eq!(t(r#"{"val": "abc"}"#).unwrap(), Some("abc".to_owned()));
    assert_eq!(t(r#"{"val": 1234}"#).unwrap(), Some("1234".to_owned()));

    assert_eq!(t(r#"{}"#).unwrap(), None);
    assert_eq!(t(r#"{"val": null}"#).unwrap(), None);
    assert_eq!(t(r#"{"val": ""}"#).unwrap(), None);
    assert_eq!(t(r#"{"val": false}"#).unwrap(), None);
    assert_eq!(t(r#"{"val": 0}"#).unwrap(), None);

    assert!(t(r#"{"val": true}"#).is_err());
    assert!(t(r#"{"val": ["abc"]}"#).is_err());
}
