use serde::{Deserialize, Deserializer};

// clients send ids either as JSON numbers or as the string keys of the categories object
#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrInt {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Accepts `4`, `2.5` or `"4"` and keeps the textual form. `null` and a missing field give `None`.
pub fn deserialize_option_string_from_scalar<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StrOrInt>::deserialize(deserializer)? {
        Some(StrOrInt::Int(v)) => Ok(Some(v.to_string())),
        Some(StrOrInt::Float(v)) => Ok(Some(v.to_string())),
        Some(StrOrInt::Str(v)) => Ok(Some(v)),
        None => Ok(None),
    }
}

/// Accepts `1` or `"1"` as an integer id.
pub fn deserialize_option_int_from_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StrOrInt>::deserialize(deserializer)? {
        Some(StrOrInt::Int(v)) => Ok(Some(v)),
        Some(StrOrInt::Float(v)) => Err(serde::de::Error::custom(format!(
            "Wrong value {v}, expected an integer id"
        ))),
        Some(StrOrInt::Str(v)) => match v.trim().parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(serde::de::Error::custom(format!(
                "Wrong value {v}, can not parse to i64"
            ))),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_option_string_from_scalar")]
        category: Option<String>,
        #[serde(default, deserialize_with = "deserialize_option_int_from_string")]
        id: Option<i64>,
    }

    fn parse(raw: &str) -> serde_json::Result<Body> {
        serde_json::from_str(raw)
    }

    #[test]
    fn numbers_and_strings_are_both_accepted() {
        let body = parse(r#"{"category": 3, "id": "4"}"#).unwrap();
        assert_eq!(body.category.as_deref(), Some("3"));
        assert_eq!(body.id, Some(4));

        let body = parse(r#"{"category": "3", "id": 4}"#).unwrap();
        assert_eq!(body.category.as_deref(), Some("3"));
        assert_eq!(body.id, Some(4));
    }

    #[test]
    fn missing_and_null_become_none() {
        let body = parse(r#"{"category": null}"#).unwrap();
        assert!(body.category.is_none());
        assert!(body.id.is_none());
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        assert!(parse(r#"{"id": "science"}"#).is_err());
        assert!(parse(r#"{"id": 1.5}"#).is_err());
    }

    #[test]
    fn fractional_numbers_keep_their_text() {
        let body = parse(r#"{"category": 3.5}"#).unwrap();
        assert_eq!(body.category.as_deref(), Some("3.5"));
    }
}
