use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Data carried by a block.
///
/// The hash preimage uses `canonical()`: compact JSON, with object keys in
/// sorted order (serde_json's default map). Any change to that form changes
/// every downstream digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Record(Value),
}

impl Payload {
    /// Canonical JSON encoding hashed into the block.
    pub fn canonical(&self) -> String {
        match self {
            Payload::Text(s) => Value::from(s.as_str()).to_string(),
            Payload::Record(v) => v.to_string(),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Record(v)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::Payload;
    use serde_json::json;

    #[test]
    fn text_is_json_quoted() {
        assert_eq!(Payload::from("Donald Duck").canonical(), "\"Donald Duck\"");
        assert_eq!(Payload::from("say \"quack\"").canonical(), r#""say \"quack\"""#);
    }

    #[test]
    fn record_keys_are_sorted() {
        let a = Payload::from(json!({ "to": "Daffy", "amount": 5, "from": "Donald" }));
        let b = Payload::from(json!({ "from": "Donald", "amount": 5, "to": "Daffy" }));
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"{"amount":5,"from":"Donald","to":"Daffy"}"#);
    }

    #[test]
    fn untagged_deserialization() {
        let p: Payload = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(p, Payload::Text("hello".into()));

        let p: Payload = serde_json::from_str(r#"{"transaction":"x"}"#).unwrap();
        assert!(matches!(p, Payload::Record(_)));
    }
}
