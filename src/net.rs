pub mod client;
pub mod server;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Sent by the client. `body` stays undecoded until the method is known.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    /// `"<TypeName>.<MethodName>"`
    pub service_method: String,
    #[serde(default = "null_body")]
    pub body: Box<RawValue>,
    /// Chosen by the client, echoed by the server.
    #[serde(default)]
    pub seq: u64,
}

/// Sent by the server. When `error` is non-empty, `body` is meaningless.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    #[serde(default)]
    pub service_method: String,
    #[serde(default = "null_body")]
    pub body: Box<RawValue>,
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub error: String,
}

fn null_body() -> Box<RawValue> {
    RawValue::NULL.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn request_wire_shape() {
        let req = Request {
            service_method: "Math.Add".to_owned(),
            body: serde_json::value::to_raw_value(&json!({"A": 1, "B": 2})).unwrap(),
            seq: 7,
        };
        let value: Value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"ServiceMethod": "Math.Add", "Body": {"A": 1, "B": 2}, "Seq": 7})
        );
    }

    #[test]
    fn body_is_kept_verbatim() {
        let req: Request =
            serde_json::from_str(r#"{"ServiceMethod":"Math.Add","Body":{"A":1,  "B":2},"Seq":3}"#)
                .unwrap();
        assert_eq!(req.body.get(), r#"{"A":1,  "B":2}"#);
        assert_eq!(req.seq, 3);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let res: Response = serde_json::from_str(r#"{"Error":"boom"}"#).unwrap();
        assert_eq!(res.error, "boom");
        assert_eq!(res.body.get(), "null");
        assert_eq!(res.seq, 0);
        assert!(res.service_method.is_empty());
    }
}
