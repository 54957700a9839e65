//! BEA Regional data API.

use serde_json::Value;
use tracing::warn;

use crate::config::{BEA_GDP_BY_STATE_PARAMS, BEA_URL};
use crate::data::request::RequestSpec;

pub fn bea_request(user_id: &str) -> RequestSpec {
    let table = BEA_GDP_BY_STATE_PARAMS
        .iter()
        .find(|(k, _)| *k == "TableName")
        .map_or("data", |(_, v)| *v);
    BEA_GDP_BY_STATE_PARAMS
        .iter()
        .fold(RequestSpec::get(format!("BEA {table}"), BEA_URL), |spec, (k, v)| {
            spec.with_query(*k, *v)
        })
        .with_query("UserID", user_id)
}

/// Records under `BEAAPI.Results.Data`. BEA reports errors inside a 200
/// response; those are logged and yield no records.
pub fn data_records(payload: &Value) -> Vec<Value> {
    let error = payload
        .pointer("/BEAAPI/Error")
        .or_else(|| payload.pointer("/BEAAPI/Results/Error"));
    if let Some(error) = error {
        let description = error
            .get("APIErrorDescription")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let code = error.get("APIErrorCode").and_then(Value::as_str).unwrap_or("");
        warn!(code, "BEA returned an error: {description}");
    }

    payload
        .pointer("/BEAAPI/Results/Data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
