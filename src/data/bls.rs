//! BLS public time-series API (v2).

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::{BLS_UNEMPLOYMENT_SERIES, BLS_URL, Config};
use crate::data::request::RequestSpec;

const STATUS_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

pub fn bls_request(config: &Config) -> RequestSpec {
    let label = format!("BLS series {}", BLS_UNEMPLOYMENT_SERIES.join(","));
    let mut body = json!({ "seriesid": BLS_UNEMPLOYMENT_SERIES });
    if let (Some(key), Value::Object(map)) = (&config.keys.bls, &mut body) {
        map.insert("registrationkey".to_string(), Value::String(key.clone()));
    }
    RequestSpec::post_json(label, BLS_URL, body)
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: SeriesResults,
}

#[derive(Debug, Default, Deserialize)]
struct SeriesResults {
    #[serde(default)]
    series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(rename = "seriesID")]
    series_id: Option<String>,
    #[serde(default)]
    data: Vec<Value>,
}

/// Flatten `Results.series[].data[]` into one record per observation, each
/// tagged with the `seriesID` it belongs to.
///
/// The API reports problems inside a 200 response (`status` plus `message`);
/// those are logged here.
pub fn series_records(payload: &Value) -> Vec<Value> {
    let response: SeriesResponse = match serde_json::from_value(payload.clone()) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "unexpected BLS response shape");
            return Vec::new();
        }
    };

    if response.status == STATUS_SUCCEEDED {
        for message in &response.message {
            debug!(message = %message, "BLS notice");
        }
    } else {
        warn!(status = %response.status, messages = ?response.message, "BLS did not process the request");
    }

    let mut records = Vec::new();
    for series in response.results.series {
        let series_id = series.series_id.map(Value::String).unwrap_or(Value::Null);
        for mut point in series.data {
            if let Value::Object(map) = &mut point {
                map.insert("seriesID".to_string(), series_id.clone());
            }
            records.push(point);
        }
    }
    records
}
