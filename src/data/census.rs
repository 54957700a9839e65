//! Census ACS 5-year requests and the aggregation plans for census pulls.

use tracing::{info, warn};

use crate::config::{
    CensusDataset, Config, MISSING_SENTINEL, POPULATION_FILTER_YEAR, POPULATION_THRESHOLD, census_url,
};
use crate::data::request::{FetchOutcome, RequestSpec, Requester};
use crate::table::{AggregatePlan, Table, from_header_rows};

pub fn call_label(state_fips: &str, year: u16) -> String {
    format!("state {state_fips} year {year}")
}

pub fn census_request(config: &Config, dataset: &CensusDataset, state_fips: &str, year: u16) -> RequestSpec {
    let spec = RequestSpec::get(call_label(state_fips, year), census_url(year))
        .with_query("get", dataset.get_param())
        .with_query("for", dataset.geography)
        .with_query("in", format!("state:{state_fips}"));
    match &config.keys.census {
        Some(key) => spec.with_query("key", key),
        None => spec,
    }
}

/// Fetch one state for every configured year, one year-tagged row-set per
/// successful call. Failed, empty and malformed responses are logged and left out.
pub fn fetch_state_years(
    requester: &Requester<'_>,
    config: &Config,
    dataset: &CensusDataset,
    state_fips: &str,
) -> Vec<Table> {
    let mut row_sets = Vec::new();

    for &year in &config.census_years {
        let spec = census_request(config, dataset, state_fips, year);
        let payload = match requester.fetch(&spec) {
            FetchOutcome::Payload(payload) => payload,
            FetchOutcome::Skipped => continue,
        };

        match from_header_rows(&payload) {
            Ok(table) if table.is_empty() => {
                info!(state = state_fips, year, "No data returned for state {state_fips} in year {year}");
            }
            Ok(mut table) => {
                table.tag_year(year);
                info!(state = state_fips, year, rows = table.len(), "fetched census rows");
                row_sets.push(table);
            }
            Err(err) => {
                warn!(state = state_fips, year, error = %err, "unexpected census payload; skipping");
            }
        }
    }

    row_sets
}

/// Plan for the all-states place pull: full rename, unemployment rate,
/// reference-year population filter, "City, State" split.
pub fn city_plan(dataset: &CensusDataset) -> AggregatePlan {
    AggregatePlan {
        renames: dataset.rename_map(),
        numeric_columns: dataset.numeric_columns(),
        sentinel: Some(MISSING_SENTINEL),
        unemployment_rate: true,
        population_filter: Some((POPULATION_FILTER_YEAR, POPULATION_THRESHOLD)),
        split_place_names: true,
        column_order: dataset.column_order.to_vec(),
    }
}

/// Plan for the single-state county pull: rename, coerce, sentinel, order.
pub fn county_plan(dataset: &CensusDataset) -> AggregatePlan {
    AggregatePlan {
        renames: dataset.rename_map(),
        numeric_columns: dataset.numeric_columns(),
        sentinel: Some(MISSING_SENTINEL),
        column_order: dataset.column_order.to_vec(),
        ..AggregatePlan::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{ApiKeys, CENSUS_CITIES, CENSUS_COUNTIES};
    use crate::data::request::FetchError;
    use crate::table::YEAR_COLUMN;
    use crate::data::testing::CannedTransport;

    fn config_with_key() -> Config {
        Config {
            keys: ApiKeys {
                census: Some("census-key".into()),
                ..ApiKeys::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn request_carries_fields_geography_and_key() {
        let spec = census_request(&config_with_key(), &CENSUS_COUNTIES, "06", 2021);

        assert_eq!(spec.url, "https://api.census.gov/data/2021/acs/acs5");
        assert_eq!(spec.label, "state 06 year 2021");
        let query = &spec.query;
        assert!(query.contains(&("get".into(), "NAME,B01003_001E,B06011_001E".into())));
        assert!(query.contains(&("for".into(), "county:*".into())));
        assert!(query.contains(&("in".into(), "state:06".into())));
        assert_eq!(query.last(), Some(&("key".into(), "census-key".into())));
    }

    #[test]
    fn request_without_key_omits_it() {
        let spec = census_request(&Config::default(), &CENSUS_CITIES, "01", 2020);
        assert!(spec.query.iter().all(|(k, _)| k != "key"));
        assert!(spec.query.contains(&("for".into(), "place:*".into())));
    }

    #[test]
    fn a_404_year_is_skipped_while_sibling_years_survive() {
        let transport = CannedTransport::new()
            .respond(
                "state 06 year 2020",
                Ok(json!([["NAME", "B01003_001E"], ["Alameda County, California", "1661584"]])),
            )
            .respond(
                "state 06 year 2021",
                Err(FetchError::Status {
                    status: 404,
                    excerpt: "unknown/unsupported geography hierarchy".into(),
                }),
            )
            .respond(
                "state 06 year 2022",
                Ok(json!([["NAME", "B01003_001E"], ["Alpine County, California", "1515"]])),
            );
        let requester = Requester::new(&transport);

        let sets = fetch_state_years(&requester, &Config::default(), &CENSUS_COUNTIES, "06");

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].cell(0, YEAR_COLUMN).and_then(|c| c.as_number()), Some(2020.0));
        assert_eq!(sets[1].cell(0, YEAR_COLUMN).and_then(|c| c.as_number()), Some(2022.0));
        assert_eq!(transport.calls().len(), 3);
    }

    #[test]
    fn empty_payload_yields_no_row_set() {
        let transport = CannedTransport::new()
            .respond("state 02 year 2020", Ok(json!([])))
            .respond("state 02 year 2021", Ok(json!([["NAME"]])))
            .respond("state 02 year 2022", Ok(json!({"unexpected": true})));
        let requester = Requester::new(&transport);

        let sets = fetch_state_years(&requester, &Config::default(), &CENSUS_COUNTIES, "02");
        assert!(sets.is_empty());
    }

    #[test]
    fn city_plan_filters_on_configured_reference_year() {
        let plan = city_plan(&CENSUS_CITIES);
        assert_eq!(plan.population_filter, Some((2010, 50_000.0)));
        assert!(plan.unemployment_rate && plan.split_place_names);
        assert_eq!(plan.column_order.len(), 25);
        assert!(county_plan(&CENSUS_COUNTIES).population_filter.is_none());
    }
}
