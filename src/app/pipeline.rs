//! The four pull pipelines.
//!
//! Each pull is fetch -> build row-sets -> (aggregate) and returns the final
//! table, or `None` when no call produced any data. `run_operation` adds the
//! CSV write. Calls are issued one at a time; the row-set list is owned by
//! the running pull.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{BEA_KEY_ENV, CENSUS_CITIES, CENSUS_COUNTIES, Config, POPULATION_FILTER_YEAR};
use crate::data::request::{FetchOutcome, Requester, Transport};
use crate::data::{bea, bls, census};
use crate::domain::Operation;
use crate::error::AppError;
use crate::table::{Table, aggregate, from_objects};

/// Run one operation end to end. Returns the written path, or `None` when
/// there was nothing to write.
pub fn run_operation(
    operation: &Operation,
    config: &Config,
    transport: &dyn Transport,
) -> Result<Option<PathBuf>, AppError> {
    let table = match operation {
        Operation::CensusAllStates => pull_census_all_states(config, transport),
        Operation::CensusState { fips } => pull_census_state(config, transport, fips),
        Operation::BlsUnemployment => pull_bls_unemployment(config, transport),
        Operation::BeaGdpByState => pull_bea_gdp_by_state(config, transport)?,
    };

    let Some(table) = table else {
        return Ok(None);
    };

    let path = config.out_dir.join(operation.output_file_name());
    crate::io::write_table_csv(&path, &table)?;
    info!(path = %path.display(), rows = table.len(), "wrote output file");
    Ok(Some(path))
}

/// Places in every configured state and year, filtered by reference-year
/// population and reshaped to the fixed city column set.
pub fn pull_census_all_states(config: &Config, transport: &dyn Transport) -> Option<Table> {
    let requester = Requester::new(transport);
    let mut row_sets = Vec::new();
    for fips in &config.state_fips {
        row_sets.extend(census::fetch_state_years(&requester, config, &CENSUS_CITIES, fips));
    }

    if row_sets.is_empty() {
        warn!("No Census data pulled.");
        return None;
    }

    if !config.census_years.contains(&POPULATION_FILTER_YEAR) {
        warn!(
            reference_year = POPULATION_FILTER_YEAR,
            years = ?config.census_years,
            "population filter year is not among fetched years; the filter will drop every row"
        );
    }

    let table = aggregate(row_sets, &census::city_plan(&CENSUS_CITIES));
    if table.is_empty() {
        warn!("No rows passed the population filter; writing header only.");
    }
    Some(table)
}

/// Counties of one state for every configured year.
pub fn pull_census_state(config: &Config, transport: &dyn Transport, fips: &str) -> Option<Table> {
    let requester = Requester::new(transport);
    let row_sets = census::fetch_state_years(&requester, config, &CENSUS_COUNTIES, fips);

    if row_sets.is_empty() {
        warn!(state = fips, "No Census data pulled for state {fips}.");
        return None;
    }

    Some(aggregate(row_sets, &census::county_plan(&CENSUS_COUNTIES)))
}

pub fn pull_bls_unemployment(config: &Config, transport: &dyn Transport) -> Option<Table> {
    let requester = Requester::new(transport);
    let payload = match requester.fetch(&bls::bls_request(config)) {
        FetchOutcome::Payload(payload) => payload,
        FetchOutcome::Skipped => return None,
    };

    records_table("BLS", &bls::series_records(&payload))
}

/// BEA requires a `UserID`; without one this is a configuration error.
pub fn pull_bea_gdp_by_state(config: &Config, transport: &dyn Transport) -> Result<Option<Table>, AppError> {
    let user_id = config.keys.bea.as_deref().ok_or_else(|| {
        AppError::config(format!(
            "Missing {BEA_KEY_ENV} in environment (.env); the BEA API requires a UserID."
        ))
    })?;

    let requester = Requester::new(transport);
    let payload = match requester.fetch(&bea::bea_request(user_id)) {
        FetchOutcome::Payload(payload) => payload,
        FetchOutcome::Skipped => return Ok(None),
    };

    Ok(records_table("BEA", &bea::data_records(&payload)))
}

fn records_table(source: &str, records: &[serde_json::Value]) -> Option<Table> {
    if records.is_empty() {
        warn!(source, "No {source} data returned.");
        return None;
    }
    match from_objects(records) {
        Ok(table) => {
            info!(source, rows = table.len(), "flattened records");
            Some(table)
        }
        Err(err) => {
            warn!(source, error = %err, "unexpected {source} payload");
            None
        }
    }
}
