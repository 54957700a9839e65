//! Static run configuration.
//!
//! Everything a pull needs that is not typed at the prompt lives here:
//! API credentials, dataset endpoints and request templates, census field
//! codes with their labels, target geographies and years.
//!
//! A `Config` is built once at startup and passed by reference to each
//! pipeline. Nothing in it changes during a run.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const CENSUS_BASE_URL: &str = "https://api.census.gov/data";
pub const BLS_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";
pub const BEA_URL: &str = "https://apps.bea.gov/api/data/";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Census ACS code for "estimate not available".
pub const MISSING_SENTINEL: f64 = -666_666_666.0;

pub const CENSUS_KEY_ENV: &str = "CENSUS_API_KEY";
pub const BLS_KEY_ENV: &str = "BLS_API_KEY";
pub const BEA_KEY_ENV: &str = "BEA_API_KEY";
pub const TIMEOUT_ENV: &str = "STATPULL_TIMEOUT_SECS";

/// States plus DC, two-digit FIPS.
pub const ALL_STATE_FIPS: [&str; 51] = [
    "01", "02", "04", "05", "06", "08", "09", "10", "11", "12", "13", "15", "16", "17", "18", "19",
    "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32", "33", "34", "35",
    "36", "37", "38", "39", "40", "41", "42", "44", "45", "46", "47", "48", "49", "50", "51", "53",
    "54", "55", "56",
];

pub const CENSUS_YEARS: [u16; 3] = [2020, 2021, 2022];

/// Reference year for the bulk pull's population filter.
pub const POPULATION_FILTER_YEAR: u16 = 2010;
pub const POPULATION_THRESHOLD: f64 = 50_000.0;

pub const BLS_UNEMPLOYMENT_SERIES: [&str; 1] = ["LNS14000000"];

/// BEA Regional dataset, SAGDP2 line 1 (all-industry GDP) for every state.
pub const BEA_GDP_BY_STATE_PARAMS: [(&str, &str); 7] = [
    ("method", "GetData"),
    ("datasetname", "Regional"),
    ("TableName", "SAGDP2"),
    ("LineCode", "1"),
    ("GeoFIPS", "STATE"),
    ("Year", "2022"),
    ("ResultFormat", "JSON"),
];

/// A census variable code and the column label it is renamed to.
pub type Field = (&'static str, &'static str);

/// The only text variable requested; every other requested code is numeric.
const NAME_CODE: &str = "NAME";

/// Request template and output shape for one census pull.
#[derive(Debug, Clone, Copy)]
pub struct CensusDataset {
    /// Geography level requested with `for=`.
    pub geography: &'static str,
    /// Variables requested with `get=`, in request order.
    pub fields: &'static [Field],
    /// Geography columns the API appends on its own; renamed, never requested.
    pub geo_fields: &'static [Field],
    pub column_order: &'static [&'static str],
}

impl CensusDataset {
    /// Comma-separated `get=` value.
    pub fn get_param(&self) -> String {
        self.fields
            .iter()
            .map(|(code, _)| *code)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn rename_map(&self) -> Vec<(&'static str, &'static str)> {
        self.fields.iter().chain(self.geo_fields).copied().collect()
    }

    pub fn numeric_columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(code, _)| *code != NAME_CODE)
            .map(|(_, label)| *label)
            .collect()
    }
}

pub const CITY_FIELDS: [Field; 22] = [
    ("NAME", "City"),
    ("B01003_001E", "Total_Population"),
    ("B06011_001E", "Median_Income"),
    ("B25105_001E", "Median_Monthly_Housing_Costs"),
    ("B25058_001E", "Median_Contract_Rent"),
    ("B25070_007E", "Rent_30_34_Percent"),
    ("B25064_001E", "Median_Gross_Rent"),
    ("B17001_002E", "Poverty_Rate"),
    ("B10058_001E", "Gross_Rent_Percentage"),
    ("B08303_001E", "Total_Commute"),
    ("B23001_001E", "Total_Labor_Force"),
    ("B23001_007E", "Unemployed_Population"),
    ("B19013_001E", "Median_Household_Income"),
    ("B09001_001E", "Children_Under_6"),
    ("C24010_004E", "Construction_Workers"),
    ("C24010_005E", "Extraction_Workers"),
    ("C24010_006E", "Installation_Maintenance_Repair_Workers"),
    ("C24010_007E", "Production_Workers"),
    ("B15001_017E", "Males_25_34_Bachelors"),
    ("B15001_050E", "Females_25_34_Bachelors"),
    ("B07009_005E", "Native_Bachelors"),
    ("B07009_013E", "Foreign_Bachelors"),
];

pub const CITY_COLUMN_ORDER: [&str; 25] = [
    "year",
    "City_Name",
    "State",
    "Total_Population",
    "Median_Income",
    "Median_Monthly_Housing_Costs",
    "Median_Contract_Rent",
    "Rent_30_34_Percent",
    "Median_Gross_Rent",
    "Poverty_Rate",
    "Gross_Rent_Percentage",
    "Total_Commute",
    "Total_Labor_Force",
    "Unemployed_Population",
    "Unemployment_Rate",
    "Median_Household_Income",
    "Children_Under_6",
    "Construction_Workers",
    "Extraction_Workers",
    "Installation_Maintenance_Repair_Workers",
    "Production_Workers",
    "Males_25_34_Bachelors",
    "Females_25_34_Bachelors",
    "Native_Bachelors",
    "Foreign_Bachelors",
];

pub const COUNTY_FIELDS: [Field; 3] = [
    ("NAME", "County"),
    ("B01003_001E", "Total_Population"),
    ("B06011_001E", "Median_Income"),
];

pub const COUNTY_GEO_FIELDS: [Field; 2] = [
    ("state", "State_FIPS"),
    ("county", "County_FIPS"),
];

pub const COUNTY_COLUMN_ORDER: [&str; 6] = [
    "year",
    "County",
    "State_FIPS",
    "County_FIPS",
    "Total_Population",
    "Median_Income",
];

/// Every incorporated place in a state, with the full variable set.
pub const CENSUS_CITIES: CensusDataset = CensusDataset {
    geography: "place:*",
    fields: &CITY_FIELDS,
    geo_fields: &[],
    column_order: &CITY_COLUMN_ORDER,
};

/// Every county in one state, population and income only.
pub const CENSUS_COUNTIES: CensusDataset = CensusDataset {
    geography: "county:*",
    fields: &COUNTY_FIELDS,
    geo_fields: &COUNTY_GEO_FIELDS,
    column_order: &COUNTY_COLUMN_ORDER,
};

/// Static API credentials. `Debug` never prints the secrets.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub census: Option<String>,
    pub bls: Option<String>,
    pub bea: Option<String>,
}

impl ApiKeys {
    /// Read keys from the process environment; blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            census: non_empty_env(CENSUS_KEY_ENV),
            bls: non_empty_env(BLS_KEY_ENV),
            bea: non_empty_env(BEA_KEY_ENV),
        }
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ApiKeys")
            .field("census", &mask(&self.census))
            .field("bls", &mask(&self.bls))
            .field("bea", &mask(&self.bea))
            .finish()
    }
}

pub fn census_url(year: u16) -> String {
    format!("{CENSUS_BASE_URL}/{year}/acs/acs5")
}

#[derive(Debug, Clone)]
pub struct Config {
    pub keys: ApiKeys,
    /// Survey years fetched for every census pull.
    pub census_years: Vec<u16>,
    /// States walked by the all-states pull.
    pub state_fips: Vec<&'static str>,
    /// Per-request timeout. There is no overall run deadline.
    pub timeout: Duration,
    /// Directory output files are written to.
    pub out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keys: ApiKeys::default(),
            census_years: CENSUS_YEARS.to_vec(),
            state_fips: ALL_STATE_FIPS.to_vec(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            out_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Build the run configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut config = Self {
            keys: ApiKeys::from_env(),
            ..Self::default()
        };

        if let Some(raw) = non_empty_env(TIMEOUT_ENV) {
            config.timeout = parse_timeout_secs(&raw)?;
        }

        Ok(config)
    }
}

/// Parse a positive whole number of seconds.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AppError::config(format!(
            "Invalid timeout '{raw}': expected a positive number of seconds."
        ))),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
