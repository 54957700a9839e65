//! The four pull operations and their fixed output names.

use std::fmt;

/// Menu keys accepted by the selector, in display order.
pub const MENU_OPTIONS: [&str; 4] = ["1", "2", "3", "4"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Every incorporated place in every state, filtered and reshaped.
    CensusAllStates,
    /// Every county in one state.
    CensusState { fips: String },
    BlsUnemployment,
    BeaGdpByState,
}

impl Operation {
    /// Map a validated menu key to an operation. `fips` is only used for "2".
    pub fn from_choice(choice: &str, fips: Option<String>) -> Option<Self> {
        match choice {
            "1" => Some(Operation::CensusAllStates),
            "2" => fips.map(|fips| Operation::CensusState { fips }),
            "3" => Some(Operation::BlsUnemployment),
            "4" => Some(Operation::BeaGdpByState),
            _ => None,
        }
    }

    /// Menu line shown by the selector.
    pub fn menu_label(choice: &str) -> Option<&'static str> {
        match choice {
            "1" => Some("Census - All States & Cities"),
            "2" => Some("Census - Single State (by FIPS)"),
            "3" => Some("BLS - National Unemployment"),
            "4" => Some("BEA - GDP by State"),
            _ => None,
        }
    }

    /// Output file name; fixed per operation (and state for the single-state pull).
    pub fn output_file_name(&self) -> String {
        match self {
            Operation::CensusAllStates => "census_all_states_cities.csv".to_string(),
            Operation::CensusState { fips } => format!("census_state_{fips}.csv"),
            Operation::BlsUnemployment => "bls_unemployment_data.csv".to_string(),
            Operation::BeaGdpByState => "bea_gdp_by_state.csv".to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CensusAllStates => write!(f, "census data for all states"),
            Operation::CensusState { fips } => write!(f, "census data for state {fips}"),
            Operation::BlsUnemployment => write!(f, "BLS unemployment data"),
            Operation::BeaGdpByState => write!(f, "BEA GDP by state data"),
        }
    }
}
