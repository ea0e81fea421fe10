use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid region name: {0:?}")]
    InvalidRegionName(String),
    #[error("province {province:?} requested without a country")]
    ProvinceWithoutCountry { province: String },
    #[error("country {country:?} requested without a continent")]
    CountryWithoutContinent { country: String },
    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("invalid bounds [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
