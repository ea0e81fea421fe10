//! Aggregation scopes over the region hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::RegionName;
use crate::records::DailyRecord;

/// The slice of the region hierarchy a time series is aggregated over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Scope {
    Global,
    Continent {
        continent: RegionName,
    },
    Country {
        continent: RegionName,
        country: RegionName,
    },
    Province {
        continent: RegionName,
        country: RegionName,
        province: RegionName,
    },
}

impl Scope {
    /// Builds a scope from optional query parameters.
    ///
    /// Blank strings count as absent. A level may only be given when every
    /// level above it is given too; skipping a level is rejected instead of
    /// being reinterpreted as a wider scope.
    pub fn from_query(
        continent: Option<&str>,
        country: Option<&str>,
        province: Option<&str>,
    ) -> Result<Self> {
        let continent = non_blank(continent);
        let country = non_blank(country);
        let province = non_blank(province);

        match (continent, country, province) {
            (None, None, None) => Ok(Self::Global),
            (Some(continent), None, None) => Ok(Self::Continent {
                continent: RegionName::new(continent)?,
            }),
            (Some(continent), Some(country), None) => Ok(Self::Country {
                continent: RegionName::new(continent)?,
                country: RegionName::new(country)?,
            }),
            (Some(continent), Some(country), Some(province)) => Ok(Self::Province {
                continent: RegionName::new(continent)?,
                country: RegionName::new(country)?,
                province: RegionName::new(province)?,
            }),
            (_, None, Some(province)) => Err(ModelError::ProvinceWithoutCountry {
                province: province.to_string(),
            }),
            (None, Some(country), _) => Err(ModelError::CountryWithoutContinent {
                country: country.to_string(),
            }),
        }
    }

    /// Returns true if the daily row falls inside this scope.
    pub fn contains(&self, row: &DailyRecord) -> bool {
        match self {
            Self::Global => true,
            Self::Continent { continent } => continent.matches(&row.region),
            Self::Country { continent, country } => {
                continent.matches(&row.region) && country.matches(&row.country)
            }
            Self::Province {
                continent,
                country,
                province,
            } => {
                continent.matches(&row.region)
                    && country.matches(&row.country)
                    && row
                        .province
                        .as_deref()
                        .is_some_and(|value| province.matches(value))
            }
        }
    }

    /// The country this scope is pinned to, if any.
    pub fn country(&self) -> Option<&RegionName> {
        match self {
            Self::Country { country, .. } | Self::Province { country, .. } => Some(country),
            Self::Global | Self::Continent { .. } => None,
        }
    }

    /// The same scope pinned to `country` instead. Global and continent
    /// scopes come back unchanged.
    #[must_use]
    pub fn with_country(&self, country: RegionName) -> Self {
        match self {
            Self::Global | Self::Continent { .. } => self.clone(),
            Self::Country { continent, .. } => Self::Country {
                continent: continent.clone(),
                country,
            },
            Self::Province {
                continent,
                province,
                ..
            } => Self::Province {
                continent: continent.clone(),
                country,
                province: province.clone(),
            },
        }
    }

    /// Short label used in logs and table headers.
    pub fn label(&self) -> String {
        match self {
            Self::Global => "global".to_string(),
            Self::Continent { continent } => continent.to_string(),
            Self::Country { country, .. } => country.to_string(),
            Self::Province {
                country, province, ..
            } => format!("{province}, {country}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
