use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use serde_with::{serde_as, TimestampSeconds};

#[derive(Deserialize, Debug, Clone)]
struct WeatherCondition {
    #[serde(default)]
    description: Option<String>,
}

/// The fields of a sample the proxy itself looks at
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
struct SampleFields {
    #[serde_as(as = "TimestampSeconds<i64>")]
    dt: DateTime<Utc>,
    #[serde(default)]
    dt_txt: Option<String>,
    #[serde(default)]
    main: Map<String, Value>,
    #[serde(default)]
    weather: Vec<WeatherCondition>,
}

/// One 3 hour sample of the forecast.
/// The upstream text of the sample is kept and serialized back byte for byte.
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    fields: SampleFields,
    raw: Box<RawValue>,
}

impl ForecastEntry {
    pub fn dt(&self) -> DateTime<Utc> {
        self.fields.dt
    }

    /// Wall clock time of the sample at the given offset
    pub fn wall_clock(&self, offset: &FixedOffset) -> NaiveDateTime {
        self.fields.dt.with_timezone(offset).naive_local()
    }

    pub fn dt_txt(&self) -> Option<&str> {
        self.fields.dt_txt.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.weather.first().and_then(|w| w.description.as_deref())
    }

    /// A value out of the sample's main block, e.g. temp, feels_like or humidity
    pub fn measurement(&self, key: &str) -> Option<&Value> {
        self.fields.main.get(key)
    }
}

impl<'de> Deserialize<'de> for ForecastEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let fields = serde_json::from_str(raw.get()).map_err(de::Error::custom)?;

        Ok(Self { fields, raw })
    }
}

impl Serialize for ForecastEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[derive(Deserialize, Debug)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub timezone: i32,
}

/// Raw forecast document. The same shape is used for failures where only cod and message are set.
#[derive(Deserialize, Debug)]
pub struct FullForecast {
    pub cod: Value,
    #[serde(default)]
    pub message: Value,
    pub list: Option<Vec<ForecastEntry>>,
    pub city: Option<City>,
}

/// Decoded forecast series for one city
#[derive(Debug)]
pub struct ForecastSeries {
    pub city: String,
    pub utc_offset: FixedOffset,
    pub list: Vec<ForecastEntry>,
}

/// The forecast chosen for a date together with the resolved city name
#[derive(Serialize, Debug)]
pub struct DatedForecast {
    pub forecast: ForecastEntry,
    pub city: String,
}
