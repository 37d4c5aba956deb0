//! Provider loading toilet facilities from a GeoJSON `FeatureCollection`.
//!
//! The collection may live in a local file or behind an HTTP URL. Each feature
//! describes one facility through its properties; see [`parse_facilities`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use toiletkaart_core::{
    hours::{DayHours, HoursError, OpeningHours, WEEK, parse_day},
    model::{Facility, FacilityId, Location, MunicipalityMeta, Ownership},
    plugin::DatasetPlugin,
    ports::{FacilityPort, PortError},
};

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Local GeoJSON file.
    File(PathBuf),
    /// GeoJSON served over HTTP(S).
    Url(String),
}

impl DatasetSource {
    /// Interpret a command-line location: `http://` and `https://` are URLs,
    /// anything else is a file path.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(formatter, "{}", path.display()),
            Self::Url(url) => write!(formatter, "{url}"),
        }
    }
}

/// Top-level GeoJSON document.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

/// Single GeoJSON feature.
#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Properties the engine understands; everything else stays in the raw table.
#[derive(Debug, Deserialize)]
struct ToiletProperties {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    open_from: Option<String>,
    #[serde(default)]
    open_until: Option<String>,
    #[serde(default, alias = "opening_hours")]
    openinghours: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "flag")]
    urinal_only: bool,
    #[serde(default, deserialize_with = "flag")]
    fee: bool,
    #[serde(default, deserialize_with = "flag")]
    wheelchair: bool,
    #[serde(default, deserialize_with = "flag")]
    wheelchair_plus: bool,
    #[serde(default)]
    ownership: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Text(String),
}

/// Accept `true`/`false`, `"yes"`/`"no"` and null (= `false`).
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Option::<RawFlag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(RawFlag::Bool(value)) => Ok(value),
        Some(RawFlag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" | "" => Ok(false),
            other => Err(D::Error::custom(format!("expected yes/no, got {other:?}"))),
        },
    }
}

/// Facility loader for a GeoJSON dataset.
pub struct GeoJsonFacilityPort {
    client: Client,
    meta: MunicipalityMeta,
    source: DatasetSource,
}

impl GeoJsonFacilityPort {
    /// Create a port reading `source`, using `client` for URLs.
    #[must_use]
    pub fn new(client: Client, meta: MunicipalityMeta, source: DatasetSource) -> Self {
        Self {
            client,
            meta,
            source,
        }
    }

    async fn fetch_collection(&self) -> Result<FeatureCollection, PortError> {
        match &self.source {
            DatasetSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                decode_collection(&text)
            }
            DatasetSource::Url(url) => {
                let text = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(PortError::from)?
                    .error_for_status()
                    .map_err(PortError::from)?
                    .text()
                    .await
                    .map_err(PortError::from)?;
                decode_collection(&text)
            }
        }
    }
}

#[async_trait]
impl FacilityPort for GeoJsonFacilityPort {
    fn municipality(&self) -> &MunicipalityMeta {
        &self.meta
    }

    async fn load(&self) -> Result<Vec<Facility>, PortError> {
        debug!(source = %self.source, "loading dataset");
        let collection = self.fetch_collection().await?;
        let facilities = facilities_from_collection(collection)?;
        info!(
            source = %self.source,
            count = facilities.len(),
            "decoded feature collection"
        );
        Ok(facilities)
    }
}

/// Build the plugin bundle for a GeoJSON dataset.
#[must_use]
pub fn plugin(client: Client, meta: MunicipalityMeta, source: DatasetSource) -> DatasetPlugin {
    let facility_port = Arc::new(GeoJsonFacilityPort::new(client, meta.clone(), source));
    DatasetPlugin {
        meta,
        facility_port,
    }
}

/// Decode facilities from GeoJSON text.
///
/// Understood properties: `id`, `name`, either `open_from` + `open_until` or an
/// `openinghours` object keyed `mon`..`sun`, the flags `urinal_only`, `fee`,
/// `wheelchair` and `wheelchair_plus` (missing means `false`), and
/// `ownership` (missing means public).
///
/// # Errors
///
/// Returns [`PortError::Decode`] for invalid JSON or a non-collection document,
/// [`PortError::Hours`] for unparseable hours and [`PortError::InvalidFeature`]
/// for features lacking hours or carrying unknown values.
pub fn parse_facilities(text: &str) -> Result<Vec<Facility>, PortError> {
    facilities_from_collection(decode_collection(text)?)
}

fn decode_collection(text: &str) -> Result<FeatureCollection, PortError> {
    serde_json::from_str(text).map_err(|err| PortError::Decode(err.to_string()))
}

fn facilities_from_collection(collection: FeatureCollection) -> Result<Vec<Facility>, PortError> {
    if collection.kind != "FeatureCollection" {
        return Err(PortError::Decode(format!(
            "expected a FeatureCollection, got {:?}",
            collection.kind
        )));
    }
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| facility_from_feature(index, feature))
        .collect()
}

fn facility_from_feature(index: usize, feature: Feature) -> Result<Facility, PortError> {
    let raw = feature.properties.unwrap_or_default();
    let props: ToiletProperties = serde_json::from_value(Value::Object(raw.clone())).map_err(
        |err| PortError::InvalidFeature {
            feature: format!("#{index}"),
            reason: err.to_string(),
        },
    )?;

    let id = feature
        .id
        .as_ref()
        .or(props.id.as_ref())
        .map_or_else(|| format!("feature-{index}"), value_text);
    let label = format!("{id} (#{index})");

    let opening_hours = opening_hours(&label, &props)?;

    let ownership = match props.ownership.as_deref() {
        None => Ownership::Public,
        Some(text) => text
            .parse()
            .map_err(|reason| PortError::InvalidFeature {
                feature: label.clone(),
                reason,
            })?,
    };

    let location = feature.geometry.as_ref().and_then(point_location);
    if location.is_none() {
        warn!(feature = %label, "feature has no point geometry");
    }

    let properties = raw
        .iter()
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect::<BTreeMap<_, _>>();

    Ok(Facility {
        id: FacilityId(id),
        name: props.name,
        location,
        opening_hours,
        urinal_only: props.urinal_only,
        fee: props.fee,
        wheelchair: props.wheelchair,
        wheelchair_plus: props.wheelchair_plus,
        ownership,
        properties,
    })
}

fn opening_hours(label: &str, props: &ToiletProperties) -> Result<OpeningHours, PortError> {
    let hours_error = |source: HoursError| PortError::Hours {
        feature: label.to_owned(),
        source,
    };

    if let Some(days) = &props.openinghours {
        let weekly = days
            .iter()
            .map(|(token, range)| -> Result<_, HoursError> {
                let day = parse_day(token)?;
                let hours = range.parse::<DayHours>()?;
                Ok((day, hours))
            })
            .collect::<Result<HashMap<_, _>, HoursError>>()
            .map_err(hours_error)?;
        if let Some(missing) = WEEK.into_iter().find(|day| !weekly.contains_key(day)) {
            return Err(hours_error(HoursError::MissingDay(missing)));
        }
        return Ok(OpeningHours::Weekly(weekly));
    }

    match (props.open_from.as_deref(), props.open_until.as_deref()) {
        (Some(from), Some(until)) => {
            let from = from.parse().map_err(hours_error)?;
            let until = until.parse().map_err(hours_error)?;
            Ok(OpeningHours::Daily(DayHours::from_bounds(from, until)))
        }
        (None, None) => Err(PortError::InvalidFeature {
            feature: label.to_owned(),
            reason: "no opening hours".to_owned(),
        }),
        _ => Err(PortError::InvalidFeature {
            feature: label.to_owned(),
            reason: "open_from and open_until must be given together".to_owned(),
        }),
    }
}

fn point_location(geometry: &Geometry) -> Option<Location> {
    if geometry.kind != "Point" {
        return None;
    }
    let coordinates = geometry.coordinates.as_array()?;
    Some(Location {
        lon: coordinates.first()?.as_f64()?,
        lat: coordinates.get(1)?.as_f64()?,
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use chrono::Weekday;
    use toiletkaart_core::hours::{Moment, TimeOfDay};

    use super::*;

    const DAILY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [6.5669, 53.2187] },
                "properties": {
                    "id": 7,
                    "name": "Vismarkt",
                    "open_from": "23:00",
                    "open_until": "05:00",
                    "urinal_only": true,
                    "fee": false,
                    "wheelchair": "no"
                }
            }
        ]
    }"#;

    const WEEKLY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "grote-markt",
                "geometry": null,
                "properties": {
                    "openinghours": {
                        "mon": "08:00 - 20:00",
                        "tue": "08:00 - 20:00",
                        "wed": "08:00 - 20:00",
                        "thu": "08:00 - 20:00",
                        "fri": "22:00 - 02:00",
                        "sat": "10:00 - 18:00",
                        "sun": "00:00 - 00:00"
                    },
                    "wheelchair": "yes",
                    "wheelchair_plus": true,
                    "ownership": "municipal"
                }
            }
        ]
    }"#;

    fn time(text: &str) -> TimeOfDay {
        text.parse().expect("valid time")
    }

    fn single(text: &str) -> Facility {
        let mut facilities = parse_facilities(text).expect("valid dataset");
        assert_eq!(facilities.len(), 1, "expected one facility");
        facilities.remove(0)
    }

    #[test]
    fn decodes_daily_pair() {
        let toilet = single(DAILY);

        assert_eq!(toilet.id, FacilityId("7".to_owned()));
        assert_eq!(toilet.name.as_deref(), Some("Vismarkt"));
        assert!(toilet.urinal_only);
        assert!(!toilet.fee);
        assert!(!toilet.wheelchair);
        assert!(!toilet.wheelchair_plus);
        assert_eq!(toilet.ownership, Ownership::Public);
        assert_eq!(
            toilet.location,
            Some(Location {
                lon: 6.5669,
                lat: 53.2187
            })
        );
        assert_eq!(
            toilet.opening_hours.is_open_at(Moment::new(Weekday::Thu, time("01:00"))),
            Ok(true)
        );
        assert_eq!(toilet.properties.get("wheelchair").map(String::as_str), Some("no"));
        assert_eq!(toilet.properties.get("urinal_only").map(String::as_str), Some("true"));
    }

    #[test]
    fn decodes_weekly_map() {
        let toilet = single(WEEKLY);

        assert_eq!(toilet.id, FacilityId("grote-markt".to_owned()));
        assert_eq!(toilet.location, None);
        assert!(toilet.wheelchair);
        assert!(toilet.wheelchair_plus);
        assert_eq!(toilet.ownership, Ownership::Municipal);
        assert_eq!(toilet.opening_hours.hours_on(Weekday::Sun), Ok(DayHours::Closed));
        assert_eq!(
            toilet.opening_hours.is_open_at(Moment::new(Weekday::Fri, time("01:30"))),
            Ok(true)
        );
        assert_eq!(
            toilet.opening_hours.is_open_at(Moment::new(Weekday::Mon, time("20:01"))),
            Ok(false)
        );
    }

    #[test]
    fn malformed_hours_fail_fast() {
        let text = DAILY.replace("\"05:00\"", "\"5 o'clock\"");
        let err = parse_facilities(&text).expect_err("bad hours");
        assert!(
            matches!(
                err,
                PortError::Hours {
                    source: HoursError::MalformedTime(_),
                    ..
                }
            ),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn unknown_day_key_is_rejected() {
        let text = WEEKLY.replace("\"sat\"", "\"saturday\"");
        let err = parse_facilities(&text).expect_err("bad day key");
        assert!(
            matches!(
                err,
                PortError::Hours {
                    source: HoursError::UnknownDay(_),
                    ..
                }
            ),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn feature_without_hours_is_invalid() {
        let text = DAILY
            .replace("\"open_from\": \"23:00\",", "")
            .replace("\"open_until\": \"05:00\",", "");
        let err = parse_facilities(&text).expect_err("no hours");
        assert!(matches!(err, PortError::InvalidFeature { .. }), "unexpected error {err:?}");
    }

    #[test]
    fn half_a_daily_pair_is_invalid() {
        let text = DAILY.replace("\"open_until\": \"05:00\",", "");
        let err = parse_facilities(&text).expect_err("missing until");
        assert!(matches!(err, PortError::InvalidFeature { .. }), "unexpected error {err:?}");
    }

    #[test]
    fn unknown_ownership_is_invalid() {
        let text = WEEKLY.replace("\"municipal\"", "\"royal\"");
        let err = parse_facilities(&text).expect_err("bad ownership");
        assert!(matches!(err, PortError::InvalidFeature { .. }), "unexpected error {err:?}");
    }

    #[test]
    fn bad_flag_text_is_invalid() {
        let text = DAILY.replace("\"wheelchair\": \"no\"", "\"wheelchair\": \"maybe\"");
        let err = parse_facilities(&text).expect_err("bad flag");
        assert!(matches!(err, PortError::InvalidFeature { .. }), "unexpected error {err:?}");
    }

    #[test]
    fn rejects_non_collections() {
        let err = parse_facilities(r#"{"type": "Feature"}"#).expect_err("not a collection");
        assert!(matches!(err, PortError::Decode(_)), "unexpected error {err:?}");

        let err = parse_facilities("not json").expect_err("not json");
        assert!(matches!(err, PortError::Decode(_)), "unexpected error {err:?}");
    }

    #[test]
    fn source_from_location() {
        assert_eq!(
            DatasetSource::from_location("https://example.org/toilets.json"),
            DatasetSource::Url("https://example.org/toilets.json".to_owned())
        );
        assert_eq!(
            DatasetSource::from_location("data/toilets.json"),
            DatasetSource::File(PathBuf::from("data/toilets.json"))
        );
    }

    #[tokio::test]
    async fn port_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(WEEKLY.as_bytes()).expect("write dataset");

        let meta = MunicipalityMeta {
            id: toiletkaart_core::model::MunicipalityId("groningen".to_owned()),
            name: "Groningen".to_owned(),
        };
        let bundle = plugin(
            Client::new(),
            meta,
            DatasetSource::File(file.path().to_path_buf()),
        );

        assert_eq!(bundle.facility_port.municipality().name, "Groningen");
        let facilities = bundle.facility_port.load().await.expect("dataset loads");
        assert_eq!(facilities.len(), 1);
    }

    #[tokio::test]
    async fn port_reports_missing_file() {
        let meta = MunicipalityMeta {
            id: toiletkaart_core::model::MunicipalityId("nowhere".to_owned()),
            name: "Nowhere".to_owned(),
        };
        let port = GeoJsonFacilityPort::new(
            Client::new(),
            meta,
            DatasetSource::File(PathBuf::from("/definitely/not/here.json")),
        );

        let err = port.load().await.expect_err("missing file");
        assert!(matches!(err, PortError::Io(_)), "unexpected error {err:?}");
    }

    #[test]
    fn weekly_map_must_cover_every_day() {
        let text = WEEKLY.replace(",\n                        \"sun\": \"00:00 - 00:00\"", "");
        assert!(!text.contains("\"sun\""), "fixture still has a sunday entry");

        let err = parse_facilities(&text).expect_err("no sunday hours");
        assert!(
            matches!(
                err,
                PortError::Hours {
                    source: HoursError::MissingDay(Weekday::Sun),
                    ..
                }
            ),
            "unexpected error {err:?}"
        );
    }

    /// Serve one HTTP response with `body` on a local port and return its URL.
    fn serve_once(status: &str, body: &'static str) -> String {
        use std::io::{BufRead as _, BufReader};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let address = listener.local_addr().expect("local address");
        let status = status.to_owned();
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|read| read > 2) {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write response");
        });
        format!("http://{address}/toilets.json")
    }

    fn url_port(url: String) -> GeoJsonFacilityPort {
        let meta = MunicipalityMeta {
            id: toiletkaart_core::model::MunicipalityId("groningen".to_owned()),
            name: "Groningen".to_owned(),
        };
        GeoJsonFacilityPort::new(Client::new(), meta, DatasetSource::Url(url))
    }

    #[tokio::test]
    async fn port_loads_from_url() {
        let port = url_port(serve_once("200 OK", WEEKLY));

        let facilities = port.load().await.expect("dataset loads");
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].id, FacilityId("grote-markt".to_owned()));
    }

    #[tokio::test]
    async fn invalid_json_over_http_is_a_decode_error() {
        let port = url_port(serve_once("200 OK", "not json"));

        let err = port.load().await.expect_err("invalid body");
        assert!(matches!(err, PortError::Decode(_)), "unexpected error {err:?}");
    }

    #[tokio::test]
    async fn http_error_status_is_a_network_error() {
        let port = url_port(serve_once("404 Not Found", ""));

        let err = port.load().await.expect_err("not found");
        assert!(matches!(err, PortError::Network(_)), "unexpected error {err:?}");
    }
}
