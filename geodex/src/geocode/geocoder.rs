//! Forward and reverse geocoding over shapefile records.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::geometry::Point;
use crate::shapefile::{ShapeRecord, ShapefileReader};
use crate::spatial::RTree;

use super::parser::{AddressParser, ParsedAddress};
use super::similarity::jaro_winkler_similarity;
use super::GeocodeError;

/// Attribute field addresses are read from unless the caller overrides it.
pub const DEFAULT_ADDRESS_FIELD: &str = "ADDRESS";

/// Candidates scoring at or below this confidence are discarded.
const CONFIDENCE_THRESHOLD: f64 = 0.3;
/// Scores above this count as exact matches.
const EXACT_THRESHOLD: f64 = 0.9;
/// Default reverse-geocoding search radius, in coordinate units.
pub(crate) const DEFAULT_REVERSE_MAX_DISTANCE: f64 = 100.0;

/// GADM-style administrative name fields, used when the address field is
/// absent: country, state/province, county/city.
const GADM_COUNTRY_FIELD: &str = "NAME_0";
const GADM_STATE_FIELD: &str = "NAME_1";
const GADM_CITY_FIELD: &str = "NAME_2";

/// How a geocode result was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Confidence above 0.9 on a forward match.
    Exact,
    /// Forward match below the exact threshold.
    Fuzzy,
    /// Produced by reverse geocoding.
    Reverse,
    /// No match.
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::Reverse => "reverse",
            MatchType::None => "",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a geocoding query.
///
/// An unmatched query is represented by the empty result: confidence 0.0
/// and [`MatchType::None`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub coordinate: Point,
    pub matched_address: ParsedAddress,
    pub confidence: f64,
    pub match_type: MatchType,
}

impl GeocodeResult {
    /// The empty, no-match result.
    pub fn empty() -> Self {
        Self {
            coordinate: Point::default(),
            matched_address: ParsedAddress::default(),
            confidence: 0.0,
            match_type: MatchType::None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.match_type != MatchType::None
    }
}

impl Default for GeocodeResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Address-to-coordinate resolver over one loaded shapefile.
#[derive(Debug)]
pub struct Geocoder {
    records: Vec<ShapeRecord>,
    parser: AddressParser,
    address_field: String,
    street_index: HashMap<String, Vec<usize>>,
    city_index: HashMap<String, Vec<usize>>,
    zip_index: HashMap<String, Vec<usize>>,
    rtree: RTree,
}

impl Geocoder {
    /// Load address data from a shapefile, reading addresses from the
    /// default `ADDRESS` field.
    pub fn load<P: AsRef<Path>>(base: P) -> Result<Self, GeocodeError> {
        Self::load_with_field(base, DEFAULT_ADDRESS_FIELD)
    }

    /// Load address data, reading addresses from a caller-chosen field.
    pub fn load_with_field<P: AsRef<Path>>(
        base: P,
        address_field: &str,
    ) -> Result<Self, GeocodeError> {
        let mut reader = ShapefileReader::open(base)?;
        let records = reader.read_all_records();
        if records.is_empty() {
            return Err(GeocodeError::NoRecords);
        }
        Ok(Self::from_records(records, address_field))
    }

    /// Build a geocoder over records the caller already has.
    pub fn from_records(records: Vec<ShapeRecord>, address_field: &str) -> Self {
        let mut geocoder = Self {
            records,
            parser: AddressParser::new(),
            address_field: address_field.to_string(),
            street_index: HashMap::new(),
            city_index: HashMap::new(),
            zip_index: HashMap::new(),
            rtree: RTree::new(),
        };
        geocoder.build_index();
        geocoder
    }

    /// Populate the inverted indexes and the R-tree in one pass.
    fn build_index(&mut self) {
        for (i, record) in self.records.iter().enumerate() {
            let parsed = record_address(&self.parser, record, &self.address_field);

            if !parsed.street_name.is_empty() {
                let key = self.parser.normalize(&parsed.street_name);
                self.street_index.entry(key).or_default().push(i);
            }
            if !parsed.city.is_empty() {
                let key = self.parser.normalize(&parsed.city);
                self.city_index.entry(key).or_default().push(i);
            }
            if !parsed.zip_code.is_empty() {
                self.zip_index.entry(parsed.zip_code).or_default().push(i);
            }

            let bounds = record.bounds();
            if !bounds.is_empty() {
                self.rtree.insert(bounds, i);
            }
        }

        tracing::info!(
            records = self.records.len(),
            streets = self.street_index.len(),
            cities = self.city_index.len(),
            zips = self.zip_index.len(),
            "built geocoding indexes"
        );
    }

    /// Resolve a free-text address to a coordinate.
    ///
    /// Candidates come from the street index; each is re-scored against the
    /// input and the best one above the confidence threshold wins. Returns
    /// the empty result when nothing qualifies.
    pub fn geocode(&self, address: &str) -> GeocodeResult {
        let parsed = self.parser.parse(address);
        if !parsed.is_valid() {
            return GeocodeResult::empty();
        }

        let mut candidates = self.find_candidates(&parsed);
        if candidates.is_empty() {
            return GeocodeResult::empty();
        }

        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates.swap_remove(0)
    }

    /// Geocode a batch of addresses, one result per input.
    pub fn geocode_batch<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<GeocodeResult> {
        addresses
            .iter()
            .map(|address| self.geocode(address.as_ref()))
            .collect()
    }

    fn find_candidates(&self, parsed: &ParsedAddress) -> Vec<GeocodeResult> {
        let street_key = self.parser.normalize(&parsed.street_name);
        let mut indices = match self.street_index.get(&street_key) {
            Some(indices) => indices.clone(),
            None => return Vec::new(),
        };
        indices.sort_unstable();
        indices.dedup();

        let mut candidates = Vec::new();
        for idx in indices {
            let record = &self.records[idx];
            let bounds = record.bounds();
            if bounds.is_empty() {
                continue;
            }

            let candidate = record_address(&self.parser, record, &self.address_field);
            let confidence = self.confidence(parsed, &candidate);
            if confidence > CONFIDENCE_THRESHOLD {
                candidates.push(GeocodeResult {
                    coordinate: bounds.center(),
                    matched_address: candidate,
                    confidence,
                    match_type: if confidence > EXACT_THRESHOLD {
                        MatchType::Exact
                    } else {
                        MatchType::Fuzzy
                    },
                });
            }
        }
        candidates
    }

    /// Weighted component agreement between the query and a candidate.
    ///
    /// Street name similarity weighs 0.4, house number equality 0.3, city
    /// similarity 0.2 and zip equality 0.1; components absent on either
    /// side contribute nothing, so the total stays in [0, 1].
    fn confidence(&self, input: &ParsedAddress, candidate: &ParsedAddress) -> f64 {
        let mut score = 0.0;

        if !input.street_name.is_empty() && !candidate.street_name.is_empty() {
            score += 0.4
                * jaro_winkler_similarity(
                    &self.parser.normalize(&input.street_name),
                    &self.parser.normalize(&candidate.street_name),
                );
        }
        if !input.house_number.is_empty()
            && !candidate.house_number.is_empty()
            && input.house_number == candidate.house_number
        {
            score += 0.3;
        }
        if !input.city.is_empty() && !candidate.city.is_empty() {
            score += 0.2
                * jaro_winkler_similarity(
                    &self.parser.normalize(&input.city),
                    &self.parser.normalize(&candidate.city),
                );
        }
        if !input.zip_code.is_empty()
            && !candidate.zip_code.is_empty()
            && input.zip_code == candidate.zip_code
        {
            score += 0.1;
        }
        score
    }

    /// Find the address nearest a coordinate.
    ///
    /// A record whose polygon contains the point wins outright with full
    /// confidence. Failing that, the record with the closest geometry
    /// centroid within `max_distance` wins with confidence falling off
    /// linearly in the distance. The empty result means nothing qualified.
    pub fn reverse_geocode(&self, point: Point, max_distance: f64) -> GeocodeResult {
        if let Some(idx) = crate::spatial::find_containing_polygon(&self.rtree, &self.records, point)
        {
            let record = &self.records[idx];
            return GeocodeResult {
                coordinate: record.bounds().center(),
                matched_address: record_address(&self.parser, record, &self.address_field),
                confidence: 1.0,
                match_type: MatchType::Reverse,
            };
        }

        if max_distance <= 0.0 || max_distance.is_nan() {
            return GeocodeResult::empty();
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, record) in self.records.iter().enumerate() {
            let bounds = record.bounds();
            if bounds.is_empty() {
                continue;
            }
            let distance = point.distance_to(bounds.center());
            if distance <= max_distance && best.map_or(true, |(_, d)| distance < d) {
                best = Some((idx, distance));
            }
        }

        match best {
            Some((idx, distance)) => {
                let record = &self.records[idx];
                GeocodeResult {
                    coordinate: record.bounds().center(),
                    matched_address: record_address(&self.parser, record, &self.address_field),
                    confidence: 1.0 - distance / max_distance,
                    match_type: MatchType::Reverse,
                }
            }
            None => GeocodeResult::empty(),
        }
    }

    /// Reverse geocode with the default search radius.
    pub fn reverse_geocode_default(&self, point: Point) -> GeocodeResult {
        self.reverse_geocode(point, DEFAULT_REVERSE_MAX_DISTANCE)
    }

    /// The loaded records, in load order (the indexing order).
    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index size summary.
    pub fn stats(&self) -> GeocoderStats {
        GeocoderStats {
            record_count: self.records.len(),
            street_entries: self.street_index.len(),
            city_entries: self.city_index.len(),
            zip_entries: self.zip_index.len(),
        }
    }
}

/// Extract a record's address as parsed components.
///
/// Prefers the configured address field. Records without it (typically
/// administrative-boundary datasets like GADM) synthesize components from
/// the `NAME_0` / `NAME_1` / `NAME_2` attribute hierarchy instead.
fn record_address(parser: &AddressParser, record: &ShapeRecord, field: &str) -> ParsedAddress {
    if let Some(text) = record.text_attribute(field) {
        if !text.trim().is_empty() {
            return parser.parse(text);
        }
    }

    let country = record.text_attribute(GADM_COUNTRY_FIELD).unwrap_or("");
    let state = record.text_attribute(GADM_STATE_FIELD).unwrap_or("");
    let city = record.text_attribute(GADM_CITY_FIELD).unwrap_or("");

    let full_address = [city, state, country]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    ParsedAddress {
        city: city.to_string(),
        state: state.to_string(),
        country: country.to_string(),
        full_address,
        ..Default::default()
    }
}

/// Printable geocoder statistics.
#[derive(Debug, Clone, Copy)]
pub struct GeocoderStats {
    pub record_count: usize,
    pub street_entries: usize,
    pub city_entries: usize,
    pub zip_entries: usize,
}

impl fmt::Display for GeocoderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Geocoder Statistics:")?;
        writeln!(f, "  Total Records: {}", self.record_count)?;
        writeln!(f, "  Street Index Entries: {}", self.street_entries)?;
        writeln!(f, "  City Index Entries: {}", self.city_entries)?;
        writeln!(f, "  Zip Index Entries: {}", self.zip_entries)?;
        Ok(())
    }
}
