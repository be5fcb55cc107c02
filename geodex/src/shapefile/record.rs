//! The record model: one geometry paired with its attribute row.

use std::collections::HashMap;

use crate::geometry::{BoundingBox, Geometry};

use super::dbf::FieldValue;

/// A shapefile record: geometry plus the matching `.dbf` attribute row.
///
/// `record_number` is the 1-based number stored in the `.shp` record
/// header; the 0-based index used for lookups and spatial payloads is the
/// record's position in whatever vector the caller keeps. Records own
/// their geometry and attributes exclusively and are move-only.
#[derive(Debug)]
pub struct ShapeRecord {
    pub record_number: i32,
    pub geometry: Geometry,
    pub attributes: HashMap<String, FieldValue>,
}

impl ShapeRecord {
    /// Bounding box of this record's geometry.
    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    /// Look up an attribute by field name.
    pub fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name)
    }

    /// Look up a textual attribute, returning `None` for non-text values.
    pub fn text_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(FieldValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_attribute_lookup() {
        let mut attributes = HashMap::new();
        attributes.insert("NAME".to_string(), FieldValue::Text("Springfield".into()));
        attributes.insert("POP".to_string(), FieldValue::Number(30720.0));

        let record = ShapeRecord {
            record_number: 1,
            geometry: Geometry::Point(Point::new(1.0, 2.0)),
            attributes,
        };

        assert_eq!(record.text_attribute("NAME"), Some("Springfield"));
        assert_eq!(record.text_attribute("POP"), None);
        assert!(record.attribute("MISSING").is_none());
        assert!(!record.bounds().is_empty());
    }
}
