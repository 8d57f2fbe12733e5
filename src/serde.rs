#![cfg(feature="serde")]
use super::histogram::{Histogram, Normalization, Row};

use serde::ser::{Serialize, SerializeStruct, Serializer};

struct Rows<'a>(&'a Histogram);

impl Serialize for Rows<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.collect_seq(self.0.rows())
    }
}

impl Serialize for Histogram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        let plan = self.plan();
        let norm = match self.normalization() {
            Normalization::Applied(total) => Some(total),
            _ => None,
        };
        let mut s = serializer.serialize_struct("Histogram", 7)?;
        s.serialize_field("xmin", &plan.range().xmin)?;
        s.serialize_field("xmax", &plan.range().xmax)?;
        s.serialize_field("bin_width", &plan.bin_width())?;
        s.serialize_field("entries", &self.entries())?;
        s.serialize_field("excluded", &self.excluded())?;
        s.serialize_field("normalized_by", &norm)?;
        s.serialize_field("rows", &Rows(self))?;
        s.end()
    }
}

impl Histogram {
    /// Render the histogram, including its rows, as pretty JSON.
    pub fn to_json(&self) -> Result<String, super::Error> {
        serde_json::to_string_pretty(self).map_err(|e| super::Error::Encode(e.to_string()))
    }
}

/// Render bare rows as a JSON array.
pub fn rows_to_json(rows: &[Row]) -> Result<String, super::Error> {
    serde_json::to_string(rows).map_err(|e| super::Error::Encode(e.to_string()))
}
