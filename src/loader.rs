// Raw record sources.
//
// The only shipped source is the hardcoded "dummy" CSV batch; anything
// unrecognized yields an empty batch rather than an error, so callers can
// treat source selection as data, not control flow.
use csv::ReaderBuilder;
use tracing::{error, info, warn};

use crate::types::RawRecord;

/// Sample batch served by the "dummy" source.
const DUMMY_CSV: &str = "id,name,value\n1,Apple,10\n2,Banana,20\n3,Cherry,30\n4,Date Fruit,40";

/// Load raw records for a named source.
pub fn load(source: &str) -> Vec<RawRecord> {
    info!(source, "loading data");
    match source {
        "dummy" => load_dummy_data(),
        _ => {
            warn!(source, "source not implemented, returning empty list");
            Vec::new()
        }
    }
}

fn load_dummy_data() -> Vec<RawRecord> {
    let mut rdr = ReaderBuilder::new().from_reader(DUMMY_CSV.as_bytes());
    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            error!(%err, "failed to read dummy data header");
            return Vec::new();
        }
    };

    let mut rows: Vec<RawRecord> = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(record) => rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            ),
            Err(err) => error!(%err, "failed to read dummy data row"),
        }
    }
    info!("successfully loaded {} records", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_source_yields_the_sample_batch() {
        let rows = load("dummy");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].get("id").map(String::as_str), Some("1"));
        assert_eq!(rows[0].get("name").map(String::as_str), Some("Apple"));
        assert_eq!(rows[0].get("value").map(String::as_str), Some("10"));
        assert_eq!(rows[3].get("name").map(String::as_str), Some("Date Fruit"));
    }

    #[test]
    fn unknown_sources_yield_an_empty_batch() {
        assert!(load("warehouse").is_empty());
    }
}
