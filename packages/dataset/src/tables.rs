//! CSV readers for the probability and attribution tables.

use std::io::Read;

use serde::de::DeserializeOwned;

/// Deserializes every row of a headered CSV table.
///
/// Headers and cells are trimmed. Columns the record type does not name
/// are ignored.
///
/// # Errors
///
/// Returns an error if the header row is missing or any row fails to
/// deserialize.
pub fn read_table<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsidence_map_dataset_models::{FactorGroupAttribution, RegionKey};

    #[test]
    fn reads_group_attribution_rows_in_file_order() {
        let data = "법정동,위험요인그룹,shap_value\n\
                    강남구_역삼동,지하 공사,0.30\n\
                    강남구_역삼동,지반,-0.50\n\
                    서초구_서초동,지반, 0.10 \n";

        let rows: Vec<FactorGroupAttribution> = read_table(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].factor_group, "지하 공사");
        assert!((rows[1].shap_value + 0.5).abs() < f64::EPSILON);
        assert_eq!(rows[2].region_key, RegionKey::new("서초구_서초동"));
        assert!((rows[2].shap_value - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let data = "법정동,shap_value\n강남구_역삼동,0.3\n";

        let rows: Result<Vec<FactorGroupAttribution>, _> = read_table(data.as_bytes());

        assert!(rows.is_err());
    }
}
