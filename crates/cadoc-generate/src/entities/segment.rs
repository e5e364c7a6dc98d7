use cadoc_core::{CadocConfig, Period, Segment};

use crate::allocation::AllocationError;
use crate::entities::Generate;

/// The catalog does not vary by period.
impl Generate for Segment {
    fn generate_period(config: &CadocConfig, _period: Period) -> Result<Vec<Self>, AllocationError> {
        Ok(config.segments.iter().map(Segment::from).collect())
    }

    fn generate(config: &CadocConfig) -> Result<Vec<Self>, AllocationError> {
        if config.segments.is_empty() {
            return Err(AllocationError::EmptyTable("segments".to_string()));
        }
        Ok(config.segments.iter().map(Segment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use cadoc_core::Record;

    use super::*;
    use crate::entities::testing::config;

    #[test]
    fn catalog_is_emitted_once() {
        let mut config = config();
        config.years = vec![2024, 2025];
        let segments = Segment::generate(&config).unwrap();
        assert_eq!(segments.len(), 24);
        assert_eq!(segments[0].key(), "401");
        assert_eq!(segments[23].name, "Subadquirentes");
    }
}
