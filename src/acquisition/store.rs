//! Append-only in-memory history of the current run

use parking_lot::RwLock;

use crate::sensors::{Reading, SensorKind};

/// The sole owner of historical readings
///
/// The collector is the only writer; aggregation and export work from
/// `snapshot` copies so no lock is held across a long computation.
#[derive(Debug, Default)]
pub struct ReadingStore {
    readings: RwLock<Vec<Reading>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, reading: Reading) {
        self.readings.write().push(reading);
    }

    /// Copy of the full history in arrival order.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.readings.read().clone()
    }

    pub fn len(&self) -> usize {
        self.readings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.read().is_empty()
    }

    pub fn count_for(&self, kind: SensorKind) -> usize {
        self.readings.read().iter().filter(|r| r.kind == kind).count()
    }

    /// Discard the history; called exactly when a new run starts.
    pub fn clear(&self) {
        self.readings.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SampleValue;

    #[test]
    fn append_and_snapshot_preserve_order() {
        let store = ReadingStore::new();
        for v in [1.0, 2.0, 3.0] {
            store.append(Reading::valid(SensorKind::Force, SampleValue::Scalar(v)));
        }
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].metric(crate::sensors::Metric::Force), Some(1.0));
        assert_eq!(snapshot[2].metric(crate::sensors::Metric::Force), Some(3.0));
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let store = ReadingStore::new();
        store.append(Reading::valid(SensorKind::Force, SampleValue::Scalar(1.0)));
        let snapshot = store.snapshot();
        store.append(Reading::valid(SensorKind::Force, SampleValue::Scalar(2.0)));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = ReadingStore::new();
        store.append(Reading::invalid(SensorKind::Temperature));
        assert_eq!(store.count_for(SensorKind::Temperature), 1);
        store.clear();
        assert!(store.is_empty());
    }
}
