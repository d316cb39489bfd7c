use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Sync lifecycle of a stored entry.
///
/// The only transition is `Pending -> Synced`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Synced { at: i64 },
}

impl SyncState {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncState::Synced { .. })
    }

    pub fn synced_at(&self) -> Option<i64> {
        match self {
            SyncState::Pending => None,
            SyncState::Synced { at } => Some(*at),
        }
    }

    /// Acknowledge the entry. Returns `false` when it was already synced,
    /// in which case the original `syncedAt` is kept.
    pub fn acknowledge(&mut self, at: i64) -> bool {
        match self {
            SyncState::Pending => {
                *self = SyncState::Synced { at };
                true
            }
            SyncState::Synced { .. } => false,
        }
    }

    /// Rebuild the state from the persisted `synced` / `syncedAt` pair.
    pub fn from_parts(synced: bool, synced_at: Option<i64>) -> Self {
        if synced {
            SyncState::Synced {
                at: synced_at.unwrap_or_default(),
            }
        } else {
            SyncState::Pending
        }
    }
}

/// Caller-supplied measurement, before the store stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub dt: String,
    pub odometer: f64,
    pub predicted_range: f64,
    pub soc: Option<f64>,
    pub charged: bool,
    pub notes: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub device_id: String,
}

impl NewEntry {
    /// Check the numeric ranges and normalise coordinates to 6 decimals.
    pub fn validate(mut self) -> AppResult<Self> {
        if !self.odometer.is_finite() || self.odometer < 0.0 {
            return Err(AppError::InvalidEntry(format!(
                "odometer must be a non-negative number (got {})",
                self.odometer
            )));
        }
        if !self.predicted_range.is_finite() || self.predicted_range < 0.0 {
            return Err(AppError::InvalidEntry(format!(
                "predicted range must be a non-negative number (got {})",
                self.predicted_range
            )));
        }
        if let Some(soc) = self.soc
            && !(0.0..=100.0).contains(&soc)
        {
            return Err(AppError::InvalidEntry(format!(
                "state of charge must be between 0 and 100 (got {soc})"
            )));
        }
        if let Some(lat) = self.lat
            && !(-90.0..=90.0).contains(&lat)
        {
            return Err(AppError::InvalidEntry(format!(
                "latitude out of range: {lat}"
            )));
        }
        if let Some(lng) = self.lng
            && !(-180.0..=180.0).contains(&lng)
        {
            return Err(AppError::InvalidEntry(format!(
                "longitude out of range: {lng}"
            )));
        }
        if self.device_id.trim().is_empty() {
            return Err(AppError::InvalidEntry("device id must not be empty".into()));
        }

        self.lat = self.lat.map(round6);
        self.lng = self.lng.map(round6);
        Ok(self)
    }
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// A stored measurement record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub dt: String,
    pub odometer: f64,
    pub predicted_range: f64,
    pub soc: Option<f64>,
    pub charged: bool,
    pub notes: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub device_id: String,
    pub created_at: i64,
    pub sync: SyncState,
}

impl Entry {
    /// Stamp a new record as the store does on insertion.
    pub fn stamp(id: i64, new: NewEntry, created_at: i64) -> Self {
        Self {
            id,
            dt: new.dt,
            odometer: new.odometer,
            predicted_range: new.predicted_range,
            soc: new.soc,
            charged: new.charged,
            notes: new.notes,
            lat: new.lat,
            lng: new.lng,
            device_id: new.device_id,
            created_at,
            sync: SyncState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.sync.is_synced()
    }

    pub fn payload(&self) -> EntryPayload {
        EntryPayload {
            id: self.id,
            dt: self.dt.clone(),
            odometer: self.odometer,
            predicted_range: self.predicted_range,
            soc: self.soc,
            charged: self.charged,
            notes: self.notes.clone(),
            lat: self.lat,
            lng: self.lng,
            device_id: self.device_id.clone(),
            created_at: self.created_at,
        }
    }
}

/// Wire projection of an entry: exactly the fields the collector receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub id: i64,
    pub dt: String,
    pub odometer: f64,
    pub predicted_range: f64,
    pub soc: Option<f64>,
    pub charged: bool,
    pub notes: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub device_id: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewEntry {
        NewEntry {
            dt: "2025-06-01T08:00:00.000Z".into(),
            odometer: 12_345.6,
            predicted_range: 310.0,
            soc: Some(80.0),
            charged: false,
            notes: String::new(),
            lat: Some(45.123_456_789),
            lng: Some(9.987_654_321),
            device_id: "dev-1".into(),
        }
    }

    #[test]
    fn validate_rounds_coordinates_to_six_decimals() {
        let e = sample().validate().unwrap();
        assert_eq!(e.lat, Some(45.123457));
        assert_eq!(e.lng, Some(9.987654));
    }

    #[test]
    fn validate_rejects_negative_odometer() {
        let mut e = sample();
        e.odometer = -1.0;
        assert!(matches!(e.validate(), Err(AppError::InvalidEntry(_))));
    }

    #[test]
    fn validate_rejects_soc_above_hundred() {
        let mut e = sample();
        e.soc = Some(101.0);
        assert!(e.validate().is_err());
    }

    #[test]
    fn validate_accepts_missing_optionals() {
        let mut e = sample();
        e.soc = None;
        e.lat = None;
        e.lng = None;
        let ok = e.validate().unwrap();
        assert_eq!(ok.lat, None);
    }

    #[test]
    fn acknowledge_is_one_way_and_keeps_first_timestamp() {
        let mut s = SyncState::Pending;
        assert!(s.acknowledge(100));
        assert!(!s.acknowledge(200));
        assert_eq!(s, SyncState::Synced { at: 100 });
    }

    #[test]
    fn payload_uses_camel_case_and_omits_sync_flags() {
        let entry = Entry::stamp(7, sample().validate().unwrap(), 1_700_000_000_000);
        let json = serde_json::to_value(entry.payload()).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 11);
        assert!(obj.contains_key("predictedRange"));
        assert!(obj.contains_key("deviceId"));
        assert!(obj.contains_key("createdAt"));
        assert!(!obj.contains_key("synced"));
        assert!(!obj.contains_key("syncedAt"));
    }
}
