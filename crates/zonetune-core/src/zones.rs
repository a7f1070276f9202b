//! Heart-rate zone table and bpm range derivation.
//!
//! Zones are expressed as percentage bands of a user's maximum heart rate.
//! A concrete [`ZoneRange`] in bpm is derived once at session start and is
//! immutable for the session's lifetime; changing the target zone requires a
//! new session.

use serde::{Deserialize, Serialize};

/// A target heart-rate zone as a percentage band of maximum heart rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HRZone {
    /// Zone number (1-5)
    pub id: u8,
    /// Display name
    pub name: String,
    /// Lower bound as a fraction of max HR (0.0-1.0)
    pub lower_percentage: f64,
    /// Upper bound as a fraction of max HR (0.0-1.0)
    pub upper_percentage: f64,
}

impl HRZone {
    pub fn new(id: u8, name: &str, lower_percentage: f64, upper_percentage: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            lower_percentage,
            upper_percentage,
        }
    }

    /// The five canonical training zones (50-60% ... 90-100% of max HR).
    pub fn default_zones() -> Vec<HRZone> {
        vec![
            HRZone::new(1, "Zone 1", 0.50, 0.60),
            HRZone::new(2, "Zone 2", 0.60, 0.70),
            HRZone::new(3, "Zone 3", 0.70, 0.80),
            HRZone::new(4, "Zone 4", 0.80, 0.90),
            HRZone::new(5, "Zone 5", 0.90, 1.00),
        ]
    }

    /// Look up a default zone by id.
    pub fn by_id(id: u8) -> Option<HRZone> {
        Self::default_zones().into_iter().find(|z| z.id == id)
    }

    /// Derive the concrete bpm band for a given maximum heart rate.
    pub fn bpm_range(&self, max_hr: u32) -> ZoneRange {
        let lower = (max_hr as f64 * self.lower_percentage).round() as u32;
        let upper = (max_hr as f64 * self.upper_percentage).round() as u32;
        ZoneRange::new(lower, upper)
    }
}

/// An inclusive bpm band `[lower_bpm, upper_bpm]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRange {
    pub lower_bpm: u32,
    pub upper_bpm: u32,
}

impl ZoneRange {
    pub fn new(lower_bpm: u32, upper_bpm: u32) -> Self {
        Self { lower_bpm, upper_bpm }
    }

    pub fn contains(&self, bpm: u32) -> bool {
        bpm >= self.lower_bpm && bpm <= self.upper_bpm
    }

    /// The band widened by `margin_bpm` on both bounds (hysteresis band).
    pub fn expanded(&self, margin_bpm: u32) -> ZoneRange {
        ZoneRange {
            lower_bpm: self.lower_bpm.saturating_sub(margin_bpm),
            upper_bpm: self.upper_bpm.saturating_add(margin_bpm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zones_cover_expected_ranges() {
        let zones = HRZone::default_zones();
        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].bpm_range(200), ZoneRange::new(100, 120));
        assert_eq!(zones[4].bpm_range(200), ZoneRange::new(180, 200));
    }

    #[test]
    fn test_bpm_range_rounds() {
        let zone = HRZone::by_id(2).unwrap();
        // 0.60 * 185 = 111.0, 0.70 * 185 = 129.5 -> 130
        assert_eq!(zone.bpm_range(185), ZoneRange::new(111, 130));
    }

    #[test]
    fn test_expanded_widens_both_bounds() {
        let range = ZoneRange::new(140, 160);
        assert_eq!(range.expanded(2), ZoneRange::new(138, 162));
        assert!(range.expanded(2).contains(138));
        assert!(range.expanded(2).contains(162));
        assert!(!range.expanded(2).contains(137));
    }

    #[test]
    fn test_expanded_saturates_at_zero() {
        let range = ZoneRange::new(1, 10);
        assert_eq!(range.expanded(5).lower_bpm, 0);
    }
}
