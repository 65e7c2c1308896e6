use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a patient across vitals events. Upstream carries no stable
/// record id, so identity is the (first name, last name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientKey {
    pub first_name: String,
    pub last_name: String,
}

impl PatientKey {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl std::fmt::Display for PatientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessLevel {
    Athlete,
    Excellent,
    Good,
    #[serde(rename = "Above Average")]
    AboveAverage,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Poor,
}

impl FitnessLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Athlete => "Athlete",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::AboveAverage => "Above Average",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
            Self::Poor => "Poor",
        }
    }
}

/// Activity classification derived from an accumulated step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn for_steps(steps: u64) -> Self {
        match steps {
            0..=1_999 => Self::Sedentary,
            2_000..=4_999 => Self::LightlyActive,
            5_000..=7_999 => Self::ModeratelyActive,
            8_000..=11_999 => Self::Active,
            _ => Self::VeryActive,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary",
            Self::LightlyActive => "Lightly Active",
            Self::ModeratelyActive => "Moderately Active",
            Self::Active => "Active",
            Self::VeryActive => "Very Active",
        }
    }
}

/// Daily step goal used for progress display.
pub const DAILY_STEP_GOAL: u64 = 10_000;

/// Percentage of the daily goal covered by `steps`, rounded, capped at 100.
pub fn goal_progress_percent(steps: u64) -> u8 {
    let pct = (steps * 100 + DAILY_STEP_GOAL / 2) / DAILY_STEP_GOAL;
    pct.min(100) as u8
}

/// One timestamped observation for one patient, as delivered by both the
/// snapshot endpoint and the event stream. `steps_taken` is advisory at
/// best; the reconciler overwrites it from its own accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_taken: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VitalRecord {
    pub fn patient_key(&self) -> PatientKey {
        PatientKey::new(self.first_name.clone(), self.last_name.clone())
    }

    /// Ordering key for the display window: case-folded surname, with a
    /// missing surname folding to the empty string so it sorts first.
    pub fn surname_sort_key(&self) -> String {
        self.last_name.trim().to_lowercase()
    }

    pub fn activity_level(&self) -> ActivityLevel {
        ActivityLevel::for_steps(self.steps_taken.unwrap_or(0))
    }

    pub fn goal_progress(&self) -> u8 {
        goal_progress_percent(self.steps_taken.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vital_record_parses_upstream_camel_case_json() {
        let raw = r#"{
            "timestamp": "2026-08-28T14:03:07Z",
            "firstName": "Ada",
            "lastName": "Osei",
            "age": 54,
            "heartRate": 72,
            "bloodPressure": "120/80",
            "stepsTaken": 431,
            "fitnessLevel": "Above Average",
            "notes": "post-op day 2"
        }"#;
        let record: VitalRecord = serde_json::from_str(raw).expect("parse record");
        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.last_name, "Osei");
        assert_eq!(record.heart_rate, Some(72));
        assert_eq!(record.fitness_level, Some(FitnessLevel::AboveAverage));
        assert_eq!(record.patient_key(), PatientKey::new("Ada", "Osei"));
    }

    #[test]
    fn vital_record_tolerates_missing_optional_fields() {
        let raw = r#"{"timestamp": "2026-08-28T14:03:07Z"}"#;
        let record: VitalRecord = serde_json::from_str(raw).expect("parse sparse record");
        assert!(record.first_name.is_empty());
        assert!(record.last_name.is_empty());
        assert_eq!(record.steps_taken, None);
        assert_eq!(record.surname_sort_key(), "");
    }

    #[test]
    fn activity_level_thresholds_match_display_bands() {
        assert_eq!(ActivityLevel::for_steps(0), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::for_steps(1_999), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::for_steps(2_000), ActivityLevel::LightlyActive);
        assert_eq!(ActivityLevel::for_steps(5_000), ActivityLevel::ModeratelyActive);
        assert_eq!(ActivityLevel::for_steps(8_000), ActivityLevel::Active);
        assert_eq!(ActivityLevel::for_steps(12_000), ActivityLevel::VeryActive);
    }

    #[test]
    fn goal_progress_rounds_and_caps_at_100() {
        assert_eq!(goal_progress_percent(0), 0);
        assert_eq!(goal_progress_percent(4_950), 50);
        assert_eq!(goal_progress_percent(9_999), 100);
        assert_eq!(goal_progress_percent(25_000), 100);
    }

    #[test]
    fn surname_sort_key_case_folds() {
        let record = VitalRecord {
            timestamp: Utc::now(),
            first_name: "Maya".into(),
            last_name: "  DeWitt ".into(),
            age: None,
            heart_rate: None,
            blood_pressure: None,
            steps_taken: None,
            fitness_level: None,
            notes: None,
        };
        assert_eq!(record.surname_sort_key(), "dewitt");
    }
}
