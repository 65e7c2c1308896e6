//! Synthetic per-patient step accumulation.
//!
//! Upstream events do not carry a trustworthy step count, so the reconciler
//! fabricates a plausible, continuously increasing counter per patient:
//! seeded from the hour of day on first sighting, then incremented at a
//! walking-cadence rate for the time elapsed between readings. The
//! derivation never mutates the inbound record; it returns a derived copy
//! and updates the explicit accumulator state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use shared::domain::{PatientKey, VitalRecord};

/// Upper bound on the first-sighting seed.
pub const SEED_CAP: u64 = 2_000;
/// Daily ceiling for the accumulated counter.
pub const DAILY_STEP_CAP: u64 = 20_000;
/// Readings closer together than this (minutes) credit no steps; faster
/// than plausible walking cadence.
pub const MIN_INCREMENT_GAP_MINUTES: f64 = 0.25;
/// At most this many minutes of walking are credited per reading, so stale
/// timestamps or clock gaps cannot produce large jumps.
pub const MAX_CREDITED_MINUTES: f64 = 3.0;

const SEED_STEPS_PER_HOUR: u64 = 200;
const SEED_WAKING_HOUR: u64 = 6;
const SEED_NOISE_STEPS: u64 = 400;
const MIN_STEPS_PER_MINUTE: u64 = 60;
const MAX_STEPS_PER_MINUTE: u64 = 100;

/// Accumulator state for one patient key. Lives for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientSteps {
    pub cumulative_steps: u64,
    pub last_update: DateTime<Utc>,
}

/// Per-patient synthetic step state, keyed by patient identity. Owned
/// exclusively by the reconciler; entries are never removed.
#[derive(Debug, Default)]
pub struct StepAccumulator {
    patients: HashMap<PatientKey, PatientSteps>,
}

impl StepAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current accumulated total for a patient, if the key has been seen.
    pub fn steps_for(&self, key: &PatientKey) -> Option<u64> {
        self.patients.get(key).map(|state| state.cumulative_steps)
    }

    pub fn tracked_patients(&self) -> usize {
        self.patients.len()
    }

    /// Applies the derivation to one record: returns a copy whose
    /// `steps_taken` reflects the accumulator, advancing per-key state as a
    /// side effect. `hour_of_day` is the caller's wall-clock hour (0-23),
    /// used only to seed first sightings.
    pub fn derive<R: Rng>(
        &mut self,
        record: &VitalRecord,
        hour_of_day: u32,
        rng: &mut R,
    ) -> VitalRecord {
        let key = record.patient_key();
        let mut derived = record.clone();

        let steps = match self.patients.get_mut(&key) {
            None => {
                let seeded = seed_steps(hour_of_day, rng);
                self.patients.insert(
                    key,
                    PatientSteps {
                        cumulative_steps: seeded,
                        last_update: record.timestamp,
                    },
                );
                seeded
            }
            Some(state) => {
                let elapsed_minutes = (record.timestamp - state.last_update).num_milliseconds()
                    as f64
                    / 60_000.0;
                if elapsed_minutes >= MIN_INCREMENT_GAP_MINUTES {
                    let steps_per_minute =
                        rng.gen_range(MIN_STEPS_PER_MINUTE..MAX_STEPS_PER_MINUTE) as f64;
                    let increment =
                        (steps_per_minute * elapsed_minutes.min(MAX_CREDITED_MINUTES)) as u64;
                    state.cumulative_steps =
                        (state.cumulative_steps + increment).min(DAILY_STEP_CAP);
                    state.last_update = record.timestamp;
                }
                state.cumulative_steps
            }
        };

        derived.steps_taken = Some(steps);
        derived
    }

    /// Re-runs the derivation over every record in the current window so
    /// displayed totals stay consistent with the latest per-key state.
    /// Records re-presented with their original timestamps fall under the
    /// minimum-gap suppression and only pick up the current total.
    pub fn derive_window<R: Rng>(
        &mut self,
        records: &[VitalRecord],
        hour_of_day: u32,
        rng: &mut R,
    ) -> Vec<VitalRecord> {
        records
            .iter()
            .map(|record| self.derive(record, hour_of_day, rng))
            .collect()
    }
}

/// First-sighting seed: models "already active since waking, plus noise".
/// Later hours seed higher, clamped to [`SEED_CAP`].
fn seed_steps<R: Rng>(hour_of_day: u32, rng: &mut R) -> u64 {
    let waking_hours = u64::from(hour_of_day).saturating_sub(SEED_WAKING_HOUR);
    let base = waking_hours * SEED_STEPS_PER_HOUR + rng.gen_range(0..SEED_NOISE_STEPS);
    base.min(SEED_CAP)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn record_at(first: &str, last: &str, timestamp: DateTime<Utc>) -> VitalRecord {
        VitalRecord {
            timestamp,
            first_name: first.into(),
            last_name: last.into(),
            age: Some(61),
            heart_rate: Some(78),
            blood_pressure: Some("118/76".into()),
            steps_taken: Some(999_999),
            fitness_level: None,
            notes: None,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 13, 0, 0).unwrap()
    }

    #[test]
    fn first_sighting_seed_stays_within_bounds_for_every_hour() {
        for hour in 0..24 {
            let mut rng = StdRng::seed_from_u64(u64::from(hour) + 17);
            let mut acc = StepAccumulator::new();
            let derived = acc.derive(&record_at("Ana", "Silva", base_time()), hour, &mut rng);
            let steps = derived.steps_taken.expect("derived steps");
            assert!(steps <= SEED_CAP, "hour {hour}: seed {steps} over cap");
            if hour <= 6 {
                assert!(steps < SEED_NOISE_STEPS, "hour {hour}: seed {steps} too high");
            }
        }
    }

    #[test]
    fn derivation_overwrites_inbound_steps_without_mutating_the_input() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut acc = StepAccumulator::new();
        let record = record_at("Ana", "Silva", base_time());
        let derived = acc.derive(&record, 14, &mut rng);
        assert_ne!(derived.steps_taken, Some(999_999));
        // inbound record is untouched
        assert_eq!(record.steps_taken, Some(999_999));
    }

    #[test]
    fn increment_between_readings_respects_cadence_bounds() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut acc = StepAccumulator::new();
            let first = acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
            let start = first.steps_taken.unwrap();

            let later = base_time() + Duration::minutes(2);
            let second = acc.derive(&record_at("Ana", "Silva", later), 10, &mut rng);
            let increment = second.steps_taken.unwrap() - start;
            assert!(
                (120..=198).contains(&increment),
                "seed {seed}: increment {increment} outside [120, 198] for a 2 minute gap"
            );
        }
    }

    #[test]
    fn increment_is_capped_at_three_minutes_of_walking() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let mut acc = StepAccumulator::new();
            let first = acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
            let start = first.steps_taken.unwrap();

            // 45 minutes elapsed, but only 3 minutes may be credited.
            let later = base_time() + Duration::minutes(45);
            let second = acc.derive(&record_at("Ana", "Silva", later), 10, &mut rng);
            let increment = second.steps_taken.unwrap() - start;
            assert!(
                (180..=297).contains(&increment),
                "seed {seed}: increment {increment} outside [180, 297] for a capped gap"
            );
        }
    }

    #[test]
    fn readings_under_fifteen_seconds_apart_credit_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut acc = StepAccumulator::new();
        let first = acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
        let start = first.steps_taken.unwrap();

        let too_soon = base_time() + Duration::seconds(10);
        let second = acc.derive(&record_at("Ana", "Silva", too_soon), 10, &mut rng);
        assert_eq!(second.steps_taken, Some(start));

        // The suppressed reading must not advance the last-update instant:
        // a reading 20s after the first still clears the 15s gate.
        let third_time = base_time() + Duration::seconds(20);
        let third = acc.derive(&record_at("Ana", "Silva", third_time), 10, &mut rng);
        assert!(third.steps_taken.unwrap() > start);
    }

    #[test]
    fn a_reading_with_an_earlier_timestamp_credits_nothing() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut acc = StepAccumulator::new();
        let first = acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
        let start = first.steps_taken.unwrap();

        let backwards = base_time() - Duration::minutes(5);
        let second = acc.derive(&record_at("Ana", "Silva", backwards), 10, &mut rng);
        assert_eq!(second.steps_taken, Some(start));
    }

    #[test]
    fn cumulative_steps_are_monotone_and_clamped_to_the_daily_cap() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut acc = StepAccumulator::new();
        let key = PatientKey::new("Ana", "Silva");

        let mut previous = 0;
        // 100 readings, 3 minutes apart, at up to 297 steps each: enough to
        // hit the 20k ceiling well before the end.
        for i in 0..100 {
            let at = base_time() + Duration::minutes(3 * i);
            let derived = acc.derive(&record_at("Ana", "Silva", at), 12, &mut rng);
            let steps = derived.steps_taken.unwrap();
            assert!(steps >= previous, "reading {i}: total went backwards");
            assert!(steps <= DAILY_STEP_CAP, "reading {i}: total over daily cap");
            previous = steps;
        }
        assert_eq!(acc.steps_for(&key), Some(DAILY_STEP_CAP));
    }

    #[test]
    fn distinct_patients_accumulate_independently() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut acc = StepAccumulator::new();
        acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
        acc.derive(&record_at("Ben", "Okafor", base_time()), 10, &mut rng);
        assert_eq!(acc.tracked_patients(), 2);

        let later = base_time() + Duration::minutes(2);
        let ana_before = acc.steps_for(&PatientKey::new("Ana", "Silva")).unwrap();
        acc.derive(&record_at("Ben", "Okafor", later), 10, &mut rng);
        assert_eq!(
            acc.steps_for(&PatientKey::new("Ana", "Silva")),
            Some(ana_before),
            "Ben's reading must not move Ana's total"
        );
    }

    #[test]
    fn window_pass_refreshes_every_record_to_current_totals() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut acc = StepAccumulator::new();
        let ana = acc.derive(&record_at("Ana", "Silva", base_time()), 10, &mut rng);
        let ben = acc.derive(&record_at("Ben", "Okafor", base_time()), 10, &mut rng);

        // Ana walks for two minutes; her old window record is stale now.
        let later = base_time() + Duration::minutes(2);
        acc.derive(&record_at("Ana", "Silva", later), 10, &mut rng);

        let refreshed = acc.derive_window(&[ana, ben.clone()], 10, &mut rng);
        assert_eq!(
            refreshed[0].steps_taken,
            Some(acc.steps_for(&PatientKey::new("Ana", "Silva")).unwrap()),
        );
        assert_eq!(refreshed[1].steps_taken, ben.steps_taken);
    }
}
