//! Scenario profiles and object spawning
//!
//! A scenario profile bounds how many objects exist, which classes appear,
//! how fast new ones spawn, and how hostile the airspace is. The generator
//! turns a profile into concrete objects with randomized kinematics, seeded
//! for reproducibility.

use crate::protocol::TrackClass;
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::Normal;

/// One simulated airborne object in polar coordinates
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: u32,
    pub classification: TrackClass,
    pub spawn_time_s: f64,
    pub lifetime_s: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_m: f64,
    pub speed_mps: f64,
    pub heading_deg: f64,
    pub rcs_dbsm: f64,
    pub is_hostile: bool,
    /// Measurement noise sigma, derived from range and RCS
    pub noise_stddev: f64,
}

/// Traffic shape for one simulation run
#[derive(Debug, Clone)]
pub struct ScenarioProfile {
    pub name: String,
    pub min_objects: u32,
    pub max_objects: u32,
    pub allowed_types: Vec<TrackClass>,
    pub spawn_rate_hz: f64,
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub min_speed_mps: f64,
    pub max_speed_mps: f64,
    pub hostile_probability: f64,
}

impl ScenarioProfile {
    /// Quiet airspace: the odd bird
    pub fn idle() -> Self {
        ScenarioProfile {
            name: "idle".to_string(),
            min_objects: 0,
            max_objects: 2,
            allowed_types: vec![TrackClass::Bird, TrackClass::Unknown],
            spawn_rate_hz: 0.01,
            min_range_m: 1000.0,
            max_range_m: 15000.0,
            min_speed_mps: 5.0,
            max_speed_mps: 30.0,
            hostile_probability: 0.0,
        }
    }

    /// Routine patrol traffic
    pub fn patrol() -> Self {
        ScenarioProfile {
            name: "patrol".to_string(),
            min_objects: 3,
            max_objects: 8,
            allowed_types: vec![
                TrackClass::FixedWing,
                TrackClass::RotaryWing,
                TrackClass::UavSmall,
            ],
            spawn_rate_hz: 0.1,
            min_range_m: 5000.0,
            max_range_m: 30000.0,
            min_speed_mps: 50.0,
            max_speed_mps: 300.0,
            hostile_probability: 0.3,
        }
    }

    /// Saturation attack
    pub fn raid() -> Self {
        ScenarioProfile {
            name: "raid".to_string(),
            min_objects: 10,
            max_objects: 30,
            allowed_types: vec![
                TrackClass::UavSmall,
                TrackClass::Missile,
                TrackClass::RocketArtillery,
            ],
            spawn_rate_hz: 1.0,
            min_range_m: 3000.0,
            max_range_m: 25000.0,
            min_speed_mps: 100.0,
            max_speed_mps: 600.0,
            hostile_probability: 0.8,
        }
    }

    /// Load test: everything at once
    pub fn stress() -> Self {
        ScenarioProfile {
            name: "stress".to_string(),
            min_objects: 50,
            max_objects: 100,
            allowed_types: vec![
                TrackClass::FixedWing,
                TrackClass::RotaryWing,
                TrackClass::UavSmall,
                TrackClass::UavLarge,
                TrackClass::Missile,
                TrackClass::RocketArtillery,
                TrackClass::Bird,
                TrackClass::Decoy,
                TrackClass::Unknown,
            ],
            spawn_rate_hz: 10.0,
            min_range_m: 1000.0,
            max_range_m: 40000.0,
            min_speed_mps: 10.0,
            max_speed_mps: 800.0,
            hostile_probability: 0.5,
        }
    }

    /// Look up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "idle" => Some(Self::idle()),
            "patrol" => Some(Self::patrol()),
            "raid" => Some(Self::raid()),
            "stress" => Some(Self::stress()),
            _ => None,
        }
    }
}

/// Spawns objects according to a profile
pub struct ObjectGenerator {
    profile: ScenarioProfile,
    rng: SmallRng,
    next_id: u32,
    last_spawn_time: f64,
}

impl ObjectGenerator {
    pub fn new(profile: ScenarioProfile, seed: u64) -> Self {
        ObjectGenerator {
            profile,
            rng: SmallRng::seed_from_u64(seed),
            next_id: 1,
            last_spawn_time: 0.0,
        }
    }

    pub fn profile(&self) -> &ScenarioProfile {
        &self.profile
    }

    fn make_object(&mut self, spawn_time_s: f64) -> WorldObject {
        let id = self.next_id;
        self.next_id += 1;

        let type_idx = self.rng.gen_range(0..self.profile.allowed_types.len());
        let classification = self.profile.allowed_types[type_idx];

        let lifetime_s = self.rng.gen_range(10.0..120.0);
        let azimuth_deg = self.rng.gen_range(0.0..360.0);
        let elevation_deg = self.rng.gen_range(0.5..45.0);
        let range_m = self
            .rng
            .gen_range(self.profile.min_range_m..=self.profile.max_range_m);
        let speed_mps = self
            .rng
            .gen_range(self.profile.min_speed_mps..=self.profile.max_speed_mps);
        let heading_deg = self.rng.gen_range(0.0..360.0);

        let base_rcs = match classification {
            TrackClass::FixedWing => 10.0,
            TrackClass::RotaryWing => 5.0,
            TrackClass::UavSmall => -5.0,
            TrackClass::UavLarge => 3.0,
            TrackClass::Missile => -10.0,
            TrackClass::RocketArtillery => -8.0,
            TrackClass::Bird => -20.0,
            TrackClass::Decoy => 15.0,
            TrackClass::Unknown => 0.0,
        };
        // Normal(0, 2) is valid by construction.
        let rcs_noise = Normal::new(0.0, 2.0)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(0.0);
        let rcs_dbsm = base_rcs + rcs_noise;

        let is_hostile = self.rng.gen_range(0.0..1.0) < self.profile.hostile_probability;

        let rcs_linear = 10f64.powf(rcs_dbsm / 10.0);
        let noise_stddev = (range_m / 1000.0 / rcs_linear.max(0.01)).max(1.0);

        WorldObject {
            id,
            classification,
            spawn_time_s,
            lifetime_s,
            azimuth_deg,
            elevation_deg,
            range_m,
            speed_mps,
            heading_deg,
            rcs_dbsm,
            is_hostile,
            noise_stddev,
        }
    }

    /// Initial population, sized uniformly within the profile bounds.
    pub fn generate_initial(&mut self) -> Vec<WorldObject> {
        let count = self
            .rng
            .gen_range(self.profile.min_objects..=self.profile.max_objects);
        (0..count).map(|_| self.make_object(0.0)).collect()
    }

    /// Spawn a new object when the profile's spawn interval has elapsed.
    pub fn maybe_spawn(&mut self, current_time_s: f64) -> Option<WorldObject> {
        if self.profile.spawn_rate_hz <= 0.0 {
            return None;
        }
        let interval = 1.0 / self.profile.spawn_rate_hz;
        if current_time_s - self.last_spawn_time >= interval {
            self.last_spawn_time = current_time_s;
            return Some(self.make_object(current_time_s));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_population_within_bounds() {
        let mut gen = ObjectGenerator::new(ScenarioProfile::patrol(), 42);
        let objects = gen.generate_initial();
        let profile = ScenarioProfile::patrol();
        assert!(objects.len() >= profile.min_objects as usize);
        assert!(objects.len() <= profile.max_objects as usize);

        for obj in &objects {
            assert!(profile.allowed_types.contains(&obj.classification));
            assert!(obj.range_m >= profile.min_range_m);
            assert!(obj.range_m <= profile.max_range_m);
            assert!(obj.speed_mps >= profile.min_speed_mps);
            assert!(obj.speed_mps <= profile.max_speed_mps);
            assert!(obj.azimuth_deg >= 0.0 && obj.azimuth_deg < 360.0);
        }
    }

    #[test]
    fn test_unique_ids() {
        let mut gen = ObjectGenerator::new(ScenarioProfile::stress(), 7);
        let objects = gen.generate_initial();
        let mut ids: Vec<u32> = objects.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), objects.len());
    }

    #[test]
    fn test_deterministic_under_seed() {
        let mut a = ObjectGenerator::new(ScenarioProfile::raid(), 99);
        let mut b = ObjectGenerator::new(ScenarioProfile::raid(), 99);
        let objs_a = a.generate_initial();
        let objs_b = b.generate_initial();
        assert_eq!(objs_a.len(), objs_b.len());
        for (x, y) in objs_a.iter().zip(&objs_b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.classification, y.classification);
            assert_eq!(x.range_m, y.range_m);
            assert_eq!(x.is_hostile, y.is_hostile);
        }
    }

    #[test]
    fn test_spawn_rate_respected() {
        let mut profile = ScenarioProfile::patrol();
        profile.spawn_rate_hz = 1.0; // one per second
        let mut gen = ObjectGenerator::new(profile, 1);

        assert!(gen.maybe_spawn(0.5).is_none());
        assert!(gen.maybe_spawn(1.0).is_some());
        assert!(gen.maybe_spawn(1.5).is_none());
        assert!(gen.maybe_spawn(2.1).is_some());
    }

    #[test]
    fn test_idle_profile_never_hostile() {
        // Idle spawn interval is 100 s; step past it each iteration.
        let mut gen = ObjectGenerator::new(ScenarioProfile::idle(), 3);
        let mut spawned = 0;
        for i in 1..=50 {
            if let Some(obj) = gen.maybe_spawn(i as f64 * 150.0) {
                assert!(!obj.is_hostile);
                spawned += 1;
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(ScenarioProfile::builtin("patrol").is_some());
        assert!(ScenarioProfile::builtin("raid").is_some());
        assert!(ScenarioProfile::builtin("blitz").is_none());
    }
}
