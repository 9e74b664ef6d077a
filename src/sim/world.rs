//! World model kinematics
//!
//! Advances every object in polar coordinates: the heading's radial
//! component changes range, the tangential component changes azimuth.
//! Objects are culled when they close inside the minimum range or outlive
//! their scripted lifetime.

use super::objects::WorldObject;

const MIN_RANGE_M: f64 = 50.0;

/// Holds and advances the simulated objects
#[derive(Default)]
pub struct WorldModel {
    objects: Vec<WorldObject>,
}

impl WorldModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, obj: WorldObject) {
        self.objects.push(obj);
    }

    /// Advance all objects by `dt` seconds, then cull expired and too-close
    /// objects against `current_time_s`.
    pub fn tick(&mut self, dt: f64, current_time_s: f64) -> &[WorldObject] {
        for obj in &mut self.objects {
            let heading_rad = obj.heading_deg.to_radians();

            let radial_delta = obj.speed_mps * heading_rad.cos() * dt;
            obj.range_m += radial_delta;

            if obj.range_m > MIN_RANGE_M {
                let tangential_delta = obj.speed_mps * heading_rad.sin() * dt;
                obj.azimuth_deg += (tangential_delta / obj.range_m).to_degrees();
                obj.azimuth_deg = obj.azimuth_deg.rem_euclid(360.0);
            }
        }

        self.objects.retain(|obj| {
            obj.range_m >= MIN_RANGE_M && current_time_s <= obj.spawn_time_s + obj.lifetime_s
        });

        &self.objects
    }

    pub fn active_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }
}
