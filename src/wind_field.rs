//! Procedural turbulent wind generation.
//!
//! Each wind component differentiates a scalar noise potential and takes
//! the curl, so the resulting horizontal vector field is divergence-free:
//! gusts swirl and shear but never spring from point sources or sinks.
//! Component magnitudes are normalized against a sampled RMS so the
//! `strength` parameter means meters per second regardless of the chosen
//! spatial and temporal scales, and the whole field is blown past a fixed
//! observer by a single slowly-evolving advection offset.

use nalgebra::Vector3;

use crate::constants::{MPH_TO_MPS, YARDS_TO_METERS};
use crate::error::BallisticsError;
use crate::noise_field::NoiseField;
use crate::random::RandomSource;

/// Dimensionless central-difference step in scaled noise space
const CURL_EPSILON: f64 = 0.01;
/// Draws per component for RMS calibration
const RMS_SAMPLE_COUNT: usize = 1000;
/// Draws per `advance_time` for the advection average
const ADVECTION_SAMPLE_COUNT: usize = 10;
/// Logistic slope of the self-gating sigmoid
const GATE_SLOPE: f64 = 4.0;

/// One turbulence octave: a curl-noise field with its own scales.
#[derive(Debug, Clone)]
pub struct WindComponent {
    strength: f64,         // m/s
    downrange_scale: f64,  // m, larger = slower spatial variation
    crossrange_scale: f64, // m
    temporal_scale: f64,   // s, larger = slower temporal variation
    exponent: f64,         // < 1 gustier, > 1 steadier
    gate_threshold: f64,   // fraction of strength; 0 disables the gate
    magnitude_rms: f64,    // 0 until calibrated
    noise: NoiseField,
}

impl WindComponent {
    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn downrange_scale(&self) -> f64 {
        self.downrange_scale
    }

    pub fn crossrange_scale(&self) -> f64 {
        self.crossrange_scale
    }

    pub fn temporal_scale(&self) -> f64 {
        self.temporal_scale
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn gate_threshold(&self) -> f64 {
        self.gate_threshold
    }

    /// Calibrated RMS of the raw curl magnitude; zero before calibration.
    pub fn magnitude_rms(&self) -> f64 {
        self.magnitude_rms
    }
}

/// Spatially- and temporally-varying wind field.
///
/// Owns its random source, so two fields built from equal seeds produce
/// identical turbulence.
#[derive(Debug, Clone)]
pub struct WindField {
    rng: RandomSource,
    components: Vec<WindComponent>,
    current_time: f64,
    sample_corners: [Vector3<f64>; 2],
    advection_gain: f64,
    advection_alpha: f64,
    global_advection_offset: Vector3<f64>,
    global_advection_velocity: Vector3<f64>,
}

impl WindField {
    pub fn new(rng: RandomSource) -> Self {
        WindField {
            rng,
            components: Vec::new(),
            current_time: 0.0,
            // Default box: 1000 m downrange, ±100 m crossrange, 100 m up
            sample_corners: [
                Vector3::new(-100.0, 0.0, -1000.0),
                Vector3::new(100.0, 100.0, 0.0),
            ],
            advection_gain: 1.0,
            advection_alpha: 0.01,
            global_advection_offset: Vector3::zeros(),
            global_advection_velocity: Vector3::zeros(),
        }
    }

    /// Add a turbulence octave. `gate_threshold` is a fraction of
    /// `strength` below which the self-gating sigmoid suppresses output;
    /// zero disables the gate.
    pub fn add_component(
        &mut self,
        strength: f64,
        downrange_scale: f64,
        crossrange_scale: f64,
        temporal_scale: f64,
        exponent: f64,
        gate_threshold: f64,
    ) {
        let noise = NoiseField::new(&mut self.rng);
        self.components.push(WindComponent {
            strength,
            downrange_scale,
            crossrange_scale,
            temporal_scale,
            exponent,
            gate_threshold,
            magnitude_rms: 0.0,
            noise,
        });
    }

    pub fn components(&self) -> &[WindComponent] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Corners of the box the advection average is drawn from.
    pub fn set_sample_corners(&mut self, min_corner: Vector3<f64>, max_corner: Vector3<f64>) {
        self.sample_corners = [min_corner, max_corner];
    }

    /// Multiplier on the advection speed; clamped to non-negative.
    pub fn set_advection_gain(&mut self, gain: f64) {
        self.advection_gain = gain.max(0.0);
    }

    pub fn advection_gain(&self) -> f64 {
        self.advection_gain
    }

    /// EMA smoothing factor for the advection velocity, clamped to [0, 1].
    pub fn set_advection_alpha(&mut self, alpha: f64) {
        self.advection_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn advection_offset(&self) -> Vector3<f64> {
        self.global_advection_offset
    }

    pub fn advection_velocity(&self) -> Vector3<f64> {
        self.global_advection_velocity
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Composite wind at a position (m/s, horizontal only). The zero
    /// vector when no components are active.
    pub fn sample(&self, position: Vector3<f64>) -> Vector3<f64> {
        let mut velocity = Vector3::zeros();
        for component in &self.components {
            velocity += self.shaped_component_sample(component, position);
        }
        velocity
    }

    pub fn sample_xyz(&self, x: f64, y: f64, z: f64) -> Vector3<f64> {
        self.sample(Vector3::new(x, y, z))
    }

    /// Wind from a single component; the zero vector for a bad index.
    pub fn sample_component(&self, index: usize, position: Vector3<f64>) -> Vector3<f64> {
        match self.components.get(index) {
            Some(component) => self.shaped_component_sample(component, position),
            None => Vector3::zeros(),
        }
    }

    /// Raw (un-normalized, un-shaped) curl vector from a single component.
    /// The zero vector for a bad index.
    pub fn raw_curl(&self, index: usize, position: Vector3<f64>, time: f64) -> Vector3<f64> {
        match self.components.get(index) {
            Some(component) => {
                component_curl(component, self.global_advection_offset, position, time)
            }
            None => Vector3::zeros(),
        }
    }

    /// Calibrate the RMS normalization of every uncalibrated component by
    /// sampling the raw curl magnitude at random locations within a window
    /// sized by the component's own scales. Idempotent; run lazily by
    /// [`WindField::advance_time`] but callable up front to pre-warm the
    /// one-time cost.
    pub fn calibrate(&mut self) {
        let offset = self.global_advection_offset;
        let now = self.current_time;

        for component in self.components.iter_mut() {
            if component.magnitude_rms > 0.0 {
                continue;
            }

            let mut sum_magnitude_sq = 0.0;
            for _ in 0..RMS_SAMPLE_COUNT {
                let crossrange =
                    self.rng.uniform(-1000.0, 1000.0) * component.crossrange_scale;
                let downrange =
                    self.rng.uniform(-1000.0, 1000.0) * component.downrange_scale;
                let time = now + self.rng.uniform(-1000.0, 1000.0) * component.temporal_scale;

                let position = Vector3::new(crossrange, 0.0, downrange);
                let curl = component_curl(component, offset, position, time);
                sum_magnitude_sq += curl.norm_squared();
            }

            component.magnitude_rms = (sum_magnitude_sq / RMS_SAMPLE_COUNT as f64).sqrt();
        }
    }

    /// Advance the field clock and evolve the global advection state.
    ///
    /// The elapsed interval is clamped to [0, 1] s; a zero-length interval
    /// leaves both the advection velocity and offset untouched. Otherwise
    /// the composite field is averaged at random points inside the sample
    /// box, blended into the advection velocity by an EMA, and the offset
    /// integrated by velocity x dt.
    pub fn advance_time(&mut self, current_time: f64) {
        let dt = current_time - self.current_time;
        self.current_time = current_time;

        if !self.components.is_empty() {
            self.calibrate();
        }

        let dt = dt.clamp(0.0, 1.0);
        if dt <= 0.0 {
            return;
        }

        let [min_corner, max_corner] = self.sample_corners;
        let mut probes = Vec::with_capacity(ADVECTION_SAMPLE_COUNT);
        for _ in 0..ADVECTION_SAMPLE_COUNT {
            probes.push(Vector3::new(
                self.rng.uniform(min_corner.x, max_corner.x),
                self.rng.uniform(min_corner.y, max_corner.y),
                self.rng.uniform(min_corner.z, max_corner.z),
            ));
        }

        let mut avg_wind = Vector3::zeros();
        for probe in &probes {
            avg_wind += self.sample(*probe);
        }
        avg_wind /= ADVECTION_SAMPLE_COUNT as f64;

        self.global_advection_velocity = self.global_advection_velocity
            * (1.0 - self.advection_alpha)
            + avg_wind * self.advection_gain * self.advection_alpha;
        self.global_advection_offset += self.global_advection_velocity * dt;
    }

    /// Normalize, reshape, gate, and clamp one component's curl sample.
    fn shaped_component_sample(
        &self,
        component: &WindComponent,
        position: Vector3<f64>,
    ) -> Vector3<f64> {
        let curl = component_curl(
            component,
            self.global_advection_offset,
            position,
            self.current_time,
        );

        let magnitude = curl.norm();
        let angle = curl.z.atan2(curl.x);

        // RMS normalization decouples strength from the chosen scales.
        let normalized = magnitude / (component.magnitude_rms + 1e-6);
        let reshaped = if component.exponent != 1.0 {
            normalized.powf(component.exponent)
        } else {
            normalized
        };
        let mut final_magnitude = reshaped * component.strength;

        // Self-gating sigmoid suppresses weak gusts.
        if component.gate_threshold > 0.0 {
            let threshold = component.gate_threshold * component.strength;
            final_magnitude =
                final_magnitude / (1.0 + (-GATE_SLOPE * (final_magnitude - threshold)).exp());
        }

        // Safety ceiling
        final_magnitude = final_magnitude.min(2.0 * component.strength);

        Vector3::new(
            final_magnitude * angle.cos(),
            0.0,
            final_magnitude * angle.sin(),
        )
    }
}

/// Raw curl of a component's noise potential at a position and time.
///
/// The potential is sampled in scaled (downrange, crossrange, time) space
/// with central differences, chain-ruled back to world derivatives, and
/// turned into the divergence-free horizontal field
/// `(w_cross, 0, w_down) = (-dpsi/d_down, 0, dpsi/d_cross)`.
fn component_curl(
    component: &WindComponent,
    advection_offset: Vector3<f64>,
    position: Vector3<f64>,
    time: f64,
) -> Vector3<f64> {
    let crossrange = position.x - advection_offset.x;
    let downrange = position.z - advection_offset.z;

    let scaled_down = downrange / component.downrange_scale;
    let scaled_cross = crossrange / component.crossrange_scale;
    let scaled_time = time / component.temporal_scale;

    let psi_down_plus = component
        .noise
        .sample(scaled_down + CURL_EPSILON, scaled_cross, scaled_time);
    let psi_down_minus = component
        .noise
        .sample(scaled_down - CURL_EPSILON, scaled_cross, scaled_time);
    let psi_cross_plus = component
        .noise
        .sample(scaled_down, scaled_cross + CURL_EPSILON, scaled_time);
    let psi_cross_minus = component
        .noise
        .sample(scaled_down, scaled_cross - CURL_EPSILON, scaled_time);

    let dpsi_scaled_down = (psi_down_plus - psi_down_minus) / (2.0 * CURL_EPSILON);
    let dpsi_scaled_cross = (psi_cross_plus - psi_cross_minus) / (2.0 * CURL_EPSILON);

    // Chain rule back to world space: d(scaled)/d(world) = 1/scale
    let dpsi_ddown = dpsi_scaled_down / component.downrange_scale;
    let dpsi_dcross = dpsi_scaled_cross / component.crossrange_scale;

    Vector3::new(-dpsi_ddown, 0.0, dpsi_dcross)
}

/// Named wind conditions, from dead-calm to range-flag-snapping.
pub mod wind_presets {
    use super::*;

    const MINUTES: f64 = 60.0;

    const PRESET_NAMES: [&str; 5] = ["Dead", "Calm", "Moderate", "Strong", "Extra Strong"];

    /// Build a named preset sampling inside the given box.
    ///
    /// Unknown names are an invalid-argument error, not a silent default.
    pub fn preset(
        name: &str,
        min_corner: Vector3<f64>,
        max_corner: Vector3<f64>,
        rng: RandomSource,
    ) -> Result<WindField, BallisticsError> {
        let mut field = WindField::new(rng);
        field.set_advection_gain(5.0);

        let base_scale = 10_000.0 * YARDS_TO_METERS;
        let gust_scale = 1000.0 * YARDS_TO_METERS;

        match name {
            "Dead" => {
                field.add_component(0.5 * MPH_TO_MPS, base_scale, base_scale, 15.0 * MINUTES, 0.5, 0.0);
                field.add_component(0.25 * MPH_TO_MPS, gust_scale, gust_scale, 3.0 * MINUTES, 0.5, 1.0);
            }
            "Calm" => {
                field.add_component(1.0 * MPH_TO_MPS, base_scale, base_scale, 15.0 * MINUTES, 0.5, 0.0);
                field.add_component(0.5 * MPH_TO_MPS, gust_scale, gust_scale, 3.0 * MINUTES, 0.5, 1.0);
            }
            "Moderate" => {
                field.add_component(3.0 * MPH_TO_MPS, base_scale, base_scale, 15.0 * MINUTES, 0.5, 0.0);
                field.add_component(6.0 * MPH_TO_MPS, gust_scale, gust_scale, 3.0 * MINUTES, 0.5, 0.5);
            }
            "Strong" => {
                field.add_component(7.0 * MPH_TO_MPS, base_scale, base_scale, 15.0 * MINUTES, 0.5, 0.0);
                field.add_component(10.0 * MPH_TO_MPS, gust_scale, gust_scale, 3.0 * MINUTES, 0.5, 0.8);
            }
            "Extra Strong" => {
                field.add_component(12.0 * MPH_TO_MPS, base_scale, base_scale, 15.0 * MINUTES, 0.5, 0.0);
                field.add_component(
                    15.0 * MPH_TO_MPS,
                    gust_scale,
                    gust_scale,
                    3.0 * MINUTES,
                    0.5,
                    10.0 / 15.0,
                );
            }
            _ => return Err(format!("unknown wind preset: {}", name).into()),
        }

        field.set_sample_corners(min_corner, max_corner);
        Ok(field)
    }

    pub fn preset_names() -> Vec<&'static str> {
        PRESET_NAMES.to_vec()
    }

    pub fn has_preset(name: &str) -> bool {
        PRESET_NAMES.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gusty_field(seed: u64) -> WindField {
        let mut field = WindField::new(RandomSource::seed_from(seed));
        field.add_component(4.0, 100.0, 100.0, 30.0, 1.0, 0.0);
        field
    }

    #[test]
    fn test_empty_field_samples_zero_everywhere() {
        let mut field = WindField::new(RandomSource::seed_from(1));
        for i in 0..20 {
            let p = Vector3::new(i as f64 * 13.0, 1.5, i as f64 * -41.0);
            assert_eq!(field.sample(p), Vector3::zeros());
        }
        field.advance_time(1.0);
        field.advance_time(2.5);
        assert_eq!(field.sample(Vector3::zeros()), Vector3::zeros());
        assert_eq!(field.advection_velocity(), Vector3::zeros());
    }

    #[test]
    fn test_calibration_is_idempotent() {
        let mut field = gusty_field(7);
        field.calibrate();
        let rms = field.components()[0].magnitude_rms();
        assert!(rms > 0.0);
        field.calibrate();
        assert_eq!(field.components()[0].magnitude_rms(), rms);
    }

    #[test]
    fn test_advance_time_lazily_calibrates() {
        let mut field = gusty_field(7);
        assert_eq!(field.components()[0].magnitude_rms(), 0.0);
        field.advance_time(0.1);
        assert!(field.components()[0].magnitude_rms() > 0.0);
    }

    #[test]
    fn test_advance_time_same_timestamp_is_a_noop() {
        let mut field = gusty_field(3);
        field.advance_time(1.0);
        field.advance_time(2.0);
        let offset = field.advection_offset();
        let velocity = field.advection_velocity();
        field.advance_time(2.0);
        assert_eq!(field.advection_offset(), offset);
        assert_eq!(field.advection_velocity(), velocity);
    }

    #[test]
    fn test_advection_evolves_with_time() {
        let mut field = gusty_field(11);
        field.set_advection_alpha(0.5);
        field.advance_time(0.0);
        for step in 1..=20 {
            field.advance_time(step as f64 * 0.5);
        }
        assert!(field.advection_offset().norm() > 0.0);
    }

    #[test]
    fn test_samples_stay_horizontal() {
        let mut field = gusty_field(5);
        field.calibrate();
        for i in 0..50 {
            let p = Vector3::new(i as f64 * 3.0, 1.5, i as f64 * -7.0);
            assert_eq!(field.sample(p).y, 0.0);
        }
    }

    #[test]
    fn test_magnitude_clamped_to_twice_strength() {
        let mut field = WindField::new(RandomSource::seed_from(9));
        // Exponent < 1 inflates weak samples; clamp still binds.
        field.add_component(2.0, 50.0, 50.0, 10.0, 0.25, 0.0);
        field.calibrate();
        for i in 0..2000 {
            let p = Vector3::new((i % 97) as f64 * 1.7, 0.0, (i % 83) as f64 * -2.9);
            let mag = field.sample(p).norm();
            assert!(mag <= 2.0 * 2.0 + 1e-9, "magnitude {} exceeds clamp", mag);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let field_a = {
            let mut f = gusty_field(21);
            f.calibrate();
            f
        };
        let field_b = {
            let mut f = gusty_field(21);
            f.calibrate();
            f
        };
        for i in 0..20 {
            let p = Vector3::new(i as f64 * 2.0, 0.0, i as f64 * -5.0);
            assert_eq!(field_a.sample(p), field_b.sample(p));
        }
    }

    #[test]
    fn test_sample_is_sum_of_components() {
        let mut field = WindField::new(RandomSource::seed_from(31));
        field.add_component(3.0, 200.0, 200.0, 60.0, 1.0, 0.0);
        field.add_component(1.0, 40.0, 40.0, 10.0, 1.0, 0.0);
        field.calibrate();
        let p = Vector3::new(12.0, 0.0, -310.0);
        let total = field.sample(p);
        let summed = field.sample_component(0, p) + field.sample_component(1, p);
        assert!((total - summed).norm() < 1e-12);
    }

    #[test]
    fn test_bad_component_index_degrades_to_zero() {
        let field = gusty_field(2);
        assert_eq!(field.sample_component(5, Vector3::zeros()), Vector3::zeros());
        assert_eq!(
            field.raw_curl(5, Vector3::zeros(), 0.0),
            Vector3::zeros()
        );
    }

    #[test]
    fn test_preset_lookup() {
        let min = Vector3::new(-100.0, 0.0, -1000.0);
        let max = Vector3::new(100.0, 100.0, 0.0);

        let field = wind_presets::preset("Moderate", min, max, RandomSource::seed_from(1)).unwrap();
        assert_eq!(field.component_count(), 2);
        assert_eq!(field.advection_gain(), 5.0);

        assert!(wind_presets::has_preset("Dead"));
        assert!(!wind_presets::has_preset("Hurricane"));
        let err = wind_presets::preset("Hurricane", min, max, RandomSource::seed_from(1));
        assert!(err.is_err());
        assert!(format!("{}", err.unwrap_err()).contains("Hurricane"));
    }

    #[test]
    fn test_preset_names_complete() {
        let names = wind_presets::preset_names();
        assert_eq!(names.len(), 5);
        for name in names {
            assert!(wind_presets::has_preset(name));
        }
    }
}
