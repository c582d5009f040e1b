//! Bullet value type: fixed physical properties plus in-flight state.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::drag_model::DragModel;

/// Radius-of-gyration factor for the spin moment of inertia estimate
/// (fraction of diameter).
const K_RG: f64 = 0.30;

/// A bullet and, optionally, its 4-DOF flight state.
///
/// World frame: x crossrange (right positive), y vertical (up positive),
/// z downrange with negative pointing downrange. A new value is produced
/// each integration step; nothing mutates a stored state in place except
/// the sideslip lag scalars updated by the spin-wind model.
#[derive(Debug, Clone)]
pub struct Bullet {
    weight: f64,   // kg
    diameter: f64, // m
    length: f64,   // m
    bc: f64,
    drag_model: DragModel,

    position: Vector3<f64>, // m
    velocity: Vector3<f64>, // m/s
    spin_rate: f64,         // rad/s, signed by twist hand
    beta_eq_right: f64,     // rad, smoothed sideslip (right component)
    beta_eq_up: f64,        // rad, smoothed sideslip (up-in-plane component)
}

impl Bullet {
    /// A bullet at rest with static properties only.
    ///
    /// `weight`, `diameter`, `length` and `bc` must be strictly positive
    /// and stay fixed for the life of a shot.
    pub fn new(weight: f64, diameter: f64, length: f64, bc: f64, drag_model: DragModel) -> Self {
        Bullet {
            weight,
            diameter,
            length,
            bc,
            drag_model,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            spin_rate: 0.0,
            beta_eq_right: 0.0,
            beta_eq_up: 0.0,
        }
    }

    /// A flying bullet sharing `base`'s static properties and lag state.
    pub fn in_flight(
        base: &Bullet,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        spin_rate: f64,
    ) -> Self {
        Bullet {
            weight: base.weight,
            diameter: base.diameter,
            length: base.length,
            bc: base.bc,
            drag_model: base.drag_model,
            position,
            velocity,
            spin_rate,
            beta_eq_right: base.beta_eq_right,
            beta_eq_up: base.beta_eq_up,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn bc(&self) -> f64 {
        self.bc
    }

    pub fn drag_model(&self) -> DragModel {
        self.drag_model
    }

    /// Sectional density, weight over diameter squared (kg/m²).
    pub fn sectional_density(&self) -> f64 {
        self.weight / (self.diameter * self.diameter)
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn spin_rate(&self) -> f64 {
        self.spin_rate
    }

    /// Downrange distance traveled (m). Downrange is negative z.
    pub fn downrange_distance(&self) -> f64 {
        -self.position.z
    }

    pub fn total_velocity(&self) -> f64 {
        self.velocity.norm()
    }

    /// Pitch of the velocity vector above the horizontal plane (rad).
    pub fn elevation_angle(&self) -> f64 {
        let horizontal = (self.velocity.x * self.velocity.x
            + self.velocity.z * self.velocity.z)
            .sqrt();
        self.velocity.y.atan2(horizontal)
    }

    /// Horizontal angle of the velocity vector off the downrange axis (rad,
    /// positive toward +x).
    pub fn azimuth_angle(&self) -> f64 {
        self.velocity.x.atan2(-self.velocity.z)
    }

    pub fn beta_eq_right(&self) -> f64 {
        self.beta_eq_right
    }

    pub fn beta_eq_up(&self) -> f64 {
        self.beta_eq_up
    }

    pub fn set_beta_eq_right(&mut self, beta: f64) {
        self.beta_eq_right = beta;
    }

    pub fn set_beta_eq_up(&mut self, beta: f64) {
        self.beta_eq_up = beta;
    }

    /// Spin rate from a signed twist pitch in meters per turn.
    /// Right-hand twist is positive, left-hand negative.
    pub fn spin_rate_from_twist(speed_mps: f64, twist_pitch_m: f64) -> f64 {
        if twist_pitch_m == 0.0 {
            return 0.0;
        }
        let omega = 2.0 * PI * speed_mps / twist_pitch_m.abs();
        if twist_pitch_m > 0.0 {
            omega
        } else {
            -omega
        }
    }

    /// Estimated axial moment of inertia, `m * (k_rg * d)²`.
    pub fn spin_moment_of_inertia(&self) -> f64 {
        let r_eff = K_RG * self.diameter;
        self.weight * r_eff * r_eff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bullet() -> Bullet {
        // 168 gr .308 match bullet, roughly
        Bullet::new(0.0109, 0.00782, 0.0312, 0.3, DragModel::G7)
    }

    #[test]
    fn test_static_properties() {
        let b = test_bullet();
        assert_eq!(b.weight(), 0.0109);
        assert_eq!(b.drag_model(), DragModel::G7);
        assert!(b.sectional_density() > 0.0);
        assert_eq!(b.position(), Vector3::zeros());
        assert_eq!(b.spin_rate(), 0.0);
    }

    #[test]
    fn test_in_flight_copies_lag_state() {
        let mut base = test_bullet();
        base.set_beta_eq_right(0.002);
        base.set_beta_eq_up(-0.001);
        let flying = Bullet::in_flight(
            &base,
            Vector3::new(0.0, 1.0, -10.0),
            Vector3::new(0.0, 0.0, -800.0),
            1000.0,
        );
        assert_eq!(flying.beta_eq_right(), 0.002);
        assert_eq!(flying.beta_eq_up(), -0.001);
        assert_eq!(flying.bc(), base.bc());
        assert_eq!(flying.spin_rate(), 1000.0);
    }

    #[test]
    fn test_downrange_distance_sign() {
        let base = test_bullet();
        let flying = Bullet::in_flight(
            &base,
            Vector3::new(0.5, 1.0, -250.0),
            Vector3::zeros(),
            0.0,
        );
        assert_eq!(flying.downrange_distance(), 250.0);
    }

    #[test]
    fn test_angles_from_velocity() {
        let base = test_bullet();
        // Straight downrange, slightly upward
        let flying = Bullet::in_flight(
            &base,
            Vector3::zeros(),
            Vector3::new(0.0, 8.0, -800.0),
            0.0,
        );
        assert!(flying.elevation_angle() > 0.0);
        assert!((flying.azimuth_angle()).abs() < 1e-12);
    }

    #[test]
    fn test_spin_rate_from_twist() {
        // 1:10" right-hand twist at 800 m/s
        let pitch = 0.254;
        let spin = Bullet::spin_rate_from_twist(800.0, pitch);
        assert!((spin - 2.0 * PI * 800.0 / 0.254).abs() < 1e-9);
        assert!(Bullet::spin_rate_from_twist(800.0, -pitch) < 0.0);
        assert_eq!(Bullet::spin_rate_from_twist(800.0, 0.0), 0.0);
    }

    #[test]
    fn test_spin_moment_of_inertia() {
        let b = test_bullet();
        let expected = 0.0109 * (0.30 * 0.00782_f64).powi(2);
        assert!((b.spin_moment_of_inertia() - expected).abs() < 1e-15);
    }
}
