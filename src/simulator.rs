//! Trajectory integration and zeroing.
//!
//! The integrator is a midpoint (RK2) scheme with two deliberate
//! asymmetries carried over from the validated reference behavior: the
//! position update uses the midpoint velocity rather than the endpoint
//! velocity, and the sideslip lag state written during the midpoint
//! acceleration evaluation is carried into the final state.

use nalgebra::Vector3;

use crate::atmosphere::Atmosphere;
use crate::bullet::Bullet;
use crate::constants::{G_ACCEL_MPS2, MIN_VELOCITY_THRESHOLD, STANDARD_AIR_DENSITY};
use crate::drag_tables::retardation;
use crate::trajectory::Trajectory;
use crate::wind_field::WindField;

/// Normal-force (lift) slope C_Nα, per radian
const LIFT_SLOPE_PER_RAD: f64 = 1.5;
/// Restoring (pitching) moment slope C_Mα, per radian
const RESTORING_MOMENT_SLOPE_PER_RAD: f64 = -0.07;
/// Empirical scale matching observed spin drift
const YAW_OF_REPOSE_SCALE: f64 = 0.2;
/// Crosswind jump shares the spin-drift scaling
const JUMP_STRENGTH_SCALE: f64 = YAW_OF_REPOSE_SCALE;
/// Slows the sideslip lag filter relative to the trim rate
const BETA_LAG_SCALE: f64 = 0.5;

/// Result of a zeroing run.
///
/// The solver always leaves the simulator's initial state set to its final
/// trial state; `converged` reports whether the residual actually dropped
/// below tolerance, instead of leaving callers to guess.
#[derive(Debug, Clone, Copy)]
pub struct ZeroSolution {
    /// Launch elevation angle (rad)
    pub pitch: f64,
    /// Launch azimuth angle (rad, positive toward +x)
    pub yaw: f64,
    /// Whether the target-plane error fell below tolerance
    pub converged: bool,
    /// Rounds actually executed
    pub iterations: u32,
    /// Combined lateral + vertical error at the target plane (m)
    pub residual_error: f64,
}

/// Stateful flight simulator for one bullet at a time.
pub struct Simulator {
    initial_bullet: Bullet,
    current_bullet: Bullet,
    atmosphere: Atmosphere,
    wind: Vector3<f64>,
    current_time: f64,
    trajectory: Trajectory,
}

impl Simulator {
    pub fn new(bullet: Bullet, atmosphere: Atmosphere) -> Self {
        let current = bullet.clone();
        Simulator {
            initial_bullet: bullet,
            current_bullet: current,
            atmosphere,
            wind: Vector3::zeros(),
            current_time: 0.0,
            trajectory: Trajectory::new(),
        }
    }

    /// Replace the initial state and reset to it.
    pub fn set_initial_bullet(&mut self, bullet: Bullet) {
        self.initial_bullet = bullet;
        self.reset_to_initial();
    }

    pub fn set_atmosphere(&mut self, atmosphere: Atmosphere) {
        self.atmosphere = atmosphere;
    }

    /// Set the wind consumed by subsequent steps (m/s, world frame).
    pub fn set_wind(&mut self, wind: Vector3<f64>) {
        self.wind = wind;
    }

    pub fn initial_bullet(&self) -> &Bullet {
        &self.initial_bullet
    }

    pub fn current_bullet(&self) -> &Bullet {
        &self.current_bullet
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn wind(&self) -> Vector3<f64> {
        self.wind
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_distance(&self) -> f64 {
        self.current_bullet.downrange_distance()
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Reset the in-flight state to the initial bullet, zero the clock,
    /// and drop the recorded trajectory.
    pub fn reset_to_initial(&mut self) {
        self.current_bullet = self.initial_bullet.clone();
        self.current_time = 0.0;
        self.trajectory.clear();
    }

    /// Advance one step of `dt` seconds and record the new sample.
    pub fn time_step(&mut self, dt: f64) -> &Bullet {
        let mut s0 = self.current_bullet.clone();
        let v0 = s0.velocity();
        let x0 = s0.position();

        let a0 = self.acceleration(&mut s0, dt);
        let v_half = v0 + a0 * (0.5 * dt);
        let x_half = x0 + v_half * (0.5 * dt);

        // The midpoint evaluation rewrites the lag scalars; the final state
        // is built from s_half so it carries them.
        let mut s_half = Bullet::in_flight(&s0, x_half, v_half, s0.spin_rate());
        let a_half = self.acceleration(&mut s_half, dt);

        let v1 = v0 + a_half * dt;
        let x1 = x0 + v_half * dt; // midpoint velocity for the position update

        self.current_bullet = Bullet::in_flight(&s_half, x1, v1, s0.spin_rate());
        self.current_time += dt;
        self.trajectory
            .push(self.current_time, self.current_bullet.clone(), self.wind);

        &self.current_bullet
    }

    /// Step from the current state until the bullet passes `max_distance`
    /// downrange or `max_time` elapses, with the wind fixed at the current
    /// wind vector.
    pub fn simulate(&mut self, max_distance: f64, dt: f64, max_time: f64) -> &Trajectory {
        self.trajectory
            .push(self.current_time, self.current_bullet.clone(), self.wind);

        let max_sim_time = self.current_time + max_time;
        while self.current_time < max_sim_time {
            self.time_step(dt);
            if self.current_bullet.downrange_distance() > max_distance {
                break;
            }
        }
        &self.trajectory
    }

    /// Like [`Simulator::simulate`], but each step consumes a fresh wind
    /// sample from `field` at the bullet's current position.
    pub fn simulate_with_wind(
        &mut self,
        max_distance: f64,
        dt: f64,
        max_time: f64,
        field: &WindField,
    ) -> &Trajectory {
        self.trajectory
            .push(self.current_time, self.current_bullet.clone(), self.wind);

        let max_sim_time = self.current_time + max_time;
        while self.current_time < max_sim_time {
            self.wind = field.sample(self.current_bullet.position());
            self.time_step(dt);
            if self.current_bullet.downrange_distance() > max_distance {
                break;
            }
        }
        &self.trajectory
    }

    /// Solve for launch pitch/yaw so the trajectory passes through
    /// `target` = (crossrange, vertical, downrange) with downrange
    /// negative.
    ///
    /// Runs up to `max_iterations` damped-correction rounds; each round
    /// simulates to 1.1× the target distance (capped at 5 s) and measures
    /// the miss at the target plane. If the target distance is beyond what
    /// a trial could reach, the loop stops early with whatever angles it
    /// has. Either way the simulator's initial state is permanently
    /// replaced by the final trial state and the simulator reset to it.
    pub fn compute_zero(
        &mut self,
        muzzle_velocity: f64,
        target: Vector3<f64>,
        dt: f64,
        max_iterations: u32,
        tolerance: f64,
        spin_rate: f64,
    ) -> ZeroSolution {
        let mut pitch: f64 = 0.01;
        let mut yaw: f64 = 0.0;
        let distance = -target.z;

        let mut converged = false;
        let mut iterations = 0;
        let mut residual = f64::INFINITY;

        for _ in 0..max_iterations {
            iterations += 1;

            let trial = Bullet::in_flight(
                &self.initial_bullet,
                Vector3::zeros(),
                launch_velocity(muzzle_velocity, pitch, yaw),
                spin_rate,
            );
            self.set_initial_bullet(trial);
            self.simulate(distance * 1.1, dt, 5.0);

            if self.trajectory.total_distance() < distance {
                // Target beyond the trial window; keep the current angles.
                break;
            }
            let point = match self.trajectory.at_distance(distance) {
                Some(p) => p,
                None => break,
            };

            let vertical_error = target.y - point.state().position().y;
            let lateral_error = target.x - point.state().position().x;
            residual = (vertical_error * vertical_error + lateral_error * lateral_error).sqrt();

            if residual < tolerance {
                converged = true;
                break;
            }

            pitch += 0.5 * vertical_error.atan2(distance);
            yaw += 0.5 * lateral_error.atan2(distance);
        }

        let final_state = Bullet::in_flight(
            &self.initial_bullet,
            Vector3::zeros(),
            launch_velocity(muzzle_velocity, pitch, yaw),
            spin_rate,
        );
        self.initial_bullet = final_state;
        self.reset_to_initial();

        ZeroSolution {
            pitch,
            yaw,
            converged,
            iterations,
            residual_error: residual,
        }
    }

    /// Drag deceleration magnitude for a state, from air-relative speed.
    fn drag_retardation(&self, state: &Bullet) -> f64 {
        let v_rel = state.velocity() - self.wind;
        let density_ratio = self.atmosphere.air_density() / STANDARD_AIR_DENSITY;
        retardation(v_rel.norm(), state.drag_model(), density_ratio, state.bc())
    }

    /// Total acceleration at `state`. Updates the state's sideslip lag
    /// scalars as a side effect of the spin-wind evaluation.
    fn acceleration(&self, state: &mut Bullet, dt: f64) -> Vector3<f64> {
        let gravity = Vector3::new(0.0, -G_ACCEL_MPS2, 0.0);

        let v_rel = state.velocity() - self.wind;
        let v_rel_mag = v_rel.norm();
        if v_rel_mag <= 0.0 {
            return gravity;
        }

        let drag_accel = -self.drag_retardation(state) * (v_rel / v_rel_mag);
        let extra = self.spin_wind_accel(state, gravity, dt);

        drag_accel + gravity + extra
    }

    /// Steady spin drift (yaw of repose) plus transient crosswind jump,
    /// expressed in the plane normal to the trajectory tangent.
    fn spin_wind_accel(&self, state: &mut Bullet, gravity: Vector3<f64>, dt: f64) -> Vector3<f64> {
        let v = state.velocity();
        let u = v - self.wind;
        let air_speed = u.norm();
        if air_speed < 1e-3 {
            return Vector3::zeros();
        }
        let tangent = if v.norm() > MIN_VELOCITY_THRESHOLD {
            v / v.norm()
        } else {
            u / air_speed
        };

        // Normal-plane basis; for a level downrange shot right is +x.
        let world_up = Vector3::new(0.0, 1.0, 0.0);
        let right = safe_norm(tangent.cross(&world_up), Vector3::new(1.0, 0.0, 0.0));
        let up_in_plane = safe_norm(tangent.cross(&right), Vector3::new(0.0, 1.0, 0.0));

        let rho = self.atmosphere.air_density();
        let q_dyn = 0.5 * rho * air_speed * air_speed;
        let s_ref = 0.25 * std::f64::consts::PI * state.diameter() * state.diameter();

        // Alignment rate: how fast the nose trims to the local airflow.
        let ref_len = state.diameter().max(state.length());
        let denom = state.spin_moment_of_inertia() * state.spin_rate().abs() + 1e-12;
        let align_rate =
            (q_dyn * s_ref * ref_len * RESTORING_MOMENT_SLOPE_PER_RAD.abs()) / denom;
        let beta_align_rate = BETA_LAG_SCALE * align_rate;
        let a_lp = 1.0 - (-beta_align_rate * dt).exp();

        // Yaw of repose from the transverse component of gravity.
        let g_perp = gravity - tangent * gravity.dot(&tangent);
        let t_x_g = tangent.cross(&g_perp);
        let yor = if align_rate > 1e-6 {
            YAW_OF_REPOSE_SCALE * (t_x_g.norm() / (air_speed * align_rate))
        } else {
            0.0
        };
        let hand = if state.spin_rate() >= 0.0 { 1.0 } else { -1.0 };
        let yor_right = hand * safe_norm(t_x_g, right).dot(&right) * yor;

        // Crosswind jump: high-pass of the lateral sideslip β = u_perp / V.
        let u_perp = u - tangent * u.dot(&tangent);
        let beta_r = u_perp.dot(&right) / (air_speed + 1e-12);
        let beta_u = u_perp.dot(&up_in_plane) / (air_speed + 1e-12);

        let mut beta_eq_right = state.beta_eq_right();
        let mut beta_eq_up = state.beta_eq_up();
        beta_eq_right += a_lp * (beta_r - beta_eq_right);
        beta_eq_up += a_lp * (beta_u - beta_eq_up);
        state.set_beta_eq_right(beta_eq_right);
        state.set_beta_eq_up(beta_eq_up);

        let hp_r = beta_r - beta_eq_right;
        let hp_u = beta_u - beta_eq_up;

        // 90° rotation about the tangent, signed by twist hand.
        let jump_r = JUMP_STRENGTH_SCALE * (hand * (-hp_u));
        let jump_u = JUMP_STRENGTH_SCALE * (hand * hp_r);

        let gain = (q_dyn * s_ref * LIFT_SLOPE_PER_RAD) / state.weight();

        right * (gain * (yor_right + jump_r)) + up_in_plane * (gain * jump_u)
    }
}

/// Muzzle velocity vector from speed and launch angles; positive pitch is
/// up, positive yaw is toward +x.
fn launch_velocity(speed: f64, pitch: f64, yaw: f64) -> Vector3<f64> {
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vector3::new(
        speed * cos_pitch * sin_yaw,
        speed * sin_pitch,
        -speed * cos_pitch * cos_yaw,
    )
}

fn safe_norm(v: Vector3<f64>, fallback: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n > 1e-9 {
        v / n
    } else {
        fallback
    }
}
