//! # Ballistics Kit
//!
//! Exterior-ballistics trajectory engine with procedural turbulent wind
//! generation, for shooting-sports training and analysis tools.
//!
//! Two coupled subsystems:
//!
//! * a trajectory integrator ([`Simulator`]) stepping a spinning projectile
//!   through drag, gravity, spin drift, and crosswind jump, with an
//!   iterative zeroing solver and an interpolated sample buffer
//!   ([`Trajectory`]);
//! * a curl-noise wind generator ([`WindField`]) producing a
//!   divergence-free, RMS-calibrated, advected turbulence field sampled
//!   once per integration step.
//!
//! Everything is synchronous and single-threaded; all public operations
//! use SI units. World frame: x crossrange, y vertical (up), z downrange
//! with negative z pointing downrange.

pub use atmosphere::Atmosphere;
pub use bullet::Bullet;
pub use drag_model::DragModel;
pub use error::BallisticsError;
pub use noise_field::NoiseField;
pub use random::RandomSource;
pub use simulator::{Simulator, ZeroSolution};
pub use trajectory::{Trajectory, TrajectoryPoint};
pub use wind_field::{wind_presets, WindComponent, WindField};

pub mod atmosphere;
pub mod bullet;
pub mod constants;
pub mod drag_model;
pub mod drag_tables;
pub mod error;
pub mod noise_field;
pub mod random;
pub mod simulator;
pub mod trajectory;
pub mod wind_field;
