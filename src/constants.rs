//! Physical constants used throughout the engine, in SI base units.

/// Gravitational acceleration in m/s² (standard value at sea level)
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Standard air density at sea level, 15°C (kg/m³)
pub const STANDARD_AIR_DENSITY: f64 = 1.225;

/// Conversion factor: meters per second to feet per second
pub const MPS_TO_FPS: f64 = 3.28084;

/// Conversion factor: feet per second to meters per second
pub const FPS_TO_MPS: f64 = 0.3048;

/// ICAO standard temperature at sea level (K)
pub const TEMPERATURE_STANDARD_K: f64 = 288.15;

/// Standard atmospheric pressure at sea level (Pa)
pub const PRESSURE_STANDARD_PA: f64 = 101_325.0;

/// Temperature lapse rate in the troposphere (K/m)
pub const TEMPERATURE_LAPSE_RATE: f64 = -0.0065;

/// Atmospheric scale height for the barometric pressure formula (m)
pub const PRESSURE_SCALE_HEIGHT: f64 = 8400.0;

/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT_UNIVERSAL: f64 = 8.314;

/// Molar mass of dry air (kg/mol)
pub const MOLAR_MASS_DRY_AIR: f64 = 0.02897;

/// Heat capacity ratio for air (dimensionless)
pub const HEAT_CAPACITY_RATIO_AIR: f64 = 1.4;

/// Conversion factor: miles per hour to meters per second
pub const MPH_TO_MPS: f64 = 0.44704;

/// Conversion factor: yards to meters
pub const YARDS_TO_METERS: f64 = 0.9144;

/// Minimum threshold for preventing division by zero
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

/// Minimum threshold for velocity magnitudes treated as nonzero
pub const MIN_VELOCITY_THRESHOLD: f64 = 1e-6;
