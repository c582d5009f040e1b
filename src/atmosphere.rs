//! Atmospheric conditions supplying air density and speed of sound.

use crate::constants::{
    GAS_CONSTANT_UNIVERSAL, HEAT_CAPACITY_RATIO_AIR, MOLAR_MASS_DRY_AIR,
    PRESSURE_SCALE_HEIGHT, PRESSURE_STANDARD_PA, TEMPERATURE_LAPSE_RATE,
    TEMPERATURE_STANDARD_K,
};
use crate::error::BallisticsError;

/// Atmospheric state for one simulated shot. All values SI.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    temperature: f64, // K
    altitude: f64,    // m
    humidity: f64,    // fraction, 0..=1
    pressure: f64,    // Pa
}

impl Atmosphere {
    /// Custom conditions. A non-positive `pressure` substitutes the
    /// standard barometric pressure for the given altitude.
    pub fn new(
        temperature: f64,
        altitude: f64,
        humidity: f64,
        pressure: f64,
    ) -> Result<Self, BallisticsError> {
        if !(0.0..=1.0).contains(&humidity) {
            return Err("humidity must be between 0.0 and 1.0".into());
        }
        let pressure = if pressure > 0.0 {
            pressure
        } else {
            standard_pressure_at(altitude)
        };
        Ok(Atmosphere {
            temperature,
            altitude,
            humidity,
            pressure,
        })
    }

    /// Standard sea-level conditions: 288.15 K, 50 % humidity.
    pub fn standard() -> Self {
        Atmosphere {
            temperature: TEMPERATURE_STANDARD_K,
            altitude: 0.0,
            humidity: 0.5,
            pressure: standard_pressure_at(0.0),
        }
    }

    /// Standard conditions at altitude, using the tropospheric lapse rate.
    pub fn at_altitude(altitude: f64) -> Self {
        let temperature = TEMPERATURE_STANDARD_K + TEMPERATURE_LAPSE_RATE * altitude;
        Atmosphere {
            temperature,
            altitude,
            humidity: 0.5,
            pressure: standard_pressure_at(altitude),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Air density (kg/m³): ideal gas with a vapor-pressure correction,
    /// `ρ = (P - 0.378 e) / (R_specific T)`.
    pub fn air_density(&self) -> f64 {
        let r_specific = GAS_CONSTANT_UNIVERSAL / MOLAR_MASS_DRY_AIR;
        let t_c = self.temperature - 273.15;
        // Magnus-form saturation vapor pressure
        let e_sat = 611.2 * (17.67 * t_c / (t_c + 243.5)).exp();
        let e = self.humidity * e_sat;
        (self.pressure - 0.378 * e) / (r_specific * self.temperature)
    }

    /// Speed of sound (m/s): `c = sqrt(γ R_specific T)`.
    pub fn speed_of_sound(&self) -> f64 {
        let r_specific = GAS_CONSTANT_UNIVERSAL / MOLAR_MASS_DRY_AIR;
        (HEAT_CAPACITY_RATIO_AIR * r_specific * self.temperature).sqrt()
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Atmosphere::standard()
    }
}

/// Barometric pressure at altitude: `P0 * exp(-h / H)`.
fn standard_pressure_at(altitude: f64) -> f64 {
    PRESSURE_STANDARD_PA * (-altitude / PRESSURE_SCALE_HEIGHT).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_density_near_sea_level_value() {
        let atmo = Atmosphere::standard();
        let density = atmo.air_density();
        assert!((density - 1.225).abs() < 0.01, "density {}", density);
    }

    #[test]
    fn test_standard_speed_of_sound() {
        let atmo = Atmosphere::standard();
        let c = atmo.speed_of_sound();
        assert!((c - 340.0).abs() < 2.0, "speed of sound {}", c);
    }

    #[test]
    fn test_humid_air_less_dense() {
        let dry = Atmosphere::new(288.15, 0.0, 0.0, 0.0).unwrap();
        let humid = Atmosphere::new(288.15, 0.0, 1.0, 0.0).unwrap();
        assert!(humid.air_density() < dry.air_density());
    }

    #[test]
    fn test_density_decreases_with_altitude() {
        let sea = Atmosphere::at_altitude(0.0);
        let high = Atmosphere::at_altitude(3000.0);
        assert!(high.air_density() < sea.air_density());
        assert!(high.temperature() < sea.temperature());
    }

    #[test]
    fn test_invalid_humidity_rejected() {
        assert!(Atmosphere::new(288.15, 0.0, 1.5, 0.0).is_err());
        assert!(Atmosphere::new(288.15, 0.0, -0.1, 0.0).is_err());
    }

    #[test]
    fn test_explicit_pressure_kept() {
        let atmo = Atmosphere::new(288.15, 0.0, 0.5, 95_000.0).unwrap();
        assert_eq!(atmo.pressure(), 95_000.0);
    }
}
