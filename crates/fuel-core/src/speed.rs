//! Airspeed conversions in the International Standard Atmosphere.
//!
//! Calibrated and true airspeed are related through the compressible
//! (subsonic) pitot equation, so the conversion stays accurate at cruise
//! Mach numbers.

/// Sea level speed of sound, knots.
pub const SEA_LEVEL_SPEED_OF_SOUND_KT: f64 = 661.4786;
pub const SEA_LEVEL_TEMP_K: f64 = 288.15;
pub const TROPOPAUSE_FT: f64 = 36_089.24;
const LAPSE_RATE_K_PER_FT: f64 = 0.001_981_2;
const TROPOPAUSE_TEMP_K: f64 = 216.65;
/// g / (R * L) for the troposphere.
const PRESSURE_EXPONENT: f64 = 5.255_88;
/// R * T / g at the tropopause, in ft.
const STRATOSPHERE_SCALE_HEIGHT_FT: f64 = 20_805.8;

/// ISA temperature (K) at a pressure altitude (ft).
pub fn isa_temperature_k(alt_ft: f64) -> f64 {
    if alt_ft <= TROPOPAUSE_FT {
        SEA_LEVEL_TEMP_K - LAPSE_RATE_K_PER_FT * alt_ft
    } else {
        TROPOPAUSE_TEMP_K
    }
}

/// Static pressure ratio p / p0.
pub fn pressure_ratio(alt_ft: f64) -> f64 {
    if alt_ft <= TROPOPAUSE_FT {
        (isa_temperature_k(alt_ft) / SEA_LEVEL_TEMP_K).powf(PRESSURE_EXPONENT)
    } else {
        let at_tropopause = (TROPOPAUSE_TEMP_K / SEA_LEVEL_TEMP_K).powf(PRESSURE_EXPONENT);
        at_tropopause * (-(alt_ft - TROPOPAUSE_FT) / STRATOSPHERE_SCALE_HEIGHT_FT).exp()
    }
}

/// Density ratio rho / rho0.
pub fn density_ratio(alt_ft: f64) -> f64 {
    pressure_ratio(alt_ft) * SEA_LEVEL_TEMP_K / isa_temperature_k(alt_ft)
}

pub fn speed_of_sound_kt(alt_ft: f64) -> f64 {
    SEA_LEVEL_SPEED_OF_SOUND_KT * (isa_temperature_k(alt_ft) / SEA_LEVEL_TEMP_K).sqrt()
}

/// Impact pressure over sea level pressure for a calibrated airspeed.
fn impact_pressure_ratio(kcas: f64) -> f64 {
    let m0 = kcas / SEA_LEVEL_SPEED_OF_SOUND_KT;
    (1.0 + 0.2 * m0 * m0).powf(3.5) - 1.0
}

/// Mach number for a calibrated airspeed at a pressure altitude.
pub fn mach(kcas: f64, alt_ft: f64) -> f64 {
    debug_assert!(kcas >= 0.0, "negative airspeed {kcas}");
    let qc_over_p = impact_pressure_ratio(kcas) / pressure_ratio(alt_ft);
    (5.0 * ((qc_over_p + 1.0).powf(2.0 / 7.0) - 1.0)).sqrt()
}

/// True airspeed (kt) from calibrated airspeed (kt) at a pressure altitude (ft).
pub fn ktas(kcas: f64, alt_ft: f64) -> f64 {
    mach(kcas, alt_ft) * speed_of_sound_kt(alt_ft)
}

/// Calibrated airspeed (kt) from true airspeed (kt) at a pressure altitude (ft).
pub fn kcas(ktas: f64, alt_ft: f64) -> f64 {
    debug_assert!(ktas >= 0.0, "negative airspeed {ktas}");
    let m = ktas / speed_of_sound_kt(alt_ft);
    let qc_over_p = (1.0 + 0.2 * m * m).powf(3.5) - 1.0;
    let qc_over_p0 = qc_over_p * pressure_ratio(alt_ft);
    SEA_LEVEL_SPEED_OF_SOUND_KT * (5.0 * ((qc_over_p0 + 1.0).powf(2.0 / 7.0) - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tas_equals_cas_at_sea_level() {
        assert!((ktas(250.0, 0.0) - 250.0).abs() < 1e-9);
        assert!((kcas(400.0, 0.0) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn tas_exceeds_cas_at_altitude() {
        let tas = ktas(280.0, 35_000.0);
        // Textbook value for 280 KCAS at FL350 is about 475 KTAS (M0.82).
        assert!((tas - 475.0).abs() < 5.0, "got {tas}");
        assert!((mach(280.0, 35_000.0) - 0.82).abs() < 0.01);
    }

    #[test]
    fn conversion_inverts() {
        for alt in [0.0, 10_000.0, 36_089.24, 41_000.0] {
            let tas = ktas(300.0, alt);
            assert!((kcas(tas, alt) - 300.0).abs() < 1e-6, "alt {alt}");
        }
    }

    #[test]
    fn atmosphere_is_continuous_at_tropopause() {
        let below = pressure_ratio(TROPOPAUSE_FT - 1e-6);
        let above = pressure_ratio(TROPOPAUSE_FT + 1e-6);
        assert!((below - above).abs() < 1e-6);
        assert!((density_ratio(0.0) - 1.0).abs() < 1e-12);
    }
}
