//! The adapter between assembled profiles and the physics kernel.
//!
//! The pipeline carries SI-ish reanalysis units (K, Pa, kg/kg); the kernel
//! speaks hPa, degrees C and g/kg. All unit normalization happens here, at
//! the boundary, so the kernel always receives its expected units.

use tracing::warn;

use crate::error::PiError;
use crate::kernel::{KernelInput, PiKernel};

/// Computes potential intensity for one observation's environment.
///
/// * `sst_k` — sea-surface temperature in K
/// * `surface_pressure_pa` — surface pressure in Pa
/// * `temperature_k` — air temperature per level in K
/// * `specific_humidity_kgkg` — specific humidity per level in kg/kg
/// * `pressure_hpa` — pressure levels in hPa, surface first
/// * `expected_levels` — the configured profile length N
///
/// A negative or non-finite kernel *value* is logged as a data-quality
/// warning but still returned; callers decide whether to discard it. A
/// kernel *failure* is fatal for the observation and propagates as
/// [`PiError::Kernel`] with the inputs echoed.
///
/// # Errors
///
/// Returns [`PiError::ProfileLengthMismatch`] unless all three profile
/// arrays have exactly `expected_levels` entries, and [`PiError::Kernel`]
/// when the kernel raises.
pub fn compute_pi<K: PiKernel>(
    kernel: &K,
    sst_k: f64,
    surface_pressure_pa: f64,
    temperature_k: &[f64],
    specific_humidity_kgkg: &[f64],
    pressure_hpa: &[f64],
    expected_levels: usize,
) -> Result<f64, PiError> {
    if temperature_k.len() != expected_levels
        || specific_humidity_kgkg.len() != expected_levels
        || pressure_hpa.len() != expected_levels
    {
        return Err(PiError::ProfileLengthMismatch {
            expected: expected_levels,
            temperature: temperature_k.len(),
            humidity: specific_humidity_kgkg.len(),
            pressure: pressure_hpa.len(),
        });
    }

    let sst_c = sst_k - 273.15;
    let msl_hpa = surface_pressure_pa / 100.0;
    let temperature_c: Vec<f64> = temperature_k.iter().map(|&t| t - 273.15).collect();
    // Specific humidity q to mixing ratio r = q / (1 - q), then kg/kg -> g/kg.
    let mixing_ratio_gkg: Vec<f64> = specific_humidity_kgkg
        .iter()
        .map(|&q| q / (1.0 - q) * 1000.0)
        .collect();

    let input = KernelInput {
        sst_c,
        msl_hpa,
        pressure_hpa,
        temperature_c: &temperature_c,
        mixing_ratio_gkg: &mixing_ratio_gkg,
    };

    let value = kernel
        .potential_intensity(&input)
        .map_err(|e| PiError::Kernel {
            reason: e.to_string(),
            sst_k,
            surface_pressure_pa,
            n_levels: expected_levels,
        })?;

    if !value.is_finite() || value < 0.0 {
        warn!(
            pi = value,
            sst_k, surface_pressure_pa, "potential intensity is non-physical; returned as-is"
        );
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use approx::assert_relative_eq;

    /// Records the inputs it was handed and returns a fixed value.
    struct ProbeKernel {
        result: Result<f64, KernelError>,
    }

    impl PiKernel for ProbeKernel {
        fn potential_intensity(&self, input: &KernelInput<'_>) -> Result<f64, KernelError> {
            // Unit normalization checks live here: the adapter must hand the
            // kernel degrees C, hPa, and g/kg.
            assert_relative_eq!(input.sst_c, 29.0, epsilon = 1e-9);
            assert_relative_eq!(input.msl_hpa, 1012.0, epsilon = 1e-9);
            assert_relative_eq!(input.temperature_c[0], 25.0, epsilon = 1e-9);
            // q = 0.015 kg/kg -> r = q/(1-q) = 15.228... g/kg
            assert_relative_eq!(input.mixing_ratio_gkg[0], 15.2284264, epsilon = 1e-6);
            self.result.clone()
        }
    }

    fn sample_profile() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            vec![298.15, 290.15, 250.15],
            vec![0.015, 0.008, 0.001],
            vec![1000.0, 850.0, 250.0],
        )
    }

    #[test]
    fn units_normalized_at_the_boundary() {
        let (t, q, p) = sample_profile();
        let kernel = ProbeKernel { result: Ok(70.0) };
        let v = compute_pi(&kernel, 302.15, 101_200.0, &t, &q, &p, 3).unwrap();
        assert_relative_eq!(v, 70.0);
    }

    #[test]
    fn length_mismatch_is_hard_error() {
        let (t, q, p) = sample_profile();
        let kernel = ProbeKernel { result: Ok(70.0) };

        let err = compute_pi(&kernel, 302.15, 101_200.0, &t, &q, &p, 29).unwrap_err();
        assert!(matches!(
            err,
            PiError::ProfileLengthMismatch { expected: 29, .. }
        ));

        let short_q = &q[..2];
        let err = compute_pi(&kernel, 302.15, 101_200.0, &t, short_q, &p, 3).unwrap_err();
        assert!(matches!(err, PiError::ProfileLengthMismatch { .. }));
    }

    #[test]
    fn kernel_failure_propagates_with_context() {
        let (t, q, p) = sample_profile();
        let kernel = ProbeKernel {
            result: Err(KernelError::NonConvergence { iterations: 200 }),
        };
        let err = compute_pi(&kernel, 302.15, 101_200.0, &t, &q, &p, 3).unwrap_err();
        match err {
            PiError::Kernel {
                reason,
                sst_k,
                n_levels,
                ..
            } => {
                assert!(reason.contains("did not converge"));
                assert_relative_eq!(sst_k, 302.15);
                assert_eq!(n_levels, 3);
            }
            other => panic!("expected Kernel error, got {other}"),
        }
    }

    #[test]
    fn negative_value_is_returned_not_raised() {
        let (t, q, p) = sample_profile();
        let kernel = ProbeKernel { result: Ok(-3.0) };
        let v = compute_pi(&kernel, 302.15, 101_200.0, &t, &q, &p, 3).unwrap();
        assert_relative_eq!(v, -3.0);
    }

    #[test]
    fn nan_value_is_returned_not_raised() {
        let (t, q, p) = sample_profile();
        let kernel = ProbeKernel {
            result: Ok(f64::NAN),
        };
        let v = compute_pi(&kernel, 302.15, 101_200.0, &t, &q, &p, 3).unwrap();
        assert!(v.is_nan());
    }
}
