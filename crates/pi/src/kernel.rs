//! The potential-intensity physics kernel.
//!
//! The kernel contract is a pure function from a thermodynamic environment
//! to a maximum sustainable wind speed. The default implementation follows
//! the Bister & Emanuel (2002) formulation: parcel CAPE computed by
//! entropy-conserving pseudoadiabatic ascent, an iteration for the minimum
//! central pressure, and the Ck/Cd surface-exchange ratio with dissipative
//! heating through the ratio of sea-surface to outflow temperature.

use crate::error::KernelError;

const T0C: f64 = 273.15;
/// Heat capacity of dry air at constant pressure (J/kg/K).
const CPD: f64 = 1005.7;
/// Heat capacity of liquid water (J/kg/K).
const CL: f64 = 4190.0;
/// Linear decrease of latent heat with temperature (J/kg/K).
const CPVMCL: f64 = 2320.0;
/// Gas constant of water vapour (J/kg/K).
const RV: f64 = 461.5;
/// Gas constant of dry air (J/kg/K).
const RD: f64 = 287.04;
/// Ratio of gas constants RD/RV.
const EPS: f64 = 0.622;
/// Latent heat of vaporization at 0 degrees C (J/kg).
const ALV0: f64 = 2.501e6;

/// SST below which no potential intensity is computed; the thermodynamic
/// disequilibrium that drives a TC does not exist over such water.
const MIN_SST_C: f64 = 5.0;

/// Pressure-iteration convergence tolerance (hPa).
const PRESSURE_TOL_HPA: f64 = 0.2;
/// Central pressures below this indicate a runaway (hypercane) solution.
const MIN_CENTRAL_PRESSURE_HPA: f64 = 400.0;

/// Thermodynamic input to the kernel, in the kernel's native units.
#[derive(Debug, Clone, Copy)]
pub struct KernelInput<'a> {
    /// Sea-surface temperature in degrees C.
    pub sst_c: f64,
    /// Sea-level (surface) pressure in hPa.
    pub msl_hpa: f64,
    /// Pressure levels in hPa, surface first, strictly decreasing.
    pub pressure_hpa: &'a [f64],
    /// Air temperature per level in degrees C.
    pub temperature_c: &'a [f64],
    /// Water-vapour mixing ratio per level in g/kg.
    pub mixing_ratio_gkg: &'a [f64],
}

/// A pure, side-effect-free potential-intensity computation.
///
/// Implementations return the maximum sustainable surface wind in m/s, NaN
/// when the environment admits no potential intensity (e.g. cold water),
/// and an error when inputs are invalid or an iteration fails.
pub trait PiKernel {
    /// Computes potential intensity for one environment.
    fn potential_intensity(&self, input: &KernelInput<'_>) -> Result<f64, KernelError>;
}

/// Bister & Emanuel (2002) CAPE-based potential intensity.
#[derive(Debug, Clone)]
pub struct BisterEmanuel {
    /// Ratio of enthalpy to momentum surface-exchange coefficients.
    ckcd: f64,
    /// Reduction factor from gradient to 10 m surface wind.
    v_reduc: f64,
    /// Whether dissipative heating scales the exchange term by Ts/T0.
    dissipative_heating: bool,
}

impl BisterEmanuel {
    /// Creates a kernel with the standard parameters: Ck/Cd = 0.9,
    /// gradient-to-surface reduction 0.8, dissipative heating on.
    pub fn new() -> Self {
        Self {
            ckcd: 0.9,
            v_reduc: 0.8,
            dissipative_heating: true,
        }
    }

    /// Sets the Ck/Cd exchange-coefficient ratio.
    pub fn with_ckcd(mut self, ckcd: f64) -> Self {
        self.ckcd = ckcd;
        self
    }

    /// Sets the gradient-to-surface wind reduction factor.
    pub fn with_v_reduc(mut self, v_reduc: f64) -> Self {
        self.v_reduc = v_reduc;
        self
    }

    /// Enables or disables dissipative heating.
    pub fn with_dissipative_heating(mut self, on: bool) -> Self {
        self.dissipative_heating = on;
        self
    }
}

impl Default for BisterEmanuel {
    fn default() -> Self {
        Self::new()
    }
}

impl PiKernel for BisterEmanuel {
    fn potential_intensity(&self, input: &KernelInput<'_>) -> Result<f64, KernelError> {
        validate(input)?;

        if input.sst_c < MIN_SST_C {
            return Ok(f64::NAN);
        }

        let sst_k = input.sst_c + T0C;
        let t_k: Vec<f64> = input.temperature_c.iter().map(|&t| t + T0C).collect();
        let r_kg: Vec<f64> = input
            .mixing_ratio_gkg
            .iter()
            .map(|&r| (r / 1000.0).max(0.0))
            .collect();
        let p = input.pressure_hpa;

        // CAPE of the environmental near-surface parcel at ambient pressure.
        let cape_env = cape(t_k[0], r_kg[0], input.msl_hpa, &t_k, &r_kg, p)?.cape;

        // Iterate the minimum central pressure: the parcel at the radius of
        // maximum wind sits at lower pressure, which raises its CAPE, which
        // deepens the pressure again until self-consistent.
        let mut pm = 970.0_f64.min(input.msl_hpa - 1.0);
        for iteration in 0..200 {
            let cape_m = cape(t_k[0], r_kg[0], pm, &t_k, &r_kg, p)?;
            let rs = saturation_mixing_ratio(input.sst_c, pm);
            let cape_ms = cape(sst_k, rs, pm, &t_k, &r_kg, p)?;

            let rat = if self.dissipative_heating {
                sst_k / cape_ms.outflow_temp_k
            } else {
                1.0
            };

            let tv_env = virtual_temp(t_k[0], r_kg[0]);
            let tv_sst = virtual_temp(sst_k, rs);
            let tv_av = 0.5 * (tv_env + tv_sst);

            let cat = (cape_m.cape - cape_env
                + 0.5 * self.ckcd * rat * (cape_ms.cape - cape_m.cape))
                .max(0.0);
            let pnew = input.msl_hpa * (-cat / (RD * tv_av)).exp();

            if pnew < MIN_CENTRAL_PRESSURE_HPA {
                return Err(KernelError::NonConvergence {
                    iterations: iteration,
                });
            }

            if (pnew - pm).abs() < PRESSURE_TOL_HPA {
                let fac = (cape_ms.cape - cape_m.cape).max(0.0);
                return Ok(self.v_reduc * (self.ckcd * rat * fac).sqrt());
            }
            pm = pnew;
        }

        Err(KernelError::NonConvergence { iterations: 200 })
    }
}

/// CAPE of a lifted parcel and the outflow (neutral-buoyancy) temperature.
struct CapeResult {
    cape: f64,
    outflow_temp_k: f64,
}

/// Computes CAPE of a parcel with temperature `tp` (K), mixing ratio `rp`
/// (kg/kg) at pressure `pp` (hPa), lifted through the environment
/// `(t, r, p)` (surface first).
///
/// Below the lifting condensation level the parcel follows a dry adiabat;
/// above it, its temperature at each level solves conservation of moist
/// entropy by Newton iteration. Buoyancy uses virtual temperature with
/// water loading; the positive and negative areas are integrated in log
/// pressure up to the level of neutral buoyancy.
fn cape(
    tp: f64,
    rp: f64,
    pp: f64,
    t: &[f64],
    r: &[f64],
    p: &[f64],
) -> Result<CapeResult, KernelError> {
    let n = p.len();
    let default_outflow = t[n - 1];

    if rp < 1.0e-6 {
        return Ok(CapeResult {
            cape: 0.0,
            outflow_temp_k: default_outflow,
        });
    }

    let tpc = tp - T0C;
    let esp = saturation_vapor_pressure(tpc);
    let evp = rp * pp / (EPS + rp);
    let rh = (evp / esp).min(1.0);
    if rh <= 0.0 {
        return Ok(CapeResult {
            cape: 0.0,
            outflow_temp_k: default_outflow,
        });
    }

    // Moist entropy of the parcel at origin.
    let alv = ALV0 - CPVMCL * tpc;
    let s = (CPD + rp * CL) * tp.ln() - RD * (pp - evp).ln() + alv * rp / tp
        - rp * RV * rh.ln();

    // Lifting condensation level (Emanuel's empirical form).
    let chi = tp / (1669.0 - 122.0 * rh - tp);
    let plcl = pp * rh.powf(chi);

    let mut tvrdif = vec![0.0; n];
    for j in 0..n {
        if p[j] > pp {
            // Below the parcel origin: no contribution.
            continue;
        }
        let tv_env = virtual_temp(t[j], r[j]);
        if p[j] >= plcl {
            // Unsaturated: dry adiabatic ascent at constant mixing ratio.
            let tg = tp * (p[j] / pp).powf(RD / CPD);
            tvrdif[j] = virtual_temp(tg, rp) - tv_env;
        } else {
            // Saturated: invert the entropy equation for parcel temperature.
            let tg = solve_saturated_temperature(s, rp, p[j], t[j])?;
            let rg = saturation_mixing_ratio(tg - T0C, p[j]);
            // Water loading: total water rp stays with the parcel.
            let tlvr = tg * (1.0 + rg / EPS) / (1.0 + rp);
            tvrdif[j] = tlvr - tv_env;
        }
    }

    // Highest level with positive buoyancy.
    let Some(inb) = (0..n).rev().find(|&j| tvrdif[j] > 0.0) else {
        return Ok(CapeResult {
            cape: 0.0,
            outflow_temp_k: default_outflow,
        });
    };
    if inb == 0 {
        return Ok(CapeResult {
            cape: 0.0,
            outflow_temp_k: default_outflow,
        });
    }

    let mut positive_area = 0.0;
    let mut negative_area = 0.0;
    for j in 1..=inb {
        let pfac = RD * (tvrdif[j] + tvrdif[j - 1]) * (p[j - 1] - p[j]) / (p[j] + p[j - 1]);
        positive_area += pfac.max(0.0);
        negative_area -= pfac.min(0.0);
    }

    // Residual positive area between the last buoyant level and the
    // interpolated level of neutral buoyancy.
    let mut outflow_temp_k = t[inb];
    if inb < n - 1 {
        let denom = tvrdif[inb] - tvrdif[inb + 1];
        if denom > 0.0 {
            let plnb = (p[inb + 1] * tvrdif[inb] - p[inb] * tvrdif[inb + 1]) / denom;
            positive_area += RD * tvrdif[inb] * (p[inb] - plnb) / (p[inb] + plnb);
            outflow_temp_k = t[inb] * (plnb / p[inb]).powf(RD / CPD);
        }
    }

    Ok(CapeResult {
        cape: (positive_area - negative_area).max(0.0),
        outflow_temp_k,
    })
}

/// Newton-iterates the saturated parcel temperature at pressure `p_hpa`
/// whose moist entropy equals `s`, starting from the environment
/// temperature.
fn solve_saturated_temperature(
    s: f64,
    rp: f64,
    p_hpa: f64,
    t_first_guess: f64,
) -> Result<f64, KernelError> {
    const MAX_ITER: usize = 500;
    const TOL_K: f64 = 0.001;

    let mut tg = t_first_guess;
    for _ in 0..MAX_ITER {
        let tc = tg - T0C;
        let es = saturation_vapor_pressure(tc);
        if es >= p_hpa {
            return Err(KernelError::InvalidInput {
                reason: format!(
                    "saturation vapor pressure {es:.1} hPa exceeds level pressure {p_hpa:.1} hPa"
                ),
            });
        }
        let rg = EPS * es / (p_hpa - es);
        let alv = ALV0 - CPVMCL * tc;
        let sl = (CPD + rp * CL) * tg.ln() - RD * (p_hpa - es).ln() + alv * rg / tg;
        let slope = (CPD + rp * CL + alv * alv * rg / (RV * tg * tg)) / tg;
        let tg_new = tg + (s - sl) / slope;
        if (tg_new - tg).abs() < TOL_K {
            return Ok(tg_new);
        }
        tg = tg_new;
    }
    Err(KernelError::NonConvergence {
        iterations: MAX_ITER,
    })
}

/// Saturation vapor pressure over liquid water (hPa), Bolton (1980).
fn saturation_vapor_pressure(t_c: f64) -> f64 {
    6.112 * (17.67 * t_c / (243.5 + t_c)).exp()
}

/// Saturation mixing ratio (kg/kg) at temperature `t_c` and pressure
/// `p_hpa`.
fn saturation_mixing_ratio(t_c: f64, p_hpa: f64) -> f64 {
    let es = saturation_vapor_pressure(t_c);
    EPS * es / (p_hpa - es)
}

/// Virtual temperature (K) of air at `t_k` with mixing ratio `r` (kg/kg).
fn virtual_temp(t_k: f64, r: f64) -> f64 {
    t_k * (1.0 + r / EPS) / (1.0 + r)
}

fn validate(input: &KernelInput<'_>) -> Result<(), KernelError> {
    let n = input.pressure_hpa.len();
    if n < 3 {
        return Err(KernelError::InvalidInput {
            reason: format!("profile needs at least 3 levels, got {n}"),
        });
    }
    if input.temperature_c.len() != n || input.mixing_ratio_gkg.len() != n {
        return Err(KernelError::InvalidInput {
            reason: format!(
                "profile arrays differ in length: pressure {n}, temperature {}, mixing ratio {}",
                input.temperature_c.len(),
                input.mixing_ratio_gkg.len()
            ),
        });
    }
    if !input.sst_c.is_finite() || !input.msl_hpa.is_finite() || input.msl_hpa <= 0.0 {
        return Err(KernelError::InvalidInput {
            reason: format!(
                "non-physical surface state: sst {} C, pressure {} hPa",
                input.sst_c, input.msl_hpa
            ),
        });
    }
    if !input
        .pressure_hpa
        .windows(2)
        .all(|w| w[0] > w[1] && w[1] > 0.0)
    {
        return Err(KernelError::InvalidInput {
            reason: "pressure levels must be strictly decreasing and positive".to_string(),
        });
    }
    for j in 0..n {
        if !input.temperature_c[j].is_finite() || !input.mixing_ratio_gkg[j].is_finite() {
            return Err(KernelError::InvalidInput {
                reason: format!("non-finite profile value at level {j}"),
            });
        }
    }
    Ok(())
}
