use std::f64::consts::PI;

use num_complex::Complex64;
use scilib::math::bessel;

use crate::error::BackprojectorError;
use crate::Result;

/// Below this argument `X_ν(x) / x^ν` is replaced by its limit at the origin
const SMALL_ARGUMENT: f64 = 1e-6;

/// Half-integer Bessel orders needed by the blob transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfOrder {
    /// ν = 3/2
    ThreeHalves,
    /// ν = 7/2
    SevenHalves,
}

impl HalfOrder {
    pub fn nu(&self) -> f64 {
        match self {
            HalfOrder::ThreeHalves => 1.5,
            HalfOrder::SevenHalves => 3.5,
        }
    }

    /// Γ(ν + 1)
    fn gamma_nu_plus_one(&self) -> f64 {
        let sqrt_pi = PI.sqrt();
        match self {
            HalfOrder::ThreeHalves => 0.75 * sqrt_pi,
            HalfOrder::SevenHalves => 3.5 * 2.5 * 1.5 * 0.5 * sqrt_pi,
        }
    }
}

/// Modified Bessel function of the first kind, order 0
pub fn bessel_i0(x: f64) -> f64 {
    bessel::i_nu(0.0, Complex64::new(x.abs(), 0.0)).re
}

/// `X_ν(x) / x^ν` where `X` is `I` (modified) or `J`.
///
/// The ratio is finite at the origin, where it equals `1 / (2^ν Γ(ν+1))`.
pub fn bessel_over_power(order: HalfOrder, x: f64, modified: bool) -> f64 {
    let x = x.abs();
    let nu = order.nu();
    if x < SMALL_ARGUMENT {
        return 1.0 / (2.0_f64.powf(nu) * order.gamma_nu_plus_one());
    }
    let value = if modified {
        bessel::i_nu(nu, Complex64::new(x, 0.0)).re
    } else {
        bessel::j_nu(nu, Complex64::new(x, 0.0)).re
    };
    value / x.powf(nu)
}

/// Fourier transform of a generalised Kaiser-Bessel blob at frequency `w`.
///
/// `a` is the blob radius, `alpha` its taper parameter and `m` its order (0 or 2).
pub fn kaiser_fourier_value(w: f64, a: f64, alpha: f64, m: u32) -> Result<f64> {
    let two_pi_aw = 2.0 * PI * a * w;
    let sigma = (alpha * alpha - two_pi_aw * two_pi_aw).abs().sqrt();
    // Past the first zero of the taper the Bessel functions become oscillating
    let modified = two_pi_aw <= alpha;
    let prefactor = (2.0 * PI).powf(1.5) * a.powi(3) / bessel_i0(alpha);

    match m {
        0 => Ok(prefactor * bessel_over_power(HalfOrder::ThreeHalves, sigma, modified)),
        2 => Ok(prefactor
            * alpha
            * alpha
            * bessel_over_power(HalfOrder::SevenHalves, sigma, modified)),
        _ => Err(BackprojectorError::InvalidParameter(format!(
            "blob order must be 0 or 2, got {}",
            m
        ))),
    }
}
