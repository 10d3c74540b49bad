// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Takes a point on the complex plane and
//! repeatedly squares it and adds the original point back, measuring
//! how quickly that number goes to infinity.  That "velocity" is the
//! number the rest of the crate colors.  Points that never reach the
//! bailout radius within the iteration budget are "bounded", and are
//! reported as exactly `max_iterations`.

use num::Complex;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

// |z| > 2, compared squared so the hot loop never takes a root.
const BAILOUT_SQR: f64 = 4.0;

/// True when the point is certainly inside the main cardioid or the
/// period-2 bulb.  Both regions are known to be in the set, so any
/// point found here can skip the iteration altogether.  A false answer
/// promises nothing; the point still has to be iterated.
#[inline]
pub fn in_main_bulbs(point: Complex<f64>) -> bool {
    let y = point.im * point.im;
    let q = y + (point.re - D4) * (point.re - D4);
    q * (q + point.re - D4) <= y * D4 || (point.re + 1.0) * (point.re + 1.0) + y <= D16
}

/// Runs the orbit of `point` and returns the zero-based iteration at
/// which it escaped together with the final value of z, or None if it
/// stayed bounded.
#[inline]
fn orbit(point: Complex<f64>, max_iterations: u32) -> Option<(u32, Complex<f64>)> {
    if in_main_bulbs(point) {
        return None;
    }
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for i in 0..max_iterations {
        z = z * z + point;
        if z.norm_sqr() > BAILOUT_SQR {
            return Some((i, z));
        }
    }
    None
}

/// This is our classic iterator function.  It returns the iteration
/// on which the orbit of `point` left the radius-2 disc, or
/// `max_iterations` if it never did.
pub fn escape_time(point: Complex<f64>, max_iterations: u32) -> u32 {
    match orbit(point, max_iterations) {
        Some((i, _)) => i,
        None => max_iterations,
    }
}

/// The smoothed variant: the same termination rule, but an escaped
/// orbit reports `n + 1 - ln(log2(|z|))`, which varies continuously
/// across the iteration boundaries and takes the banding out of the
/// gradient.  The result is kept inside `[0, max_iterations)` so that
/// it can never be mistaken for a bounded point.
pub fn smooth_escape_time(point: Complex<f64>, max_iterations: u32) -> f64 {
    match orbit(point, max_iterations) {
        Some((i, z)) => {
            let nu = z.norm().log2().ln();
            let ceiling = f64::from(max_iterations) - std::f64::EPSILON * f64::from(max_iterations);
            num::clamp(f64::from(i) + 1.0 - nu, 0.0, ceiling)
        }
        None => f64::from(max_iterations),
    }
}
