//! Named constants and unary math functions available inside expressions.
//!
//! Both tables are built once and never mutated. Names are matched
//! case-insensitively, and an optional `Math.` qualifier is accepted so that
//! `Math.PI` and `PI` resolve to the same entry.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::f64::consts;

/// Qualifier that may prefix any constant or function name.
pub const NAMESPACE_PREFIX: &str = "Math.";

/// Golden ratio, (1 + sqrt(5)) / 2.
const PHI: f64 = 1.618_033_988_749_895;

pub type UnaryFn = fn(f64) -> f64;

lazy_static! {
    static ref CONSTANTS: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert("pi", consts::PI);
        m.insert("e", consts::E);
        m.insert("phi", PHI);
        m.insert("tau", consts::TAU);
        m.insert("sqrt2", consts::SQRT_2);
        m.insert("sqrt1_2", consts::FRAC_1_SQRT_2);
        m.insert("ln2", consts::LN_2);
        m.insert("ln10", consts::LN_10);
        m.insert("log2e", consts::LOG2_E);
        m.insert("log10e", consts::LOG10_E);
        m
    };

    static ref FUNCTIONS: HashMap<&'static str, UnaryFn> = {
        let mut m: HashMap<&'static str, UnaryFn> = HashMap::new();
        m.insert("sqrt", f64::sqrt);
        m.insert("cbrt", f64::cbrt);
        m.insert("sin", f64::sin);
        m.insert("cos", f64::cos);
        m.insert("tan", f64::tan);
        m.insert("asin", f64::asin);
        m.insert("acos", f64::acos);
        m.insert("atan", f64::atan);
        m.insert("sinh", f64::sinh);
        m.insert("cosh", f64::cosh);
        m.insert("tanh", f64::tanh);
        m.insert("asinh", f64::asinh);
        m.insert("acosh", f64::acosh);
        m.insert("atanh", f64::atanh);
        m.insert("log", f64::ln);
        m.insert("ln", f64::ln);
        m.insert("log10", f64::log10);
        m.insert("log2", f64::log2);
        m.insert("exp", f64::exp);
        m.insert("abs", f64::abs);
        m.insert("floor", f64::floor);
        m.insert("ceil", f64::ceil);
        m.insert("round", f64::round);
        m.insert("trunc", f64::trunc);
        m.insert("sign", sign);
        m
    };
}

/// `f64::signum` maps 0 to 1; a calculator expects 0.
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

/// Strip the namespace qualifier and normalise case.
fn normalize(name: &str) -> String {
    name.strip_prefix(NAMESPACE_PREFIX)
        .unwrap_or(name)
        .to_ascii_lowercase()
}

/// Look up a named constant.
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS.get(normalize(name).as_str()).copied()
}

/// Look up a unary function.
pub fn function(name: &str) -> Option<UnaryFn> {
    FUNCTIONS.get(normalize(name).as_str()).copied()
}

/// All constant names, sorted, for help output.
pub fn constant_names() -> Vec<&'static str> {
    let mut names: Vec<_> = CONSTANTS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// All function names, sorted, for help output.
pub fn function_names() -> Vec<&'static str> {
    let mut names: Vec<_> = FUNCTIONS.keys().copied().collect();
    names.sort_unstable();
    names
}
