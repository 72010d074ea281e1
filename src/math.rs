// Arithmetic and statistics primitives with explicit failure modes.
//
// The aggregate calculator builds on these; each primitive reports invalid
// input through `MathError` and leaves the skip-or-propagate decision to
// the caller.
use crate::errors::MathError;

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Divide `a` by `b`, failing instead of producing an infinity.
pub fn divide(a: f64, b: f64) -> Result<f64, MathError> {
    if b == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

/// Raise `base` to `exp`, rejecting the cases that are undefined over the
/// reals rather than letting `powf` return NaN or an infinity:
/// a negative base with a fractional exponent, or zero with a negative
/// exponent.
pub fn power(base: f64, exp: f64) -> Result<f64, MathError> {
    if base < 0.0 && exp.fract() != 0.0 {
        return Err(MathError::InvalidOperation(format!(
            "negative base {} with non-integer exponent {}",
            base, exp
        )));
    }
    if base == 0.0 && exp < 0.0 {
        return Err(MathError::InvalidOperation(format!(
            "zero base with negative exponent {}",
            exp
        )));
    }
    Ok(base.powf(exp))
}

/// Arithmetic mean of a dataset.
pub fn mean(data: &[f64]) -> Result<f64, MathError> {
    if data.is_empty() {
        return Err(MathError::EmptyInput);
    }
    let sum: f64 = data.iter().copied().sum();
    Ok(sum / data.len() as f64)
}

/// Median of a dataset. Sorts a copy with `partial_cmp`, treating NaN
/// comparisons as equal.
pub fn median(data: &[f64]) -> Result<f64, MathError> {
    if data.is_empty() {
        return Err(MathError::EmptyInput);
    }
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Ok(v[mid])
    } else {
        Ok((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Sample standard deviation (Bessel's correction, N-1 denominator).
pub fn std_dev(data: &[f64]) -> Result<f64, MathError> {
    if data.len() < 2 {
        return Err(MathError::InsufficientData(data.len()));
    }
    let m = mean(data)?;
    let variance: f64 =
        data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (data.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Trial-division primality check. Skips multiples of 2 and 3 by walking
/// candidates of the form 6k +/- 1 up to sqrt(n).
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i: i64 = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
