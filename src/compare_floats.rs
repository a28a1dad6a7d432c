pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Clamp a value into [-1, 1] so it can be fed to asin/acos or sqrt(1 - x^2)
pub(crate) fn clamp_to_unit(value: f64) -> f64 {
    max_of_2(-1.0, min_of_2(1.0, value))
}

/// Replace a denominator whose magnitude is below `epsilon` with `epsilon`, keeping its sign.
/// NaN is passed through untouched.
pub(crate) fn guard_denominator(value: f64, epsilon: f64) -> f64 {
    if value.abs() >= epsilon || value.is_nan() {
        value
    } else if value.is_sign_negative() {
        -epsilon
    } else {
        epsilon
    }
}
