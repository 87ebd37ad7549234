use crate::diagnostics::note_unformatted;

/// Rewrites a coordinate value so its decimal representation carries
/// exactly six fractional digits.
///
/// Values with more than six fractional digits are rounded through
/// `f64`, so ties follow the binary representation (Rust's `{:.6}`
/// formatting). Shorter fractions are never rounded: they are padded
/// with zeros and a trailing `1` digit up to six places, and integers
/// become `N.000001`. Anything that cannot be handled is returned
/// unchanged.
pub fn format_coord(value: &str) -> String {
    let Some((integer, decimal)) = value.split_once('.') else {
        return format!("{value}.000001");
    };
    if decimal.contains('.') {
        note_unformatted();
        return value.to_string();
    }
    if decimal.len() >= 6 {
        // > 6 rounds, == 6 reformats; both go through the float value.
        match value.parse::<f64>() {
            Ok(v) => format!("{v:.6}"),
            Err(_) => {
                note_unformatted();
                value.to_string()
            }
        }
    } else {
        let zeros = "0".repeat(5 - decimal.len());
        format!("{integer}.{decimal}{zeros}1")
    }
}

/// Applies `func` to `value` n times, feeding each output into the
/// next call. The processing pipeline runs its transforms with n = 2
/// by default; see the `--passes` flag.
pub fn apply_n_times<T>(func: impl Fn(T) -> T, mut value: T, n: usize) -> T {
    for _ in 0..n {
        value = func(value);
    }
    value
}
