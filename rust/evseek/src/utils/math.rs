/// Natural log of `n!` by direct summation.
///
/// Matched-ion counts stay small enough that this never needs a gamma
/// approximation.
pub fn lnfact(n: u16) -> f64 {
    (2..=u64::from(n)).map(|x| (x as f64).ln()).sum()
}

/// Least-squares line through `(xs, ys)`.
///
/// Returns `None` when fewer than two points are given or the x spread is
/// too small to support a slope.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let sx: f64 = xs.iter().sum();
    let sy: f64 = ys.iter().sum();
    let sxx: f64 = xs.iter().map(|x| x * x).sum();
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

    let denom = nf * sxx - sx * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let slope = (nf * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / nf;
    if slope.is_finite() && intercept.is_finite() {
        Some((slope, intercept))
    } else {
        None
    }
}

/// Median of an unsorted sample. Even-length samples average the two middle
/// values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lnfact() {
        assert_eq!(lnfact(0), 0.0);
        assert_eq!(lnfact(1), 0.0);
        assert!((lnfact(3) - 6.0f64.ln()).abs() < 1e-12);
        assert!((lnfact(5) - 120.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_linear_fit_recovers_line() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| -2.0 * x + 0.5).collect();
        let (slope, intercept) = linear_fit(&xs, &ys).unwrap();
        assert!((slope - -2.0).abs() < 1e-9);
        assert!((intercept - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(linear_fit(&[1.0], &[1.0]).is_none());
        // No x spread, no slope.
        assert!(linear_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
