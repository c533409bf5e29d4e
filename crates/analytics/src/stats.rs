//! Pure statistics over `f64` price and return series.
//!
//! Every function returns `None` when its result is undefined for the input
//! (too few points, zero denominators). Callers decide what to substitute.

use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Standard deviations below this are treated as zero.
pub(crate) const ZERO_STD: f64 = 1e-12;

/// Simple bar-over-bar returns. The first bar has no return, so the output is
/// one element shorter than the input.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Sample covariance of two equally long series.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let (ma, mb) = (mean(a)?, mean(b)?);
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    Some(sum / (a.len() - 1) as f64)
}

/// The most negative peak-to-trough decline as a fraction (`<= 0`).
///
/// The running maximum is tracked bar by bar, so a recovered dip still counts.
pub fn max_drawdown(closes: &[f64]) -> Option<f64> {
    let mut peak = *closes.first()?;
    let mut worst = 0.0_f64;

    for close in closes {
        if *close > peak {
            peak = *close;
        }
        let drawdown = (close - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
        if !drawdown.is_finite() {
            return None;
        }
    }
    Some(worst)
}

/// Annualised Sharpe ratio of daily returns against a daily risk-free rate.
pub fn sharpe_ratio(returns: &[f64], risk_free_daily: f64, periods_per_year: f64) -> Option<f64> {
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_daily).collect();
    let std = sample_std(&excess)?;
    if std < ZERO_STD {
        return None;
    }
    Some(mean(&excess)? / std * periods_per_year.sqrt())
}

/// Simple moving average of the trailing `period` closes, or `None` when the
/// series is shorter than the window.
pub fn trailing_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let mut sma = Sma::new(period).ok()?;
    let mut last = None;
    // Only the tail matters; the indicator is primed with exactly one window.
    for close in &closes[closes.len() - period..] {
        last = Some(sma.next(*close));
    }
    last
}

/// Relative Strength Index from simple rolling averages of gains and losses
/// over the last `period` bar-over-bar changes.
///
/// Returns `None` with fewer than `period + 1` closes or when there was no
/// movement at all in the window. A window with gains but no losses is 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - period - 1..];
    let (mut gains, mut losses) = (0.0_f64, 0.0_f64);
    for w in window.windows(2) {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Compound annual growth rate as a fraction.
pub fn cagr(start: f64, end: f64, years: f64) -> Option<f64> {
    if years <= 0.0 {
        return None;
    }
    let growth = (end / start).powf(1.0 / years) - 1.0;
    growth.is_finite().then_some(growth)
}

/// Rounds half away from zero to `dp` decimal places and clears negative zero.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10_f64.powi(dp);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn returns_skip_first_bar() {
        let r = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!(approx(r[0], 0.10));
        assert!(approx(r[1], -0.10));
        assert!(daily_returns(&[100.0]).is_empty());
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(approx(std, (5.0_f64 / 3.0).sqrt()));
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]).unwrap();
        assert!(approx(dd, -0.25));
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), Some(0.0));
        assert_eq!(max_drawdown(&[]), None);
    }

    #[test]
    fn drawdown_with_zero_peak_is_undefined() {
        assert_eq!(max_drawdown(&[0.0, 0.0]), None);
    }

    #[test]
    fn sharpe_undefined_without_dispersion() {
        assert!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0, 252.0).is_none());
        assert!(sharpe_ratio(&[0.01], 0.0, 252.0).is_none());
        let s = sharpe_ratio(&[0.01, 0.03], 0.0, 252.0).unwrap();
        let expected = 0.02 / (0.0002_f64).sqrt() * 252_f64.sqrt();
        assert!(approx(s, expected));
    }

    #[test]
    fn trailing_sma_uses_last_window() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        assert!(approx(trailing_sma(&closes, 20).unwrap(), 20.5));
        assert!(trailing_sma(&closes, 50).is_none());
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        assert!(approx(rsi(&closes, 14).unwrap(), 50.0));
    }

    #[test]
    fn rsi_edge_cases() {
        let rising: Vec<f64> = (0..20).map(f64::from).collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));
        assert_eq!(rsi(&[5.0; 20], 14), None);
        assert_eq!(rsi(&rising[..14], 14), None);
    }

    #[test]
    fn cagr_doubles_over_one_year() {
        assert!(approx(cagr(100.0, 200.0, 1.0).unwrap(), 1.0));
        assert!(approx(cagr(100.0, 121.0, 2.0).unwrap(), 0.1));
        assert!(cagr(0.0, 10.0, 1.0).is_none());
        assert!(cagr(100.0, 110.0, 0.0).is_none());
    }

    #[test]
    fn rounding_clears_negative_zero() {
        assert_eq!(round_dp(-0.0001, 2), 0.0);
        assert!(round_dp(-0.0001, 2).is_sign_positive());
        assert_eq!(round_dp(1.23456, 4), 1.2346);
        assert_eq!(round_dp(2520.0000000000005, 2), 2520.0);
    }
}
