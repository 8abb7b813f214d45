//! ADX (Average Directional Index) indicator

use crate::common::math;
use crate::models::indicators::AdxIndicator;

fn wilder_smooth(previous: f64, value: f64, period: usize) -> f64 {
    previous - previous / period as f64 + value
}

fn directional_index(plus_dm: f64, minus_dm: f64, tr: f64) -> (f64, f64, f64) {
    let (plus_di, minus_di) = if tr > 0.0 {
        (100.0 * plus_dm / tr, 100.0 * minus_dm / tr)
    } else {
        (0.0, 0.0)
    };
    let di_sum = plus_di + minus_di;
    let dx = if di_sum > 0.0 {
        100.0 * (plus_di - minus_di).abs() / di_sum
    } else {
        0.0
    };
    (plus_di, minus_di, dx)
}

/// Calculate ADX with Wilder smoothing
///
/// TR, +DM and -DM are smoothed over `period` bars, DX is derived from the
/// smoothed +DI/-DI, and ADX is the Wilder average of DX. Needs at least
/// `2 * period` bars.
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<AdxIndicator> {
    if period == 0 {
        return None;
    }
    if highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }
    if closes.len() < 2 * period {
        return None;
    }

    let mut tr_values = Vec::with_capacity(closes.len() - 1);
    let mut plus_dm_values = Vec::with_capacity(closes.len() - 1);
    let mut minus_dm_values = Vec::with_capacity(closes.len() - 1);

    for i in 1..closes.len() {
        tr_values.push(math::true_range(highs[i], lows[i], closes[i - 1]));

        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        plus_dm_values.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm_values.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
    }

    let mut smoothed_tr: f64 = tr_values[..period].iter().sum();
    let mut smoothed_plus: f64 = plus_dm_values[..period].iter().sum();
    let mut smoothed_minus: f64 = minus_dm_values[..period].iter().sum();

    let (mut plus_di, mut minus_di, first_dx) =
        directional_index(smoothed_plus, smoothed_minus, smoothed_tr);
    let mut dx_values = vec![first_dx];

    for i in period..tr_values.len() {
        smoothed_tr = wilder_smooth(smoothed_tr, tr_values[i], period);
        smoothed_plus = wilder_smooth(smoothed_plus, plus_dm_values[i], period);
        smoothed_minus = wilder_smooth(smoothed_minus, minus_dm_values[i], period);

        let (p, m, dx) = directional_index(smoothed_plus, smoothed_minus, smoothed_tr);
        plus_di = p;
        minus_di = m;
        dx_values.push(dx);
    }

    if dx_values.len() < period {
        return None;
    }

    let mut adx = dx_values[..period].iter().sum::<f64>() / period as f64;
    for dx in &dx_values[period..] {
        adx = (adx * (period as f64 - 1.0) + dx) / period as f64;
    }

    Some(AdxIndicator {
        adx,
        plus_di,
        minus_di,
        period,
    })
}
