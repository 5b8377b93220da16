//! Scale mapping, tick generation and tick label formatting.
//!
//! Tick placement follows the classic 1-2-5 stepping for linear domains and
//! the 1..9 per decade layout for log domains, so the thinning rules applied by
//! the panels see the same tick lists the interactive page used to produce.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return self.r0;
        }
        self.r0 + (v - self.d0) * (self.r1 - self.r0) / span
    }

    /// Extends the domain outwards to whole tick steps.
    pub fn nice(mut self, count: usize) -> Self {
        if let Some(step) = tick_step(self.d0, self.d1, count) {
            self.d0 = (self.d0 / step).floor() * step;
            self.d1 = (self.d1 / step).ceil() * step;
        }
        self
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.d0 <= self.d1 {
            (self.d0, self.d1)
        } else {
            (self.d1, self.d0)
        };
        let Some(step) = tick_step(lo, hi, count) else {
            return vec![lo];
        };
        let start = (lo / step - 1e-9).ceil() * step;
        let stop = (hi / step + 1e-9).floor() * step + step * 0.5;
        let mut out = Vec::new();
        let mut i = 0usize;
        loop {
            let v = start + step * i as f64;
            if v > stop {
                break;
            }
            out.push(clean(v));
            i += 1;
        }
        out
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> Option<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 || count == 0 {
        return None;
    }
    let m = count as f64;
    let mut step = 10f64.powf((span / m).log10().floor());
    let err = m / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    Some(step)
}

// strips float noise such as 0.30000000000000004
fn clean(v: f64) -> f64 {
    (v * 1e12).round() / 1e12
}

/// Base-10 log scale. Domain bounds must be positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        let l0 = self.d0.log10();
        let span = self.d1.log10() - l0;
        if !span.is_finite() || span == 0.0 {
            return self.r0;
        }
        self.r0 + (v.log10() - l0) * (self.r1 - self.r0) / span
    }

    /// Rounds the domain out to whole decades.
    pub fn nice(mut self) -> Self {
        self.d0 = 10f64.powi(self.d0.log10().floor() as i32);
        self.d1 = 10f64.powi(self.d1.log10().ceil() as i32);
        self
    }
}

/// 1..9 times every power of ten, restricted to `[lo, hi]`.
pub fn log_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if !(lo > 0.0) || !hi.is_finite() || hi < lo {
        return Vec::new();
    }
    let i0 = lo.log10().floor() as i32;
    let i1 = hi.log10().ceil() as i32;
    let eps = 1e-9;
    let mut out = Vec::new();
    for i in i0..=i1 {
        let base = 10f64.powi(i);
        for k in 1..10 {
            let v = clean(base * k as f64);
            if v >= lo * (1.0 - eps) && v <= hi * (1.0 + eps) {
                out.push(v);
            }
            if i == i1 {
                break;
            }
        }
    }
    out
}

pub fn is_power_of_ten(v: f64) -> bool {
    if v <= 0.0 {
        return false;
    }
    let l = v.log10();
    (l - l.round()).abs() < 1e-9
}

/// Ordinal rows laid out in equal bands, in first-seen order.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    keys: Vec<usize>,
    step: f64,
}

impl BandScale {
    pub fn new<I: IntoIterator<Item = usize>>(keys: I, total: f64) -> Self {
        let mut seen = Vec::new();
        for k in keys {
            if !seen.contains(&k) {
                seen.push(k);
            }
        }
        let step = if seen.is_empty() {
            0.0
        } else {
            total / seen.len() as f64
        };
        Self { keys: seen, step }
    }

    pub fn band(&self, key: usize) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| *k == key)
            .map(|i| i as f64 * self.step)
    }
}

pub fn format_percent(v: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, v * 100.0)
}

/// Rounds to `places` decimals and prints the shortest representation.
pub fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

pub fn fmt_tick(v: f64) -> String {
    if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else if v.abs() < 10.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.1}", v)
    }
}

const SUPERSCRIPT: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// `10` followed by the exponent in superscript digits, e.g. `10²`.
pub fn format_power_of_ten(v: f64) -> String {
    let exp = v.log10().round() as i64;
    let mut out = String::from("10");
    for c in exp.to_string().chars() {
        match c.to_digit(10) {
            Some(d) => out.push(SUPERSCRIPT[d as usize]),
            None => out.push('⁻'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints() {
        let s = LinearScale::new((0.0, 10.0), (80.0, 800.0));
        assert_eq!(s.map(0.0), 80.0);
        assert_eq!(s.map(10.0), 800.0);
        assert_eq!(s.map(5.0), 440.0);
    }

    #[test]
    fn inverted_range_for_y_axes() {
        let s = LinearScale::new((0.0, 1.0), (100.0, 0.0));
        assert_eq!(s.map(1.0), 0.0);
        assert_eq!(s.map(0.25), 75.0);
    }

    #[test]
    fn linear_ticks_use_round_steps() {
        let s = LinearScale::new((0.0, 0.3), (100.0, 0.0));
        assert_eq!(s.ticks(4), vec![0.0, 0.1, 0.2, 0.3]);
        let s = LinearScale::new((0.0, 1000.0), (0.0, 200.0));
        assert_eq!(s.ticks(10).len(), 11);
    }

    #[test]
    fn nice_extends_to_step() {
        let s = LinearScale::new((0.0, 487.0), (0.0, 200.0)).nice(10);
        assert_eq!(s.map(0.0), 0.0);
        assert_eq!(s.map(500.0), 200.0);
    }

    #[test]
    fn log_ticks_cover_each_decade() {
        assert_eq!(
            log_ticks(5.0, 30.0),
            vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 20.0, 30.0]
        );
        assert_eq!(log_ticks(1.0, 1.0), vec![1.0]);
        assert!(log_ticks(0.0, 10.0).is_empty());
    }

    #[test]
    fn log_nice_rounds_to_decades() {
        let s = LogScale::new((5.0, 500.0), (0.0, 150.0)).nice();
        assert!(s.map(1.0).abs() < 1e-9);
        assert!((s.map(1000.0) - 150.0).abs() < 1e-9);
        assert!((s.map(10.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn band_scale_keeps_first_seen_order() {
        let b = BandScale::new([3, 1, 3, 2], 30.0);
        assert_eq!(b.band(3), Some(0.0));
        assert_eq!(b.band(1), Some(10.0));
        assert_eq!(b.band(2), Some(20.0));
        assert_eq!(b.band(7), None);
    }

    #[test]
    fn percent_and_power_labels() {
        assert_eq!(format_percent(0.05, 1), "5.0%");
        assert_eq!(format_percent(0.0005, 2), "0.05%");
        assert_eq!(format_power_of_ten(100.0), "10²");
        assert_eq!(format_power_of_ten(1.0), "10⁰");
        assert!(is_power_of_ten(1000.0));
        assert!(!is_power_of_ten(500.0));
        assert_eq!(round_to(0.123456, 2), 0.12);
    }
}
