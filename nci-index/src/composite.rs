//! Composite index assembly and lead-time shifting.

use serde::{Deserialize, Serialize};

/// Shift a series by `lead` positions: `out[i] = series[i + lead]`,
/// zero where that index falls outside the series or is not representable.
pub fn shift(series: &[f64], lead: i64) -> Vec<f64> {
    let n = series.len() as i64;
    (0..n)
        .map(|i| match i.checked_add(lead) {
            Some(j) if (0..n).contains(&j) => series[j as usize],
            _ => 0.0,
        })
        .collect()
}

/// Elementwise `w1*a + w2*b + w3*c`.
pub fn weighted_sum(a: &[f64], b: &[f64], c: &[f64], (w1, w2, w3): (f64, f64, f64)) -> Vec<f64> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((x, y), z)| w1 * x + w2 * y + w3 * z)
        .collect()
}

/// The four output series, aligned to the calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeSeries {
    pub nci: Vec<f64>,
    pub justify: Vec<f64>,
    pub deter: Vec<f64>,
    pub escalate: Vec<f64>,
}

impl CompositeSeries {
    /// Apply the same lead shift to every series.
    pub fn shifted(self, lead: i64) -> Self {
        if lead == 0 {
            return self;
        }
        Self {
            nci: shift(&self.nci, lead),
            justify: shift(&self.justify, lead),
            deter: shift(&self.deter, lead),
            escalate: shift(&self.escalate, lead),
        }
    }

    pub fn len(&self) -> usize {
        self.nci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nci.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_forward_and_back() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(shift(&x, 1), vec![2.0, 3.0, 4.0, 0.0]);
        assert_eq!(shift(&x, -2), vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(shift(&x, 0), x.to_vec());
        assert_eq!(shift(&x, 10), vec![0.0; 4]);
        assert!(shift(&[], 3).is_empty());
    }

    #[test]
    fn test_shift_extreme_lead_zero_fills() {
        let x = [1.0, 2.0, 3.0];
        assert_eq!(shift(&x, i64::MAX), vec![0.0; 3]);
        assert_eq!(shift(&x, i64::MIN), vec![0.0; 3]);
        assert_eq!(shift(&x, i64::MAX - 1), vec![0.0; 3]);
    }

    #[test]
    fn test_weighted_sum() {
        let s = weighted_sum(&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0], (0.4, 0.3, 0.3));
        assert!((s[0] - 0.7).abs() < 1e-12);
        assert!((s[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_moves_all_series() {
        let series = CompositeSeries {
            nci: vec![1.0, 2.0],
            justify: vec![3.0, 4.0],
            deter: vec![5.0, 6.0],
            escalate: vec![7.0, 8.0],
        };
        let s = series.shifted(1);
        assert_eq!(s.nci, vec![2.0, 0.0]);
        assert_eq!(s.justify, vec![4.0, 0.0]);
        assert_eq!(s.deter, vec![6.0, 0.0]);
        assert_eq!(s.escalate, vec![8.0, 0.0]);
    }
}
