//! Expansion of textual search intervals into candidate value sequences.
//!
//! Two policies exist: a powers-of-two sweep ("min,max", both bounds powers
//! of two) and a linear sweep with an explicit increment ("min,max,step").

use crate::error::TuneError;

/// A parsed search interval for one tuning parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Doubling sweep: min, 2*min, 4*min, ... while <= max.
    PowerOfTwo { min: u32, max: u32 },
    /// Linear sweep: min, min+step, min+2*step, ... while <= max.
    Stepped { min: u32, max: u32, step: u32 },
}

impl Interval {
    /// Parse a "min,max" powers-of-two interval.
    pub fn parse_pow2(text: &str) -> Result<Self, TuneError> {
        let fields = split_fields(text)?;
        if fields.len() != 2 {
            return Err(TuneError::InvalidInterval(format!(
                "expected \"min,max\", got \"{text}\""
            )));
        }
        let (min, max) = (to_bound(fields[0], text)?, to_bound(fields[1], text)?);
        if min > max {
            return Err(TuneError::InvalidInterval(format!(
                "min {min} exceeds max {max} in \"{text}\""
            )));
        }
        if !min.is_power_of_two() || !max.is_power_of_two() {
            return Err(TuneError::InvalidInterval(format!(
                "bounds of \"{text}\" must both be powers of two"
            )));
        }
        Ok(Interval::PowerOfTwo { min, max })
    }

    /// Parse a "min,max,step" linear interval. The step may be omitted and
    /// defaults to 1.
    pub fn parse_stepped(text: &str) -> Result<Self, TuneError> {
        let fields = split_fields(text)?;
        if fields.len() != 2 && fields.len() != 3 {
            return Err(TuneError::InvalidInterval(format!(
                "expected \"min,max[,step]\", got \"{text}\""
            )));
        }
        let (min, max) = (to_bound(fields[0], text)?, to_bound(fields[1], text)?);
        let step = match fields.get(2) {
            Some(&raw) => {
                if raw <= 0 {
                    return Err(TuneError::InvalidInterval(format!(
                        "step must be positive in \"{text}\""
                    )));
                }
                to_bound(raw, text)?
            }
            None => 1,
        };
        if min > max {
            return Err(TuneError::InvalidInterval(format!(
                "min {min} exceeds max {max} in \"{text}\""
            )));
        }
        Ok(Interval::Stepped { min, max, step })
    }

    /// Expand into the ordered sequence of candidate values.
    pub fn expand(&self) -> Vec<u32> {
        let mut values = Vec::new();
        match *self {
            Interval::PowerOfTwo { min, max } => {
                let mut v = min;
                while v <= max {
                    values.push(v);
                    match v.checked_mul(2) {
                        Some(next) => v = next,
                        None => break,
                    }
                }
            }
            Interval::Stepped { min, max, step } => {
                let mut v = min;
                while v <= max {
                    values.push(v);
                    match v.checked_add(step) {
                        Some(next) => v = next,
                        None => break,
                    }
                }
            }
        }
        values
    }
}

fn split_fields(text: &str) -> Result<Vec<i64>, TuneError> {
    text.split(',')
        .map(|f| {
            f.trim()
                .parse::<i64>()
                .map_err(|_| TuneError::InvalidInterval(format!("non-integer field in \"{text}\"")))
        })
        .collect()
}

fn to_bound(raw: i64, text: &str) -> Result<u32, TuneError> {
    if raw < 1 || raw > u32::MAX as i64 {
        return Err(TuneError::InvalidInterval(format!(
            "bound {raw} out of range in \"{text}\""
        )));
    }
    Ok(raw as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow2_expansion_covers_without_overshoot() {
        let seq = Interval::parse_pow2("2,64").unwrap().expand();
        assert_eq!(seq, vec![2, 4, 8, 16, 32, 64]);
        // Maximal coverage: doubling the last element would overshoot.
        let last = *seq.last().unwrap();
        assert!(last * 2 > 64);
    }

    #[test]
    fn pow2_single_point() {
        assert_eq!(Interval::parse_pow2("1,1").unwrap().expand(), vec![1]);
    }

    #[test]
    fn pow2_last_below_max_is_included() {
        assert_eq!(Interval::parse_pow2("4,16").unwrap().expand(), vec![4, 8, 16]);
    }

    #[test]
    fn stepped_expansion_excludes_overshoot() {
        let seq = Interval::parse_stepped("1,1024,16").unwrap().expand();
        assert_eq!(seq.first(), Some(&1));
        assert_eq!(seq[1], 17);
        assert_eq!(seq.last(), Some(&1009));
        assert_eq!(seq.len(), 64);
        assert!(seq.iter().all(|&v| v <= 1024));
    }

    #[test]
    fn stepped_default_step_is_one() {
        assert_eq!(
            Interval::parse_stepped("3,6").unwrap().expand(),
            vec![3, 4, 5, 6]
        );
    }

    #[test]
    fn min_above_max_rejected() {
        assert!(matches!(
            Interval::parse_pow2("64,2"),
            Err(TuneError::InvalidInterval(_))
        ));
        assert!(matches!(
            Interval::parse_stepped("10,5,1"),
            Err(TuneError::InvalidInterval(_))
        ));
    }

    #[test]
    fn non_pow2_bound_rejected() {
        assert!(matches!(
            Interval::parse_pow2("3,64"),
            Err(TuneError::InvalidInterval(_))
        ));
        assert!(matches!(
            Interval::parse_pow2("2,63"),
            Err(TuneError::InvalidInterval(_))
        ));
    }

    #[test]
    fn non_positive_step_rejected() {
        assert!(matches!(
            Interval::parse_stepped("1,10,0"),
            Err(TuneError::InvalidInterval(_))
        ));
        assert!(matches!(
            Interval::parse_stepped("1,10,-4"),
            Err(TuneError::InvalidInterval(_))
        ));
    }

    #[test]
    fn step_beyond_u32_rejected() {
        // A step above u32::MAX must fail the parse, not wrap to zero
        // and expand forever.
        let err = Interval::parse_stepped("1,10,4294967296");
        assert!(matches!(err, Err(TuneError::InvalidInterval(_))));
        assert!(Interval::parse_stepped("1,10,9999999999").is_err());
    }

    #[test]
    fn bound_beyond_u32_rejected() {
        assert!(matches!(
            Interval::parse_stepped("1,4294967296"),
            Err(TuneError::InvalidInterval(_))
        ));
        assert!(Interval::parse_pow2("1,4294967296").is_err());
    }

    #[test]
    fn malformed_text_rejected() {
        assert!(Interval::parse_pow2("2").is_err());
        assert!(Interval::parse_pow2("2,4,8").is_err());
        assert!(Interval::parse_stepped("a,b").is_err());
        assert!(Interval::parse_stepped("1,2,3,4").is_err());
    }
}
