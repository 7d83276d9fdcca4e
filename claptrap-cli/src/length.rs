use std::str::FromStr;

use rand::Rng;

use claptrap_core::PhraseLength;

/// Length argument as typed on the command line: `"L"` or `"MIN-MAX"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl FromStr for LengthRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid length {part:?}, expected a number"))
        };
        match s.split_once('-') {
            Some((min, max)) => Ok(Self { min: parse(min)?, max: parse(max)? }),
            None => {
                let length = parse(s)?;
                Ok(Self { min: length, max: length })
            }
        }
    }
}

impl LengthRange {
    /// Draws the minimum uniformly in `min..=max` and keeps `max` as the
    /// upper bound, so phrase lengths spread over the whole range.
    ///
    /// An inverted range is passed through unchanged for the library to
    /// reject.
    pub fn pick<R: Rng>(self, rng: &mut R) -> PhraseLength {
        if self.min > self.max || self.min == 0 {
            return PhraseLength::range(self.min, self.max);
        }
        PhraseLength::range(rng.random_range(self.min..=self.max), self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_single_and_range() {
        assert_eq!("50".parse(), Ok(LengthRange { min: 50, max: 50 }));
        assert_eq!("10-100".parse(), Ok(LengthRange { min: 10, max: 100 }));
        assert!("ten".parse::<LengthRange>().is_err());
        assert!("1-2-3".parse::<LengthRange>().is_err());
    }

    #[test]
    fn picked_minimum_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(8);
        let range = LengthRange { min: 10, max: 20 };
        for _ in 0..100 {
            match range.pick(&mut rng) {
                PhraseLength::Range { min, max } => assert!((10..=20).contains(&min) && max == 20),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_ranges_are_left_for_validation() {
        let mut rng = StdRng::seed_from_u64(0);
        let picked = LengthRange { min: 10, max: 5 }.pick(&mut rng);
        assert!(picked.bounds().is_err());
    }
}
