use crate::error::{CoreError, CoreResult};

/// A named value clamped to a range.
///
/// Meters back health bars, cooldowns, and the timers of the event
/// scheduler. The value is kept inside `[minimum, maximum]` by every
/// mutation; the wrapping operations ([`Meter::shift`] and friends)
/// fold overshoot back into the range instead of clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    name: String,
    minimum: f64,
    value: f64,
    maximum: f64,
}

impl Meter {
    /// Create a full meter ranging from zero to `maximum`.
    pub fn new(name: impl Into<String>, maximum: f64) -> CoreResult<Self> {
        Self::with_range(name, 0.0, maximum, maximum)
    }

    /// Create a meter with an explicit range and starting value.
    ///
    /// The value is clamped into the range. An inverted range is
    /// rejected; an empty range (`minimum == maximum`) is allowed but
    /// has no defined ratio.
    pub fn with_range(
        name: impl Into<String>,
        minimum: f64,
        value: f64,
        maximum: f64,
    ) -> CoreResult<Self> {
        let name = name.into();
        if maximum < minimum {
            return Err(CoreError::BadRange {
                name,
                minimum,
                maximum,
            });
        }
        Ok(Self {
            name,
            minimum,
            value: value.clamp(minimum, maximum),
            maximum,
        })
    }

    /// The meter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Lower bound.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Upper bound.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Width of the range.
    pub fn span(&self) -> f64 {
        self.maximum - self.minimum
    }

    /// Set the value, clamped into the range. Returns the stored value.
    pub fn set_value(&mut self, value: f64) -> f64 {
        self.value = value.clamp(self.minimum, self.maximum);
        self.value
    }

    /// Raise the lower bound, re-clamping the value.
    pub fn set_minimum(&mut self, minimum: f64) -> CoreResult<()> {
        if self.maximum < minimum {
            return Err(CoreError::BadRange {
                name: self.name.clone(),
                minimum,
                maximum: self.maximum,
            });
        }
        self.minimum = minimum;
        self.value = self.value.clamp(self.minimum, self.maximum);
        Ok(())
    }

    /// Lower the upper bound, re-clamping the value.
    pub fn set_maximum(&mut self, maximum: f64) -> CoreResult<()> {
        if maximum < self.minimum {
            return Err(CoreError::BadRange {
                name: self.name.clone(),
                minimum: self.minimum,
                maximum,
            });
        }
        self.maximum = maximum;
        self.value = self.value.clamp(self.minimum, self.maximum);
        Ok(())
    }

    /// Set the value to the maximum. Returns the new value.
    pub fn refill(&mut self) -> f64 {
        self.value = self.maximum;
        self.value
    }

    /// Set the value to the minimum. Returns the new value.
    pub fn reset(&mut self) -> f64 {
        self.value = self.minimum;
        self.value
    }

    /// Position of the value inside the range, from 0.0 to 1.0.
    ///
    /// An empty range has no defined ratio and errors.
    pub fn ratio(&self) -> CoreResult<f64> {
        let span = self.span();
        if span == 0.0 {
            return Err(CoreError::ZeroSpan(self.name.clone()));
        }
        Ok((self.value - self.minimum) / span)
    }

    /// `true` when the value sits at the maximum.
    pub fn is_full(&self) -> bool {
        self.value == self.maximum
    }

    /// `true` when the value sits at the minimum.
    pub fn is_empty(&self) -> bool {
        self.value == self.minimum
    }

    /// Move the value by `amount`, wrapping overshoot back into the
    /// range. Returns the new value.
    pub fn shift(&mut self, amount: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return self.value;
        }
        let moved = self.value + amount;
        if moved > self.maximum || moved < self.minimum {
            self.value = self.minimum + (moved - self.minimum).rem_euclid(span);
        } else {
            self.value = moved;
        }
        self.value
    }

    /// Step the value up by one, wrapping past the maximum.
    pub fn next(&mut self) -> f64 {
        self.shift(1.0)
    }

    /// Step the value down by one, wrapping past the minimum.
    pub fn prev(&mut self) -> f64 {
        self.shift(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_meter_starts_full() {
        let meter = Meter::new("health", 10.0).unwrap();
        assert_eq!(meter.value(), 10.0);
        assert!(meter.is_full());
        assert_eq!(meter.span(), 10.0);
    }

    #[test]
    fn inverted_range_rejected() {
        let err = Meter::with_range("broken", 5.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, CoreError::BadRange { .. }));
    }

    #[test]
    fn set_value_clamps() {
        let mut meter = Meter::new("health", 10.0).unwrap();
        assert_eq!(meter.set_value(-3.0), 0.0);
        assert_eq!(meter.set_value(99.0), 10.0);
        assert_eq!(meter.set_value(4.5), 4.5);
    }

    #[test]
    fn ratio_of_empty_range_errors() {
        let meter = Meter::with_range("flat", 3.0, 3.0, 3.0).unwrap();
        assert!(matches!(meter.ratio(), Err(CoreError::ZeroSpan(_))));
    }

    #[test]
    fn ratio_measures_position() {
        let mut meter = Meter::with_range("gauge", 10.0, 15.0, 20.0).unwrap();
        assert_eq!(meter.ratio().unwrap(), 0.5);
        meter.reset();
        assert_eq!(meter.ratio().unwrap(), 0.0);
        meter.refill();
        assert_eq!(meter.ratio().unwrap(), 1.0);
    }

    #[test]
    fn shift_wraps_past_the_maximum() {
        let mut meter = Meter::with_range("frame", 0.0, 3.0, 4.0).unwrap();
        assert_eq!(meter.next(), 4.0);
        assert_eq!(meter.next(), 1.0);
        assert_eq!(meter.prev(), 0.0);
        assert_eq!(meter.prev(), 3.0);
    }

    #[test]
    fn shift_inside_the_range_is_plain_addition() {
        let mut meter = Meter::new("gauge", 10.0).unwrap();
        meter.set_value(2.0);
        assert_eq!(meter.shift(3.5), 5.5);
    }

    proptest! {
        #[test]
        fn shift_never_escapes_the_range(
            start in 0.0..100.0f64,
            amount in -1000.0..1000.0f64,
        ) {
            let mut meter = Meter::new("gauge", 100.0).unwrap();
            meter.set_value(start);
            let value = meter.shift(amount);
            prop_assert!(value >= meter.minimum());
            prop_assert!(value <= meter.maximum());
        }

        #[test]
        fn ratio_stays_normalized(value in -50.0..150.0f64) {
            let mut meter = Meter::new("gauge", 100.0).unwrap();
            meter.set_value(value);
            let ratio = meter.ratio().unwrap();
            prop_assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
