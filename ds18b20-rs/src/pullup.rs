use core::convert::Infallible;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, ErrorType, OutputPin},
};

/// Placeholder pin type for drivers without a strong pull-up line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPullup;

impl ErrorType for NoPullup {
    type Error = Infallible;
}

impl OutputPin for NoPullup {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Active-high strong pull-up line for parasite-powered devices.
#[derive(Debug)]
pub(crate) struct StrongPullup<P> {
    pin: Option<P>,
}

impl<P> StrongPullup<P> {
    pub(crate) const fn none() -> Self {
        Self { pin: None }
    }

    pub(crate) const fn new(pin: P) -> Self {
        Self { pin: Some(pin) }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.pin.is_some()
    }

    pub(crate) fn release(self) -> Option<P> {
        self.pin
    }
}

impl<P: OutputPin> StrongPullup<P> {
    /// Waits `ms` milliseconds, holding the line high for the whole window when
    /// `parasite` is set and a line is configured.
    ///
    /// The line is always driven low again before returning, including when
    /// asserting it failed.
    pub(crate) fn hold<D: DelayNs>(
        &mut self,
        parasite: bool,
        delay: &mut D,
        ms: u32,
    ) -> Result<(), ErrorKind> {
        let pin = match self.pin.as_mut() {
            Some(pin) if parasite => pin,
            _ => {
                delay.delay_ms(ms);
                return Ok(());
            }
        };
        let asserted = pin.set_high().map_err(|e| e.kind());
        delay.delay_ms(ms);
        let released = pin.set_low().map_err(|e| e.kind());
        if asserted.is_err() || released.is_err() {
            log::warn!("strong pull-up: assert {:?}, release {:?}", asserted, released);
        }
        asserted.and(released)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal_mock::eh1::{
        MockError,
        delay::NoopDelay,
        digital::{Mock as PinMock, State, Transaction},
    };
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn parasite_window_is_paired() {
        let pin = PinMock::new(&[Transaction::set(State::High), Transaction::set(State::Low)]);
        let mut pullup = StrongPullup::new(pin);
        assert_eq!(pullup.hold(true, &mut NoopDelay::new(), 750), Ok(()));
        pullup.release().unwrap().done();
    }

    #[test]
    fn external_power_leaves_line_alone() {
        let pin = PinMock::new(&[]);
        let mut pullup = StrongPullup::new(pin);
        assert_eq!(pullup.hold(false, &mut NoopDelay::new(), 750), Ok(()));
        pullup.release().unwrap().done();
    }

    #[test]
    fn released_even_if_assert_fails() {
        let pin = PinMock::new(&[
            Transaction::set(State::High).with_error(MockError::Io(IoErrorKind::Other)),
            Transaction::set(State::Low),
        ]);
        let mut pullup = StrongPullup::new(pin);
        assert_eq!(
            pullup.hold(true, &mut NoopDelay::new(), 11),
            Err(ErrorKind::Other)
        );
        pullup.release().unwrap().done();
    }

    #[test]
    fn unconfigured_line_only_waits() {
        let mut pullup = StrongPullup::<NoPullup>::none();
        assert!(!pullup.is_configured());
        assert_eq!(pullup.hold(true, &mut NoopDelay::new(), 94), Ok(()));
    }
}
