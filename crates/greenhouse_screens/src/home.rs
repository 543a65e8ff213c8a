//! Home screen: pressing the box spins it once around Y and moves on

use greenhouse_animation::{
    Animation, AnimationId, AnimationStatus, Driver, Easing, Interpolation, Orchestrator, Result,
    Unit, ValueId,
};
use tracing::debug;

use crate::config::HomeConfig;
use crate::frame::{Angle, ElementStyle, Frame};
use crate::screen::{mount_with, read_or, Screen, ScreenEvent};

pub struct HomeScreen {
    session: Orchestrator,
    progress: ValueId,
    rotate_y: Interpolation,
    press_ms: f64,
    pending: Option<AnimationId>,
    next: String,
}

impl HomeScreen {
    pub const NAME: &'static str = "home";

    pub fn mount(driver: &mut Driver, config: &HomeConfig) -> Result<Self> {
        let (session, progress) = mount_with(driver, Self::NAME, |session, driver| {
            let progress = session.create_value(driver, 0.0)?;
            // a bad duration fails the mount, not the first press
            Animation::timing(progress, 1.0, config.press_ms, Easing::EaseInOut)?;
            Ok(progress)
        })?;
        let rotate_y = Interpolation::new(&[0.0, 1.0], &[0.0, 360.0])?.with_unit(Unit::Degrees);

        Ok(Self {
            session,
            progress,
            rotate_y,
            press_ms: config.press_ms,
            pending: None,
            next: config.next.clone(),
        })
    }
}

impl Screen for HomeScreen {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn frame(&self, driver: &Driver) -> Frame {
        let frame = Frame::new(Self::NAME, driver.now_ms());
        if !self.session.is_active() {
            return frame;
        }
        let progress = read_or(driver, self.progress, 0.0);
        frame.with(
            "box",
            ElementStyle::default().rotated_y(Angle::degrees(self.rotate_y.eval(progress))),
        )
    }

    fn press(&mut self, driver: &mut Driver, target: &str) -> Result<bool> {
        if target != "box" {
            return Ok(false);
        }
        let spin = Animation::timing(self.progress, 1.0, self.press_ms, Easing::EaseInOut)?;
        self.pending = Some(self.session.drive(driver, &spin)?);
        Ok(true)
    }

    fn poll(&mut self, driver: &mut Driver) -> Vec<ScreenEvent> {
        match self.pending {
            Some(spin) if driver.status(spin) == Some(AnimationStatus::Completed) => {
                self.pending = None;
                debug!(to = %self.next, "home spin finished");
                vec![ScreenEvent::Navigate {
                    to: self.next.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn unmount(&mut self, driver: &mut Driver) {
        self.pending = None;
        self.session.cancel(driver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenhouse_animation::{AnimationError, LifecycleError};

    fn tick_to(driver: &mut Driver, end: f64) {
        let mut t = driver.now_ms();
        while t < end {
            t = (t + 10.0).min(end);
            driver.tick(t);
        }
    }

    fn box_angle(screen: &HomeScreen, driver: &Driver) -> String {
        screen
            .frame(driver)
            .element("box")
            .and_then(|style| style.rotate_y)
            .map(|angle| angle.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_press_spins_then_navigates() {
        let mut driver = Driver::new();
        driver.tick(0.0);
        let mut screen = HomeScreen::mount(&mut driver, &HomeConfig::default()).unwrap();
        assert_eq!(box_angle(&screen, &driver), "0deg");

        assert!(!screen.press(&mut driver, "title").unwrap());
        assert!(screen.press(&mut driver, "box").unwrap());

        tick_to(&mut driver, 250.0);
        assert_eq!(box_angle(&screen, &driver), "180deg");
        assert!(screen.poll(&mut driver).is_empty());

        tick_to(&mut driver, 500.0);
        assert_eq!(box_angle(&screen, &driver), "360deg");
        assert_eq!(
            screen.poll(&mut driver),
            vec![ScreenEvent::Navigate {
                to: "NextScreen".into()
            }]
        );
        screen.unmount(&mut driver);
    }

    #[test]
    fn test_unmount_mid_spin_stays_silent() {
        let mut driver = Driver::new();
        driver.tick(0.0);
        let mut screen = HomeScreen::mount(&mut driver, &HomeConfig::default()).unwrap();
        screen.press(&mut driver, "box").unwrap();
        tick_to(&mut driver, 100.0);
        screen.unmount(&mut driver);

        tick_to(&mut driver, 1000.0);
        assert!(screen.poll(&mut driver).is_empty());
        assert_eq!(
            screen.press(&mut driver, "box").unwrap_err(),
            AnimationError::Lifecycle(LifecycleError::SessionTornDown("home".into()))
        );
    }

    #[test]
    fn test_rejects_negative_duration() {
        let mut driver = Driver::new();
        let config = HomeConfig {
            press_ms: -1.0,
            ..HomeConfig::default()
        };
        assert!(HomeScreen::mount(&mut driver, &config).is_err());
        assert_eq!(driver.value_count(), 0);
    }
}
