//! Splash screen: the wordmark fades in, then the app moves on to login

use greenhouse_animation::{
    Animation, AnimationId, AnimationStatus, Driver, Easing, Orchestrator, Result, ValueId,
};
use tracing::debug;

use crate::config::SplashConfig;
use crate::frame::{ElementStyle, Frame};
use crate::screen::{mount_with, read_or, Screen, ScreenEvent};

pub struct SplashScreen {
    session: Orchestrator,
    opacity: ValueId,
    /// Pending hand-off; cleared once it fires or the screen unmounts
    timer: Option<AnimationId>,
    next: String,
}

impl SplashScreen {
    pub const NAME: &'static str = "splash";

    pub fn mount(driver: &mut Driver, config: &SplashConfig) -> Result<Self> {
        let (session, (opacity, timer)) = mount_with(driver, Self::NAME, |session, driver| {
            let opacity = session.create_value(driver, 0.0)?;
            session.start(
                driver,
                &Animation::timing(opacity, 1.0, config.fade_ms, Easing::EaseInOut)?,
            )?;
            let timer = session.start(driver, &Animation::delay(config.navigate_after_ms)?)?;
            Ok((opacity, timer))
        })?;

        Ok(Self {
            session,
            opacity,
            timer: Some(timer),
            next: config.next.clone(),
        })
    }
}

impl Screen for SplashScreen {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn frame(&self, driver: &Driver) -> Frame {
        let frame = Frame::new(Self::NAME, driver.now_ms());
        if !self.session.is_active() {
            return frame;
        }
        frame.with(
            "title",
            ElementStyle::default().faded(read_or(driver, self.opacity, 0.0)),
        )
    }

    fn press(&mut self, _driver: &mut Driver, _target: &str) -> Result<bool> {
        Ok(false)
    }

    fn poll(&mut self, driver: &mut Driver) -> Vec<ScreenEvent> {
        match self.timer {
            Some(timer) if driver.status(timer) == Some(AnimationStatus::Completed) => {
                self.timer = None;
                debug!(to = %self.next, "splash finished");
                vec![ScreenEvent::Navigate {
                    to: self.next.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn unmount(&mut self, driver: &mut Driver) {
        self.timer = None;
        self.session.cancel(driver);
    }
}
