//! Settings screen choreography
//!
//! On mount the header drops in, the list container rises after a short
//! delay, each setting item follows on a stagger, a slow background turn
//! starts and never stops, and the floating action button pops in last.
//! Two gestures layer on top:
//!
//! - `edit_profile`: the edit button pulses while the profile card flips
//!   a few degrees around Y and back
//! - `fab`: the floating action button pulses
//!
//! A gesture only replaces the animations of the values it touches, so the
//! background turn and any unfinished entrance keep running underneath.

use std::f64::consts::TAU;

use greenhouse_animation::{
    Animation, Driver, Easing, Extrapolate, Interpolation, Orchestrator, Result, StaggerPlan,
    Staggered, ValueId,
};

use crate::config::SettingsConfig;
use crate::frame::{Angle, ElementStyle, Frame};
use crate::screen::{mount_with, read_or, Screen, ScreenEvent};

/// One row of the settings list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingItem {
    pub id: &'static str,
    pub title: &'static str,
    pub has_switch: bool,
}

pub const SETTING_ITEMS: [SettingItem; 8] = [
    SettingItem { id: "1", title: "Notifications", has_switch: true },
    SettingItem { id: "2", title: "Privacy", has_switch: false },
    SettingItem { id: "3", title: "Dark Mode", has_switch: true },
    SettingItem { id: "4", title: "Theme", has_switch: false },
    SettingItem { id: "5", title: "Language", has_switch: false },
    SettingItem { id: "6", title: "Backup", has_switch: true },
    SettingItem { id: "7", title: "Help & Support", has_switch: false },
    SettingItem { id: "8", title: "About", has_switch: false },
];

/// Frame element name of a setting item
pub fn item_element(id: &str) -> String {
    format!("item_{id}")
}

/// Press pulse: dip, overshoot, settle
fn pulse(value: ValueId, dip: f64, peak: f64) -> Result<Animation> {
    Animation::sequence([
        Animation::timing(value, dip, 100.0, Easing::EaseInOutQuad)?,
        Animation::timing(value, peak, 100.0, Easing::EaseInOutQuad)?,
        Animation::timing(value, 1.0, 200.0, Easing::EaseInOutQuad)?,
    ])
}

fn card_flip(rotate_y: ValueId) -> Result<Animation> {
    Animation::sequence([
        Animation::timing(rotate_y, 10.0, 200.0, Easing::EaseInOutQuad)?,
        Animation::timing(rotate_y, -10.0, 400.0, Easing::EaseInOutQuad)?,
        Animation::timing(rotate_y, 0.0, 200.0, Easing::EaseInOutQuad)?,
    ])
}

struct Values {
    header: ValueId,
    list: ValueId,
    items: Staggered<&'static str>,
    rotation: ValueId,
    button_scale: ValueId,
    rotate_y: ValueId,
    fab: ValueId,
    fab_scale: ValueId,
}

struct Slides {
    header: Interpolation,
    list: Interpolation,
    item: Interpolation,
}

impl Slides {
    fn new() -> Result<Self> {
        let slide = |from: f64| {
            Interpolation::new(&[0.0, 1.0], &[from, 0.0])
                .map(|i| i.extrapolate(Extrapolate::Extend))
        };
        Ok(Self {
            header: slide(-50.0)?,
            list: slide(100.0)?,
            item: slide(20.0)?,
        })
    }
}

pub struct SettingsScreen {
    session: Orchestrator,
    values: Values,
    slides: Slides,
}

impl SettingsScreen {
    pub const NAME: &'static str = "settings";

    pub fn mount(driver: &mut Driver, config: &SettingsConfig) -> Result<Self> {
        let slides = Slides::new()?;
        let (session, values) = mount_with(driver, Self::NAME, |session, driver| {
            Self::choreograph(session, driver, config)
        })?;
        Ok(Self {
            session,
            values,
            slides,
        })
    }

    fn choreograph(
        session: &mut Orchestrator,
        driver: &mut Driver,
        config: &SettingsConfig,
    ) -> Result<Values> {
        let header = session.create_value(driver, 0.0)?;
        session.start(
            driver,
            &Animation::timing(
                header,
                1.0,
                config.header_ms,
                Easing::EaseOutBack {
                    overshoot: config.header_overshoot,
                },
            )?,
        )?;

        let list = session.create_value(driver, 0.0)?;
        session.start_delayed(
            driver,
            config.list_delay_ms,
            Animation::timing(
                list,
                1.0,
                config.list_ms,
                Easing::EaseOutBack {
                    overshoot: config.list_overshoot,
                },
            )?,
        )?;

        let items = session.stagger(
            driver,
            SETTING_ITEMS.iter().map(|item| item.id),
            StaggerPlan {
                from: 0.0,
                to: 1.0,
                start_ms: config.item_start_ms,
                interval_ms: config.item_interval_ms,
                duration_ms: config.item_ms,
                easing: Easing::EaseOutBack {
                    overshoot: config.item_overshoot,
                },
            },
        )?;

        let rotation = session.create_value(driver, 0.0)?;
        let turn = Animation::sequence([
            Animation::linear(rotation, TAU, config.rotation_period_ms)?,
            Animation::set(rotation, 0.0)?,
        ])?;
        session.start(driver, &Animation::forever(turn)?)?;

        let fab = session.create_value(driver, 0.0)?;
        session.start_delayed(
            driver,
            config.fab_delay_ms,
            Animation::timing(
                fab,
                1.0,
                config.fab_ms,
                Easing::EaseOutBack {
                    overshoot: config.fab_overshoot,
                },
            )?,
        )?;

        Ok(Values {
            header,
            list,
            items,
            rotation,
            button_scale: session.create_value(driver, 1.0)?,
            rotate_y: session.create_value(driver, 0.0)?,
            fab,
            fab_scale: session.create_value(driver, 1.0)?,
        })
    }
}

impl Screen for SettingsScreen {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn frame(&self, driver: &Driver) -> Frame {
        let mut frame = Frame::new(Self::NAME, driver.now_ms());
        if !self.session.is_active() {
            return frame;
        }
        let v = &self.values;
        let read = |value| read_or(driver, value, 0.0);

        frame.insert(
            "background",
            ElementStyle::default().rotated(Angle::radians(read(v.rotation))),
        );

        let header = read(v.header);
        frame.insert(
            "header",
            ElementStyle::default()
                .faded(header)
                .shifted(self.slides.header.eval(header)),
        );

        frame.insert(
            "profile_card",
            ElementStyle::default()
                .rotated_x(Angle::degrees(0.0))
                .rotated_y(Angle::degrees(read(v.rotate_y))),
        );
        frame.insert(
            "edit_button",
            ElementStyle::default().scaled(read_or(driver, v.button_scale, 1.0)),
        );

        let list = read(v.list);
        frame.insert(
            "list",
            ElementStyle::default()
                .faded(list)
                .shifted(self.slides.list.eval(list)),
        );
        for (id, value) in v.items.iter() {
            let item = read(value);
            frame.insert(
                item_element(id),
                ElementStyle::default()
                    .faded(item)
                    .shifted(self.slides.item.eval(item)),
            );
        }

        let fab = read(v.fab);
        frame.insert(
            "fab",
            ElementStyle::default()
                .faded(fab)
                .scaled(fab * read_or(driver, v.fab_scale, 1.0)),
        );
        frame
    }

    fn press(&mut self, driver: &mut Driver, target: &str) -> Result<bool> {
        match target {
            "edit_profile" => {
                let scale = pulse(self.values.button_scale, 0.9, 1.1)?;
                let flip = card_flip(self.values.rotate_y)?;
                self.session.drive(driver, &scale)?;
                self.session.drive(driver, &flip)?;
                Ok(true)
            }
            "fab" => {
                let scale = pulse(self.values.fab_scale, 0.8, 1.2)?;
                self.session.drive(driver, &scale)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn poll(&mut self, _driver: &mut Driver) -> Vec<ScreenEvent> {
        Vec::new()
    }

    fn unmount(&mut self, driver: &mut Driver) {
        self.session.cancel(driver);
    }
}
