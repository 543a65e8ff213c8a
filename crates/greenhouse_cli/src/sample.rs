//! Frame sampling: dump a screen's render parameters as JSON lines

use anyhow::{bail, Result};
use greenhouse_screens::HeadlessRuntime;
use std::io::Write;
use std::str::FromStr;
use tracing::warn;

/// A press scheduled at a logical time, written `target@ms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressAt {
    pub target: String,
    pub at_ms: u64,
}

impl FromStr for PressAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, at) = s
            .split_once('@')
            .ok_or_else(|| format!("expected TARGET@MS, got '{s}'"))?;
        if target.is_empty() {
            return Err(format!("missing press target in '{s}'"));
        }
        let at_ms = at
            .parse()
            .map_err(|_| format!("invalid press time '{at}' in '{s}'"))?;
        Ok(Self {
            target: target.to_string(),
            at_ms,
        })
    }
}

fn advance_to(runtime: &mut HeadlessRuntime, at_ms: u64) -> Result<()> {
    let now = runtime.elapsed_ms();
    if at_ms > now {
        runtime.wait(at_ms - now)?;
    }
    Ok(())
}

/// Write one frame every `interval_ms` from mount until `duration_ms`,
/// inclusive. Returns the number of frames written.
pub fn sample_frames<W: Write>(
    runtime: &mut HeadlessRuntime,
    interval_ms: u64,
    duration_ms: u64,
    presses: &[PressAt],
    out: &mut W,
) -> Result<usize> {
    if interval_ms == 0 {
        bail!("sample interval must be > 0");
    }

    let mut presses: Vec<&PressAt> = presses.iter().collect();
    presses.sort_by_key(|p| p.at_ms);
    let mut pending = presses.into_iter().peekable();

    let mut written = 0;
    let mut t = 0;
    loop {
        while let Some(press) = pending.next_if(|p| p.at_ms <= t) {
            advance_to(runtime, press.at_ms)?;
            if !runtime.press(&press.target)? {
                warn!(element = %press.target, at_ms = press.at_ms, "nothing to press");
            }
        }
        advance_to(runtime, t)?;
        writeln!(out, "{}", serde_json::to_string(&runtime.frame())?)?;
        written += 1;

        if t >= duration_ms {
            break;
        }
        t = (t + interval_ms).min(duration_ms);
    }
    Ok(written)
}
