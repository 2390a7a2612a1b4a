// ==============================================================================
// transmission.rs — GEARBOX + AUTOMATIC SHIFT STATE MACHINE
// ------------------------------------------------------------------------------
// Gear numbering: 0 = neutral, -1 = reverse, 1..=N forward.
//
// ratio():
//     neutral -> 0
//     reverse -> reverse_ratio (overall, already includes final drive)
//     forward -> gears[g - 1] · final_drive
//
// Automatic mode is a two-threshold hysteresis machine with a cooldown:
//     upshift   when rpm > upshift_rpm   and below top gear
//     downshift when rpm < downshift_rpm and above first gear
// and no shift while the cooldown timer is running. The cooldown is what keeps
// it from hunting between two gears.
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TransmissionConfig;
use crate::math::Real;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftMode {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearChange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone)]
pub struct Transmission {
    pub gears: Vec<Real>,
    pub final_drive: Real,
    pub reverse_ratio: Real,
    pub upshift_rpm: Real,
    pub downshift_rpm: Real,
    pub shift_cooldown: Real, // s
    pub mode: ShiftMode,

    current_gear: i32,
    shift_timer: Real, // s
}

impl Transmission {
    /// Starts in first gear.
    pub fn new(cfg: &TransmissionConfig) -> Self {
        Self {
            gears: cfg.gears.clone(),
            final_drive: cfg.final_drive,
            reverse_ratio: cfg.reverse_ratio,
            upshift_rpm: cfg.upshift_rpm,
            downshift_rpm: cfg.downshift_rpm,
            shift_cooldown: cfg.shift_cooldown,
            mode: cfg.mode,
            current_gear: 1,
            shift_timer: 0.0,
        }
    }

    pub fn current_gear(&self) -> i32 { self.current_gear }
    pub fn shift_timer(&self) -> Real { self.shift_timer }

    fn top_gear(&self) -> i32 {
        self.gears.len() as i32
    }

    pub fn ratio(&self) -> Real {
        match self.current_gear {
            0 => 0.0,
            g if g < 0 => self.reverse_ratio,
            g => self
                .gears
                .get((g - 1) as usize)
                .map(|r| r * self.final_drive)
                .unwrap_or(0.0),
        }
    }

    fn change_to(&mut self, gear: i32) -> Option<GearChange> {
        let gear = gear.clamp(-1, self.top_gear());
        if gear == self.current_gear {
            return None;
        }
        let change = GearChange { from: self.current_gear, to: gear };
        self.current_gear = gear;
        self.shift_timer = self.shift_cooldown;
        debug!(from = change.from, to = change.to, "gear change");
        Some(change)
    }

    /// Counts the cooldown down and, in automatic mode, picks a gear from rpm.
    pub fn update_automatic(&mut self, rpm: Real, _throttle: Real, dt: Real) -> Option<GearChange> {
        self.shift_timer = (self.shift_timer - dt).max(0.0);
        if self.shift_timer > 0.0 || self.mode != ShiftMode::Automatic {
            return None;
        }

        let gear = self.current_gear;
        if rpm > self.upshift_rpm && gear >= 1 && gear < self.top_gear() {
            self.change_to(gear + 1)
        } else if rpm < self.downshift_rpm && gear > 1 {
            self.change_to(gear - 1)
        } else {
            None
        }
    }

    // ---- manual commands (respect the same cooldown) ----

    pub fn shift_up(&mut self) -> Option<GearChange> {
        if self.shift_timer > 0.0 {
            return None;
        }
        self.change_to(self.current_gear + 1)
    }

    pub fn shift_down(&mut self) -> Option<GearChange> {
        if self.shift_timer > 0.0 {
            return None;
        }
        self.change_to(self.current_gear - 1)
    }

    /// Direct selection (e.g. reverse from a UI); bypasses the cooldown.
    pub fn set_gear(&mut self, gear: i32) -> Option<GearChange> {
        self.change_to(gear)
    }

    pub fn reset(&mut self) {
        self.current_gear = 1;
        self.shift_timer = 0.0;
    }
}
