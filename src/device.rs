//! The plotting device boundary.
//!
//! The plotter is opaque: the session configures it, hands it the items to
//! plot, switches modes and asks it to draw. Runtime faults come back as
//! [`RuntimeFault`]; the device's own fault code is read afterwards through
//! [`PlotDevice::last_fault_code`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::PlotItem;
use crate::types::Point;

/// Device operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotMode {
    /// Plot the loaded document from the start
    Plot,
    /// Raise the pen and idle the motors so the carriage can be moved by hand
    Align,
    /// Continue a paused plot from the device's last known pen position
    ResumePlot,
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotMode::Plot => write!(f, "plot"),
            PlotMode::Align => write!(f, "align"),
            PlotMode::ResumePlot => write!(f, "res_plot"),
        }
    }
}

/// Device settings, passed through to the device unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceOptions(pub BTreeMap<String, Value>);

impl DeviceOptions {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }
}

impl Default for DeviceOptions {
    fn default() -> Self {
        let mut options = DeviceOptions(BTreeMap::new());
        // Maximum XY speed with the pen down / up
        options.set("speed_pendown", 1);
        options.set("speed_penup", 1);
        options.set("accel", 1);
        // Pen heights
        options.set("pen_pos_down", 10);
        options.set("pen_pos_up", 90);
        options.set("pen_rate_lower", 1);
        options.set("pen_rate_raise", 1);
        options.set("pen_delay_down", 0);
        options.set("pen_delay_up", 70);
        options.set("const_speed", true);
        options.set("model", 5);
        options.set("penlift", 1);
        options.set("port", Value::Null);
        options.set("port_config", 0);
        options
    }
}

/// A fault raised by the device while it was executing a command.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("plotter fault: {message}")]
pub struct RuntimeFault {
    pub message: String,
}

impl RuntimeFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A pen plotter reachable through a small command set.
pub trait PlotDevice {
    /// Apply device settings before a run.
    fn configure(&mut self, options: &DeviceOptions) -> Result<(), RuntimeFault>;

    /// Hand the items of the run to the device, in drawing order.
    fn load_document(&mut self, items: &[PlotItem]) -> Result<(), RuntimeFault>;

    fn set_mode(&mut self, mode: PlotMode) -> Result<(), RuntimeFault>;

    /// Draw one item: pen down along each polyline, pen up between them.
    fn draw(&mut self, item: &PlotItem) -> Result<(), RuntimeFault>;

    /// Execute the current non-drawing mode (e.g. align).
    fn run_mode(&mut self) -> Result<(), RuntimeFault>;

    /// Device fault code for the most recent fault, 0 if none.
    fn last_fault_code(&self) -> i32;
}

/// One command as seen by a [`PreviewDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Configure(DeviceOptions),
    LoadDocument { items: usize },
    SetMode(PlotMode),
    /// Pen-up travel
    MoveTo(Point),
    PenDown(Point),
    LineTo(Point),
    PenUp,
    RunMode(PlotMode),
}

/// Dry-run plotter: records commands instead of moving motors.
///
/// A fault can be scheduled to rehearse pause/resume without hardware.
#[derive(Debug, Clone)]
pub struct PreviewDevice {
    mode: PlotMode,
    pen: Point,
    pen_down: bool,
    drawn: usize,
    fault_after: Option<(usize, i32)>,
    last_fault: i32,
    commands: Vec<Command>,
}

impl Default for PreviewDevice {
    fn default() -> Self {
        Self {
            mode: PlotMode::Plot,
            pen: Point::ZERO,
            pen_down: false,
            drawn: 0,
            fault_after: None,
            last_fault: 0,
            commands: Vec::new(),
        }
    }
}

impl PreviewDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault with `code` when asked to draw after `items` items.
    pub fn fail_after(mut self, items: usize, code: i32) -> Self {
        self.fault_after = Some((items, code));
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    /// Last pen position; survives faults like the real carriage does.
    pub fn pen(&self) -> Point {
        self.pen
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    fn pen_up(&mut self) {
        if self.pen_down {
            self.commands.push(Command::PenUp);
            self.pen_down = false;
        }
    }
}

impl PlotDevice for PreviewDevice {
    fn configure(&mut self, options: &DeviceOptions) -> Result<(), RuntimeFault> {
        self.commands.push(Command::Configure(options.clone()));
        Ok(())
    }

    fn load_document(&mut self, items: &[PlotItem]) -> Result<(), RuntimeFault> {
        self.commands.push(Command::LoadDocument { items: items.len() });
        Ok(())
    }

    fn set_mode(&mut self, mode: PlotMode) -> Result<(), RuntimeFault> {
        self.mode = mode;
        self.commands.push(Command::SetMode(mode));
        if mode == PlotMode::ResumePlot {
            // Back to where the interrupted run left the pen
            self.commands.push(Command::MoveTo(self.pen));
        }
        Ok(())
    }

    fn draw(&mut self, item: &PlotItem) -> Result<(), RuntimeFault> {
        if let Some((after, code)) = self.fault_after {
            if self.drawn >= after {
                self.pen_up();
                self.last_fault = code;
                self.fault_after = None;
                return Err(RuntimeFault::new(format!("scheduled fault {}", code)));
            }
        }

        for line in item.polylines() {
            let [first, rest @ ..] = line.points() else {
                continue;
            };
            self.commands.push(Command::PenDown(*first));
            self.pen_down = true;
            for p in rest {
                self.commands.push(Command::LineTo(*p));
            }
            self.pen = rest.last().copied().unwrap_or(*first);
            self.pen_up();
        }
        self.drawn += 1;
        Ok(())
    }

    fn run_mode(&mut self) -> Result<(), RuntimeFault> {
        if self.mode == PlotMode::Align {
            self.pen_up();
        }
        self.commands.push(Command::RunMode(self.mode));
        Ok(())
    }

    fn last_fault_code(&self) -> i32 {
        self.last_fault
    }
}
