use std::collections::VecDeque;

use log::warn;
use rtrb::{Consumer, Producer, PushError};

use crate::dsp::{distortion::ShaperCurve, param::Automation};
use crate::patch::Waveform;

pub use crate::graph::oscillator::OscId;

/// Automatable parameters of the signal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Amplitude,
    Frequency(OscId),
    FilterCutoff,
    FilterResonance,
    LfoRate,
    LfoDepth,
    DelayTime,
    DelayFeedback,
    DelayMix,
}

/// Everything the control thread can ask of the render thread.
///
/// Times are seconds on the render clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Automate {
        param: ParamId,
        op: Automation,
    },
    StartOscillator {
        id: OscId,
        waveform: Waveform,
        frequency: f32,
        level: f32,
        at: f64,
    },
    StopOscillator {
        id: OscId,
        at: f64,
    },
    SetWaveform {
        id: OscId,
        waveform: Waveform,
    },
    SetShaperCurve(ShaperCurve),
}

impl Command {
    pub fn automate(param: ParamId, op: Automation) -> Self {
        Command::Automate { param, op }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Automate { .. } => "automate",
            Command::StartOscillator { .. } => "start-oscillator",
            Command::StopOscillator { .. } => "stop-oscillator",
            Command::SetWaveform { .. } => "set-waveform",
            Command::SetShaperCurve(_) => "set-shaper-curve",
        }
    }
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<Command>;
}

impl CommandReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for VecDeque<Command> {
    fn pop(&mut self) -> Option<Command> {
        self.pop_front()
    }
}

/// Destination for commands built on the control thread.
///
/// A full sink hands the command back.
pub trait CommandSink {
    fn send(&mut self, command: Command) -> Result<(), Command>;
}

impl CommandSink for Producer<Command> {
    fn send(&mut self, command: Command) -> Result<(), Command> {
        match self.push(command) {
            Ok(()) => Ok(()),
            Err(PushError::Full(returned)) => Err(returned),
        }
    }
}

impl CommandSink for Vec<Command> {
    fn send(&mut self, command: Command) -> Result<(), Command> {
        self.push(command);
        Ok(())
    }
}

impl CommandSink for VecDeque<Command> {
    fn send(&mut self, command: Command) -> Result<(), Command> {
        self.push_back(command);
        Ok(())
    }
}

/// Send `command`, logging and dropping it if the sink is full.
pub(crate) fn dispatch<S: CommandSink + ?Sized>(sink: &mut S, command: Command) -> bool {
    match sink.send(command) {
        Ok(()) => true,
        Err(dropped) => {
            warn!("command queue full, dropping {}", dropped.name());
            false
        }
    }
}
