/*
Scheduled Parameter Automation
==============================

Every continuously variable control in the engine (amplitude, oscillator
frequency, filter cutoff, delay mix, ...) is a `Param`: a scalar whose value
follows a timeline of scheduled events instead of being assigned directly.
The control thread never writes a value in place. It schedules where the
value should be and by when, and the rendering thread evaluates the timeline
once per sample.

Vocabulary
----------

  event         A point on the timeline: (time, value, ramp shape).

  ramp          How the value travels from the previous event to this one.
                  Step         jump at `time`
                  Linear       straight line from the previous point
                  Exponential  constant-ratio curve from the previous point
                  Target       from `time` on, approach `value` with a time
                               constant; never "arrives", only settles

  origin        The last point the timeline has passed. Ramps start here.

  hold          `cancel_and_hold(t)`: forget everything scheduled after `t`
                and pin whatever value the timeline would have had at `t`.


Shapes
------

    Linear                   Exponential              Target (time constant τ)

    v1 ┤        ╱            v1 ┤          ╱          v1 ┤      ______
       │      ╱                 │        ╱               │   .-'
       │    ╱                   │      _/                │  /
    v0 ┤  ╱                  v0 ┤___.-'               v0 ┤_/
       └──────→ t               └──────→ t               └──────→ t
        t0    t1                 t0    t1                 t0 (63% after τ)

    linear:       v(t) = v0 + (v1 - v0) · (t - t0) / (t1 - t0)
    exponential:  v(t) = v0 · (v1 / v0) ^ ((t - t0) / (t1 - t0))
    target:       v(t) = v1 + (v0 - v1) · e^(-(t - t0) / τ)

An exponential curve cannot cross or start at zero. If `v0` and `v1` have
different signs, or `v0` is zero, the value holds at `v0` until `t1` and then
jumps. Envelope release therefore aims at a tiny positive floor, never 0.


Why holds matter
----------------

Re-scheduling a param without cancelling what is already queued stacks ramps
on top of each other: a new attack would start from wherever the old decay
was *planned* to be, not where it actually is. Every phase change in the
engine is therefore "hold, then schedule":

    hold(t0)  →  linear(peak, t0 + attack)  →  linear(sustain, ... + decay)

The hold pins the real value at `t0`, so the next ramp always starts from the
signal that is actually sounding.


Realtime Safety
---------------

Events live in a `Vec` pre-allocated to `MAX_EVENTS`. Scheduling into a full
timeline drops the event furthest in the future. Nothing here allocates after
construction.
*/

use crate::MIN_TIME;

/// Upper bound on scheduled events per param.
pub const MAX_EVENTS: usize = 32;

/// Shape of the segment that ends at an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ramp {
    Step,
    Linear,
    Exponential,
    Target { time_constant: f32 },
}

/// A single point on a param timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    pub time: f64,
    pub value: f32,
    pub ramp: Ramp,
}

impl AutomationEvent {
    /// Jump to `value` at `at`.
    pub fn set(value: f32, at: f64) -> Self {
        Self {
            time: at,
            value,
            ramp: Ramp::Step,
        }
    }

    /// Straight line from the previous point, arriving at `end`.
    pub fn linear(value: f32, end: f64) -> Self {
        Self {
            time: end,
            value,
            ramp: Ramp::Linear,
        }
    }

    /// Constant-ratio curve from the previous point, arriving at `end`.
    pub fn exponential(value: f32, end: f64) -> Self {
        Self {
            time: end,
            value,
            ramp: Ramp::Exponential,
        }
    }

    /// Settle toward `value` from `start` on, with the given time constant.
    pub fn target(value: f32, start: f64, time_constant: f32) -> Self {
        Self {
            time: start,
            value,
            ramp: Ramp::Target {
                time_constant: time_constant.max(MIN_TIME),
            },
        }
    }
}

/// A timeline operation sent from the control side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    /// Drop everything after `at` and pin the value the timeline has there.
    CancelAndHold { at: f64 },
    /// Add an event to the timeline.
    Schedule(AutomationEvent),
}

impl Automation {
    pub fn time(&self) -> f64 {
        match self {
            Automation::CancelAndHold { at } => *at,
            Automation::Schedule(event) => event.time,
        }
    }

    /// Move the operation so it happens no earlier than `earliest`.
    pub fn not_before(self, earliest: f64) -> Self {
        match self {
            Automation::CancelAndHold { at } => Automation::CancelAndHold {
                at: at.max(earliest),
            },
            Automation::Schedule(mut event) => {
                event.time = event.time.max(earliest);
                Automation::Schedule(event)
            }
        }
    }
}

/// An automatable scalar evaluated on the rendering clock.
#[derive(Debug, Clone)]
pub struct Param {
    origin_time: f64,
    origin_value: f32,
    /// Active `Target` approach as (value, time constant), if any.
    settling: Option<(f32, f32)>,
    events: Vec<AutomationEvent>,
}

impl Param {
    pub fn new(value: f32) -> Self {
        Self {
            origin_time: 0.0,
            origin_value: value,
            settling: None,
            events: Vec::with_capacity(MAX_EVENTS),
        }
    }

    /// Forget the timeline and sit at `value` from `at` on.
    pub fn reset(&mut self, value: f32, at: f64) {
        self.events.clear();
        self.settling = None;
        self.origin_time = at;
        self.origin_value = value;
    }

    pub fn apply(&mut self, op: Automation) {
        match op {
            Automation::CancelAndHold { at } => self.cancel_and_hold(at),
            Automation::Schedule(event) => self.schedule(event),
        }
    }

    /// Insert an event, keeping the timeline ordered by time.
    ///
    /// Events sharing a time keep their scheduling order.
    pub fn schedule(&mut self, event: AutomationEvent) {
        if !event.value.is_finite() || !event.time.is_finite() {
            return;
        }

        let index = self.events.partition_point(|e| e.time <= event.time);
        if self.events.len() == MAX_EVENTS {
            if index == MAX_EVENTS {
                return;
            }
            self.events.pop();
        }
        self.events.insert(index, event);
    }

    pub fn cancel_and_hold(&mut self, at: f64) {
        let held = self.value_at(at);
        self.events.retain(|e| e.time <= at);

        if self.events.is_empty() && at <= self.origin_time {
            self.reset(held, self.origin_time);
            return;
        }
        self.schedule(AutomationEvent::set(held, at));
    }

    /// Value of the timeline at `t`, without consuming any events.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut start_time = self.origin_time;
        let mut start_value = self.origin_value;
        let mut settling = self.settling;

        for event in &self.events {
            if t < event.time {
                return segment(start_time, start_value, settling, Some(event), t);
            }

            match event.ramp {
                Ramp::Target { time_constant } => {
                    start_value =
                        segment(start_time, start_value, settling, Some(event), event.time);
                    settling = Some((event.value, time_constant));
                }
                _ => {
                    start_value = event.value;
                    settling = None;
                }
            }
            start_time = event.time;
        }

        segment(start_time, start_value, settling, None, t)
    }

    /// Consume every event whose time has been reached by `t`.
    pub fn advance_to(&mut self, t: f64) {
        let mut reached = 0;
        for event in &self.events {
            if event.time > t {
                break;
            }

            match event.ramp {
                Ramp::Target { time_constant } => {
                    self.origin_value = segment(
                        self.origin_time,
                        self.origin_value,
                        self.settling,
                        Some(event),
                        event.time,
                    );
                    self.settling = Some((event.value, time_constant));
                }
                _ => {
                    self.origin_value = event.value;
                    self.settling = None;
                }
            }
            self.origin_time = event.time;
            reached += 1;
        }

        if reached > 0 {
            self.events.drain(..reached);
        }
    }

    /// Advance to `t` and return the value there.
    #[inline]
    pub fn next_value(&mut self, t: f64) -> f32 {
        self.advance_to(t);
        self.value_at(t)
    }

    /// Fill `out` with one value per sample, starting at `start`.
    pub fn render(&mut self, out: &mut [f32], start: f64, sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;

        if self.is_static() {
            out.fill(self.origin_value);
            return;
        }

        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.next_value(start + i as f64 * dt);
        }
    }

    /// True when nothing is scheduled and no approach is in progress.
    pub fn is_static(&self) -> bool {
        self.events.is_empty() && self.settling.is_none()
    }

    /// Time of the last scheduled event, if any.
    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

/// Evaluate the segment that starts at (`start_time`, `start_value`) and
/// ends at `next`.
#[inline]
fn segment(
    start_time: f64,
    start_value: f32,
    settling: Option<(f32, f32)>,
    next: Option<&AutomationEvent>,
    t: f64,
) -> f32 {
    match next {
        Some(event) if event.ramp == Ramp::Linear => {
            let span = event.time - start_time;
            if span <= 0.0 {
                return event.value;
            }
            let progress = ((t - start_time) / span).clamp(0.0, 1.0) as f32;
            start_value + (event.value - start_value) * progress
        }
        Some(event) if event.ramp == Ramp::Exponential => {
            let span = event.time - start_time;
            if span <= 0.0 {
                return event.value;
            }
            if start_value * event.value <= 0.0 {
                return start_value;
            }
            let progress = ((t - start_time) / span).clamp(0.0, 1.0) as f32;
            start_value * (event.value / start_value).powf(progress)
        }
        _ => match settling {
            Some((target, time_constant)) => {
                let elapsed = (t - start_time).max(0.0) as f32;
                target + (start_value - target) * (-elapsed / time_constant).exp()
            }
            None => start_value,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn static_param_holds_value() {
        let mut param = Param::new(0.5);
        let mut out = vec![0.0; 16];
        param.render(&mut out, 0.0, SAMPLE_RATE);
        assert!(out.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_point() {
        let mut param = Param::new(0.0);
        param.schedule(AutomationEvent::set(0.0, 0.0));
        param.schedule(AutomationEvent::linear(1.0, 1.0));

        assert!((param.value_at(0.25) - 0.25).abs() < 1e-6);
        assert!((param.value_at(0.5) - 0.5).abs() < 1e-6);
        assert!((param.value_at(2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn chained_ramps_start_where_previous_ended() {
        let mut param = Param::new(0.0);
        param.cancel_and_hold(0.0);
        param.schedule(AutomationEvent::linear(0.3, 0.1));
        param.schedule(AutomationEvent::linear(0.15, 0.3));

        assert!((param.value_at(0.1) - 0.3).abs() < 1e-6);
        assert!((param.value_at(0.2) - 0.225).abs() < 1e-5);
        assert!((param.value_at(0.3) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn exponential_ramp_follows_constant_ratio() {
        let mut param = Param::new(1.0);
        param.schedule(AutomationEvent::set(1.0, 0.0));
        param.schedule(AutomationEvent::exponential(0.01, 1.0));

        // Halfway in time is the geometric mean.
        assert!((param.value_at(0.5) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn exponential_ramp_from_zero_holds_until_end() {
        let mut param = Param::new(0.0);
        param.schedule(AutomationEvent::set(0.0, 0.0));
        param.schedule(AutomationEvent::exponential(0.5, 1.0));

        assert_eq!(param.value_at(0.9), 0.0);
        assert_eq!(param.value_at(1.0), 0.5);
    }

    #[test]
    fn target_settles_exponentially() {
        let mut param = Param::new(100.0);
        param.schedule(AutomationEvent::target(200.0, 0.0, 0.1));

        let after_one_tau = param.value_at(0.1);
        let expected = 200.0 - 100.0 * (-1.0f32).exp();
        assert!((after_one_tau - expected).abs() < 1e-3);
        assert!((param.value_at(2.0) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn hold_pins_value_mid_ramp_and_drops_future_events() {
        let mut param = Param::new(0.0);
        param.schedule(AutomationEvent::set(0.0, 0.0));
        param.schedule(AutomationEvent::linear(1.0, 1.0));
        param.schedule(AutomationEvent::linear(0.0, 2.0));

        param.cancel_and_hold(0.5);

        assert!((param.value_at(0.5) - 0.5).abs() < 1e-6);
        assert!((param.value_at(1.5) - 0.5).abs() < 1e-6);
        assert_eq!(param.last_event_time(), Some(0.5));
    }

    #[test]
    fn hold_at_ramp_end_keeps_the_ramp() {
        let mut param = Param::new(0.3);
        param.cancel_and_hold(0.0);
        param.schedule(AutomationEvent::linear(0.0, 0.01));
        param.cancel_and_hold(0.01);
        param.schedule(AutomationEvent::linear(0.3, 0.02));

        assert!((param.value_at(0.005) - 0.15).abs() < 1e-5);
        assert!(param.value_at(0.01).abs() < 1e-6);
        assert!((param.value_at(0.015) - 0.15).abs() < 1e-5);
    }

    #[test]
    fn hold_during_target_freezes_the_approach() {
        let mut param = Param::new(0.0);
        param.schedule(AutomationEvent::target(1.0, 0.0, 0.1));
        let at = 0.1;
        let expected = param.value_at(at);

        param.cancel_and_hold(at);

        assert!((param.value_at(at) - expected).abs() < 1e-6);
        assert!((param.value_at(1.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn advancing_matches_pure_evaluation() {
        let mut param = Param::new(0.0);
        param.cancel_and_hold(0.0);
        param.schedule(AutomationEvent::linear(1.0, 0.01));
        param.schedule(AutomationEvent::target(0.5, 0.02, 0.005));

        let reference = param.clone();
        let mut out = vec![0.0; 64];
        param.render(&mut out, 0.0, SAMPLE_RATE);

        for (i, &value) in out.iter().enumerate() {
            let t = i as f64 / SAMPLE_RATE as f64;
            assert!(
                (value - reference.value_at(t)).abs() < 1e-5,
                "sample {i}: rendered {value}, expected {}",
                reference.value_at(t)
            );
        }
    }

    #[test]
    fn full_timeline_drops_latest_event() {
        let mut param = Param::new(0.0);
        for i in 0..MAX_EVENTS + 4 {
            param.schedule(AutomationEvent::set(i as f32, i as f64));
        }
        assert_eq!(param.pending_events(), MAX_EVENTS);
        assert_eq!(param.last_event_time(), Some((MAX_EVENTS - 1) as f64));
    }

    #[test]
    fn non_finite_events_are_ignored() {
        let mut param = Param::new(1.0);
        param.schedule(AutomationEvent::linear(f32::NAN, 1.0));
        assert!(param.is_static());
    }
}
