//! Scene reference frame management
//!
//! Holds the frame every transform in a scene is expressed against, the single
//! pending switch request, and the auto-recentering policy that re-centers the
//! frame on a designated target once it drifts too far or too fast.

use super::ReferenceFrame;
use crate::error::{FrameError, FrameResult};
use glam::{DVec3, Vec3};
use hecs::Entity;
use tracing::{debug, info, warn};

/// Maximum number of switch records kept before the oldest half is dropped
const MAX_HISTORY: usize = 100;

/// Payload delivered to every transform and listener when a switch is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneReferenceFrameSwitchData {
    /// Frame that was active until this switch
    pub old_frame: ReferenceFrame,
    /// Frame that is active from now on
    pub new_frame: ReferenceFrame,
    /// Simulation time at which the switch was applied
    pub ut: f64,
}

/// Record of an applied frame switch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchRecord {
    pub ut: f64,
    pub old_frame: ReferenceFrame,
    pub new_frame: ReferenceFrame,
    /// Whether the switch came from the auto-recenter policy
    pub automatic: bool,
}

/// Where the manager is in its switch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    SwitchPending,
    Applying,
}

/// Identifies a subscribed switch listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchListenerId(u64);

type SwitchListener = Box<dyn FnMut(&SceneReferenceFrameSwitchData)>;

#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    frame: ReferenceFrame,
    automatic: bool,
}

/// Owns the active reference frame of one simulation scene
///
/// Switches are never applied on request. A request fills the single pending
/// slot (a later request overwrites an earlier one) and the owning scene
/// applies it between the last fixed step of a tick and the presentation step.
pub struct SceneReferenceFrameManager {
    current_frame: ReferenceFrame,
    pending_switch: Option<PendingSwitch>,
    applying: bool,
    /// Transform watched by the auto-recenter policy
    target: Option<Entity>,
    /// Scene-local distance from the origin past which the frame recenters
    max_relative_position: f64,
    /// Scene-local speed past which the frame recenters
    max_relative_velocity: f64,
    listeners: Vec<(SwitchListenerId, SwitchListener)>,
    next_listener_id: u64,
    switch_history: Vec<SwitchRecord>,
    /// Lifetime counters; the history is trimmed, these are not
    switches_performed: u64,
    automatic_switches: u64,
    /// Set once a velocity-only breach in a static frame has been reported
    velocity_breach_reported: bool,
}

impl std::fmt::Debug for SceneReferenceFrameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneReferenceFrameManager")
            .field("current_frame", &self.current_frame)
            .field("pending_switch", &self.pending_switch)
            .field("target", &self.target)
            .field("max_relative_position", &self.max_relative_position)
            .field("max_relative_velocity", &self.max_relative_velocity)
            .field("listeners", &self.listeners.len())
            .field("switch_history", &self.switch_history.len())
            .finish()
    }
}

impl SceneReferenceFrameManager {
    /// Create a manager starting in `initial_frame`
    pub fn new(
        initial_frame: ReferenceFrame,
        max_relative_position: f64,
        max_relative_velocity: f64,
    ) -> Self {
        Self {
            current_frame: initial_frame,
            pending_switch: None,
            applying: false,
            target: None,
            max_relative_position,
            max_relative_velocity,
            listeners: Vec::new(),
            next_listener_id: 0,
            switch_history: Vec::new(),
            switches_performed: 0,
            automatic_switches: 0,
            velocity_breach_reported: false,
        }
    }

    /// The active frame
    pub fn current_frame(&self) -> &ReferenceFrame {
        &self.current_frame
    }

    /// The frame waiting to be applied, if any
    pub fn pending_frame(&self) -> Option<&ReferenceFrame> {
        self.pending_switch.as_ref().map(|pending| &pending.frame)
    }

    pub fn is_switch_requested(&self) -> bool {
        self.pending_switch.is_some()
    }

    pub fn state(&self) -> SwitchState {
        if self.applying {
            SwitchState::Applying
        } else if self.pending_switch.is_some() {
            SwitchState::SwitchPending
        } else {
            SwitchState::Idle
        }
    }

    /// Queue `frame` to become the scene frame at the next tick boundary
    ///
    /// `ut` is the scene's current simulation time. The frame must have been
    /// captured at exactly that time.
    pub fn request_switch(&mut self, frame: ReferenceFrame, ut: f64) -> FrameResult<()> {
        self.queue_switch(frame, ut, false)
    }

    fn queue_switch(&mut self, frame: ReferenceFrame, ut: f64, automatic: bool) -> FrameResult<()> {
        if frame.reference_ut() != ut {
            return Err(FrameError::InvalidArgument(format!(
                "frame captured at UT {} cannot be requested at UT {ut}",
                frame.reference_ut()
            )));
        }

        if let Some(previous) = self.pending_switch.replace(PendingSwitch { frame, automatic }) {
            if previous.frame != frame {
                debug!(
                    ut,
                    superseded = ?previous.frame.kind(),
                    "Pending reference frame switch superseded"
                );
            }
        }

        debug!(ut, kind = ?frame.kind(), automatic, "Reference frame switch requested");
        Ok(())
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Set or clear the transform followed by the auto-recenter policy
    pub fn set_target(&mut self, target: Option<Entity>) {
        debug!(target = ?target, "Setting reference frame target");
        self.target = target;
    }

    pub fn clear_target(&mut self) {
        self.set_target(None);
    }

    pub fn max_relative_position(&self) -> f64 {
        self.max_relative_position
    }

    pub fn max_relative_velocity(&self) -> f64 {
        self.max_relative_velocity
    }

    /// Set both recentering thresholds
    pub fn set_thresholds(
        &mut self,
        max_relative_position: f64,
        max_relative_velocity: f64,
    ) -> FrameResult<()> {
        for (name, value) in [
            ("max_relative_position", max_relative_position),
            ("max_relative_velocity", max_relative_velocity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FrameError::InvalidArgument(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        debug!(
            max_relative_position,
            max_relative_velocity, "Setting recentering thresholds"
        );
        self.max_relative_position = max_relative_position;
        self.max_relative_velocity = max_relative_velocity;
        Ok(())
    }

    /// Whether a target at this scene-local position/velocity needs recentering
    ///
    /// Sitting exactly on a threshold does not count as exceeding it.
    pub fn exceeds_thresholds(&self, local_position: Vec3, local_velocity: Vec3) -> bool {
        f64::from(local_position.length()) > self.max_relative_position
            || f64::from(local_velocity.length()) > self.max_relative_velocity
    }

    /// Whether the auto-recenter policy should recenter on a target at this
    /// scene-local position/velocity
    ///
    /// A frame kind that cannot translate never absorbs velocity, so a breach
    /// of the velocity threshold alone is reported once and otherwise ignored.
    pub fn needs_recenter(&mut self, local_position: Vec3, local_velocity: Vec3) -> bool {
        let position_breach = f64::from(local_position.length()) > self.max_relative_position;
        let velocity_breach = f64::from(local_velocity.length()) > self.max_relative_velocity;

        if !velocity_breach {
            self.velocity_breach_reported = false;
        } else if !position_breach && !self.current_frame.kind().carries_velocity() {
            if !self.velocity_breach_reported {
                warn!(
                    kind = ?self.current_frame.kind(),
                    speed = local_velocity.length(),
                    max_relative_velocity = self.max_relative_velocity,
                    "Target exceeds the velocity threshold but the frame cannot move"
                );
                self.velocity_breach_reported = true;
            }
            return false;
        }

        position_breach || velocity_breach
    }

    /// Request a frame of the current kind centered on the given absolute state
    pub fn request_recenter(
        &mut self,
        ut: f64,
        absolute_position: DVec3,
        absolute_velocity: DVec3,
    ) -> FrameResult<()> {
        let frame = self
            .current_frame
            .recentered(ut, absolute_position, absolute_velocity);
        info!(
            ut,
            position = ?absolute_position,
            velocity = ?absolute_velocity,
            "Target drifted past recentering thresholds"
        );
        self.queue_switch(frame, ut, true)
    }

    /// Make the pending frame current and return the switch payload
    ///
    /// Leaves the manager in [`SwitchState::Applying`] until
    /// [`Self::finish_switch`] is called with the returned data.
    pub fn begin_switch(&mut self, ut: f64) -> Option<SceneReferenceFrameSwitchData> {
        let pending = self.pending_switch.take()?;
        let data = SceneReferenceFrameSwitchData {
            old_frame: self.current_frame,
            new_frame: pending.frame,
            ut,
        };

        self.current_frame = pending.frame;
        self.applying = true;
        self.switches_performed += 1;
        if pending.automatic {
            self.automatic_switches += 1;
        }

        self.switch_history.push(SwitchRecord {
            ut,
            old_frame: data.old_frame,
            new_frame: data.new_frame,
            automatic: pending.automatic,
        });
        if self.switch_history.len() > MAX_HISTORY {
            self.switch_history.drain(..MAX_HISTORY / 2);
        }

        Some(data)
    }

    /// Notify switch listeners and return to idle
    pub fn finish_switch(&mut self, data: &SceneReferenceFrameSwitchData) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(data);
        }
        self.applying = false;

        info!(
            ut = data.ut,
            kind = ?data.new_frame.kind(),
            origin = ?data.new_frame.origin_at(data.ut),
            "Reference frame switch applied"
        );
    }

    /// Register a callback run after every applied switch
    pub fn subscribe_switch(
        &mut self,
        listener: impl FnMut(&SceneReferenceFrameSwitchData) + 'static,
    ) -> SwitchListenerId {
        let id = SwitchListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not subscribed
    pub fn unsubscribe_switch(&mut self, id: SwitchListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = self.listeners.len() != before;
        if !removed {
            warn!(id = ?id, "Tried to remove unknown switch listener");
        }
        removed
    }

    pub fn switch_history(&self) -> &[SwitchRecord] {
        &self.switch_history
    }

    pub fn clear_history(&mut self) {
        self.switch_history.clear();
    }

    pub fn stats(&self) -> ReferenceFrameStats {
        ReferenceFrameStats {
            current_frame: self.current_frame,
            switch_pending: self.is_switch_requested(),
            switches_performed: self.switches_performed,
            automatic_switches: self.automatic_switches,
            has_target: self.target.is_some(),
            max_relative_position: self.max_relative_position,
            max_relative_velocity: self.max_relative_velocity,
        }
    }
}

/// Snapshot of the manager's state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrameStats {
    pub current_frame: ReferenceFrame,
    pub switch_pending: bool,
    /// Switches applied since the manager was created
    pub switches_performed: u64,
    pub automatic_switches: u64,
    pub has_target: bool,
    pub max_relative_position: f64,
    pub max_relative_velocity: f64,
}
