//! Change notifications for transform values

use tracing::trace;

/// A value on a transform that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformEvent {
    AbsolutePositionChanged,
    AbsoluteRotationChanged,
    AbsoluteVelocityChanged,
    AbsoluteAngularVelocityChanged,
    AbsoluteAccelerationChanged,
    PositionChanged,
    RotationChanged,
    VelocityChanged,
    AngularVelocityChanged,
    AccelerationChanged,
    /// Fired once after any batch containing at least one other event
    AnyValueChanged,
}

impl TransformEvent {
    /// Scene-local values, all of which move when the scene frame switches
    pub const SCENE_LOCAL: [TransformEvent; 5] = [
        TransformEvent::PositionChanged,
        TransformEvent::RotationChanged,
        TransformEvent::VelocityChanged,
        TransformEvent::AngularVelocityChanged,
        TransformEvent::AccelerationChanged,
    ];

    /// Every absolute and scene-local value
    pub const ALL_VALUES: [TransformEvent; 10] = [
        TransformEvent::AbsolutePositionChanged,
        TransformEvent::AbsoluteRotationChanged,
        TransformEvent::AbsoluteVelocityChanged,
        TransformEvent::AbsoluteAngularVelocityChanged,
        TransformEvent::AbsoluteAccelerationChanged,
        TransformEvent::PositionChanged,
        TransformEvent::RotationChanged,
        TransformEvent::VelocityChanged,
        TransformEvent::AngularVelocityChanged,
        TransformEvent::AccelerationChanged,
    ];
}

/// Identifies a subscribed transform listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformListenerId(u64);

type TransformListener = Box<dyn FnMut(TransformEvent) + Send + Sync>;

/// Per-transform listener list, fired synchronously
#[derive(Default)]
pub struct TransformEvents {
    listeners: Vec<(TransformListenerId, TransformEvent, TransformListener)>,
    next_id: u64,
}

impl std::fmt::Debug for TransformEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEvents")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TransformEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` every time `event` fires
    pub fn subscribe(
        &mut self,
        event: TransformEvent,
        listener: impl FnMut(TransformEvent) + Send + Sync + 'static,
    ) -> TransformListenerId {
        let id = TransformListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, event, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not subscribed
    pub fn unsubscribe(&mut self, id: TransformListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Fire each event in `changed`, then [`TransformEvent::AnyValueChanged`]
    pub fn notify(&mut self, changed: &[TransformEvent]) {
        if changed.is_empty() {
            return;
        }
        trace!(changed = ?changed, "Transform values changed");

        for &event in changed {
            self.fire(event);
        }
        self.fire(TransformEvent::AnyValueChanged);
    }

    fn fire(&mut self, event: TransformEvent) {
        for (_, subscribed, listener) in self.listeners.iter_mut() {
            if *subscribed == event {
                listener(event);
            }
        }
    }
}
