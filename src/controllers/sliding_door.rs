use tracing::{debug, info, warn};

use crate::animation::{AnimatorStep, DoorAnimator};
use crate::audio::CueSynchronizer;
use crate::config::DoorSettings;
use crate::errors::{DoorError, DoorResult};
use crate::models::{
    Direction, DoorEvent, DoorEventKind, DoorRequest, DoorState, EntityId, LeafPose, OperationMode,
    PendingKind, PendingOffer, PendingOperation, RejectReason,
};
use crate::rig::{DoorRig, PoseMotion};
use crate::sensors::{OccupancyProbe, SensorListener};
use crate::state_management::{DeferredCall, DeferredCalls, ExitOutcome, LockGate, OccupancyTracker, PendingSlot};

/// The state machine behind a two-leaf sliding door
///
/// The controller decides whether a requested transition is legal given the lock and occupancy
/// state, reverses in-flight animations smoothly, keeps a one-slot queue for requests that
/// cannot be applied yet, and drives the animator and cue audio once per tick. All calls are
/// expected on the same logical thread as `tick`; nothing here synchronises.
pub struct SlidingDoorController<R: DoorRig> {
    /// The door's configuration
    settings: DoorSettings,
    /// Where the door is in its cycle
    state: DoorState,
    /// Which requests may open a closed door
    mode: OperationMode,
    /// Progress of the current transition and the leaf poses derived from it
    animator: DoorAnimator,
    /// Entities currently inside the sensed region
    occupancy: OccupancyTracker,
    /// Lock flag and its enable switch
    lock: LockGate,
    /// Maps progress to cue playback
    cues: CueSynchronizer,
    /// At most one deferred open or close
    pending: PendingSlot,
    /// Grace-delayed closes waiting for their due time
    deferred: DeferredCalls,
    /// Optional fresh occupancy source for reconciliation
    probe: Option<Box<dyn OccupancyProbe>>,
    /// Seconds of tick time since start-up
    clock: f64,
    /// Clock time of the next reconciliation, if enabled
    next_reconcile_at: Option<f64>,
    /// Observability records not yet drained
    events: Vec<DoorEvent>,
    /// Host-side leaves and audio
    rig: R,
}

impl<R: DoorRig> SlidingDoorController<R> {
    /// Creates a new `SlidingDoorController`
    ///
    /// Validates the settings and takes the closed-pose snapshot from the rig. The door starts
    /// `Closed` with an empty region and the lock flag from the settings.
    ///
    /// # Arguments
    ///
    /// * `settings`: The door's configuration
    /// * `rig`: The host-side leaves and cue audio
    ///
    /// # Returns
    ///
    /// * `Ok(SlidingDoorController)` ready to tick
    /// * `Err(DoorError)` if the settings are unusable or the rig has no leaf transforms
    pub fn new(settings: DoorSettings, rig: R) -> DoorResult<Self> {
        settings.validate()?;
        let closed = rig.current_pose().ok_or_else(|| {
            DoorError::MissingLeafTransform(format!("door '{}' has no leaf transforms", settings.name))
        })?;
        let animator = DoorAnimator::new(
            settings.transition_duration,
            settings.easing_curve,
            closed,
            settings.left_open_offset,
            settings.right_open_offset,
        )?;
        let cues = CueSynchronizer::new(settings.cue_clip_length, settings.play_close_cue_reversed)?;

        info!(
            "Initializing sliding door '{}' ({} mode, locking {})",
            settings.name,
            settings.operation_mode,
            if settings.locking_enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            state: DoorState::Closed,
            mode: settings.operation_mode,
            lock: LockGate::new(settings.locking_enabled, settings.door_locked),
            animator,
            occupancy: OccupancyTracker::new(),
            cues,
            pending: PendingSlot::new(),
            deferred: DeferredCalls::new(),
            probe: None,
            clock: 0.0,
            next_reconcile_at: None,
            events: Vec::new(),
            settings,
            rig,
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &DoorSettings {
        &self.settings
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.mode
    }

    /// Progress of the current (or last) transition in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.animator.progress()
    }

    pub fn open_fraction(&self) -> f32 {
        self.animator.open_fraction()
    }

    pub fn leaf_pose(&self) -> LeafPose {
        self.animator.pose()
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy.count()
    }

    /// The raw lock flag.
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn is_effectively_locked(&self) -> bool {
        self.lock.is_effectively_locked()
    }

    pub fn locking_enabled(&self) -> bool {
        self.lock.is_enabled()
    }

    pub fn pending(&self) -> Option<PendingOperation> {
        self.pending.peek()
    }

    pub fn scheduled_calls(&self) -> usize {
        self.deferred.len()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// No animation in flight and nothing scheduled.
    pub fn is_idle(&self) -> bool {
        !self.state.is_moving() && self.deferred.is_empty()
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    /// Hands over every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<DoorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Requests the door to open
    ///
    /// A closed door opens if it is not effectively locked and the operation mode accepts the
    /// request's origin. A closing door reverses under the same guard, or keeps closing and
    /// queues the open when the guard refuses. Opening and open doors ignore the request.
    ///
    /// # Arguments
    ///
    /// * `triggered_by_sensor`: Whether the request comes from the proximity sensor
    pub fn request_open(&mut self, triggered_by_sensor: bool) {
        let request = DoorRequest::Open { triggered_by_sensor };
        match self.state {
            DoorState::Opening | DoorState::Open => {
                debug!("Door '{}' already {}; ignoring {}", self.settings.name, self.state, request);
            }
            DoorState::Closed => match self.open_guard(triggered_by_sensor) {
                Ok(()) => self.begin_transition(Direction::Opening),
                Err(reason) => self.reject(request, reason),
            },
            DoorState::Closing => match self.open_guard(triggered_by_sensor) {
                Ok(()) => self.begin_transition(Direction::Opening),
                Err(reason) => {
                    self.reject(request, reason);
                    self.queue_pending(PendingOperation::open(triggered_by_sensor));
                }
            },
        }
    }

    /// Requests the door to close
    ///
    /// An open door starts closing when the region is empty or `force` is set; otherwise the
    /// request is rejected. An opening door reverses under the same guard, or keeps opening and
    /// queues the close. Closing and closed doors ignore the request.
    ///
    /// # Arguments
    ///
    /// * `force`: Bypass the occupancy guard
    pub fn request_close(&mut self, force: bool) {
        let request = DoorRequest::Close { force };
        match self.state {
            DoorState::Closing | DoorState::Closed => {
                debug!("Door '{}' already {}; ignoring {}", self.settings.name, self.state, request);
            }
            DoorState::Open => match self.close_guard(force) {
                Ok(()) => self.begin_transition(Direction::Closing),
                Err(reason) => self.reject(request, reason),
            },
            DoorState::Opening => match self.close_guard(force) {
                Ok(()) => self.begin_transition(Direction::Closing),
                Err(reason) => {
                    debug!("Door '{}' deferring {}: {}", self.settings.name, request, reason);
                    self.queue_pending(PendingOperation::close());
                }
            },
        }
    }

    /// Closes regardless of occupancy. The lock guard only concerns opening, so it is never in the way.
    pub fn force_close(&mut self) {
        self.request_close(true);
    }

    /// Open when closed, close when open, nothing while moving.
    pub fn toggle(&mut self) {
        match self.state {
            DoorState::Open => self.request_close(false),
            DoorState::Closed => self.request_open(false),
            DoorState::Opening | DoorState::Closing => {
                debug!("Door '{}' is {}; toggle ignored", self.settings.name, self.state);
            }
        }
    }

    /// `true` opens manually; `false` clears the occupancy count and force-closes.
    pub fn force_trigger(&mut self, open: bool) {
        if open {
            self.request_open(false);
        } else {
            self.reset_occupancy();
            self.force_close();
        }
    }

    /// Snaps the door closed immediately
    ///
    /// The only synchronous transition: drops any pending operation and scheduled close, zeroes
    /// the occupancy count, stops the cue and places the leaves exactly at the closed pose
    /// without emitting animation frames.
    pub fn force_clear(&mut self) {
        info!("Force-clearing door '{}' from {}", self.settings.name, self.state);
        if let Some(operation) = self.pending.take() {
            self.emit(DoorEventKind::PendingDiscarded { operation });
        }
        self.reset_occupancy();
        self.deferred.clear();

        let pose = self.animator.snap_closed();
        self.rig.stop_cue();
        self.rig.apply_pose(pose, PoseMotion::Snapped);
        self.set_state(DoorState::Closed);
        self.emit(DoorEventKind::Cleared);
    }

    /// Locks the door
    ///
    /// If the lock is in effect, an open door is asked to close (subject to occupancy) and an
    /// opening door gets a pending close; an open already in progress is not interrupted.
    pub fn lock(&mut self) {
        self.apply_lock();
        if !self.lock.is_effectively_locked() {
            return;
        }
        match self.state {
            DoorState::Open => self.request_close(false),
            DoorState::Opening => self.queue_pending(PendingOperation::close()),
            DoorState::Closed | DoorState::Closing => {}
        }
    }

    /// Unlocks the door and zeroes the occupancy count so a stale count cannot hold the next close.
    pub fn unlock(&mut self) {
        if self.lock.unlock() {
            self.emit_lock_state();
        }
        self.reset_occupancy();
    }

    pub fn set_locking_enabled(&mut self, enabled: bool) {
        if self.lock.is_enabled() != enabled {
            self.lock.set_enabled(enabled);
            self.emit_lock_state();
        }
    }

    /// Access granted: unlock, and open if manual requests are honoured.
    pub fn keypad_granted(&mut self) {
        self.unlock();
        if self.mode == OperationMode::Normal {
            self.request_open(false);
        }
    }

    /// Access revoked: lock, and close even if an open is in progress.
    pub fn keypad_closed(&mut self) {
        self.apply_lock();
        if matches!(self.state, DoorState::Open | DoorState::Opening) {
            self.request_close(true);
        }
    }

    /// Zeroes the occupancy count. An open or opening door that just lost its last occupants
    /// this way gets the same grace-delayed close as one emptied by exits.
    pub fn reset_occupancy(&mut self) {
        let old = self.occupancy.reset();
        if old != 0 {
            self.emit(DoorEventKind::OccupancyChanged { old, new: 0 });
            if matches!(self.state, DoorState::Open | DoorState::Opening) {
                self.schedule_delayed_close();
            }
        }
    }

    /// Switches the operation mode. The occupancy count is reset either way, since a count
    /// gathered under one mode means nothing under the other.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        let old = std::mem::replace(&mut self.mode, mode);
        if old != mode {
            info!("Door '{}' operation mode {} -> {}", self.settings.name, old, mode);
            self.emit(DoorEventKind::ModeChanged { old, new: mode });
        }
        self.reset_occupancy();
    }

    /// Registers a probe that the tick re-queries every `reconcile_interval` seconds.
    pub fn attach_occupancy_probe(&mut self, probe: Box<dyn OccupancyProbe>) {
        self.probe = Some(probe);
        self.next_reconcile_at = (self.settings.reconcile_interval > 0.0)
            .then(|| self.clock + f64::from(self.settings.reconcile_interval));
    }

    /// Replaces the accumulated count with a fresh one when they disagree
    ///
    /// A fresh zero while the door is open or opening schedules the grace-delayed close; a
    /// fresh non-zero count while it is closed or closing issues a sensor open request.
    ///
    /// # Arguments
    ///
    /// * `fresh`: The occupant count just re-queried from the adapter
    pub fn reconcile_occupancy(&mut self, fresh: u32) {
        let stale = self.occupancy.count();
        if stale == fresh {
            return;
        }
        warn!(
            "Door '{}' occupancy count {} disagrees with sensor re-query {}; trusting the sensor",
            self.settings.name, stale, fresh
        );
        self.occupancy.set(fresh);
        self.emit(DoorEventKind::OccupancyReconciled { stale, fresh });

        if fresh == 0 && matches!(self.state, DoorState::Open | DoorState::Opening) {
            self.schedule_delayed_close();
        } else if fresh > 0 && matches!(self.state, DoorState::Closed | DoorState::Closing) {
            self.request_open(true);
        }
    }

    /// Advances the door by `dt` seconds
    ///
    /// 1. Advances the clock
    /// 2. Fires deferred calls that have come due, re-checking occupancy at fire time
    /// 3. Re-queries the occupancy probe if a reconciliation is due
    /// 4. Advances the animator, pushes the pose to the rig and commits a completed transition
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += f64::from(dt);

        for call in self.deferred.take_due(self.clock) {
            self.run_deferred(call);
        }

        self.reconcile_if_due();

        match self.animator.advance(dt) {
            AnimatorStep::Idle => {}
            AnimatorStep::Moved(pose) => self.rig.apply_pose(pose, PoseMotion::Animated),
            AnimatorStep::Completed { direction, pose } => {
                self.rig.apply_pose(pose, PoseMotion::Animated);
                self.complete_transition(direction);
            }
        }
    }

    fn open_guard(&self, triggered_by_sensor: bool) -> Result<(), RejectReason> {
        if self.lock.is_effectively_locked() {
            return Err(RejectReason::Locked);
        }
        match self.mode {
            OperationMode::Normal => Ok(()),
            OperationMode::ProximitySensor if triggered_by_sensor => Ok(()),
            OperationMode::ProximitySensor => Err(RejectReason::SensorModeOnly),
        }
    }

    fn close_guard(&self, force: bool) -> Result<(), RejectReason> {
        match self.occupancy.count() {
            0 => Ok(()),
            _ if force => Ok(()),
            n => Err(RejectReason::Occupied(n)),
        }
    }

    /// Starts or reverses a transition. The single place reversal happens.
    fn begin_transition(&mut self, direction: Direction) {
        if self.state.direction() == Some(direction.reversed()) {
            self.animator.reverse();
            info!(
                "Door '{}' reversing to {} at progress {:.3}",
                self.settings.name,
                direction,
                self.animator.progress()
            );
            self.emit(DoorEventKind::TransitionReversed { to: direction, progress: self.animator.progress() });
        } else {
            self.animator.start(direction);
        }

        if let Some(operation) = self.pending.take_kind(PendingKind::from(direction)) {
            debug!("Door '{}' pending {} satisfied by new transition", self.settings.name, operation.kind);
            self.emit(DoorEventKind::PendingDiscarded { operation });
        }

        self.set_state(direction.moving_state());

        let playback = self.cues.playback(direction, self.animator.open_fraction());
        self.rig.play_cue(playback);
        self.emit(DoorEventKind::CueStarted(playback));
    }

    fn complete_transition(&mut self, direction: Direction) {
        self.set_state(direction.terminal_state());

        // A leftover request for the state just reached is moot.
        if let Some(operation) = self.pending.take_kind(PendingKind::from(direction)) {
            self.emit(DoorEventKind::PendingDiscarded { operation });
        }

        match direction {
            Direction::Opening => {
                if let Some(operation) = self.pending.take_kind(PendingKind::Close) {
                    if self.occupancy.is_empty() {
                        self.emit(DoorEventKind::PendingDrained { operation });
                        self.request_close(false);
                    } else {
                        debug!(
                            "Door '{}' dropping pending close; {} occupant(s) inside",
                            self.settings.name,
                            self.occupancy.count()
                        );
                        self.emit(DoorEventKind::PendingDiscarded { operation });
                    }
                }
            }
            Direction::Closing => {
                if let Some(operation) = self.pending.take_kind(PendingKind::Open) {
                    self.emit(DoorEventKind::PendingDrained { operation });
                    self.request_open(operation.triggered_by_sensor);
                }
            }
        }
    }

    fn queue_pending(&mut self, operation: PendingOperation) {
        match self.pending.offer(operation) {
            PendingOffer::AlreadyPending => {
                debug!("Door '{}' already has a pending {}", self.settings.name, operation.kind);
            }
            PendingOffer::Queued => {
                self.emit(DoorEventKind::PendingQueued { operation, replaced: None });
            }
            PendingOffer::Replaced(previous) => {
                debug!(
                    "Door '{}' pending {} replaced by {}",
                    self.settings.name, previous.kind, operation.kind
                );
                self.emit(DoorEventKind::PendingQueued { operation, replaced: Some(previous) });
            }
        }
    }

    fn register_arrival(&mut self) {
        let old = self.occupancy.count();
        let new = self.occupancy.enter();
        self.emit(DoorEventKind::OccupancyChanged { old, new });
        self.request_open(true);
    }

    fn schedule_delayed_close(&mut self) {
        let due_at = self.deferred.schedule(
            self.clock,
            f64::from(self.settings.delayed_close_grace),
            DeferredCall::DelayedClose,
        );
        debug!("Door '{}' delayed close due at {:.3}s", self.settings.name, due_at);
        self.emit(DoorEventKind::DelayedCloseScheduled { due_at });
    }

    fn run_deferred(&mut self, call: DeferredCall) {
        match call {
            DeferredCall::DelayedClose => {
                let occupancy = self.occupancy.count();
                if occupancy > 0 {
                    debug!("Door '{}' delayed close skipped; {} occupant(s) inside", self.settings.name, occupancy);
                    self.emit(DoorEventKind::DelayedCloseSkipped { occupancy });
                    return;
                }
                if matches!(self.state, DoorState::Open | DoorState::Opening) {
                    self.request_close(false);
                }
            }
        }
    }

    fn reconcile_if_due(&mut self) {
        let Some(due_at) = self.next_reconcile_at else {
            return;
        };
        if self.clock < due_at {
            return;
        }
        let fresh = match &self.probe {
            Some(probe) => probe.occupants(),
            None => return,
        };
        self.next_reconcile_at = Some(self.clock + f64::from(self.settings.reconcile_interval));
        self.reconcile_occupancy(fresh);
    }

    fn apply_lock(&mut self) {
        if self.lock.lock() {
            self.emit_lock_state();
        }
    }

    fn emit_lock_state(&mut self) {
        let locked = self.lock.is_locked();
        let effective = self.lock.is_effectively_locked();
        info!("Door '{}' lock flag {} (effective: {})", self.settings.name, locked, effective);
        self.emit(DoorEventKind::LockChanged { locked, effective });
    }

    fn reject(&mut self, request: DoorRequest, reason: RejectReason) {
        info!("Door '{}' rejected {}: {}", self.settings.name, request, reason);
        self.emit(DoorEventKind::RequestRejected { request, reason });
    }

    fn set_state(&mut self, new: DoorState) {
        let old = self.state;
        if old != new {
            self.state = new;
            info!("Door '{}' state changed: {} -> {}", self.settings.name, old, new);
            self.emit(DoorEventKind::StateChanged { old, new });
        }
    }

    fn emit(&mut self, kind: DoorEventKind) {
        self.events.push(DoorEvent::new(&self.settings.name, kind));
    }
}

impl<R: DoorRig> SensorListener for SlidingDoorController<R> {
    fn on_entity_entered(&mut self, entity: EntityId) {
        debug!("Door '{}' sensor: {} entered", self.settings.name, entity);
        self.register_arrival();
    }

    fn on_entity_exited(&mut self, entity: EntityId) {
        debug!("Door '{}' sensor: {} exited", self.settings.name, entity);
        let old = self.occupancy.count();
        match self.occupancy.exit() {
            ExitOutcome::Underflow => self.emit(DoorEventKind::OccupancyUnderflow),
            ExitOutcome::StillOccupied(new) => self.emit(DoorEventKind::OccupancyChanged { old, new }),
            ExitOutcome::BecameEmpty => {
                self.emit(DoorEventKind::OccupancyChanged { old, new: 0 });
                if matches!(self.state, DoorState::Open | DoorState::Opening) {
                    self.schedule_delayed_close();
                }
            }
        }
    }

    fn on_sensor_activated(&mut self, already_inside: u32) {
        info!(
            "Door '{}' proximity sensor active with {} occupant(s) already inside",
            self.settings.name, already_inside
        );
        self.set_operation_mode(OperationMode::ProximitySensor);
        for _ in 0..already_inside {
            self.register_arrival();
        }
    }

    fn on_sensor_deactivated(&mut self) {
        info!("Door '{}' proximity sensor deactivated", self.settings.name);
        self.reset_occupancy();
        // Nobody is left to be let in by a sensor open queued earlier.
        if let Some(operation) = self.pending.take_sensor_open() {
            self.emit(DoorEventKind::PendingDiscarded { operation });
        }
        if matches!(self.state, DoorState::Open | DoorState::Opening) {
            self.force_close();
        }
    }
}
