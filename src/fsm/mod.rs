//! Sort-cycle state identity.
//!
//! ```text
//!  IDLE ──[present]──▶ OBJECT_DETECTED ──[intake done]──▶ CAPTURING
//!    ▲                                                       │
//!    │                                  [no artifact]────────┤
//!    │                                                       ▼
//!    │                                              CLASSIFYING
//!    │                                                       │
//!    │                                                       ▼
//!    └────────────── RETURNING ◀──────────────────────── SORTING
//!
//!  Any state ──[shutdown]──▶ teardown (rewind conveyor, release outputs)
//! ```
//!
//! The controller executes one state handler at a time.  Each handler
//! returns the next [`StateId`]; returning `Idle` ends the cycle.  The
//! per-cycle blackboard lives in [`context::CycleState`].

pub mod context;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all sort-cycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    ObjectDetected = 1,
    Capturing = 2,
    Classifying = 3,
    Sorting = 4,
    Returning = 5,
}

impl StateId {
    /// Total number of states.
    pub const COUNT: usize = 6;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (the safe state).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::ObjectDetected,
            2 => Self::Capturing,
            3 => Self::Classifying,
            4 => Self::Sorting,
            5 => Self::Returning,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }

    /// Upper-case name used in transition logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::ObjectDetected => "OBJECT_DETECTED",
            Self::Capturing => "CAPTURING",
            Self::Classifying => "CLASSIFYING",
            Self::Sorting => "SORTING",
            Self::Returning => "RETURNING",
        }
    }

    /// Whether `next` is a legal successor of `self`.  Cancellation may
    /// drop any active state straight back to IDLE.
    pub fn can_transition_to(self, next: StateId) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::ObjectDetected)
                | (Self::ObjectDetected, Self::Capturing)
                | (Self::Capturing, Self::Classifying)
                | (Self::Capturing, Self::Returning)
                | (Self::Classifying, Self::Sorting)
                | (Self::Sorting, Self::Returning)
        ) || (self != Self::Idle && next == Self::Idle)
    }
}

impl core::fmt::Display for StateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
