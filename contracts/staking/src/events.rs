//! Audit Events for the Staking Contracts
//!
//! One event per mutating operation, each carrying the operator, the
//! stake pool address, and operation-specific amounts. The engine never
//! performs I/O itself: events go through the injected [`EventSink`],
//! and the in-memory [`EventLog`] serves tests and embedders that index
//! events themselves.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::Address;
use crate::Vec;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Contract Lifecycle Events (0x01 - 0x1F)
    ContractCreated = 0x01,
    VoterUpdated = 0x02,
    LockupReset = 0x03,
    StakeAdded = 0x04,
    OperatorSwitched = 0x05,

    // Commission Events (0x20 - 0x3F)
    CommissionRequested = 0x20,
    CommissionUpdated = 0x21,

    // Distribution Events (0x40 - 0x5F)
    StakeUnlocked = 0x40,
    DistributionAdded = 0x41,
    DistributionPaid = 0x42,
}

/// Main event enum containing all staking contract events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum StakingEvent {
    // ============ Contract Lifecycle Events ============

    /// Emitted when a staking contract is created
    ContractCreated {
        operator: Address,
        voter: Address,
        pool_address: Address,
        principal: u64,
        commission_percentage: u64,
    },

    /// Emitted when the delegated voter changes
    VoterUpdated {
        operator: Address,
        pool_address: Address,
        old_voter: Address,
        new_voter: Address,
    },

    /// Emitted when the stake pool lockup is extended
    LockupReset {
        operator: Address,
        pool_address: Address,
    },

    /// Emitted when the staker adds principal
    StakeAdded {
        operator: Address,
        pool_address: Address,
        amount: u64,
    },

    /// Emitted when a contract is re-keyed to a new operator
    OperatorSwitched {
        old_operator: Address,
        new_operator: Address,
        pool_address: Address,
    },

    // ============ Commission Events ============

    /// Emitted when operator commission is claimed
    CommissionRequested {
        operator: Address,
        pool_address: Address,
        accumulated_rewards: u64,
        commission_amount: u64,
    },

    /// Emitted when the commission rate changes
    CommissionUpdated {
        operator: Address,
        pool_address: Address,
        old_commission: u64,
        new_commission: u64,
    },

    // ============ Distribution Events ============

    /// Emitted when the staker requests a principal withdrawal
    StakeUnlocked {
        operator: Address,
        pool_address: Address,
        amount: u64,
        commission_paid: u64,
    },

    /// Emitted when a pending distribution claim is recorded
    DistributionAdded {
        operator: Address,
        pool_address: Address,
        amount: u64,
    },

    /// Emitted when a settled distribution is paid out
    DistributionPaid {
        operator: Address,
        pool_address: Address,
        recipient: Address,
        amount: u64,
    },
}

impl StakingEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::ContractCreated { .. } => EventType::ContractCreated,
            Self::VoterUpdated { .. } => EventType::VoterUpdated,
            Self::LockupReset { .. } => EventType::LockupReset,
            Self::StakeAdded { .. } => EventType::StakeAdded,
            Self::OperatorSwitched { .. } => EventType::OperatorSwitched,
            Self::CommissionRequested { .. } => EventType::CommissionRequested,
            Self::CommissionUpdated { .. } => EventType::CommissionUpdated,
            Self::StakeUnlocked { .. } => EventType::StakeUnlocked,
            Self::DistributionAdded { .. } => EventType::DistributionAdded,
            Self::DistributionPaid { .. } => EventType::DistributionPaid,
        }
    }

    /// The stake pool this event concerns
    pub fn pool_address(&self) -> Address {
        match self {
            Self::ContractCreated { pool_address, .. } => *pool_address,
            Self::VoterUpdated { pool_address, .. } => *pool_address,
            Self::LockupReset { pool_address, .. } => *pool_address,
            Self::StakeAdded { pool_address, .. } => *pool_address,
            Self::OperatorSwitched { pool_address, .. } => *pool_address,
            Self::CommissionRequested { pool_address, .. } => *pool_address,
            Self::CommissionUpdated { pool_address, .. } => *pool_address,
            Self::StakeUnlocked { pool_address, .. } => *pool_address,
            Self::DistributionAdded { pool_address, .. } => *pool_address,
            Self::DistributionPaid { pool_address, .. } => *pool_address,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Append-only audit sink the engine emits into.
///
/// Injected per operation so the accounting engine stays free of I/O;
/// substitute an in-memory [`EventLog`] in tests.
pub trait EventSink {
    /// Record one event
    fn emit(&mut self, event: StakingEvent);
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<StakingEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Get all events
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<StakingEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&StakingEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: StakingEvent) {
        self.events.push(event);
    }
}
