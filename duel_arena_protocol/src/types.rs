// Connection identity shared by the relay and its tests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relay-assigned connection handle, issued in accept order. A connection is
/// the participant identity: one connection may sit in several sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}
