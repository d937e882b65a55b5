//! Connected screens
//!
//! A session has at most one host, who drives the game, and any number of
//! viewers showing the board read-only. Each connection is identified by a
//! random [`Id`]; the tunnel behind an id is looked up on demand so that
//! reconnects keep their role.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use super::{SyncMessage, UpdateMessage, session::Tunnel};

/// A unique identifier for a connection
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Role of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Value {
    /// Drives the game and sees every answer
    Host,
    /// Shows the board; hidden answers stay hidden
    Viewer,
}

/// Role of a connection, used as a map key
///
/// Roles carry no data, so this is the same set as [`Value`].
pub type ValueKind = Value;

impl Value {
    /// Returns the kind of this value
    pub fn kind(self) -> ValueKind {
        self
    }
}

/// Serialization helper for Watchers struct
#[derive(Deserialize)]
struct WatchersSerde {
    mapping: HashMap<Id, Value>,
}

/// All connections of a session
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "WatchersSerde")]
pub struct Watchers {
    mapping: HashMap<Id, Value>,

    #[serde(skip_serializing)]
    reverse_mapping: EnumMap<ValueKind, HashSet<Id>>,
}

impl From<WatchersSerde> for Watchers {
    /// Rebuilds the role index, which is not serialized
    fn from(serde: WatchersSerde) -> Self {
        let WatchersSerde { mapping } = serde;
        let mut reverse_mapping: EnumMap<ValueKind, HashSet<Id>> = EnumMap::default();
        for (id, value) in &mapping {
            reverse_mapping[value.kind()].insert(*id);
        }
        Self {
            mapping,
            reverse_mapping,
        }
    }
}

/// Errors that can occur when managing connections
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The session has reached the maximum number of connections
    #[error("maximum number of connections reached")]
    MaximumWatchers,
    /// Another connection is already the host
    #[error("the game already has a host")]
    HostTaken,
}

impl Watchers {
    /// Creates a session with its host already connected
    pub fn with_host_id(host_id: Id) -> Self {
        let mut watchers = Self::default();
        watchers.mapping.insert(host_id, Value::Host);
        watchers.reverse_mapping[ValueKind::Host].insert(host_id);
        watchers
    }

    /// All live connections with their tunnels and roles
    pub fn vec<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) -> Vec<(Id, T, Value)> {
        self.mapping
            .iter()
            .filter_map(|(id, value)| Some((*id, tunnel_finder(*id)?, *value)))
            .collect_vec()
    }

    /// Number of connections with a given role
    pub fn specific_count(&self, filter: ValueKind) -> usize {
        self.reverse_mapping[filter].len()
    }

    /// Registers a connection
    ///
    /// # Errors
    ///
    /// * `Error::HostTaken` - A different connection is already the host
    /// * `Error::MaximumWatchers` - The session is full
    pub fn add_watcher(&mut self, watcher_id: Id, watcher_value: Value) -> Result<(), Error> {
        let kind = watcher_value.kind();

        if kind == ValueKind::Host
            && self.reverse_mapping[ValueKind::Host]
                .iter()
                .any(|host| *host != watcher_id)
        {
            return Err(Error::HostTaken);
        }
        if !self.mapping.contains_key(&watcher_id)
            && self.mapping.len() >= crate::constants::watcher::MAX_WATCHER_COUNT
        {
            return Err(Error::MaximumWatchers);
        }

        if let Some(old) = self.mapping.insert(watcher_id, watcher_value) {
            self.reverse_mapping[old.kind()].remove(&watcher_id);
        }
        self.reverse_mapping[kind].insert(watcher_id);

        Ok(())
    }

    /// Forgets a connection
    ///
    /// # Returns
    ///
    /// The role it had, if it was registered.
    pub fn remove_watcher(&mut self, watcher_id: Id) -> Option<Value> {
        let value = self.mapping.remove(&watcher_id)?;
        self.reverse_mapping[value.kind()].remove(&watcher_id);
        Some(value)
    }

    /// Role of a connection
    pub fn get_watcher_value(&self, watcher_id: Id) -> Option<Value> {
        self.mapping.get(&watcher_id).copied()
    }

    /// Closes the tunnel of a connection, if it is live
    pub fn remove_watcher_session<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        if let Some(tunnel) = tunnel_finder(watcher_id) {
            tunnel.close();
        }
    }

    /// Sends an update to one connection
    pub fn send_message<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(session) = tunnel_finder(watcher_id) else {
            return;
        };

        session.send_message(message);
    }

    /// Sends the full state to one connection
    pub fn send_state<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &SyncMessage,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(session) = tunnel_finder(watcher_id) else {
            return;
        };

        session.send_state(message);
    }

    /// Sends each connection the message built for its role
    ///
    /// `sender` may return `None` to skip a connection.
    pub fn announce_with<S, T: Tunnel, F: Fn(Id) -> Option<T>>(&self, sender: S, tunnel_finder: F)
    where
        S: Fn(Id, ValueKind) -> Option<UpdateMessage>,
    {
        for (watcher, session, value) in self.vec(tunnel_finder) {
            let Some(message) = sender(watcher, value.kind()) else {
                continue;
            };

            session.send_message(&message);
        }
    }
}
