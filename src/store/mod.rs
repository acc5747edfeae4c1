//! In-memory demo store
//!
//! Users and trips kept for the lifetime of the process. Nothing is
//! persisted; the store starts from a small fixed seed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: u64,
    pub destination: String,
    pub budget: i64,
    pub people_count: i64,
}

/// Body of a user create or update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Body of a trip create; numbers may arrive as strings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripInput {
    pub destination: Option<String>,
    pub budget: Option<Value>,
    pub people_count: Option<Value>,
}

/// Trip filter for recommendations; absent fields match everything
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripFilter {
    pub budget: Option<String>,
    pub people_count: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("missing required fields: {0}")]
    MissingFields(&'static str),
    #[error("invalid number for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("no user with id {0}")]
    UserNotFound(u64),
    #[error("no trip with id {0}")]
    TripNotFound(u64),
}

/// Leading integer of a JSON number or numeric string
fn leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// `"12abc"` reads as 12; no leading digits reads as nothing
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| i + sign_len);
    s[..digits].parse().ok()
}

/// Absent, null, empty and zero all count as missing
fn is_blank(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

pub struct DemoStore {
    users: RwLock<Vec<User>>,
    trips: RwLock<Vec<Trip>>,
}

impl DemoStore {
    /// Store with no users or trips
    pub fn empty() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            trips: RwLock::new(Vec::new()),
        }
    }

    /// Store holding the two demo users and two demo trips
    pub fn seeded() -> Self {
        let users = vec![
            User {
                id: 1,
                name: "Hong Gildong".to_string(),
                email: "hong@example.com".to_string(),
            },
            User {
                id: 2,
                name: "Kim Cheolsu".to_string(),
                email: "kim@example.com".to_string(),
            },
        ];
        let trips = vec![
            Trip {
                id: 1,
                destination: "Jeju".to_string(),
                budget: 500_000,
                people_count: 2,
            },
            Trip {
                id: 2,
                destination: "Busan".to_string(),
                budget: 300_000,
                people_count: 3,
            },
        ];

        Self {
            users: RwLock::new(users),
            trips: RwLock::new(trips),
        }
    }

    pub fn users(&self) -> Vec<User> {
        read(&self.users).clone()
    }

    pub fn user(&self, id: u64) -> Result<User, StoreError> {
        read(&self.users)
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::UserNotFound(id))
    }

    pub fn create_user(&self, input: UserInput) -> Result<User, StoreError> {
        let (name, email) = match (input.name, input.email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => (name, email),
            _ => return Err(StoreError::MissingFields("name, email")),
        };

        let mut users = write(&self.users);
        let user = User {
            id: next_id(users.iter().map(|u| u.id)),
            name,
            email,
        };
        users.push(user.clone());
        Ok(user)
    }

    /// Overwrite only the fields present and non-empty in `input`
    pub fn update_user(&self, id: u64, input: UserInput) -> Result<User, StoreError> {
        let mut users = write(&self.users);
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;

        if let Some(name) = input.name.filter(|n| !n.is_empty()) {
            user.name = name;
        }
        if let Some(email) = input.email.filter(|e| !e.is_empty()) {
            user.email = email;
        }
        Ok(user.clone())
    }

    pub fn delete_user(&self, id: u64) -> Result<User, StoreError> {
        let mut users = write(&self.users);
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;
        Ok(users.remove(index))
    }

    pub fn trips(&self) -> Vec<Trip> {
        read(&self.trips).clone()
    }

    pub fn trip(&self, id: u64) -> Result<Trip, StoreError> {
        read(&self.trips)
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::TripNotFound(id))
    }

    pub fn create_trip(&self, input: TripInput) -> Result<Trip, StoreError> {
        let destination = input.destination.filter(|d| !d.is_empty());
        if destination.is_none() || is_blank(&input.budget) || is_blank(&input.people_count) {
            return Err(StoreError::MissingFields("destination, budget, peopleCount"));
        }

        let number = |field: &'static str, value: &Option<Value>| {
            value.as_ref().and_then(leading_int).ok_or_else(|| StoreError::InvalidNumber {
                field,
                value: value.as_ref().map(Value::to_string).unwrap_or_default(),
            })
        };
        let budget = number("budget", &input.budget)?;
        let people_count = number("peopleCount", &input.people_count)?;

        let mut trips = write(&self.trips);
        let trip = Trip {
            id: next_id(trips.iter().map(|t| t.id)),
            destination: destination.unwrap_or_default(),
            budget,
            people_count,
        };
        trips.push(trip.clone());
        Ok(trip)
    }

    /// Trips within budget, for exactly the party size, in the region
    pub fn recommendations(&self, filter: &TripFilter) -> Vec<Trip> {
        let budget = filter
            .budget
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(parse_leading_int);
        let people = filter
            .people_count
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(parse_leading_int);
        let region = filter.region.as_deref().filter(|r| !r.is_empty());

        read(&self.trips)
            .iter()
            .filter(|trip| match budget {
                // An unreadable budget compares false, so it filters nothing.
                Some(Some(max)) => trip.budget <= max,
                _ => true,
            })
            .filter(|trip| match people {
                Some(count) => Some(trip.people_count) == count,
                None => true,
            })
            .filter(|trip| region.map_or(true, |r| trip.destination.contains(r)))
            .cloned()
            .collect()
    }
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::seeded()
    }
}
