//! Memory addresses
//!
//! An [`Address`] identifies a cell by partition (stack or heap) plus an
//! offset inside that partition.  Addresses are totally ordered, hashable,
//! and print as `S00001` / `H00017` — the form students see in memory views.
//! They serialize as that same display string, so persisted states stay
//! readable and aliasing survives round-trips by plain value equality.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The two disjoint address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Partition {
    Stack,
    Heap,
}

impl Partition {
    pub fn prefix(self) -> char {
        match self {
            Partition::Stack => 'S',
            Partition::Heap => 'H',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Partition::Stack => "stack",
            Partition::Heap => "heap",
        }
    }
}

/// Partition + offset identity of one memory location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    pub partition: Partition,
    pub offset: u64,
}

impl Address {
    pub fn new(partition: Partition, offset: u64) -> Self {
        Address { partition, offset }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:05}", self.partition.prefix(), self.offset)
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let partition = match s.chars().next() {
            Some('S') => Partition::Stack,
            Some('H') => Partition::Heap,
            _ => return Err(format!("invalid address '{}'", s)),
        };
        let offset = s[1..]
            .parse::<u64>()
            .map_err(|_| format!("invalid address '{}'", s))?;
        Ok(Address { partition, offset })
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AddressVisitor;

impl Visitor<'_> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an address string like \"S00001\" or \"H00017\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
        v.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let addr = Address::new(Partition::Heap, 17);
        assert_eq!(addr.to_string(), "H00017");
        assert_eq!("H00017".parse::<Address>().unwrap(), addr);
        assert_eq!(
            "S00001".parse::<Address>().unwrap(),
            Address::new(Partition::Stack, 1)
        );
        assert!("X00001".parse::<Address>().is_err());
    }

    #[test]
    fn ordering_is_partition_then_offset() {
        let s9 = Address::new(Partition::Stack, 9);
        let h0 = Address::new(Partition::Heap, 0);
        let h5 = Address::new(Partition::Heap, 5);
        assert!(s9 < h0);
        assert!(h0 < h5);
    }
}
