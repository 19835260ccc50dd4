//! Stations and the legs connecting them.
//!
//! A [`StationGraph`] holds exactly one [`Station`] per distinct coordinate.
//! Stations may carry several labels, and legs are stored as directed edges
//! on both of their endpoints. Stations are addressed by [`StationId`], which
//! is only meaningful for the graph that issued it.

use std::{collections::HashMap, ops::Index};

use crate::survex::SurveyDate;

mod label;
mod search;

pub use label::{natural_key, therion_label};
pub use search::Route;

/// A position in survey units (centimetres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Handle to a station within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationId(u32);

impl StationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

macro_rules! flag_set {
    ($(#[$attr:meta])* $name:ident { $($(#[$fattr:meta])* $bit:literal => $const:ident, $pred:ident;)* }) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u8);

        impl $name {
            $(
                $(#[$fattr])*
                pub const $const: Self = Self($bit);
            )*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn from_bits(bits: u8) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> u8 {
                self.0
            }

            /// Whether any flag of `other` is also set here.
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            $(
                pub const fn $pred(self) -> bool {
                    self.0 & $bit != 0
                }
            )*
        }

        impl core::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Station properties recorded by a label.
    StationFlags {
        0x01 => SURFACE, is_surface;
        0x02 => UNDERGROUND, is_underground;
        0x04 => ENTRANCE, is_entrance;
        0x08 => EXPORTED, is_exported;
        0x10 => FIXED, is_fixed;
        0x20 => ANONYMOUS, is_anonymous;
        0x40 => WALL, is_wall;
    }
}

flag_set! {
    /// Leg properties that exclude it from some totals.
    LegFlags {
        0x01 => SURFACE, is_surface;
        0x02 => DUPLICATE, is_duplicate;
        0x04 => SPLAY, is_splay;
    }
}

/// One end of a leg, as seen from the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub station: StationId,
    pub flags: LegFlags,
}

/// A directed leg between two stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub from: StationId,
    pub to: StationId,
    pub flags: LegFlags,
}

/// A survey station.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    coord: Coord,
    labels: Vec<String>,
    flags: StationFlags,
    date: SurveyDate,
    connected_from: Vec<Edge>,
    connected_to: Vec<Edge>,
}

impl Station {
    fn new(coord: Coord, date: SurveyDate) -> Self {
        Self {
            coord,
            labels: Vec::new(),
            flags: StationFlags::empty(),
            date,
            connected_from: Vec::new(),
            connected_to: Vec::new(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// All labels, in the order they were recorded.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The first label, or a placeholder for unlabelled stations.
    pub fn label(&self) -> &str {
        self.labels.first().map_or("<unnamed station>", String::as_str)
    }

    /// The first label in Therion notation (`a.b.c` becomes `c@b.a`).
    pub fn therion_label(&self) -> String {
        therion_label(self.label())
    }

    pub fn flags(&self) -> StationFlags {
        self.flags
    }

    pub fn date(&self) -> SurveyDate {
        self.date
    }

    /// Legs ending at this station.
    pub fn connected_from(&self) -> &[Edge] {
        &self.connected_from
    }

    /// Legs starting at this station.
    pub fn connected_to(&self) -> &[Edge] {
        &self.connected_to
    }

    /// Neighbouring stations, regardless of leg direction.
    pub fn connected(&self) -> impl Iterator<Item = StationId> + '_ {
        self.connected_from
            .iter()
            .chain(&self.connected_to)
            .map(|e| e.station)
    }

    /// Straight-line distance.
    pub fn distance(&self, other: &Station) -> f64 {
        let (dx, dy, dz) = self.delta(other);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn distance_horizontal(&self, other: &Station) -> f64 {
        let (dx, dy, _) = self.delta(other);
        (dx * dx + dy * dy).sqrt()
    }

    /// Signed altitude difference; negative if `other` is below.
    pub fn distance_vertical(&self, other: &Station) -> f64 {
        self.delta(other).2
    }

    /// Compass bearing to `other` in degrees, 0 when it lies due north.
    pub fn bearing(&self, other: &Station) -> f64 {
        let (dx, dy, _) = self.delta(other);
        dx.atan2(dy).to_degrees().rem_euclid(360.0)
    }

    fn delta(&self, other: &Station) -> (f64, f64, f64) {
        (
            f64::from(other.coord.x) - f64::from(self.coord.x),
            f64::from(other.coord.y) - f64::from(self.coord.y),
            f64::from(other.coord.z) - f64::from(self.coord.z),
        )
    }
}

/// Stations keyed by coordinate, with a label index.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationGraph {
    stations: Vec<Station>,
    by_coord: HashMap<Coord, StationId>,
    by_label: HashMap<String, StationId>,
}

impl StationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Look up the station at `coord`, creating it if there is none.
    pub fn get_or_create(&mut self, coord: Coord) -> StationId {
        self.get_or_create_dated(coord, SurveyDate::Unknown)
    }

    /// As [`Self::get_or_create`], dating the station if it is new.
    pub fn get_or_create_dated(&mut self, coord: Coord, date: SurveyDate) -> StationId {
        let stations = &mut self.stations;
        *self.by_coord.entry(coord).or_insert_with(|| {
            let id = StationId(stations.len() as u32);
            stations.push(Station::new(coord, date));
            id
        })
    }

    /// Record a label for a station and merge in its flags.
    ///
    /// A label already pointing at another station is re-pointed here.
    pub fn add_label(&mut self, id: StationId, label: String, flags: StationFlags) {
        let station = &mut self.stations[id.index()];
        station.flags |= flags;
        station.labels.push(label.clone());
        self.by_label.insert(label, id);
    }

    /// Add a directed leg. Parallel legs are kept.
    pub fn connect(&mut self, from: StationId, to: StationId, flags: LegFlags) {
        self.stations[to.index()]
            .connected_from
            .push(Edge { station: from, flags });
        self.stations[from.index()]
            .connected_to
            .push(Edge { station: to, flags });
    }

    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    pub fn by_label(&self, label: &str) -> Option<StationId> {
        self.by_label.get(label).copied()
    }

    pub fn by_coord(&self, coord: Coord) -> Option<StationId> {
        self.by_coord.get(&coord).copied()
    }

    /// The label to station mapping.
    pub fn label_index(&self) -> &HashMap<String, StationId> {
        &self.by_label
    }

    /// Rebuild the label index from the stations' labels, later stations
    /// winning where labels collide.
    pub fn reindex(&mut self) {
        self.by_label = self
            .stations()
            .flat_map(|(id, s)| s.labels.iter().map(move |l| (l.clone(), id)))
            .collect();
    }

    /// All stations in creation order.
    pub fn stations(&self) -> impl Iterator<Item = (StationId, &Station)> {
        self.stations
            .iter()
            .enumerate()
            .map(|(i, s)| (StationId(i as u32), s))
    }

    /// All legs, grouped by the station they end at.
    pub fn legs(&self) -> impl Iterator<Item = Leg> + '_ {
        self.stations().flat_map(|(to, s)| {
            s.connected_from.iter().map(move |e| Leg {
                from: e.station,
                to,
                flags: e.flags,
            })
        })
    }

    pub(crate) fn neighbours(&self, id: StationId) -> impl Iterator<Item = StationId> + '_ {
        self.stations[id.index()].connected()
    }

    /// Length of a leg in survey units.
    pub fn leg_length(&self, leg: &Leg) -> f64 {
        self[leg.from].distance(&self[leg.to])
    }

    /// Total length of all legs, whatever their flags.
    pub fn length(&self) -> f64 {
        self.legs().map(|l| self.leg_length(&l)).sum()
    }

    /// Total length of legs that are not surface, duplicate or splay legs.
    pub fn cave_length(&self) -> f64 {
        let excluded = LegFlags::SURFACE | LegFlags::DUPLICATE | LegFlags::SPLAY;
        self.legs()
            .filter(|l| !l.flags.intersects(excluded))
            .map(|l| self.leg_length(&l))
            .sum()
    }

    /// Lowest and highest coordinate on each axis.
    pub fn extent(&self) -> Option<(Coord, Coord)> {
        let mut coords = self.stations.iter().map(|s| s.coord);
        let first = coords.next()?;

        Some(coords.fold((first, first), |(lo, hi), c| {
            (
                Coord::new(lo.x.min(c.x), lo.y.min(c.y), lo.z.min(c.z)),
                Coord::new(hi.x.max(c.x), hi.y.max(c.y), hi.z.max(c.z)),
            )
        }))
    }

    /// Vertical range of all stations.
    pub fn depth(&self) -> i64 {
        self.extent()
            .map_or(0, |(lo, hi)| i64::from(hi.z) - i64::from(lo.z))
    }

    /// Stations with any label starting with `prefix`.
    pub fn filter<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (StationId, &'a Station)> {
        self.stations()
            .filter(move |(_, s)| s.labels.iter().any(|l| l.starts_with(prefix)))
    }

    /// All indexed labels in natural order (`"2"` before `"10"`).
    pub fn sorted_labels(&self) -> Vec<&str> {
        let mut labels: Vec<_> = self.by_label.keys().map(String::as_str).collect();
        labels.sort_by_cached_key(|l| natural_key(l));
        labels
    }

    /// The closest pair of stations between this graph and `other`, as
    /// `(distance, ours, theirs)`.
    pub fn nearest_stations(&self, other: &StationGraph) -> Option<(f64, StationId, StationId)> {
        self.stations()
            .flat_map(|(a, sa)| other.stations().map(move |(b, sb)| (sa.distance(sb), a, b)))
            .min_by(|x, y| x.0.total_cmp(&y.0))
    }
}

impl Index<StationId> for StationGraph {
    type Output = Station;

    fn index(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }
}
