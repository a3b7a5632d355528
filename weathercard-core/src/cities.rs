//! Built-in list of cities offered for selection.

use crate::model::Place;

pub const DEFAULT_CITY: &str = "Atlanta";

pub const CITIES: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Dallas",
    "Houston",
    "Washington",
    "Philadelphia",
    "Miami",
    "Atlanta",
    "Phoenix",
    "Boston",
    "San Francisco",
    "Riverside",
    "Detroit",
    "Seattle",
    "Minneapolis",
    "San Diego",
    "Tampa",
    "Denver",
    "Baltimore",
    "St. Louis",
    "Charlotte",
    "Orlando",
    "San Antonio",
    "Portland",
    "Austin",
];

pub fn default_place() -> Place {
    Place(DEFAULT_CITY.to_string())
}

pub fn places() -> impl Iterator<Item = Place> {
    CITIES.iter().map(|name| Place(name.to_string()))
}
