//! Favourite cities and the pure list operations over them.
//!
//! A city is identified by the `name` the weather source returned, compared
//! exactly. Every function here returns a new list; persisting it is the
//! caller's job.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Unit, WeatherObservation};

/// A bookmarked city: the last observation seen plus the unit it was seen in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouriteEntry {
    #[serde(flatten)]
    pub observation: WeatherObservation,
    // Older lists were written with `unitValue`.
    #[serde(default, alias = "unitValue")]
    pub unit: Unit,
}

impl FavouriteEntry {
    pub fn new(observation: WeatherObservation, unit: Unit) -> Self {
        Self { observation, unit }
    }

    pub fn name(&self) -> &str {
        &self.observation.name
    }
}

/// Ordered favourites, persisted as one JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FavouritesList(Vec<FavouriteEntry>);

impl<'de> Deserialize<'de> for FavouritesList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<FavouriteEntry>::deserialize(deserializer).map(FavouritesList::from)
    }
}

impl FavouritesList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FavouriteEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, city: &str) -> Option<usize> {
        self.0.iter().position(|e| e.name() == city)
    }

    pub fn get(&self, city: &str) -> Option<&FavouriteEntry> {
        self.0.iter().find(|e| e.name() == city)
    }

    /// Replace the entry at `index` with `entry`, dropping any other entry
    /// that already carries the new name.
    pub(crate) fn replace_at(&mut self, index: usize, entry: FavouriteEntry) {
        let name = entry.name().to_string();
        if let Some(slot) = self.0.get_mut(index) {
            *slot = entry;
        }

        let mut i = 0;
        self.0.retain(|e| {
            let keep = i == index || e.name() != name;
            i += 1;
            keep
        });
    }
}

impl From<Vec<FavouriteEntry>> for FavouritesList {
    /// Later duplicates of a name are discarded.
    fn from(entries: Vec<FavouriteEntry>) -> Self {
        let mut list = FavouritesList::new();
        for entry in entries {
            if list.position(entry.name()).is_none() {
                list.0.push(entry);
            }
        }
        list
    }
}

/// Outcome of a favourite toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggled {
    pub list: FavouritesList,
    pub is_favourite: bool,
}

pub fn is_favourite(list: &FavouritesList, city: &str) -> bool {
    list.position(city).is_some()
}

/// Add the city if absent, otherwise remove it.
pub fn toggle_favourite(list: &FavouritesList, observation: &WeatherObservation, unit: Unit) -> Toggled {
    if is_favourite(list, &observation.name) {
        Toggled { list: remove_favourite(list, &observation.name), is_favourite: false }
    } else {
        let mut entries = list.0.clone();
        entries.push(FavouriteEntry::new(observation.clone(), unit));
        Toggled { list: FavouritesList(entries), is_favourite: true }
    }
}

pub fn remove_favourite(list: &FavouritesList, city: &str) -> FavouritesList {
    FavouritesList(list.0.iter().filter(|e| e.name() != city).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::observation;
    use std::collections::HashSet;

    fn list_of(names: &[&str]) -> FavouritesList {
        names.iter().fold(FavouritesList::new(), |list, name| {
            toggle_favourite(&list, &observation(name, 10.0), Unit::Celsius).list
        })
    }

    #[test]
    fn toggle_adds_then_removes() {
        let list = list_of(&["Oslo"]);
        let paris = observation("Paris", 18.0);

        let added = toggle_favourite(&list, &paris, Unit::Fahrenheit);
        assert!(added.is_favourite);
        assert!(is_favourite(&added.list, "Paris"));
        assert_eq!(added.list.entries().last().map(|e| e.unit), Some(Unit::Fahrenheit));

        let removed = toggle_favourite(&added.list, &paris, Unit::Fahrenheit);
        assert!(!removed.is_favourite);
        assert!(!is_favourite(&removed.list, "Paris"));
    }

    #[test]
    fn toggling_twice_restores_original_list() {
        let original = list_of(&["Oslo", "Lima", "Cairo"]);
        let paris = observation("Paris", 21.0);

        let once = toggle_favourite(&original, &paris, Unit::Fahrenheit).list;
        let twice = toggle_favourite(&once, &paris, Unit::Fahrenheit).list;

        assert_eq!(twice, original);
    }

    #[test]
    fn toggling_present_city_twice_moves_it_to_the_end() {
        let original = list_of(&["Oslo", "Lima", "Cairo"]);
        let lima = observation("Lima", 27.5);

        let once = toggle_favourite(&original, &lima, Unit::Fahrenheit).list;
        let twice = toggle_favourite(&once, &lima, Unit::Fahrenheit).list;

        let names: Vec<_> = twice.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Oslo", "Cairo", "Lima"]);
        assert_eq!(twice.entries()[0], original.entries()[0]);
        assert_eq!(twice.entries()[1], original.entries()[2]);

        let last = twice.entries().last().unwrap();
        assert_eq!(last.observation, lima);
        assert_eq!(last.unit, Unit::Fahrenheit);
    }

    #[test]
    fn repeated_toggles_never_duplicate_names() {
        let mut list = FavouritesList::new();
        let cities = ["Paris", "Oslo", "Paris", "Paris", "Lima", "Oslo", "Paris"];

        for city in cities {
            list = toggle_favourite(&list, &observation(city, 5.0), Unit::Celsius).list;
            let names: HashSet<_> = list.entries().iter().map(|e| e.name()).collect();
            assert_eq!(names.len(), list.len());
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        let list = list_of(&["Paris"]);
        assert!(is_favourite(&list, "Paris"));
        assert!(!is_favourite(&list, "paris"));
    }

    #[test]
    fn remove_keeps_order_of_others() {
        let list = list_of(&["Oslo", "Lima", "Cairo"]);
        let out = remove_favourite(&list, "Lima");

        let names: Vec<_> = out.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Oslo", "Cairo"]);
        assert_eq!(remove_favourite(&out, "Nowhere"), out);
    }

    #[test]
    fn replace_at_drops_clashing_entry() {
        let mut list = list_of(&["Oslo", "paris", "Paris"]);
        list.replace_at(1, FavouriteEntry::new(observation("Paris", 30.0), Unit::Fahrenheit));

        let names: Vec<_> = list.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Oslo", "Paris"]);
        assert_eq!(list.get("Paris").map(|e| e.unit), Some(Unit::Fahrenheit));
    }

    #[test]
    fn entry_serializes_flat_with_unit_tag() {
        let entry = FavouriteEntry::new(observation("Paris", 18.0), Unit::Celsius);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["name"], "Paris");
        assert_eq!(value["unit"], "C");
        assert_eq!(value["main"]["temp"], 18.0);
    }

    #[test]
    fn legacy_unit_value_key_is_accepted() {
        let raw = r#"[{
            "name": "Paris",
            "main": {"temp": 18.0, "humidity": 50},
            "wind": {"speed": 2.0},
            "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
            "unitValue": "F"
        }]"#;

        let list: FavouritesList = serde_json::from_str(raw).unwrap();
        let entry = list.get("Paris").unwrap();
        assert_eq!(entry.unit, Unit::Fahrenheit);
        assert!(entry.observation.extra.is_empty());
    }

    #[test]
    fn saved_entry_keeps_nested_document_fields() {
        let raw = r#"{
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 12.3, "humidity": 81, "sea_level": 1012},
            "wind": {"speed": 4.1, "gust": 7.6},
            "sys": {"country": "FR"},
            "name": "Paris"
        }"#;
        let obs: WeatherObservation = serde_json::from_str(raw).unwrap();

        let list = toggle_favourite(&FavouritesList::new(), &obs, Unit::Celsius).list;
        let stored = serde_json::to_value(&list).unwrap();

        assert_eq!(stored[0]["weather"][0]["id"], 500);
        assert_eq!(stored[0]["main"]["sea_level"], 1012);
        assert_eq!(stored[0]["wind"]["gust"], 7.6);
        assert_eq!(stored[0]["sys"]["country"], "FR");
        assert_eq!(stored[0]["unit"], "C");

        let reloaded: FavouritesList = serde_json::from_value(stored).unwrap();
        assert_eq!(reloaded.get("Paris").unwrap().observation, obs);
    }

    #[test]
    fn from_vec_discards_later_duplicates() {
        let entries = vec![
            FavouriteEntry::new(observation("Paris", 1.0), Unit::Celsius),
            FavouriteEntry::new(observation("Paris", 2.0), Unit::Celsius),
        ];

        let list = FavouritesList::from(entries.clone());
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("Paris").unwrap().observation.main.temp, 1.0);

        let raw = serde_json::to_string(&entries).unwrap();
        let parsed: FavouritesList = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, list);
    }
}
