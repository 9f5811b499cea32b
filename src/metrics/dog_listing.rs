//! Dog listings: adoptable dogs of a breed in a state, and dogs by city
//!
//! Plain filtered joins. Attribute and description rows are optional here
//! (left-join semantics), unlike preference matching.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::data::AdoptionData;

pub const SAMPLE_DOGS_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDog {
    pub dog_id: i64,
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub size: Option<String>,
    pub city: String,
    pub state: String,
    pub fixed: Option<bool>,
    pub house_trained: Option<bool>,
    pub env_children: Option<bool>,
    pub special_needs: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDog {
    pub org_id: String,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub dog_id: i64,
    pub dog_name: Option<String>,
    pub dog_age: Option<String>,
    pub dog_sex: Option<String>,
    pub dog_size: Option<String>,
    pub breed_primary: Option<String>,
    pub breed_secondary: Option<String>,
    pub breed_mixed: Option<bool>,
    pub color_primary: Option<String>,
    pub color_secondary: Option<String>,
    pub coat: Option<String>,
    pub fixed: Option<bool>,
    pub house_trained: Option<bool>,
    pub special_needs: Option<bool>,
    pub shots_current: Option<bool>,
    pub env_children: Option<bool>,
}

/// true, then false, then missing
fn flag_order(a: Option<bool>, b: Option<bool>) -> Ordering {
    let key = |v: Option<bool>| match v {
        Some(true) => 0,
        Some(false) => 1,
        None => 2,
    };
    key(a).cmp(&key(b))
}

/// Present names ascending, missing names last
fn name_order(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dogs of a breed at shelters in a state, child-friendly and fixed dogs first
///
/// State and breed match case-insensitively. At most [`SAMPLE_DOGS_LIMIT`] rows.
pub fn sample_dogs(data: &AdoptionData, state: &str, breed: &str) -> Vec<SampleDog> {
    let mut rows: Vec<SampleDog> = data
        .dogs_with_shelters()
        .filter(|(_, shelter)| shelter.state.eq_ignore_ascii_case(state))
        .filter(|(dog, _)| {
            data.primary_breed(dog.dog_id)
                .map_or(false, |b| b.to_lowercase() == breed.to_lowercase())
        })
        .map(|(dog, shelter)| {
            let attrs = data.attributes(dog.dog_id);
            SampleDog {
                dog_id: dog.dog_id,
                name: dog.name.clone(),
                age: dog.age.clone(),
                sex: dog.sex.clone(),
                size: dog.size.clone(),
                city: shelter.city.clone(),
                state: shelter.state.clone(),
                fixed: attrs.and_then(|a| a.fixed),
                house_trained: attrs.and_then(|a| a.house_trained),
                env_children: attrs.and_then(|a| a.env_children),
                special_needs: attrs.and_then(|a| a.special_needs),
                description: data.description(dog.dog_id).map(|d| d.text.clone()),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        flag_order(a.env_children, b.env_children)
            .then_with(|| flag_order(a.fixed, b.fixed))
            .then_with(|| name_order(&a.name, &b.name))
            .then_with(|| a.dog_id.cmp(&b.dog_id))
    });
    rows.truncate(SAMPLE_DOGS_LIMIT);
    rows
}

/// Every dog at shelters in `city` (exact match), ordered by org id then dog id
pub fn dogs_by_city(data: &AdoptionData, city: &str) -> Vec<CityDog> {
    let mut rows: Vec<CityDog> = data
        .dogs_with_shelters()
        .filter(|(_, shelter)| shelter.city == city)
        .map(|(dog, shelter)| {
            let breed = data.breed(dog.dog_id);
            let attrs = data.attributes(dog.dog_id);
            CityDog {
                org_id: shelter.org_id.clone(),
                city: shelter.city.clone(),
                state: shelter.state.clone(),
                zip: shelter.zip.clone(),
                dog_id: dog.dog_id,
                dog_name: dog.name.clone(),
                dog_age: dog.age.clone(),
                dog_sex: dog.sex.clone(),
                dog_size: dog.size.clone(),
                breed_primary: breed.and_then(|b| b.breed_primary.clone()),
                breed_secondary: breed.and_then(|b| b.breed_secondary.clone()),
                breed_mixed: breed.and_then(|b| b.mixed),
                color_primary: attrs.and_then(|a| a.color_primary.clone()),
                color_secondary: attrs.and_then(|a| a.color_secondary.clone()),
                coat: attrs.and_then(|a| a.coat.clone()),
                fixed: attrs.and_then(|a| a.fixed),
                house_trained: attrs.and_then(|a| a.house_trained),
                special_needs: attrs.and_then(|a| a.special_needs),
                shots_current: attrs.and_then(|a| a.shots_current),
                env_children: attrs.and_then(|a| a.env_children),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.org_id.cmp(&b.org_id).then_with(|| a.dog_id.cmp(&b.dog_id)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dog, DogAttributes, DogBreed, Shelter, Tables};

    fn snapshot() -> AdoptionData {
        let dog = |dog_id: i64, org: &str, name: Option<&str>| Dog {
            dog_id,
            org_id: org.into(),
            name: name.map(String::from),
            age: None,
            sex: None,
            size: None,
        };
        let attrs = |dog_id: i64, env_children: Option<bool>, fixed: Option<bool>| DogAttributes {
            dog_id,
            env_children,
            fixed,
            ..Default::default()
        };

        AdoptionData::from_tables(Tables {
            shelters: vec![
                Shelter { org_id: "WA02".into(), city: "Seattle".into(), state: "WA".into(), zip: Some("98101".into()) },
                Shelter { org_id: "WA01".into(), city: "Seattle".into(), state: "WA".into(), zip: None },
                Shelter { org_id: "OR01".into(), city: "Portland".into(), state: "OR".into(), zip: None },
            ],
            dogs: vec![
                dog(1, "WA02", Some("Zed")),
                dog(2, "WA01", Some("Abe")),
                dog(3, "WA01", None),
                dog(4, "WA02", Some("Max")),
                dog(5, "OR01", Some("Ore")),
                dog(6, "WA01", Some("Bo")),
            ],
            breeds: vec![
                DogBreed { dog_id: 1, breed_primary: Some("Beagle".into()), ..Default::default() },
                DogBreed { dog_id: 2, breed_primary: Some("Beagle".into()), ..Default::default() },
                DogBreed { dog_id: 3, breed_primary: Some("beagle".into()), ..Default::default() },
                DogBreed { dog_id: 4, breed_primary: Some("Beagle".into()), ..Default::default() },
                DogBreed { dog_id: 5, breed_primary: Some("Beagle".into()), ..Default::default() },
            ],
            attributes: vec![
                attrs(1, Some(true), Some(true)),
                attrs(2, Some(false), Some(true)),
                attrs(4, Some(true), Some(false)),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_sample_dogs_ordering() {
        let rows = sample_dogs(&snapshot(), "wa", "BEAGLE");
        let ids: Vec<i64> = rows.iter().map(|r| r.dog_id).collect();
        assert_eq!(ids, vec![1, 4, 2, 3]);
        assert!(rows.iter().all(|r| r.state == "WA"));
    }

    #[test]
    fn test_sample_dogs_no_match() {
        assert!(sample_dogs(&snapshot(), "TX", "Beagle").is_empty());
    }

    #[test]
    fn test_dogs_by_city_left_joins() {
        let rows = dogs_by_city(&snapshot(), "Seattle");
        let keys: Vec<(&str, i64)> = rows.iter().map(|r| (r.org_id.as_str(), r.dog_id)).collect();
        assert_eq!(keys, vec![("WA01", 2), ("WA01", 3), ("WA01", 6), ("WA02", 1), ("WA02", 4)]);

        let bo = rows.iter().find(|r| r.dog_id == 6).unwrap();
        assert_eq!(bo.breed_primary, None);
        assert_eq!(bo.fixed, None);
    }

    #[test]
    fn test_dogs_by_city_is_exact() {
        assert!(dogs_by_city(&snapshot(), "seattle").is_empty());
    }
}
