//! Adoption counts per breed within a shelter grouping (state or city)

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{AdoptionData, Shelter};
use crate::utils::{rank_partitioned, Ranked, Selection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTopBreed {
    pub state: String,
    pub breed_primary: String,
    pub adoption_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBreed {
    pub city: String,
    pub breed_primary: String,
    pub adoption_count: u64,
    pub rank: usize,
}

#[derive(Debug, Clone)]
struct GroupCount {
    group: String,
    breed: String,
    count: u64,
}

/// Count dogs per (shelter group, primary breed)
fn count_by_group<'a, F>(data: &'a AdoptionData, group_of: F) -> Vec<GroupCount>
where
    F: Fn(&'a Shelter) -> &'a str,
{
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for (dog, shelter) in data.dogs_with_shelters() {
        if let Some(breed) = data.primary_breed(dog.dog_id) {
            *counts.entry((group_of(shelter), breed)).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((group, breed), count)| GroupCount {
            group: group.to_string(),
            breed: breed.to_string(),
            count,
        })
        .collect()
}

fn rank_within_groups(counts: Vec<GroupCount>, selection: Selection) -> Vec<Ranked<GroupCount>> {
    let by_breed = |a: &GroupCount, b: &GroupCount| -> Ordering { a.breed.cmp(&b.breed) };
    rank_partitioned(counts, |c| c.group.clone(), |c| c.count as f64, Some(&by_breed), selection)
}

/// Most adopted breed per shelter state, ties kept
///
/// `state` restricts the input to one exact state abbreviation before ranking.
pub fn top_breed_per_state(data: &AdoptionData, state: Option<&str>) -> Vec<StateTopBreed> {
    let counts: Vec<GroupCount> = count_by_group(data, |s| s.state.as_str())
        .into_iter()
        .filter(|c| state.map_or(true, |wanted| c.group == wanted))
        .collect();

    rank_within_groups(counts, Selection::TopRank(1))
        .into_iter()
        .map(|ranked| StateTopBreed {
            state: ranked.item.group,
            breed_primary: ranked.item.breed,
            adoption_count: ranked.item.count,
        })
        .collect()
}

/// Every breed per shelter city with its competition rank
pub fn city_breeds(data: &AdoptionData) -> Vec<CityBreed> {
    rank_within_groups(count_by_group(data, |s| s.city.as_str()), Selection::All)
        .into_iter()
        .map(|ranked| CityBreed {
            city: ranked.item.group,
            breed_primary: ranked.item.breed,
            adoption_count: ranked.item.count,
            rank: ranked.rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dog, DogBreed, Tables};

    /// (org_id, city, state) shelters and (org_id, breed) dogs
    fn snapshot(shelters: &[(&str, &str, &str)], dogs: &[(&str, &str)]) -> AdoptionData {
        AdoptionData::from_tables(Tables {
            shelters: shelters
                .iter()
                .map(|(org, city, state)| Shelter {
                    org_id: org.to_string(),
                    city: city.to_string(),
                    state: state.to_string(),
                    zip: None,
                })
                .collect(),
            dogs: dogs
                .iter()
                .enumerate()
                .map(|(i, (org, _))| Dog {
                    dog_id: i as i64,
                    org_id: org.to_string(),
                    name: None,
                    age: None,
                    sex: None,
                    size: None,
                })
                .collect(),
            breeds: dogs
                .iter()
                .enumerate()
                .map(|(i, (_, breed))| DogBreed {
                    dog_id: i as i64,
                    breed_primary: Some(breed.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_top_breed_keeps_ties() {
        let data = snapshot(
            &[("A", "Seattle", "WA"), ("B", "Portland", "OR")],
            &[("A", "Lab"), ("A", "Pug"), ("A", "Lab"), ("A", "Pug"), ("A", "Boxer"), ("B", "Husky")],
        );

        let top = top_breed_per_state(&data, None);
        let rows: Vec<(&str, &str, u64)> = top
            .iter()
            .map(|r| (r.state.as_str(), r.breed_primary.as_str(), r.adoption_count))
            .collect();
        assert_eq!(rows, vec![("OR", "Husky", 1), ("WA", "Lab", 2), ("WA", "Pug", 2)]);
    }

    #[test]
    fn test_state_filter() {
        let data = snapshot(&[("A", "Seattle", "WA"), ("B", "Portland", "OR")], &[("A", "Lab"), ("B", "Husky")]);

        let top = top_breed_per_state(&data, Some("WA"));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].breed_primary, "Lab");
        assert!(top_breed_per_state(&data, Some("wa")).is_empty());
    }

    #[test]
    fn test_city_breed_ranks() {
        let data = snapshot(
            &[("A", "Seattle", "WA"), ("C", "Seattle", "WA")],
            &[("A", "Lab"), ("C", "Lab"), ("A", "Pug"), ("C", "Pug"), ("A", "Boxer")],
        );

        let rows = city_breeds(&data);
        let ranks: Vec<(&str, usize)> = rows.iter().map(|r| (r.breed_primary.as_str(), r.rank)).collect();
        assert_eq!(ranks, vec![("Lab", 1), ("Pug", 1), ("Boxer", 3)]);
    }
}
