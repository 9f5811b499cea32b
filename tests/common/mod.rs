//! Shared snapshot fixture for integration tests
//!
//! Three states, four counties, five shelters and seven dogs:
//!
//! - WA: S1 Seattle (dogs 1, 2 Beagle; 3 Labrador), S2 Tacoma (4 Labrador)
//! - OR: S3 Portland (5 Beagle, 6 Poodle), S5 Eugene (no dogs)
//! - ID: S4 Boise (7 Poodle)
//!
//! Dog 3 is behind on shots, so S1 is the only non-gold shelter.

#![allow(dead_code)]

use std::fmt::Display;
use std::fs;
use std::path::Path;

use breed_scorer_rust::data::{
    DemographicRecord, Dog, DogAttributes, DogBreed, DogDescription, EconomicRecord, Shelter, StateRef, Tract,
};
use breed_scorer_rust::{AdoptionData, Tables};

fn tract(tract_id: i64, county: &str, state: &str) -> Tract {
    Tract { tract_id, county: county.into(), state: state.into() }
}

fn economics(tract_id: i64, income: f64, poverty: f64, commute: f64) -> EconomicRecord {
    EconomicRecord {
        tract_id,
        income: Some(income),
        income_per_cap: Some(income / 2.0),
        poverty: Some(poverty),
        child_poverty: Some(poverty * 1.5),
        unemployment: Some(poverty / 2.0),
        employed: Some(500.0),
        mean_commute: Some(commute),
    }
}

fn demographics(tract_id: i64) -> DemographicRecord {
    DemographicRecord {
        tract_id,
        total_pop: Some(1000.0),
        men: Some(490.0),
        women: Some(510.0),
        ..Default::default()
    }
}

fn shelter(org_id: &str, city: &str, state: &str, zip: &str) -> Shelter {
    Shelter { org_id: org_id.into(), city: city.into(), state: state.into(), zip: Some(zip.into()) }
}

fn dog(dog_id: i64, org_id: &str, name: &str, size: &str) -> Dog {
    Dog {
        dog_id,
        org_id: org_id.into(),
        name: Some(name.into()),
        age: Some("Adult".into()),
        sex: Some(if dog_id % 2 == 0 { "Female" } else { "Male" }.into()),
        size: Some(size.into()),
    }
}

fn breed(dog_id: i64, primary: &str) -> DogBreed {
    DogBreed { dog_id, breed_primary: Some(primary.into()), breed_secondary: None, mixed: Some(false) }
}

fn attributes(
    dog_id: i64,
    color: &str,
    coat: &str,
    fixed: bool,
    special_needs: bool,
    shots_current: Option<bool>,
    env_children: Option<bool>,
) -> DogAttributes {
    DogAttributes {
        dog_id,
        color_primary: Some(color.into()),
        color_secondary: None,
        coat: Some(coat.into()),
        fixed: Some(fixed),
        house_trained: Some(true),
        shots_current,
        special_needs: Some(special_needs),
        env_children,
    }
}

fn description(dog_id: i64, text: &str) -> DogDescription {
    DogDescription { dog_id, text: text.into() }
}

pub fn fixture_tables() -> Tables {
    Tables {
        tracts: vec![
            tract(1, "King County", "Washington"),
            tract(2, "Pierce County", "Washington"),
            tract(3, "Multnomah County", "Oregon"),
            tract(4, "Ada County", "Idaho"),
        ],
        economics: vec![
            economics(1, 80000.0, 10.0, 30.0),
            economics(2, 60000.0, 15.0, 28.0),
            economics(3, 50000.0, 20.0, 25.0),
            economics(4, 40000.0, 25.0, 20.0),
        ],
        demographics: (1..=4).map(demographics).collect(),
        states: vec![
            StateRef { abbrev: "WA".into(), name: "Washington".into() },
            StateRef { abbrev: "OR".into(), name: "Oregon".into() },
            StateRef { abbrev: "ID".into(), name: "Idaho".into() },
        ],
        shelters: vec![
            shelter("S1", "Seattle", "WA", "98101"),
            shelter("S2", "Tacoma", "WA", "98402"),
            shelter("S3", "Portland", "OR", "97201"),
            shelter("S4", "Boise", "ID", "83702"),
            shelter("S5", "Eugene", "OR", "97401"),
        ],
        dogs: vec![
            dog(1, "S1", "Max", "Medium"),
            dog(2, "S1", "Bella", "Medium"),
            dog(3, "S1", "Rex", "Large"),
            dog(4, "S2", "Luna", "Large"),
            dog(5, "S3", "Daisy", "Medium"),
            dog(6, "S3", "Coco", "Small"),
            dog(7, "S4", "Bo", "Small"),
        ],
        breeds: vec![
            breed(1, "Beagle"),
            breed(2, "Beagle"),
            breed(3, "Labrador"),
            breed(4, "Labrador"),
            breed(5, "Beagle"),
            breed(6, "Poodle"),
            breed(7, "Poodle"),
        ],
        attributes: vec![
            attributes(1, "Tricolor", "Short", true, false, Some(true), Some(true)),
            attributes(2, "Tricolor", "Short", true, false, Some(true), None),
            attributes(3, "Yellow", "Long", false, true, Some(false), Some(false)),
            attributes(4, "Black", "Short", true, false, Some(true), Some(true)),
            attributes(5, "Tricolor", "Short", false, false, Some(true), Some(false)),
            attributes(6, "White", "Long", true, false, None, None),
            attributes(7, "White", "Long", true, false, Some(true), Some(true)),
        ],
        descriptions: vec![
            description(1, "Friendly beagle who loves walks"),
            description(2, "Shy at first"),
            description(4, "A very FRIENDLY lab"),
            description(7, "friendly and calm"),
        ],
    }
}

pub fn fixture_data() -> AdoptionData {
    AdoptionData::from_tables(fixture_tables())
}

fn opt<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "NA".to_string(), |v| v.to_string())
}

fn write_csv(dir: &Path, table: &str, header: &str, rows: Vec<String>) {
    let mut text = String::from(header);
    text.push('\n');
    for row in rows {
        text.push_str(&row);
        text.push('\n');
    }
    fs::write(dir.join(format!("{}.csv", table)), text).unwrap();
}

/// Write `tables` as one CSV file per table, nulls as `NA`
pub fn write_csv_snapshot(dir: &Path, tables: &Tables) {
    write_csv(dir, "tracts", "tract_id,county,state",
        tables.tracts.iter().map(|t| format!("{},{},{}", t.tract_id, t.county, t.state)).collect());

    write_csv(dir, "economics",
        "tract_id,income,income_per_cap,poverty,child_poverty,unemployment,employed,mean_commute",
        tables.economics.iter().map(|e| format!("{},{},{},{},{},{},{},{}",
            e.tract_id, opt(&e.income), opt(&e.income_per_cap), opt(&e.poverty), opt(&e.child_poverty),
            opt(&e.unemployment), opt(&e.employed), opt(&e.mean_commute))).collect());

    write_csv(dir, "demographics", "tract_id,total_pop,men,women,hispanic,white,black,asian,pacific",
        tables.demographics.iter().map(|d| format!("{},{},{},{},{},{},{},{},{}",
            d.tract_id, opt(&d.total_pop), opt(&d.men), opt(&d.women), opt(&d.hispanic),
            opt(&d.white), opt(&d.black), opt(&d.asian), opt(&d.pacific))).collect());

    write_csv(dir, "states", "state_abbrev,state_name",
        tables.states.iter().map(|s| format!("{},{}", s.abbrev, s.name)).collect());

    write_csv(dir, "shelters", "org_id,city,state,zip",
        tables.shelters.iter().map(|s| format!("{},{},{},{}", s.org_id, s.city, s.state, opt(&s.zip))).collect());

    write_csv(dir, "dogs", "dog_id,org_id,name,age,sex,size",
        tables.dogs.iter().map(|d| format!("{},{},{},{},{},{}",
            d.dog_id, d.org_id, opt(&d.name), opt(&d.age), opt(&d.sex), opt(&d.size))).collect());

    write_csv(dir, "dog_breeds", "dog_id,breed_primary,breed_secondary,breed_mixed",
        tables.breeds.iter().map(|b| format!("{},{},{},{}",
            b.dog_id, opt(&b.breed_primary), opt(&b.breed_secondary), opt(&b.mixed))).collect());

    write_csv(dir, "dog_attributes",
        "dog_id,color_primary,color_secondary,coat,fixed,house_trained,shots_current,special_needs,env_children",
        tables.attributes.iter().map(|a| format!("{},{},{},{},{},{},{},{},{}",
            a.dog_id, opt(&a.color_primary), opt(&a.color_secondary), opt(&a.coat), opt(&a.fixed),
            opt(&a.house_trained), opt(&a.shots_current), opt(&a.special_needs), opt(&a.env_children))).collect());

    write_csv(dir, "dog_descriptions", "dog_id,description",
        tables.descriptions.iter().map(|d| format!("{},{}", d.dog_id, d.text)).collect());
}
