//! Data Loading and Management
//!
//! Read-only typed view over one point-in-time snapshot of the adoption
//! dataset: census tracts with their economic and demographic records,
//! shelters, dogs and the optional per-dog extension tables.
//!
//! Tables are read with Polars (parquet preferred, CSV fallback), converted
//! once into typed records and indexed. Nothing here is mutated after
//! construction; every analytic operation borrows the same snapshot.

use polars::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::utils::{materialize_with_columns, str_values, f64_values, i64_values, bool_values};

/// Census tract (smallest geographic unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tract {
    pub tract_id: i64,
    pub county: String,
    /// Full state name, e.g. "Washington"
    pub state: String,
}

/// Economic indicators for one tract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicRecord {
    pub tract_id: i64,
    pub income: Option<f64>,
    pub income_per_cap: Option<f64>,
    pub poverty: Option<f64>,
    pub child_poverty: Option<f64>,
    pub unemployment: Option<f64>,
    pub employed: Option<f64>,
    pub mean_commute: Option<f64>,
}

/// Population counts for one tract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub tract_id: i64,
    pub total_pop: Option<f64>,
    pub men: Option<f64>,
    pub women: Option<f64>,
    pub hispanic: Option<f64>,
    pub white: Option<f64>,
    pub black: Option<f64>,
    pub asian: Option<f64>,
    pub pacific: Option<f64>,
}

/// Mapping between the abbreviation shelters use and the name tracts use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRef {
    pub abbrev: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub org_id: String,
    pub city: String,
    /// Two-letter state abbreviation
    pub state: String,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub dog_id: i64,
    pub org_id: String,
    pub name: Option<String>,
    /// Age bucket, e.g. "Baby", "Young", "Adult", "Senior"
    pub age: Option<String>,
    pub sex: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DogBreed {
    pub dog_id: i64,
    pub breed_primary: Option<String>,
    pub breed_secondary: Option<String>,
    pub mixed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DogAttributes {
    pub dog_id: i64,
    pub color_primary: Option<String>,
    pub color_secondary: Option<String>,
    pub coat: Option<String>,
    pub fixed: Option<bool>,
    pub house_trained: Option<bool>,
    pub shots_current: Option<bool>,
    pub special_needs: Option<bool>,
    pub env_children: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogDescription {
    pub dog_id: i64,
    pub text: String,
}

/// Raw table rows as delivered by the ingestion side, before indexing
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub tracts: Vec<Tract>,
    pub economics: Vec<EconomicRecord>,
    pub demographics: Vec<DemographicRecord>,
    pub states: Vec<StateRef>,
    pub shelters: Vec<Shelter>,
    pub dogs: Vec<Dog>,
    pub breeds: Vec<DogBreed>,
    pub attributes: Vec<DogAttributes>,
    pub descriptions: Vec<DogDescription>,
}

/// Table file names (without extension) and the columns each must provide
pub const TABLE_COLUMNS: &[(&str, &[&str])] = &[
    ("tracts", &["tract_id", "county", "state"]),
    ("economics", &["tract_id", "income", "income_per_cap", "poverty", "child_poverty",
        "unemployment", "employed", "mean_commute"]),
    ("demographics", &["tract_id", "total_pop", "men", "women", "hispanic", "white",
        "black", "asian", "pacific"]),
    ("states", &["state_abbrev", "state_name"]),
    ("shelters", &["org_id", "city", "state", "zip"]),
    ("dogs", &["dog_id", "org_id", "name", "age", "sex", "size"]),
    ("dog_breeds", &["dog_id", "breed_primary", "breed_secondary", "breed_mixed"]),
    ("dog_attributes", &["dog_id", "color_primary", "color_secondary", "coat", "fixed",
        "house_trained", "shots_current", "special_needs", "env_children"]),
    ("dog_descriptions", &["dog_id", "description"]),
];

fn required_columns(table: &str) -> &'static [&'static str] {
    TABLE_COLUMNS
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, cols)| *cols)
        .unwrap_or(&[])
}

impl Tables {
    /// Load every table from `data_dir`
    pub fn load(data_dir: &Path) -> Result<Self> {
        tracing::info!("Loading adoption snapshot from {:?}", data_dir);

        let tables = Tables {
            tracts: parse_tracts(&read_table(data_dir, "tracts")?)?,
            economics: parse_economics(&read_table(data_dir, "economics")?)?,
            demographics: parse_demographics(&read_table(data_dir, "demographics")?)?,
            states: parse_states(&read_table(data_dir, "states")?)?,
            shelters: parse_shelters(&read_table(data_dir, "shelters")?)?,
            dogs: parse_dogs(&read_table(data_dir, "dogs")?)?,
            breeds: parse_breeds(&read_table(data_dir, "dog_breeds")?)?,
            attributes: parse_attributes(&read_table(data_dir, "dog_attributes")?)?,
            descriptions: parse_descriptions(&read_table(data_dir, "dog_descriptions")?)?,
        };

        tracing::info!(
            tracts = tables.tracts.len(),
            shelters = tables.shelters.len(),
            dogs = tables.dogs.len(),
            "Snapshot tables loaded"
        );

        Ok(tables)
    }
}

/// Resolve `<dir>/<table>.parquet`, falling back to `<dir>/<table>.csv`
fn table_path(data_dir: &Path, table: &str) -> Result<PathBuf> {
    let parquet = data_dir.join(format!("{}.parquet", table));
    if parquet.exists() {
        return Ok(parquet);
    }
    let csv = data_dir.join(format!("{}.csv", table));
    if csv.exists() {
        return Ok(csv);
    }
    anyhow::bail!("Table '{}' not found in {:?} (expected .parquet or .csv)", table, data_dir)
}

/// Read one table, projected to its required columns
fn read_table(data_dir: &Path, table: &str) -> Result<DataFrame> {
    let path = table_path(data_dir, table)?;
    let context = format!("{} table", table);

    let lazy = if path.extension().map_or(false, |ext| ext == "parquet") {
        LazyFrame::scan_parquet(&path, Default::default())
            .with_context(|| format!("Failed to scan parquet: {:?}", path))?
    } else {
        let parse_options = CsvParseOptions::default()
            .with_null_values(Some(NullValues::AllColumnsSingle("NA".into())));

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_options)
            .try_into_reader_with_file_path(Some(path.clone()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load CSV: {:?}", path))?
            .lazy()
    };

    let df = materialize_with_columns(&lazy, required_columns(table), &context)?;
    tracing::debug!("Read {} rows from {:?}", df.height(), path);
    Ok(df)
}

/// Warn once per table about rows dropped for a missing key
fn report_skipped(table: &str, skipped: usize) {
    if skipped > 0 {
        tracing::warn!("{}: skipped {} rows with a missing key", table, skipped);
    }
}

pub fn parse_tracts(df: &DataFrame) -> Result<Vec<Tract>> {
    let ctx = "tracts table";
    let ids = i64_values(df, "tract_id", ctx)?;
    let counties = str_values(df, "county", ctx)?;
    let states = str_values(df, "state", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for ((id, county), state) in ids.into_iter().zip(counties).zip(states) {
        match (id, county, state) {
            (Some(tract_id), Some(county), Some(state)) => rows.push(Tract { tract_id, county, state }),
            _ => skipped += 1,
        }
    }
    report_skipped("tracts", skipped);
    Ok(rows)
}

pub fn parse_economics(df: &DataFrame) -> Result<Vec<EconomicRecord>> {
    let ctx = "economics table";
    let ids = i64_values(df, "tract_id", ctx)?;
    let income = f64_values(df, "income", ctx)?;
    let income_per_cap = f64_values(df, "income_per_cap", ctx)?;
    let poverty = f64_values(df, "poverty", ctx)?;
    let child_poverty = f64_values(df, "child_poverty", ctx)?;
    let unemployment = f64_values(df, "unemployment", ctx)?;
    let employed = f64_values(df, "employed", ctx)?;
    let mean_commute = f64_values(df, "mean_commute", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(tract_id) = id else {
            skipped += 1;
            continue;
        };
        rows.push(EconomicRecord {
            tract_id,
            income: income[i],
            income_per_cap: income_per_cap[i],
            poverty: poverty[i],
            child_poverty: child_poverty[i],
            unemployment: unemployment[i],
            employed: employed[i],
            mean_commute: mean_commute[i],
        });
    }
    report_skipped("economics", skipped);
    Ok(rows)
}

pub fn parse_demographics(df: &DataFrame) -> Result<Vec<DemographicRecord>> {
    let ctx = "demographics table";
    let ids = i64_values(df, "tract_id", ctx)?;
    let total_pop = f64_values(df, "total_pop", ctx)?;
    let men = f64_values(df, "men", ctx)?;
    let women = f64_values(df, "women", ctx)?;
    let hispanic = f64_values(df, "hispanic", ctx)?;
    let white = f64_values(df, "white", ctx)?;
    let black = f64_values(df, "black", ctx)?;
    let asian = f64_values(df, "asian", ctx)?;
    let pacific = f64_values(df, "pacific", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(tract_id) = id else {
            skipped += 1;
            continue;
        };
        rows.push(DemographicRecord {
            tract_id,
            total_pop: total_pop[i],
            men: men[i],
            women: women[i],
            hispanic: hispanic[i],
            white: white[i],
            black: black[i],
            asian: asian[i],
            pacific: pacific[i],
        });
    }
    report_skipped("demographics", skipped);
    Ok(rows)
}

pub fn parse_states(df: &DataFrame) -> Result<Vec<StateRef>> {
    let ctx = "states table";
    let abbrevs = str_values(df, "state_abbrev", ctx)?;
    let names = str_values(df, "state_name", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (abbrev, name) in abbrevs.into_iter().zip(names) {
        match (abbrev, name) {
            (Some(abbrev), Some(name)) => rows.push(StateRef { abbrev, name }),
            _ => skipped += 1,
        }
    }
    report_skipped("states", skipped);
    Ok(rows)
}

pub fn parse_shelters(df: &DataFrame) -> Result<Vec<Shelter>> {
    let ctx = "shelters table";
    let org_ids = str_values(df, "org_id", ctx)?;
    let cities = str_values(df, "city", ctx)?;
    let states = str_values(df, "state", ctx)?;
    let zips = str_values(df, "zip", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (((org_id, city), state), zip) in org_ids.into_iter().zip(cities).zip(states).zip(zips) {
        match (org_id, city, state) {
            (Some(org_id), Some(city), Some(state)) => rows.push(Shelter { org_id, city, state, zip }),
            _ => skipped += 1,
        }
    }
    report_skipped("shelters", skipped);
    Ok(rows)
}

pub fn parse_dogs(df: &DataFrame) -> Result<Vec<Dog>> {
    let ctx = "dogs table";
    let ids = i64_values(df, "dog_id", ctx)?;
    let org_ids = str_values(df, "org_id", ctx)?;
    let names = str_values(df, "name", ctx)?;
    let ages = str_values(df, "age", ctx)?;
    let sexes = str_values(df, "sex", ctx)?;
    let sizes = str_values(df, "size", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (i, (id, org_id)) in ids.into_iter().zip(org_ids).enumerate() {
        let (Some(dog_id), Some(org_id)) = (id, org_id) else {
            skipped += 1;
            continue;
        };
        rows.push(Dog {
            dog_id,
            org_id,
            name: names[i].clone(),
            age: ages[i].clone(),
            sex: sexes[i].clone(),
            size: sizes[i].clone(),
        });
    }
    report_skipped("dogs", skipped);
    Ok(rows)
}

pub fn parse_breeds(df: &DataFrame) -> Result<Vec<DogBreed>> {
    let ctx = "dog_breeds table";
    let ids = i64_values(df, "dog_id", ctx)?;
    let primary = str_values(df, "breed_primary", ctx)?;
    let secondary = str_values(df, "breed_secondary", ctx)?;
    let mixed = bool_values(df, "breed_mixed", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(dog_id) = id else {
            skipped += 1;
            continue;
        };
        rows.push(DogBreed {
            dog_id,
            breed_primary: primary[i].clone(),
            breed_secondary: secondary[i].clone(),
            mixed: mixed[i],
        });
    }
    report_skipped("dog_breeds", skipped);
    Ok(rows)
}

pub fn parse_attributes(df: &DataFrame) -> Result<Vec<DogAttributes>> {
    let ctx = "dog_attributes table";
    let ids = i64_values(df, "dog_id", ctx)?;
    let color_primary = str_values(df, "color_primary", ctx)?;
    let color_secondary = str_values(df, "color_secondary", ctx)?;
    let coat = str_values(df, "coat", ctx)?;
    let fixed = bool_values(df, "fixed", ctx)?;
    let house_trained = bool_values(df, "house_trained", ctx)?;
    let shots_current = bool_values(df, "shots_current", ctx)?;
    let special_needs = bool_values(df, "special_needs", ctx)?;
    let env_children = bool_values(df, "env_children", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (i, id) in ids.into_iter().enumerate() {
        let Some(dog_id) = id else {
            skipped += 1;
            continue;
        };
        rows.push(DogAttributes {
            dog_id,
            color_primary: color_primary[i].clone(),
            color_secondary: color_secondary[i].clone(),
            coat: coat[i].clone(),
            fixed: fixed[i],
            house_trained: house_trained[i],
            shots_current: shots_current[i],
            special_needs: special_needs[i],
            env_children: env_children[i],
        });
    }
    report_skipped("dog_attributes", skipped);
    Ok(rows)
}

pub fn parse_descriptions(df: &DataFrame) -> Result<Vec<DogDescription>> {
    let ctx = "dog_descriptions table";
    let ids = i64_values(df, "dog_id", ctx)?;
    let texts = str_values(df, "description", ctx)?;

    let mut skipped = 0;
    let mut rows = Vec::with_capacity(df.height());
    for (id, text) in ids.into_iter().zip(texts) {
        match (id, text) {
            (Some(dog_id), Some(text)) => rows.push(DogDescription { dog_id, text }),
            _ => skipped += 1,
        }
    }
    report_skipped("dog_descriptions", skipped);
    Ok(rows)
}

/// Indexed, read-only snapshot of the adoption dataset
///
/// Invariants established at construction:
/// - every dog belongs to a known shelter (orphans are dropped)
/// - at most one breed / attribute / description row per dog
/// - at most one economic and one demographic record per tract
#[derive(Debug, Default)]
pub struct AdoptionData {
    tracts: Vec<Tract>,
    economics: FxHashMap<i64, EconomicRecord>,
    demographics: FxHashMap<i64, DemographicRecord>,
    states: Vec<StateRef>,
    state_names: FxHashMap<String, usize>,
    shelters: Vec<Shelter>,
    shelter_index: FxHashMap<String, usize>,
    dogs: Vec<Dog>,
    breeds: FxHashMap<i64, DogBreed>,
    attributes: FxHashMap<i64, DogAttributes>,
    descriptions: FxHashMap<i64, DogDescription>,
}

/// Identity of the snapshot a read model was derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFingerprint {
    pub tracts: u64,
    pub shelters: u64,
    pub dogs: u64,
    pub digest: u64,
}

fn hash_f64<H: Hasher>(value: Option<f64>, hasher: &mut H) {
    value.map(f64::to_bits).hash(hasher);
}

/// Index rows by key, keeping the first row for a key
fn index_unique<T, F>(rows: Vec<T>, table: &str, key: F) -> FxHashMap<i64, T>
where
    F: Fn(&T) -> i64,
{
    let mut map = FxHashMap::default();
    let mut duplicates = 0;
    for row in rows {
        let k = key(&row);
        if map.contains_key(&k) {
            duplicates += 1;
            continue;
        }
        map.insert(k, row);
    }
    if duplicates > 0 {
        tracing::warn!("{}: dropped {} duplicate rows", table, duplicates);
    }
    map
}

impl AdoptionData {
    /// Load and index a snapshot from a data directory
    pub fn load(data_dir: &Path) -> Result<Self> {
        let tables = Tables::load(data_dir)
            .with_context(|| format!("Failed to load adoption snapshot from {:?}", data_dir))?;
        Ok(Self::from_tables(tables))
    }

    /// Index already-materialized tables
    pub fn from_tables(tables: Tables) -> Self {
        let Tables {
            tracts,
            economics,
            demographics,
            states,
            shelters,
            dogs,
            breeds,
            attributes,
            descriptions,
        } = tables;

        let total_tracts = tracts.len();
        let mut seen_tracts: FxHashSet<i64> = FxHashSet::default();
        let tracts: Vec<Tract> = tracts
            .into_iter()
            .filter(|tract| seen_tracts.insert(tract.tract_id))
            .collect();
        if tracts.len() < total_tracts {
            tracing::warn!("tracts: dropped {} duplicate rows", total_tracts - tracts.len());
        }

        let mut shelter_index = FxHashMap::default();
        let mut unique_shelters = Vec::with_capacity(shelters.len());
        for shelter in shelters {
            if shelter_index.contains_key(&shelter.org_id) {
                tracing::warn!("shelters: duplicate org_id {} dropped", shelter.org_id);
                continue;
            }
            shelter_index.insert(shelter.org_id.clone(), unique_shelters.len());
            unique_shelters.push(shelter);
        }

        let total_dogs = dogs.len();
        let mut seen_dogs: FxHashSet<i64> = FxHashSet::default();
        let dogs: Vec<Dog> = dogs
            .into_iter()
            .filter(|dog| shelter_index.contains_key(&dog.org_id) && seen_dogs.insert(dog.dog_id))
            .collect();
        if dogs.len() < total_dogs {
            tracing::warn!(
                "dogs: dropped {} rows with unknown shelter or duplicate id",
                total_dogs - dogs.len()
            );
        }

        // Extension rows only attach to dogs that survived the shelter check
        let breeds: Vec<DogBreed> = breeds.into_iter().filter(|r| seen_dogs.contains(&r.dog_id)).collect();
        let attributes: Vec<DogAttributes> =
            attributes.into_iter().filter(|r| seen_dogs.contains(&r.dog_id)).collect();
        let descriptions: Vec<DogDescription> =
            descriptions.into_iter().filter(|r| seen_dogs.contains(&r.dog_id)).collect();

        let state_names = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.abbrev.clone(), i))
            .collect();

        AdoptionData {
            tracts,
            economics: index_unique(economics, "economics", |r| r.tract_id),
            demographics: index_unique(demographics, "demographics", |r| r.tract_id),
            states,
            state_names,
            shelters: unique_shelters,
            shelter_index,
            dogs,
            breeds: index_unique(breeds, "dog_breeds", |r| r.dog_id),
            attributes: index_unique(attributes, "dog_attributes", |r| r.dog_id),
            descriptions: index_unique(descriptions, "dog_descriptions", |r| r.dog_id),
        }
    }

    /// Digest of every field the derived read model is computed from
    ///
    /// Independent of row order. Two snapshots with equal fingerprints yield
    /// identical derived tables.
    pub fn fingerprint(&self) -> SnapshotFingerprint {
        let mut hasher = FxHasher::default();

        let mut tracts: Vec<&Tract> = self.tracts.iter().collect();
        tracts.sort_by_key(|t| t.tract_id);
        for tract in tracts {
            tract.tract_id.hash(&mut hasher);
            tract.county.hash(&mut hasher);
            tract.state.hash(&mut hasher);
            let econ = self.economics.get(&tract.tract_id);
            econ.is_some().hash(&mut hasher);
            if let Some(econ) = econ {
                hash_f64(econ.income, &mut hasher);
                hash_f64(econ.poverty, &mut hasher);
                hash_f64(econ.mean_commute, &mut hasher);
            }
        }

        let mut shelters: Vec<&Shelter> = self.shelters.iter().collect();
        shelters.sort_by(|a, b| a.org_id.cmp(&b.org_id));
        for shelter in shelters {
            shelter.org_id.hash(&mut hasher);
            shelter.state.hash(&mut hasher);
        }

        let mut dogs: Vec<&Dog> = self.dogs.iter().collect();
        dogs.sort_by_key(|d| d.dog_id);
        for dog in dogs {
            dog.dog_id.hash(&mut hasher);
            dog.org_id.hash(&mut hasher);
            self.primary_breed(dog.dog_id).hash(&mut hasher);
            let attrs = self.attributes(dog.dog_id);
            attrs.is_some().hash(&mut hasher);
            if let Some(attrs) = attrs {
                attrs.fixed.hash(&mut hasher);
                attrs.coat.hash(&mut hasher);
                attrs.special_needs.hash(&mut hasher);
            }
        }

        SnapshotFingerprint {
            tracts: self.tracts.len() as u64,
            shelters: self.shelters.len() as u64,
            dogs: self.dogs.len() as u64,
            digest: hasher.finish(),
        }
    }

    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    pub fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }

    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    pub fn states(&self) -> &[StateRef] {
        &self.states
    }

    pub fn economics(&self, tract_id: i64) -> Option<&EconomicRecord> {
        self.economics.get(&tract_id)
    }

    pub fn demographics(&self, tract_id: i64) -> Option<&DemographicRecord> {
        self.demographics.get(&tract_id)
    }

    pub fn shelter(&self, org_id: &str) -> Option<&Shelter> {
        self.shelter_index.get(org_id).map(|&i| &self.shelters[i])
    }

    /// Shelter of a dog. Always present for dogs in this snapshot.
    pub fn shelter_of(&self, dog: &Dog) -> Option<&Shelter> {
        self.shelter(&dog.org_id)
    }

    pub fn breed(&self, dog_id: i64) -> Option<&DogBreed> {
        self.breeds.get(&dog_id)
    }

    /// Primary breed label, if the dog has a breed row with a primary breed
    pub fn primary_breed(&self, dog_id: i64) -> Option<&str> {
        self.breeds.get(&dog_id).and_then(|b| b.breed_primary.as_deref())
    }

    pub fn attributes(&self, dog_id: i64) -> Option<&DogAttributes> {
        self.attributes.get(&dog_id)
    }

    pub fn description(&self, dog_id: i64) -> Option<&DogDescription> {
        self.descriptions.get(&dog_id)
    }

    /// Full state name for a shelter's state abbreviation
    pub fn state_name(&self, abbrev: &str) -> Option<&str> {
        self.state_names.get(abbrev).map(|&i| self.states[i].name.as_str())
    }

    /// Dogs paired with their shelter
    pub fn dogs_with_shelters(&self) -> impl Iterator<Item = (&Dog, &Shelter)> + '_ {
        self.dogs
            .iter()
            .filter_map(move |dog| self.shelter_of(dog).map(|shelter| (dog, shelter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog(dog_id: i64, org_id: &str) -> Dog {
        Dog {
            dog_id,
            org_id: org_id.to_string(),
            name: None,
            age: None,
            sex: None,
            size: None,
        }
    }

    fn shelter(org_id: &str) -> Shelter {
        Shelter {
            org_id: org_id.to_string(),
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            zip: None,
        }
    }

    #[test]
    fn test_orphan_and_duplicate_dogs_dropped() {
        let data = AdoptionData::from_tables(Tables {
            shelters: vec![shelter("WA01")],
            dogs: vec![dog(1, "WA01"), dog(2, "NOPE"), dog(1, "WA01")],
            ..Default::default()
        });

        assert_eq!(data.dogs().len(), 1);
        assert_eq!(data.dogs()[0].dog_id, 1);
    }

    #[test]
    fn test_extension_rows_are_single_valued() {
        let data = AdoptionData::from_tables(Tables {
            shelters: vec![shelter("WA01")],
            dogs: vec![dog(1, "WA01")],
            breeds: vec![
                DogBreed { dog_id: 1, breed_primary: Some("Beagle".into()), ..Default::default() },
                DogBreed { dog_id: 1, breed_primary: Some("Pug".into()), ..Default::default() },
            ],
            ..Default::default()
        });

        assert_eq!(data.primary_breed(1), Some("Beagle"));
        assert_eq!(data.primary_breed(2), None);
    }

    #[test]
    fn test_state_name_lookup() {
        let data = AdoptionData::from_tables(Tables {
            states: vec![StateRef { abbrev: "WA".into(), name: "Washington".into() }],
            ..Default::default()
        });

        assert_eq!(data.state_name("WA"), Some("Washington"));
        assert_eq!(data.state_name("OR"), None);
    }

    #[test]
    fn test_parse_dogs_from_frame() {
        let df = df![
            "dog_id" => &[Some(1i64), None, Some(3)],
            "org_id" => &["WA01", "WA01", "WA02"],
            "name" => &[Some("Rex"), Some("Ghost"), None],
            "age" => &["Adult", "Young", "Baby"],
            "sex" => &["Male", "Female", "Male"],
            "size" => &["Large", "Small", "Medium"],
        ].unwrap();

        let dogs = parse_dogs(&df).unwrap();
        assert_eq!(dogs.len(), 2);
        assert_eq!(dogs[0].name.as_deref(), Some("Rex"));
        assert_eq!(dogs[1].dog_id, 3);
        assert_eq!(dogs[1].name, None);
    }

    #[test]
    fn test_parse_attributes_bool_encodings() {
        let df = df![
            "dog_id" => &[1i64, 2],
            "color_primary" => &["Black", "White"],
            "color_secondary" => &[None::<&str>, Some("Brown")],
            "coat" => &["Long", "Short"],
            "fixed" => &[1i64, 0],
            "house_trained" => &["t", "f"],
            "shots_current" => &[Some(true), None],
            "special_needs" => &[false, false],
            "env_children" => &["true", "false"],
        ].unwrap();

        let attrs = parse_attributes(&df).unwrap();
        assert_eq!(attrs[0].fixed, Some(true));
        assert_eq!(attrs[1].fixed, Some(false));
        assert_eq!(attrs[0].house_trained, Some(true));
        assert_eq!(attrs[1].shots_current, None);
        assert_eq!(attrs[1].color_secondary.as_deref(), Some("Brown"));
    }

    fn tract(tract_id: i64, county: &str) -> Tract {
        Tract { tract_id, county: county.into(), state: "Washington".into() }
    }

    fn income(tract_id: i64, income: f64) -> EconomicRecord {
        EconomicRecord { tract_id, income: Some(income), ..Default::default() }
    }

    #[test]
    fn test_duplicate_tract_counted_once() {
        let data = AdoptionData::from_tables(Tables {
            tracts: vec![tract(1, "King County"), tract(2, "King County"), tract(1, "King County")],
            economics: vec![income(1, 100000.0), income(2, 40000.0)],
            ..Default::default()
        });

        assert_eq!(data.tracts().len(), 2);
        let stats = crate::metrics::county_stats(&data);
        assert_eq!(stats[0].avg_income, Some(70000.0));
    }

    fn fingerprint_fixture(breed: &str, reversed: bool) -> SnapshotFingerprint {
        let mut dogs = vec![dog(1, "WA01"), dog(2, "WA01")];
        let mut tracts = vec![tract(1, "King County"), tract(2, "Pierce County")];
        if reversed {
            dogs.reverse();
            tracts.reverse();
        }
        AdoptionData::from_tables(Tables {
            tracts,
            economics: vec![income(1, 80000.0), income(2, 60000.0)],
            shelters: vec![shelter("WA01")],
            dogs,
            breeds: vec![
                DogBreed { dog_id: 1, breed_primary: Some("Beagle".into()), ..Default::default() },
                DogBreed { dog_id: 2, breed_primary: Some(breed.into()), ..Default::default() },
            ],
            ..Default::default()
        })
        .fingerprint()
    }

    #[test]
    fn test_fingerprint_ignores_row_order() {
        assert_eq!(fingerprint_fixture("Pug", false), fingerprint_fixture("Pug", true));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let pug = fingerprint_fixture("Pug", false);
        let husky = fingerprint_fixture("Husky", false);
        assert_eq!(pug.dogs, husky.dogs);
        assert_ne!(pug.digest, husky.digest);
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AdoptionData::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Table 'tracts' not found"));
    }
}
