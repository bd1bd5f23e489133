//! The gazetteer index: entity records plus the name trie.
//!
//! A [`Gazetteer`] is built exactly once from the rows of a backing source
//! and is immutable afterwards. It is `Send + Sync` and meant to be shared
//! through an `Arc` by every document-processing thread.

use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::KeyNormalizer;
use crate::analysis::variant::VariantExpander;
use crate::config::GazetteerConfig;
use crate::error::{GazetteerError, Result};
use crate::index::trie::RadixTrie;
use crate::source::SourceRow;

/// Dense handle of an entity inside one gazetteer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// The position of the entity in the gazetteer.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An entity identifier and its official names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// External identifier (database id).
    pub id: String,
    /// Official names as loaded from the source.
    pub names: BTreeSet<String>,
    /// Normalized keys of the official names.
    pub name_keys: BTreeSet<String>,
    /// Normalized key of the identifier itself, when it has one.
    pub id_key: Option<String>,
    /// Organism the entity belongs to, for taxon-aware sources.
    pub taxon: Option<String>,
}

impl EntityRecord {
    fn new(id: &str, id_key: Option<String>) -> Self {
        EntityRecord {
            id: id.to_string(),
            names: BTreeSet::new(),
            name_keys: BTreeSet::new(),
            id_key,
            taxon: None,
        }
    }
}

/// Statistics returned by an index build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Rows consumed from the source.
    pub rows: usize,
    /// Distinct entities.
    pub entities: usize,
    /// Official names inserted into the index.
    pub names_indexed: usize,
    /// Names skipped because they normalize to an empty key.
    pub names_skipped: usize,
    /// Repeated `(id, name)` pairs.
    pub duplicates: usize,
    /// Entity ids inserted as keys.
    pub id_keys: usize,
    /// New `(key, entity)` pairs contributed by variant expansion.
    pub variant_keys: usize,
    /// Names whose variant expansion was skipped by the token cap.
    pub variants_capped: usize,
    /// Distinct keys in the finished index.
    pub keys: usize,
    /// Nodes in the finished trie.
    pub trie_nodes: usize,
}

/// An immutable dictionary index over entity names.
#[derive(Debug)]
pub struct Gazetteer {
    config: GazetteerConfig,
    normalizer: KeyNormalizer,
    trie: RadixTrie<EntityId>,
    entities: Vec<EntityRecord>,
    ids: AHashMap<String, EntityId>,
}

impl Gazetteer {
    /// Build a gazetteer from `(id, name)` rows.
    pub fn build<I>(config: GazetteerConfig, rows: I) -> Result<(Self, BuildStats)>
    where
        I: IntoIterator<Item = SourceRow>,
    {
        let mut builder = GazetteerBuilder::new(config)?;
        for row in rows {
            builder.add_row(row)?;
        }
        Ok(builder.build())
    }

    /// Reassemble a gazetteer from its persisted parts.
    pub(crate) fn from_parts(
        config: GazetteerConfig,
        trie: RadixTrie<EntityId>,
        entities: Vec<EntityRecord>,
    ) -> Result<Self> {
        config.validate()?;
        let normalizer = config.key_normalizer()?;
        let ids = entities
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id.clone(), EntityId(i as u32)))
            .collect();
        Ok(Gazetteer {
            config,
            normalizer,
            trie,
            entities,
            ids,
        })
    }

    pub(crate) fn records(&self) -> &[EntityRecord] {
        &self.entities
    }

    /// The configuration the index was built with.
    pub fn config(&self) -> &GazetteerConfig {
        &self.config
    }

    /// The key normalizer shared by indexing, matching and scoring.
    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.normalizer
    }

    pub fn trie(&self) -> &RadixTrie<EntityId> {
        &self.trie
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.trie.len()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The record of an entity handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different gazetteer.
    pub fn entity(&self, id: EntityId) -> &EntityRecord {
        &self.entities[id.index()]
    }

    /// All entity records.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, record)| (EntityId(i as u32), record))
    }

    /// Resolve an external identifier to its handle.
    pub fn lookup_id(&self, id: &str) -> Option<EntityId> {
        self.ids.get(id).copied()
    }

    /// Taxon of an entity, if the source provided one.
    pub fn taxon(&self, id: EntityId) -> Option<&str> {
        self.entity(id).taxon.as_deref()
    }

    /// Entities registered under exactly this (raw) name.
    pub fn lookup_name(&self, name: &str) -> Vec<EntityId> {
        self.normalizer
            .make_key(name)
            .and_then(|key| self.trie.get(&key).map(<[EntityId]>::to_vec))
            .unwrap_or_default()
    }
}

/// Single-writer builder of a [`Gazetteer`].
pub struct GazetteerBuilder {
    config: GazetteerConfig,
    normalizer: KeyNormalizer,
    expander: VariantExpander,
    trie: RadixTrie<EntityId>,
    entities: Vec<EntityRecord>,
    ids: AHashMap<String, EntityId>,
    taxon_map: AHashMap<String, String>,
    skipped: AHashSet<(String, String)>,
    stats: BuildStats,
}

impl GazetteerBuilder {
    /// Create a builder, validating the configuration.
    pub fn new(config: GazetteerConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = config.key_normalizer()?;
        let expander = VariantExpander::new(config.max_variant_tokens);
        Ok(GazetteerBuilder {
            config,
            normalizer,
            expander,
            trie: RadixTrie::new(),
            entities: Vec::new(),
            ids: AHashMap::new(),
            taxon_map: AHashMap::new(),
            skipped: AHashSet::new(),
            stats: BuildStats::default(),
        })
    }

    /// Remap taxon ids while loading (`from -> to`).
    pub fn with_taxon_map(mut self, taxon_map: AHashMap<String, String>) -> Self {
        self.taxon_map = taxon_map;
        self
    }

    /// Register one `(id, name)` pair.
    pub fn add(&mut self, id: &str, name: &str) -> Result<()> {
        self.add_row(SourceRow::new(id, name))
    }

    /// Register one source row.
    ///
    /// A row without id or name is malformed and fails the build. A name
    /// without content characters is skipped with a warning; an id with no
    /// other names does not become an entity.
    pub fn add_row(&mut self, mut row: SourceRow) -> Result<()> {
        self.stats.rows += 1;
        if row.id.trim().is_empty() {
            return Err(GazetteerError::source(format!(
                "Malformed row: missing id for name {:?}",
                row.name
            )));
        }
        if row.name.is_empty() {
            return Err(GazetteerError::source(format!(
                "Malformed row: missing name for id {:?}",
                row.id
            )));
        }

        let existing = self.ids.get(&row.id).copied();
        if let Some(entity) = existing
            && let Some(taxon) = &row.taxon
        {
            self.assign_taxon(entity, taxon.clone());
        }

        // An id only becomes an entity once one of its names yields a key.
        let Some(key) = self.normalizer.make_key(&row.name) else {
            if !self.skipped.insert((row.id.clone(), row.name.clone())) {
                self.stats.duplicates += 1;
                return Ok(());
            }
            warn!(
                "Skipping name {:?} of {}: no content characters",
                row.name, row.id
            );
            self.stats.names_skipped += 1;
            return Ok(());
        };

        if existing.is_some_and(|entity| self.entities[entity.index()].names.contains(&row.name)) {
            self.stats.duplicates += 1;
            return Ok(());
        }

        let entity = match existing {
            Some(entity) => entity,
            None => {
                let entity = self.intern(&row.id);
                if let Some(taxon) = row.taxon.take() {
                    self.assign_taxon(entity, taxon);
                }
                entity
            }
        };

        self.trie.put(&key, entity);
        self.stats.names_indexed += 1;

        if self.config.generate_variants {
            let variants = self.expander.expand(&row.name, &self.normalizer);
            if variants.capped {
                self.stats.variants_capped += 1;
            }
            for variant in &variants.keys {
                if self.trie.put(variant, entity) {
                    self.stats.variant_keys += 1;
                }
            }
        }

        let record = &mut self.entities[entity.index()];
        record.names.insert(row.name);
        record.name_keys.insert(key);
        Ok(())
    }

    fn intern(&mut self, id: &str) -> EntityId {
        if let Some(&entity) = self.ids.get(id) {
            return entity;
        }

        let entity = EntityId(self.entities.len() as u32);
        let id_key = self.normalizer.make_key(id);
        if self.config.id_matching {
            match &id_key {
                Some(key) => {
                    self.trie.put(key, entity);
                    self.stats.id_keys += 1;
                }
                None => warn!("Identifier {id:?} has no content characters; not indexed"),
            }
        }

        self.entities.push(EntityRecord::new(id, id_key));
        self.ids.insert(id.to_string(), entity);
        entity
    }

    fn assign_taxon(&mut self, entity: EntityId, taxon: String) {
        let taxon = self.taxon_map.get(&taxon).cloned().unwrap_or(taxon);
        let record = &mut self.entities[entity.index()];
        match &record.taxon {
            None => record.taxon = Some(taxon),
            Some(existing) if *existing != taxon => warn!(
                "Entity {} already has taxon {}; ignoring {}",
                record.id, existing, taxon
            ),
            Some(_) => {}
        }
    }

    /// Finish the build.
    pub fn build(mut self) -> (Gazetteer, BuildStats) {
        self.trie.compact();
        self.entities.shrink_to_fit();

        let mut stats = self.stats;
        stats.entities = self.entities.len();
        stats.keys = self.trie.len();
        stats.trie_nodes = self.trie.node_count();

        if self.trie.is_empty() {
            warn!("Gazetteer index is empty; no text will match");
        }
        info!(
            "Built gazetteer: {} entities, {} names, {} keys ({} from variants), {} skipped",
            stats.entities, stats.names_indexed, stats.keys, stats.variant_keys, stats.names_skipped
        );

        let gazetteer = Gazetteer {
            config: self.config,
            normalizer: self.normalizer,
            trie: self.trie,
            entities: self.entities,
            ids: self.ids,
        };
        (gazetteer, stats)
    }
}
