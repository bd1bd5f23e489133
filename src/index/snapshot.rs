//! Binary snapshots of a built gazetteer.
//!
//! Building from a large dictionary (variant expansion in particular) is the
//! slow part of startup, so a finished index can be written to disk and
//! reopened directly.
//!
//! File layout (little-endian):
//!
//! ```text
//! magic   4 bytes  "GZTR"
//! version u32
//! length  u64      payload length in bytes
//! crc32   u32      CRC-32 of the payload
//! payload          bincode-encoded config, trie and entity records
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::GazetteerConfig;
use crate::error::{GazetteerError, Result};
use crate::index::gazetteer::{EntityId, EntityRecord, Gazetteer};
use crate::index::trie::RadixTrie;

const MAGIC: &[u8; 4] = b"GZTR";
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Payload {
    config: GazetteerConfig,
    trie: RadixTrie<EntityId>,
    entities: Vec<EntityRecord>,
}

/// Borrowed twin of [`Payload`]; encodes to the same bytes.
#[derive(Serialize)]
struct PayloadRef<'a> {
    config: &'a GazetteerConfig,
    trie: &'a RadixTrie<EntityId>,
    entities: &'a [EntityRecord],
}

/// Write `gazetteer` to `path`.
pub fn save<P: AsRef<Path>>(gazetteer: &Gazetteer, path: P) -> Result<()> {
    let path = path.as_ref();
    let payload = PayloadRef {
        config: gazetteer.config(),
        trie: gazetteer.trie(),
        entities: gazetteer.records(),
    };
    let bytes = bincode::serialize(&payload)?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u64::<LittleEndian>(bytes.len() as u64)?;
    writer.write_u32::<LittleEndian>(crc32fast::hash(&bytes))?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    info!("Wrote gazetteer snapshot {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Open a snapshot written by [`save`].
pub fn open<P: AsRef<Path>>(path: P) -> Result<Gazetteer> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path).map_err(|e| {
        GazetteerError::index(format!("Failed to open snapshot '{}': {e}", path.display()))
    })?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(GazetteerError::index(format!(
            "'{}' is not a gazetteer snapshot",
            path.display()
        )));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(GazetteerError::index(format!(
            "Unsupported snapshot version {version} (expected {FORMAT_VERSION})"
        )));
    }
    let length = reader.read_u64::<LittleEndian>()?;
    let checksum = reader.read_u32::<LittleEndian>()?;

    let mut bytes = Vec::new();
    reader.take(length).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != length {
        return Err(GazetteerError::index("Snapshot payload is truncated"));
    }
    if crc32fast::hash(&bytes) != checksum {
        return Err(GazetteerError::index("Snapshot checksum mismatch"));
    }

    let payload: Payload = bincode::deserialize(&bytes)?;
    info!(
        "Opened gazetteer snapshot {}: {} entities, {} keys",
        path.display(),
        payload.entities.len(),
        payload.trie.len()
    );
    Gazetteer::from_parts(payload.config, payload.trie, payload.entities)
}

impl Gazetteer {
    /// Write this gazetteer to a snapshot file. See [`save`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save(self, path)
    }

    /// Open a snapshot file. See [`open`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Gazetteer> {
        open(path)
    }
}
