use crate::core::error::{RepoError, Result};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use ring::digest;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Length of a full hex digest.
pub const DIGEST_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(ObjectType::Blob),
            "commit" => Some(ObjectType::Commit),
            _ => None,
        }
    }
}

/// A value that can live in the object store.
///
/// The payload encoding must be a pure function of the value, since the
/// digest of the stored bytes is the object's identity.
pub trait Object: Sized {
    const TYPE: ObjectType;

    fn to_payload(&self) -> Result<Vec<u8>>;

    fn from_payload(payload: &[u8]) -> Result<Self>;
}

/// The contents of one file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    contents: Vec<u8>,
}

impl Blob {
    pub fn new(contents: Vec<u8>) -> Self {
        Self { contents }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }
}

impl Object for Blob {
    const TYPE: ObjectType = ObjectType::Blob;

    fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(self.contents.clone())
    }

    fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(Blob::new(payload.to_vec()))
    }
}

/// Content-addressed, write-once storage under `.twig/objects`.
pub struct ObjectStore {
    dir: PathBuf,
    compression: Compression,
}

impl ObjectStore {
    pub fn new<P: AsRef<Path>>(dir: P, compression_level: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            compression: Compression::new(compression_level.min(9)),
        }
    }

    /// Digest an object would be stored under, without writing it.
    pub fn digest_of<O: Object>(object: &O) -> Result<String> {
        let full_content = encode(O::TYPE, &object.to_payload()?);
        Ok(hash_content(&full_content))
    }

    /// Stores `object` unless an object with the same digest already exists.
    pub fn put<O: Object>(&self, object: &O) -> Result<String> {
        let full_content = encode(O::TYPE, &object.to_payload()?);
        let hash = hash_content(&full_content);

        let obj_path = self.object_path(&hash);
        if obj_path.exists() {
            trace!(digest = %hash, "object already stored");
            return Ok(hash);
        }

        if let Some(parent) = obj_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let compressed = self.compress(&full_content)?;
        let temp_path = obj_path.with_extension("tmp");
        fs::write(&temp_path, compressed)?;
        fs::rename(&temp_path, &obj_path)?;

        debug!(digest = %hash, kind = O::TYPE.as_str(), size = full_content.len(), "stored object");
        Ok(hash)
    }

    pub fn get<O: Object>(&self, hash: &str) -> Result<O> {
        let (kind, payload) = self.read_raw(hash)?;
        if kind != O::TYPE.as_str() {
            return Err(RepoError::TypeMismatch {
                digest: hash.to_string(),
                expected: O::TYPE.as_str(),
                actual: kind,
            });
        }
        O::from_payload(&payload)
    }

    pub fn contains(&self, hash: &str) -> bool {
        is_valid_digest(hash) && self.object_path(hash).exists()
    }

    fn object_path(&self, hash: &str) -> PathBuf {
        let (dir, file) = hash.split_at(2);
        self.dir.join(dir).join(file)
    }

    fn read_raw(&self, hash: &str) -> Result<(String, Vec<u8>)> {
        if !self.contains(hash) {
            return Err(RepoError::NotFound(hash.to_string()));
        }

        let compressed = fs::read(self.object_path(hash))?;
        let decompressed = decompress(&compressed)
            .map_err(|e| RepoError::Corrupted(format!("object {}: {}", hash, e)))?;

        if hash_content(&decompressed) != hash {
            return Err(RepoError::Corrupted(format!(
                "object {} failed integrity verification",
                hash
            )));
        }

        let null_pos = decompressed
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| RepoError::Corrupted(format!("object {} has no header", hash)))?;

        let header = String::from_utf8_lossy(&decompressed[..null_pos]);
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| RepoError::Corrupted(format!("object {} has a malformed header", hash)))?;

        if ObjectType::from_str(kind).is_none() {
            return Err(RepoError::Corrupted(format!(
                "object {} has unknown type '{}'",
                hash, kind
            )));
        }

        let expected_size: usize = size
            .parse()
            .map_err(|_| RepoError::Corrupted(format!("object {} has an invalid size", hash)))?;
        let payload = decompressed[null_pos + 1..].to_vec();
        if payload.len() != expected_size {
            return Err(RepoError::Corrupted(format!("object {} size mismatch", hash)));
        }

        Ok((kind.to_string(), payload))
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }
}

/// `"<type> <len>\0"` followed by the payload.
fn encode(kind: ObjectType, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind.as_str(), payload.len());
    let mut full_content = header.into_bytes();
    full_content.extend_from_slice(payload);
    full_content
}

pub fn hash_content(content: &[u8]) -> String {
    let digest_result = digest::digest(&digest::SHA256, content);
    hex::encode(digest_result.as_ref())
}

pub fn is_valid_digest(hash: &str) -> bool {
    hash.len() == DIGEST_LEN && hash.chars().all(|c| c.is_ascii_hexdigit())
}

fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}
