//! Proving and verifying key material on disk.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::*;

use crate::ProverError;

const PROVING_KEY_FILE: &str = "provingKey.bin";
const VERIFYING_KEY_FILE: &str = "verificationKey.bin";
const PROVING_KEY_LEN: usize = 32;
const VK_DOMAIN: &[u8] = b"podseq-vk";

#[derive(Clone, PartialEq, Eq)]
pub struct ProvingKey(Vec<u8>);

impl ProvingKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn generate() -> Self {
        let mut bytes = vec![0u8; PROVING_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        let mut hasher = Sha256::new();
        hasher.update(VK_DOMAIN);
        hasher.update(&self.0);
        VerifyingKey(hasher.finalize().into())
    }
}

// Never print key material.
impl fmt::Debug for ProvingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProvingKey(..)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey([u8; 32]);

impl VerifyingKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Key files under `<datadir>/keys`.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(datadir: &Path) -> Self {
        Self {
            dir: datadir.join("keys"),
        }
    }

    pub fn proving_key_path(&self) -> PathBuf {
        self.dir.join(PROVING_KEY_FILE)
    }

    pub fn verifying_key_path(&self) -> PathBuf {
        self.dir.join(VERIFYING_KEY_FILE)
    }

    /// Generates and writes a key pair unless a proving key is already present.
    ///
    /// A missing verifying key is re-derived from the proving key.
    pub fn ensure_keys(&self) -> Result<VerifyingKey, ProverError> {
        let pk_path = self.proving_key_path();
        let pk = if pk_path.exists() {
            self.load_proving_key()?
        } else {
            fs::create_dir_all(&self.dir)?;
            let pk = ProvingKey::generate();
            fs::write(&pk_path, pk.as_bytes())?;
            info!(path = %pk_path.display(), "generated proving key");
            pk
        };

        let vk = pk.verifying_key();
        let vk_path = self.verifying_key_path();
        if !vk_path.exists() {
            fs::write(&vk_path, vk.as_bytes())?;
            info!(path = %vk_path.display(), "wrote verifying key");
        } else if self.load_verifying_key()? != vk {
            return Err(ProverError::MalformedKey(vk_path));
        }
        Ok(vk)
    }

    pub fn load_proving_key(&self) -> Result<ProvingKey, ProverError> {
        let path = self.proving_key_path();
        if !path.exists() {
            return Err(ProverError::MissingProvingKey(path));
        }
        let bytes = fs::read(&path)?;
        if bytes.is_empty() {
            return Err(ProverError::MalformedKey(path));
        }
        Ok(ProvingKey(bytes))
    }

    pub fn load_verifying_key(&self) -> Result<VerifyingKey, ProverError> {
        let path = self.verifying_key_path();
        if !path.exists() {
            return Err(ProverError::MissingVerifyingKey(path));
        }
        let bytes: [u8; 32] = fs::read(&path)?
            .try_into()
            .map_err(|_| ProverError::MalformedKey(path))?;
        Ok(VerifyingKey(bytes))
    }
}
