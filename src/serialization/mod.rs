//! Model persistence.
//!
//! A trained one-vs-all model is stored as a single bundle holding the
//! feature column list, the scaler bounds, one weight vector per house and
//! the imputation means. The file layout is:
//!
//! ```text
//! [4-byte magic: "SHAT"]
//! [1-byte major version][1-byte minor version]
//! [bincode-encoded ModelBundle]
//! ```
//!
//! f64 values are stored as raw IEEE-754 bits and round-trip exactly.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use sorting_hat::classification::House;
//! use sorting_hat::preprocessing::{ImputationMeans, ScalerState};
//! use sorting_hat::serialization::ModelBundle;
//!
//! let bundle = ModelBundle {
//!     features: vec!["Astronomy".to_string()],
//!     scaler: ScalerState { min: vec![-10.0], max: vec![10.0] },
//!     weights: House::ALL.into_iter().map(|h| (h, vec![0.1, -0.2])).collect::<BTreeMap<_, _>>(),
//!     imputation_means: ImputationMeans::new(vec![0.5]),
//! };
//!
//! let bytes = bundle.to_bytes().expect("encodes");
//! assert_eq!(&bytes[..4], b"SHAT");
//! assert_eq!(ModelBundle::from_bytes(&bytes).expect("decodes"), bundle);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::classification::House;
use crate::error::{HatError, Result};
use crate::preprocessing::{ImputationMeans, ScalerState};

/// File magic.
pub const MODEL_MAGIC: [u8; 4] = *b"SHAT";

/// Format version written by this build, as (major, minor).
pub const FORMAT_VERSION: (u8, u8) = (1, 0);

const HEADER_LEN: usize = 6;

/// Everything inference needs from a training run, saved and loaded whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Feature columns, in the order the weights expect them.
    pub features: Vec<String>,
    /// Fitted min-max bounds.
    pub scaler: ScalerState,
    /// Weight vector (bias first) per house.
    pub weights: BTreeMap<House, Vec<f64>>,
    /// Per-column training means used to fill missing cells.
    pub imputation_means: ImputationMeans,
}

impl ModelBundle {
    /// Checks that the parts of the bundle agree with each other.
    ///
    /// # Errors
    ///
    /// Returns [`HatError::Format`] if a house is missing, or if a weight
    /// vector, the scaler bounds or the means disagree with the feature count.
    pub fn validate(&self) -> Result<()> {
        let n_features = self.features.len();
        if n_features == 0 {
            return Err(HatError::format("bundle lists no feature columns"));
        }
        for house in House::ALL {
            let weight = self
                .weights
                .get(&house)
                .ok_or_else(|| HatError::format(format!("missing weights for {house}")))?;
            if weight.len() != n_features + 1 {
                return Err(HatError::format(format!(
                    "{house} weights have {} entries, expected {}",
                    weight.len(),
                    n_features + 1
                )));
            }
        }
        if self.scaler.min.len() != n_features || self.scaler.max.len() != n_features {
            return Err(HatError::format(format!(
                "scaler describes {}/{} columns, expected {n_features}",
                self.scaler.min.len(),
                self.scaler.max.len()
            )));
        }
        if self.imputation_means.len() != n_features {
            return Err(HatError::format(format!(
                "imputation means describe {} columns, expected {n_features}",
                self.imputation_means.len()
            )));
        }
        Ok(())
    }

    /// Encodes the bundle with its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle is inconsistent or encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let payload = bincode::serialize(self)?;
        let mut output = Vec::with_capacity(HEADER_LEN + payload.len());
        output.extend_from_slice(&MODEL_MAGIC);
        output.push(FORMAT_VERSION.0);
        output.push(FORMAT_VERSION.1);
        output.extend_from_slice(&payload);
        Ok(output)
    }

    /// Decodes and validates a bundle.
    ///
    /// Files with the same major version and a minor version up to the
    /// current one are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error on a short buffer, bad magic, unsupported version,
    /// undecodable payload or inconsistent bundle.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = data
            .get(..HEADER_LEN)
            .ok_or_else(|| HatError::format("file too short for header"))?;
        if header[..4] != MODEL_MAGIC {
            return Err(HatError::format(format!(
                "invalid magic: expected {MODEL_MAGIC:?}, got {:?}",
                &header[..4]
            )));
        }

        let found = (header[4], header[5]);
        if found.0 != FORMAT_VERSION.0 || found.1 > FORMAT_VERSION.1 {
            return Err(HatError::UnsupportedVersion {
                found,
                supported: FORMAT_VERSION,
            });
        }

        let bundle: ModelBundle = bincode::deserialize(&data[HEADER_LEN..])?;
        bundle.validate()?;
        Ok(bundle)
    }
}

/// Writes `bundle` to `path`.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over `path`, so readers see either the old file or the new
/// one.
///
/// # Errors
///
/// Returns an error if the bundle is inconsistent or any I/O step fails.
pub fn save_bundle<P: AsRef<Path>>(path: P, bundle: &ModelBundle) -> Result<()> {
    let path = path.as_ref();
    let bytes = bundle.to_bytes()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| HatError::Io(e.error))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "model saved");
    Ok(())
}

/// Reads and validates a bundle from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid bundle.
pub fn load_bundle<P: AsRef<Path>>(path: P) -> Result<ModelBundle> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let bundle = ModelBundle::from_bytes(&data)?;
    tracing::info!(
        path = %path.display(),
        features = bundle.features.len(),
        "model loaded"
    );
    Ok(bundle)
}
