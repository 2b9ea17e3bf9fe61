//! # Aperture Correction
//!
//! Applies spatially varying aperture corrections to flux fields in place.
//!
//! Responsibilities:
//! - Decide which flux fields are corrected, directly or through a proxy
//! - Add (or alias) the `apCorr` / `apCorrErr` output columns and a failure flag
//! - Evaluate the correction models per source and rewrite flux and flux error
//!
//! # Example
//!
//! ```ignore
//! let names = ApCorrNameSet::from_names(&blueprint.ap_corr_names);
//! let task = ApplyApCorrTask::new(&mut schema, &names, blueprint.apply_ap_corr.clone())?;
//! let mut catalog = document.fill(SourceCatalog::new(schema))?;
//! let summaries = task.run(&mut catalog, &ap_corr_map);
//! ```

pub mod error;
mod info;
mod name_set;
mod task;

pub use contracts::ApplyApCorrConfig;
pub use error::{ApCorrError, Result};
pub use info::ApCorrInfo;
pub use name_set::ApCorrNameSet;
pub use task::{ApCorrFieldSummary, ApplyApCorrTask, FluxErrMode, DEFAULT_FLUX_ERR_MODE};
