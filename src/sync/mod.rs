//! Record synchronization between the catalog and the outside world.
//!
//! - **Load**: files → decode → extract → catalog ([`Loader`])
//! - **Export**: catalog → one file per record ([`Exporter`])
//! - **Harvest refresh**: harvested records → remote endpoint ([`HarvestRefresher`])
//! - **Sitemap**: catalog → sitemap XML ([`write_sitemap`])
//!
//! # Failure model
//!
//! Only setup failures (missing scan path, unqueryable store, uncreatable
//! output directory) come back as `Err`. Everything that goes wrong for a
//! single file or record is logged through `tracing` and recorded in the
//! engine's report, and the run continues.
//!
//! # Example
//!
//! ```ignore
//! use catadm::extract::DialectExtractor;
//! use catadm::sync::{Exporter, Loader};
//!
//! let report = Loader::new(&mut catalog, &DialectExtractor)
//!     .force_update(false)
//!     .load_path(Path::new("records/"), false)?;
//! println!("{} of {} files loaded", report.processed.len(), report.total_files);
//!
//! let exported = Exporter::new(&catalog).export(Path::new("out/"))?;
//! ```

pub mod decode;
mod export;
mod file;
mod harvest;
mod load;
pub mod scan;
mod sitemap;
mod types;
mod xml;

pub use decode::{decode, Decoded, DecodeError};
pub use export::{sanitize_filename, Exporter};
pub use file::atomic_write;
pub use harvest::{
    harvest_request, normalize_schema, CswHarvestClient, HarvestError, HarvestRefresher, Harvester,
};
pub use load::{timestamp_now, Loader};
pub use scan::scan;
pub use sitemap::{build_sitemap, record_url, write_sitemap, SITEMAP_NAMESPACE};
pub use types::{
    ExportCollision, ExportFailure, ExportReport, HarvestFailure, HarvestReport, LoadReport, Outcome, RecordOutcome,
    SyncError, SyncResult,
};
