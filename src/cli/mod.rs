//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::http::DEFAULT_TIMEOUT_SECS;

pub mod commands;

/// catadm - metadata catalog administration
#[derive(Parser, Debug)]
#[command(name = "catadm", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.catadm/config.json)
    #[arg(short, long, global = true, env = "CATADM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (default: repository.database from config, else ~/.catadm/data/catalog.db)
    #[arg(long, global = true, env = "CATADM_DB")]
    pub db: Option<PathBuf>,

    /// Records table name (default: repository.table from config, else "records")
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the records table and its indexes
    SetupDb,

    /// Load metadata records from a file or directory
    LoadRecords {
        /// File or directory of .xml / .json documents
        #[arg(short, long)]
        path: PathBuf,

        /// Descend into subdirectories (collects .xml files only)
        #[arg(short, long)]
        recursive: bool,

        /// Overwrite records whose identifier already exists
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete all records
    DeleteRecords {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export every record to a directory, one file per record
    ExportRecords {
        /// Output directory (created if missing)
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Rebuild the records table indexes
    RebuildDbIndexes,

    /// Compact the database and refresh planner statistics
    OptimizeDb,

    /// Re-harvest every non-local record from its origin
    RefreshHarvestedRecords {
        /// Catalog endpoint that performs the harvest (default: server.url from config)
        #[arg(short, long)]
        url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Write an XML sitemap of all records
    GenSitemap {
        /// Sitemap file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Catalog endpoint used in record URLs (default: server.url from config)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// POST a request document to a catalog endpoint and print the response
    PostXml {
        /// Endpoint URL
        #[arg(short, long)]
        url: String,

        /// Request document
        #[arg(short, long)]
        xml: PathBuf,

        /// Timeout in seconds
        #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Check that a document and its schema are well-formed XML
    ValidateXml {
        /// Document to check
        #[arg(short, long)]
        xml: PathBuf,

        /// XML Schema document
        #[arg(short = 's', long)]
        xsd: PathBuf,
    },

    /// Print versions of catadm and its components
    GetSysprof,
}
