use clap::{Parser, Subcommand};

/// Command-line interface definition for rangelog
/// Offline-first logger for EV range measurements with deferred sync
#[derive(Parser)]
#[command(
    name = "rangelog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record odometer and predicted-range readings offline, sync them to a collector later",
    long_about = None
)]
pub struct Cli {
    /// Override the SQLite database path
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the fallback JSON file path
    #[arg(global = true, long = "fallback")]
    pub fallback: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration file and the database
    Init,

    /// Record a new measurement
    Add {
        /// Odometer reading (km)
        #[arg(long = "odometer", short = 'o')]
        odometer: f64,

        /// Predicted range shown by the car (km)
        #[arg(long = "range", short = 'r')]
        range: f64,

        /// State of charge in percent (0-100)
        #[arg(long = "soc")]
        soc: Option<f64>,

        /// The car was charged at this stop
        #[arg(long = "charged")]
        charged: bool,

        /// Free-text notes
        #[arg(long = "notes", default_value = "")]
        notes: String,

        /// Latitude (decimal degrees)
        #[arg(long = "lat", allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,

        /// Longitude (decimal degrees)
        #[arg(long = "lng", allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,

        /// Measurement time (RFC 3339 or YYYY-MM-DDTHH:MM local); defaults to now
        #[arg(long = "dt")]
        dt: Option<String>,
    },

    /// List the most recent entries
    List {
        /// Maximum number of entries to show (default from config)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show entries not yet acknowledged by the collector
    Pending {
        /// Print only the number of pending entries
        #[arg(long = "count")]
        count: bool,
    },

    /// Upload pending entries to the configured collector
    Sync {
        /// Run only if a background sync has been requested (for schedulers)
        #[arg(long = "background")]
        background: bool,
    },

    /// View or change the configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "set-url",
            value_name = "URL",
            help = "Set the sync endpoint URL (empty string clears it)"
        )]
        set_url: Option<String>,

        #[arg(long = "show-url", help = "Print the effective sync endpoint")]
        show_url: bool,
    },

    /// Show the active storage backend, pending count and sync endpoint
    Status,
}
