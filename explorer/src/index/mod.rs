//! Index configuration drift detection

pub mod checker;
pub mod comparator;
pub mod configuration;

pub use checker::{IndexAdapter, IndexChangedChecker, IndexStatus};
pub use comparator::{
    normalize_settings, ConfigurationComparator, Difference, DifferenceKind, MANAGED_SETTINGS,
};
pub use configuration::IndexConfiguration;
