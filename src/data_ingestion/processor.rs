pub mod cleaner;
pub mod csv_io;
pub mod data_loader;

pub use cleaner::{
    clean_column_names, clean_numeric_column, drop_unnecessary_columns, prune_datasets, CleanError,
};
pub use csv_io::{CsvError, CsvReader, CsvReaderConfig};
pub use data_loader::DataLoader;
