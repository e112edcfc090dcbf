pub mod data_loader;
pub mod dedup;
pub mod paths;
pub mod stats_loader;

pub use data_loader::{collect_jsonl_files, parse_jsonl_file, parse_line, scan_raw_logs};
pub use dedup::{Deduper, dedupe_and_filter};
pub use paths::{DataPaths, default_config_path};
pub use stats_loader::{load_stats_cache, read_summary};
