pub mod section;
pub mod header;
pub mod extract;
pub mod walk;
pub mod scan;
pub mod listing;

pub use section::{Section, SectionName, SectionType, VALID_SECTION_TYPES};
pub use header::{decode, decode_with, ContainerHeader, DecodeError, DecodeOptions};
pub use extract::{extract_line, extract_line_bytes, ExtractError};
pub use scan::{scan, scan_with, ConformingFiles, ScanError, ScanOptions, ScanStats, SF_MAX_SECTION_SIZE};
pub use listing::{list, ListError, ListOptions};
