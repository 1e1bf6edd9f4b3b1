pub mod applier;
pub mod fence;
pub mod fs;
pub mod path_resolver;
pub mod reader;
pub mod response_parser;
pub mod writer;

pub use applier::{FileChangeApplier, Preview};
pub use path_resolver::ResolutionContext;
pub use response_parser::parse_response;

/// Extensions treated as editable text, both when reading context directories
/// and when deciding whether a fence annotation names a file.
pub const TEXT_EXTENSIONS: [&str; 32] = [
    "txt", "rs", "ts", "js", "go", "json", "py", "cpp", "c", "h", "hpp", "css", "html", "md",
    "yaml", "yml", "toml", "xml", "tsx", "jsx", "java", "kt", "rb", "php", "cs", "sh", "sql",
    "swift", "ini", "cfg", "pyi", "vue",
];
