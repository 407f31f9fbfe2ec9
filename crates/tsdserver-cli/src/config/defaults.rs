use std::path::PathBuf;

pub fn default_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_welcome() -> String {
    "index.html".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_ecma_version() -> u32 {
    tsdserver_core::EcmaVersion::DEFAULT.year().unwrap_or(2023)
}

pub fn default_tsconfig() -> PathBuf {
    PathBuf::from("tsconfig.json")
}
