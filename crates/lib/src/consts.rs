/// Application name used for data and config directories.
pub const APP_NAME: &str = "critstore";

/// Default config file name within the config directory.
pub const CONFIG_FILENAME: &str = "critstore.json";

/// Default modifier (write-ahead) file name within the store directory.
pub const MODIFIER_FILENAME: &str = "critical.mod";

/// Default committed file name within the store directory.
pub const COMMITTED_FILENAME: &str = "critical.dat";

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "CRITSTORE_DIR";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CRITSTORE_CONFIG";

/// Current store image format version (text and binary).
pub const STORE_IMAGE_VERSION: u32 = 1;

/// Magic prefix of binary store images.
pub const BINARY_IMAGE_MAGIC: &[u8; 4] = b"CDS\x01";

/// Bits the theme ordinal is shifted by when packing a payvar index.
pub const PAYVAR_THEME_SHIFT: u32 = 16;
