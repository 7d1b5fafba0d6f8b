/// Default color assigned to a category when none is supplied
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

/// Maximum attachment size in bytes (10MB)
pub const MAX_ATTACHMENT_SIZE: usize = 10 * 1024 * 1024;

/// Token type claim for access tokens
pub const TOKEN_TYPE_ACCESS: &str = "access";

/// Token type claim for refresh tokens
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Maximum stored attachment filename length in characters
pub const MAX_FILENAME_LENGTH: usize = 255;
