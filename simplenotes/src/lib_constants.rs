// relative to the data directory
pub const GLOBAL_NOTES_FILE: &str = "notes.json";
pub const USER_NOTES_DIRECTORY: &str = "users";
pub const NOTES_FILE_EXTENSION: &str = ".json";
pub const TMP_FILENAME_INFIX: &str = ".tmp.";

pub const GLOBAL_SCOPE_KEY: &str = "notes";
pub const USER_SCOPE_KEY_PREFIX: &str = "notes:user:";

pub const MAX_USER_ID_LEN: usize = 256;

// a uuid v4 collision is practically impossible, the limit only
// guards against a broken generator
pub const MAX_ID_ALLOCATION_ATTEMPTS: usize = 4;

pub const ACCESS_TOKEN_KEY_LEN: usize = 64;
