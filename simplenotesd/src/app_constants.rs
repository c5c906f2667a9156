pub const API_PREFIX: &str = "/api";
pub const NOTES_PATH: &str = "/api/notes";
