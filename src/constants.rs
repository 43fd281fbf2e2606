pub const MODEL_API_KEY_ENV_NAME: &str = "LINKR_MODEL_API_KEY";
pub const SEARCH_API_KEY_ENV_NAME: &str = "LINKR_SEARCH_API_KEY";
pub const JSONBIN_KEY_ENV_NAME: &str = "LINKR_JSONBIN_KEY";
pub const SETTINGS_PATH_ENV_NAME: &str = "LINKR_SETTINGS";

pub const DEFAULT_SETTINGS_PATH: &str = "linkr.settings.json";
pub const DEFAULT_STORE: &str = "sqlite:linkr.db";
pub const DEFAULT_FORMAT_TEMPLATE: &str = "- {name}: {url}";

/// Lowest similarity score accepted as a match, in `[0, 1]`.
pub const MATCH_THRESHOLD: f64 = 0.75;
/// Discount applied when only a single word of a multi-word name matches.
pub const TOKEN_MATCH_WEIGHT: f64 = 0.9;

/// Transcript chunk size in characters. Zero disables chunking.
pub const DEFAULT_CHUNK_SIZE: usize = 3500;

pub const BRAVE_SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
pub const SUGGESTION_COUNT: u8 = 10;

pub const JSONBIN_ENDPOINT: &str = "https://api.jsonbin.io/v3/b/";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";
pub(crate) const BULLET_STRIPPER: &str = r"^(?:[-*•]|\d+[.)])\s+";

pub(crate) const DEFAULT_EXTRACTION_PROMPT: &str = r#"
Extract a list of all names or entities mentioned in the transcript below
(people, companies, libraries, or products).
Return them as plain text, one name per line.
Do not include explanations or formatting.
Transcript:"#;
