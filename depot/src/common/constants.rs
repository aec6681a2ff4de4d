// record constants
pub const DOC_ID: &str = "id";
pub const DOC_SEQ: &str = "_seq";
pub const RESERVED_FIELDS: [&str; 2] = [DOC_ID, DOC_SEQ];

// event kind constants
pub const ALL_EVENTS: &str = "*";
pub const ADD_EVENT: &str = "add";
pub const REMOVE_EVENT: &str = "remove";
pub const UPDATE_EVENT: &str = "update";
pub const EVENT_KINDS: [&str; 4] = [ALL_EVENTS, ADD_EVENT, REMOVE_EVENT, UPDATE_EVENT];
