pub mod ordered_map;
pub mod raw;
pub mod structure;

pub use ordered_map::OrderedMap;
pub use raw::{
    RawLeague, RawLeagueEntry, RawMatch, RawTeam, decode_matches, id_key, json_type_name,
    present_id,
};
pub use structure::{Club, League, Metadata, OrganizationEntry, Structure, Team};
