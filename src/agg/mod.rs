mod ping_group;
pub(crate) mod stream;

pub use ping_group::PingGroup;
