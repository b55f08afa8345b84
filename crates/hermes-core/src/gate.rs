use std::collections::{HashMap, HashSet};

use crate::{
    domain::{ChannelId, GuildId},
    errors::Error,
    Result,
};

/// Guild -> channels whose attachments are mirrored to storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchedChannels {
    guilds: HashMap<GuildId, HashSet<ChannelId>>,
}

impl WatchedChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `guild:channel` pairs separated by commas, e.g. `12345:67890,12345:67891`.
    ///
    /// An empty string yields an empty set.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut out = Self::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let parsed = pair.split_once(':').and_then(|(g, c)| {
                Some((g.trim().parse::<u64>().ok()?, c.trim().parse::<u64>().ok()?))
            });
            let Some((guild, channel)) = parsed else {
                return Err(Error::Config(format!(
                    "WATCHED_CHANNELS must be a comma-separated list of guild:channel pairs, \
                     e.g. '12345:67890,23456:78901' (bad entry: '{pair}')"
                )));
            };
            out.insert(GuildId(guild), ChannelId(channel));
        }
        Ok(out)
    }

    pub fn insert(&mut self, guild: GuildId, channel: ChannelId) {
        self.guilds.entry(guild).or_default().insert(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.guilds.values().map(HashSet::len).sum()
    }

    /// Both ids are required; a message outside a guild is never watched.
    pub fn is_watched(&self, guild: Option<GuildId>, channel: Option<ChannelId>) -> bool {
        let (Some(guild), Some(channel)) = (guild, channel) else {
            return false;
        };
        self.guilds
            .get(&guild)
            .is_some_and(|channels| channels.contains(&channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_groups_by_guild() {
        let w = WatchedChannels::parse("1:10, 1:11,2:20").unwrap();
        assert_eq!(w.len(), 3);
        assert!(w.is_watched(Some(GuildId(1)), Some(ChannelId(10))));
        assert!(w.is_watched(Some(GuildId(1)), Some(ChannelId(11))));
        assert!(w.is_watched(Some(GuildId(2)), Some(ChannelId(20))));
    }

    #[test]
    fn rejects_pairs_not_configured() {
        let w = WatchedChannels::parse("1:10,2:20").unwrap();
        assert!(!w.is_watched(Some(GuildId(1)), Some(ChannelId(20))));
        assert!(!w.is_watched(Some(GuildId(3)), Some(ChannelId(10))));
    }

    #[test]
    fn missing_context_is_never_watched() {
        let w = WatchedChannels::parse("1:10").unwrap();
        assert!(!w.is_watched(None, Some(ChannelId(10))));
        assert!(!w.is_watched(Some(GuildId(1)), None));
        assert!(!w.is_watched(None, None));
    }

    #[test]
    fn empty_input_is_empty_set() {
        let w = WatchedChannels::parse("").unwrap();
        assert!(w.is_empty());
        assert!(!w.is_watched(Some(GuildId(1)), Some(ChannelId(1))));
    }

    #[test]
    fn malformed_input_is_a_config_error() {
        for bad in ["1", "a:b", "1:2:3", "1:2,x"] {
            assert!(
                matches!(WatchedChannels::parse(bad), Err(Error::Config(_))),
                "{bad}"
            );
        }
    }
}
