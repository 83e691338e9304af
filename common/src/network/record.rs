use serde::Serialize;

/// One wireless network observed by the capture tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRecord {
    /// Hardware address of the access point, the merge key.
    pub identity: String,
    /// Broadcast name; empty for hidden networks.
    pub display_name: String,
    /// `None` when the channel column did not hold a positive integer.
    pub channel: Option<u16>,
    pub signal_level: Option<String>,
    pub encryption: Option<String>,
}

impl NetworkRecord {
    pub fn new(identity: impl Into<String>, display_name: impl Into<String>, channel: u16) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            channel: Some(channel).filter(|ch| *ch > 0),
            signal_level: None,
            encryption: None,
        }
    }

    pub fn with_signal_level(mut self, signal_level: impl Into<String>) -> Self {
        self.signal_level = Some(signal_level.into());
        self
    }

    pub fn with_encryption(mut self, encryption: impl Into<String>) -> Self {
        self.encryption = Some(encryption.into());
        self
    }

    /// A record is accepted into the merged collection only when it has an
    /// identity, a name and a positive channel.
    pub fn is_valid(&self) -> bool {
        !self.identity.is_empty()
            && !self.display_name.is_empty()
            && self.channel.is_some_and(|ch| ch > 0)
    }

    /// Folds a newer observation of the same network into this one.
    ///
    /// Required fields take the newer value, optional fields only when the
    /// newer observation carries them. Returns whether anything changed.
    pub fn refresh_from(&mut self, newer: NetworkRecord) -> bool {
        let before = self.clone();

        self.display_name = newer.display_name;
        if newer.channel.is_some() {
            self.channel = newer.channel;
        }
        if newer.signal_level.is_some() {
            self.signal_level = newer.signal_level;
        }
        if newer.encryption.is_some() {
            self.encryption = newer.encryption;
        }

        *self != before
    }
}
