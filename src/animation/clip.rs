use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::animation::binding::TargetPath;
use crate::animation::channel::Channel;
use crate::animation::value_type::ValueType;

new_key_type! {
    /// Stable handle of a channel inside an [`Animation`].
    pub struct ChannelKey;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AnimationFlags: u32 {
        const LOOP = 1 << 0;
    }
}

/// A named set of channels with playback metadata.
///
/// Channels live in an arena owned by the animation and are addressed by
/// [`ChannelKey`]; keys stay valid until the channel is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    #[serde(default)]
    pub flags: AnimationFlags,
    /// Playback rate multiplier, `1.0` for authored speed.
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f32,
    duration: f32,
    channels: SlotMap<ChannelKey, Channel>,
}

fn default_speed_factor() -> f32 {
    1.0
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: AnimationFlags::empty(),
            speed_factor: default_speed_factor(),
            duration: 0.0,
            channels: SlotMap::with_key(),
        }
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    /// Sets the duration to the latest sample time over all channels.
    pub fn update_duration(&mut self) {
        self.duration = self
            .channels
            .values()
            .filter_map(Channel::end_time)
            .fold(0.0_f32, f32::max);
    }

    #[inline]
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.flags.contains(AnimationFlags::LOOP)
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.flags.set(AnimationFlags::LOOP, looping);
    }

    // ========================================================================
    // Channels
    // ========================================================================

    pub fn add_channel(&mut self, channel: Channel) -> ChannelKey {
        self.channels.insert(channel)
    }

    /// Returns the channel driving `path`, creating an empty one of
    /// `value_type` if there is none.
    ///
    /// An existing channel is returned as is, even if it stores another type.
    pub fn add_channel_with(&mut self, path: impl Into<TargetPath>, value_type: ValueType) -> ChannelKey {
        let path = path.into();
        if let Some(key) = self.find_channel_key(&path) {
            return key;
        }
        log::debug!("Animation '{}': new {value_type} channel '{path}'", self.name);
        self.channels.insert(Channel::new(path, value_type))
    }

    pub fn remove_channel(&mut self, key: ChannelKey) -> Option<Channel> {
        self.channels.remove(key)
    }

    #[must_use]
    pub fn channel(&self, key: ChannelKey) -> Option<&Channel> {
        self.channels.get(key)
    }

    pub fn channel_mut(&mut self, key: ChannelKey) -> Option<&mut Channel> {
        self.channels.get_mut(key)
    }

    #[must_use]
    pub fn find_channel_key(&self, path: &TargetPath) -> Option<ChannelKey> {
        self.channels
            .iter()
            .find_map(|(key, channel)| (channel.target_path == *path).then_some(key))
    }

    #[must_use]
    pub fn find_channel(&self, path: &str) -> Option<&Channel> {
        self.channels.values().find(|c| c.target_path.as_str() == path)
    }

    pub fn find_channel_mut(&mut self, path: &str) -> Option<&mut Channel> {
        self.channels.values_mut().find(|c| c.target_path.as_str() == path)
    }

    pub fn channels(&self) -> impl Iterator<Item = (ChannelKey, &Channel)> {
        self.channels.iter()
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = (ChannelKey, &mut Channel)> {
        self.channels.iter_mut()
    }

    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Animation '{}' ({} channels, duration {}s, speed {}",
            self.name,
            self.channels.len(),
            self.duration,
            self.speed_factor
        )?;
        if self.is_looping() {
            f.write_str(", looping")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_channel_with_reuses_existing_path() {
        let mut anim = Animation::new("walk");
        let a = anim.add_channel_with("bone/hip/position", ValueType::Vec3);
        let b = anim.add_channel_with("bone/hip/position", ValueType::Vec3);
        assert_eq!(a, b);
        assert_eq!(anim.channel_count(), 1);
    }

    #[test]
    fn removed_keys_stay_dead() {
        let mut anim = Animation::new("walk");
        let key = anim.add_channel_with("a", ValueType::Float);
        assert!(anim.remove_channel(key).is_some());
        assert!(anim.channel(key).is_none());
        let other = anim.add_channel_with("a", ValueType::Float);
        assert_ne!(key, other);
    }
}
