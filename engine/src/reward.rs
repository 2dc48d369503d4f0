use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Events that occurred during a single tick, independent of the scalar
    /// point reward. The bit values are an external contract.
    #[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
    pub struct RewardFlags: u32 {
        const AGENT_DIES = 1 << 0;
        const COLLECT_DIAMOND = 1 << 1;
        const WALK_THROUGH_EXIT = 1 << 2;
        const NUT_TO_DIAMOND = 1 << 3;
        const COLLECT_KEY = 1 << 4;
        const WALK_THROUGH_GATE = 1 << 5;
        const BUTTERFLY_TO_DIAMOND = 1 << 6;
    }
}

impl Serialize for RewardFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RewardFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(RewardFlags::from_bits_truncate)
    }
}
