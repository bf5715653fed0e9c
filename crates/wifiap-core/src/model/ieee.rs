// ── IEEE 802.11 standard mask ──
//
// One hardware-mode bit (a/b/g/ad) plus optional amendment bits. The
// bit values match the integers accepted by `setIeeeStandard` on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Bitmask of IEEE 802.11 standards enabled for the access point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IeeeStandard: u32 {
        const A = 0x001;
        const B = 0x002;
        const G = 0x004;
        const AD = 0x008;
        const D = 0x010;
        const H = 0x020;
        const N = 0x040;
        const AC = 0x080;
        const AX = 0x100;
        const W = 0x200;

        /// Bits selecting the PHY family. Exactly one must be set.
        const HARDWARE_MODE_BITS = 0x00F;
    }
}

impl IeeeStandard {
    /// The hardware-mode bits alone.
    pub const fn hardware_bits(self) -> Self {
        self.intersection(Self::HARDWARE_MODE_BITS)
    }

    /// The selected hardware mode, if exactly one mode bit is set.
    pub fn hardware_mode(self) -> Option<HardwareMode> {
        let hw = self.hardware_bits();
        if hw == Self::A {
            Some(HardwareMode::A)
        } else if hw == Self::B {
            Some(HardwareMode::B)
        } else if hw == Self::G {
            Some(HardwareMode::G)
        } else if hw == Self::AD {
            Some(HardwareMode::Ad)
        } else {
            None
        }
    }
}

impl Default for IeeeStandard {
    fn default() -> Self {
        Self::G
    }
}

impl fmt::Display for IeeeStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// ── HardwareMode ────────────────────────────────────────────────────

/// PHY family selected by the hardware-mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HardwareMode {
    A,
    B,
    G,
    Ad,
}

impl HardwareMode {
    /// Channels accepted for this mode.
    pub const fn channel_range(self) -> ChannelRange {
        match self {
            Self::A => ChannelRange { min: 7, max: 196 },
            Self::B | Self::G => ChannelRange { min: 1, max: 14 },
            Self::Ad => ChannelRange { min: 1, max: 6 },
        }
    }
}

/// Inclusive channel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: u16,
    pub max: u16,
}

impl ChannelRange {
    pub const fn contains(self, channel: u16) -> bool {
        self.min <= channel && channel <= self.max
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        HardwareMode::G.channel_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_mode_requires_single_bit() {
        assert_eq!(IeeeStandard::G.hardware_mode(), Some(HardwareMode::G));
        assert_eq!(
            (IeeeStandard::A | IeeeStandard::AC).hardware_mode(),
            Some(HardwareMode::A)
        );
        assert_eq!((IeeeStandard::A | IeeeStandard::B).hardware_mode(), None);
        assert_eq!(IeeeStandard::N.hardware_mode(), None);
    }

    #[test]
    fn unknown_bits_are_retained() {
        let mask = IeeeStandard::from_bits_retain(0x404);
        assert_eq!(mask.bits(), 0x404);
        assert_eq!(mask.hardware_mode(), Some(HardwareMode::G));
        assert_eq!(mask.to_string(), "1028");
    }

    #[test]
    fn channel_ranges_per_mode() {
        assert_eq!(HardwareMode::A.channel_range(), ChannelRange { min: 7, max: 196 });
        assert_eq!(HardwareMode::B.channel_range(), ChannelRange { min: 1, max: 14 });
        assert_eq!(HardwareMode::G.channel_range(), ChannelRange { min: 1, max: 14 });
        assert_eq!(HardwareMode::Ad.channel_range(), ChannelRange { min: 1, max: 6 });
    }

    #[test]
    fn hardware_mode_display_matches_hostapd() {
        assert_eq!(HardwareMode::Ad.to_string(), "ad");
        assert_eq!(HardwareMode::G.to_string(), "g");
    }
}
