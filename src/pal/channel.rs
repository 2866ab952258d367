//! Physical channel (`pch`) encoding.
//! The medium is told apart by two discriminator bits; the low 9 bits hold
//! the channel number of that medium.



/// Medium discriminator of RF channels.
pub const PCH_RF: u16 = 0x0200;

/// Medium discriminator of serial channels.
pub const PCH_SERIAL: u16 = 0x0400;

/// Channel number field.
pub const PCH_CHANNEL_MASK: u16 = 0x01FF;

/// RF channel number reserved for frequency hopping.
pub const PCH_FREQUENCY_HOPPING: u16 = 0x01FF;



/// Communication medium of a physical channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum Medium {
    Plc,
    Rf,
    Serial,
}

impl Medium {
    /// Physical channel of a channel number on this medium.
    pub const fn pch(self, channel: u16) -> u16 {
        let channel = channel & PCH_CHANNEL_MASK;

        match self {
            Medium::Plc => channel,
            Medium::Rf => PCH_RF | channel,
            Medium::Serial => PCH_SERIAL | channel,
        }
    }
}



/// Splits a physical channel into its medium and channel number.
pub const fn decode(pch: u16) -> (Medium, u16) {
    let channel = pch & PCH_CHANNEL_MASK;

    let medium = if pch & PCH_SERIAL != 0 {
        Medium::Serial
    } else if pch & PCH_RF != 0 {
        Medium::Rf
    } else {
        Medium::Plc
    };

    (medium, channel)
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_bits_select_the_medium() {
        assert_eq!(decode(0x0205), (Medium::Rf, 5));
        assert_eq!(decode(0x0005), (Medium::Plc, 5));
        assert_eq!(decode(0x0401), (Medium::Serial, 1));
        assert_eq!(decode(0x03FF), (Medium::Rf, PCH_FREQUENCY_HOPPING));
    }

    #[test]
    fn encoding_masks_the_channel() {
        assert_eq!(Medium::Rf.pch(5), 0x0205);
        assert_eq!(Medium::Plc.pch(0x0205), 0x0005);
        assert_eq!(decode(Medium::Rf.pch(300)), (Medium::Rf, 300));
    }
}
