//! Robust modulation selection of the RF medium.



use super::types::PalScheme;



/// Lowest RSSI decoded without FEC.
pub const FSK_FEC_OFF_THRESHOLD_DBM: i8 = -89;

/// Lowest RSSI decoded with FEC.
pub const FSK_FEC_ON_THRESHOLD_DBM: i8 = -94;

/// Thermal noise offset of the LQI scale.
const LQI_OFFSET_DBM: i16 = 174;

/// LQI of a signal at the noise floor of the receiver.
const LQI_NOISE_FLOOR: u8 = 63;



/// Selection policy of `robust_modulation`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
#[repr(u8)]
pub enum RobustMode {
    /// Least robust scheme the signal allows.
    Auto = 0,

    /// FEC forced off.
    FecOff = 1,

    /// FEC forced on.
    FecOn = 2,
}

impl RobustMode {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Auto),
            1 => Some(Self::FecOff),
            2 => Some(Self::FecOn),
            _ => None,
        }
    }
}

/// Scheme expected to be decoded at `rssi`. `Rf` if the signal is too weak
/// for the schemes `mode` allows.
pub const fn robust_modulation(rssi: i8, mode: RobustMode) -> PalScheme {
    match mode {
        RobustMode::Auto | RobustMode::FecOff if rssi >= FSK_FEC_OFF_THRESHOLD_DBM => PalScheme::RfFskFecOff,
        RobustMode::Auto | RobustMode::FecOn if rssi >= FSK_FEC_ON_THRESHOLD_DBM => PalScheme::RfFskFecOn,
        _ => PalScheme::Rf,
    }
}

/// Returns `false` if `modulation` cannot satisfy `reference`: a frame
/// without FEC never meets a FEC requirement.
pub const fn check_minimum_quality(reference: PalScheme, modulation: PalScheme) -> bool {
    !matches!((reference, modulation), (PalScheme::RfFskFecOn, PalScheme::RfFskFecOff))
}

/// Less robust of two schemes.
pub const fn less_robust_modulation(a: PalScheme, b: PalScheme) -> PalScheme {
    if matches!(a, PalScheme::RfFskFecOff) || matches!(b, PalScheme::RfFskFecOff) {
        PalScheme::RfFskFecOff
    } else if matches!(a, PalScheme::RfFskFecOn) || matches!(b, PalScheme::RfFskFecOn) {
        PalScheme::RfFskFecOn
    } else {
        PalScheme::Rf
    }
}

/// Link quality of a frame received at `rssi`.
pub const fn lqi_from_rssi(rssi: i8) -> u8 {
    let lqi = rssi as i16 + LQI_OFFSET_DBM;

    if lqi < 0 { 0 } else if lqi > 255 { 255 } else { lqi as u8 }
}

/// SNR in 3 dB steps (0 to 7) of a link quality.
pub const fn snr_from_lqi(lqi: u8) -> u8 {
    let steps = lqi.saturating_sub(LQI_NOISE_FLOOR) / 3;

    if steps > 7 { 7 } else { steps }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_thresholds() {
        use RobustMode::*;

        assert_eq!(robust_modulation(-88, FecOff), PalScheme::RfFskFecOff);
        assert_eq!(robust_modulation(-89, FecOff), PalScheme::RfFskFecOff);
        assert_eq!(robust_modulation(-90, FecOff), PalScheme::Rf);
        assert_eq!(robust_modulation(-95, FecOff), PalScheme::Rf);

        assert_eq!(robust_modulation(-60, FecOn), PalScheme::RfFskFecOn);
        assert_eq!(robust_modulation(-90, FecOn), PalScheme::RfFskFecOn);
        assert_eq!(robust_modulation(-94, FecOn), PalScheme::RfFskFecOn);
        assert_eq!(robust_modulation(-95, FecOn), PalScheme::Rf);
    }

    #[test]
    fn auto_picks_the_least_robust_scheme() {
        assert_eq!(robust_modulation(-60, RobustMode::Auto), PalScheme::RfFskFecOff);
        assert_eq!(robust_modulation(-89, RobustMode::Auto), PalScheme::RfFskFecOff);
        assert_eq!(robust_modulation(-92, RobustMode::Auto), PalScheme::RfFskFecOn);
        assert_eq!(robust_modulation(-95, RobustMode::Auto), PalScheme::Rf);

        assert_eq!(RobustMode::from_byte(2), Some(RobustMode::FecOn));
        assert_eq!(RobustMode::from_byte(3), None);
    }

    #[test]
    fn minimum_quality_table() {
        use PalScheme::*;

        for reference in [Rf, RfFskFecOff, RfFskFecOn] {
            for modulation in [Rf, RfFskFecOff, RfFskFecOn] {
                let expected = !(reference == RfFskFecOn && modulation == RfFskFecOff);
                assert_eq!(check_minimum_quality(reference, modulation), expected);
            }
        }
    }

    #[test]
    fn less_robust() {
        use PalScheme::*;

        assert_eq!(less_robust_modulation(RfFskFecOn, RfFskFecOff), RfFskFecOff);
        assert_eq!(less_robust_modulation(Rf, RfFskFecOn), RfFskFecOn);
        assert_eq!(less_robust_modulation(Rf, Rf), Rf);
    }

    #[test]
    fn link_quality() {
        assert_eq!(lqi_from_rssi(-100), 74);
        assert_eq!(lqi_from_rssi(-128), 46);
        assert_eq!(lqi_from_rssi(127), 255);

        assert_eq!(snr_from_lqi(46), 0);
        assert_eq!(snr_from_lqi(74), 3);
        assert_eq!(snr_from_lqi(255), 7);
    }
}
