//! Configuration of the RF215 driver and the PAL.



use super::common::*;
use super::pal::rf_rm::RobustMode;



/// Largest frame held by a frame buffer (PSDU plus FCS).
pub const FRAME_MAX_LEN: usize = 2047;

/// Largest PSDU accepted for transmission.
pub const PSDU_MAX_LEN: usize = FRAME_MAX_LEN - FCS_LEN;

/// Clients that may open each transceiver.
pub const CLIENTS_PER_TRX: usize = 2;

/// TX buffers shared by both transceivers.
pub const TX_BUFFERS: usize = 4;

/// Margin added to the PPDU duration before a transmission times out.
pub const TX_TIMEOUT_MARGIN_US: u32 = 2_000;

/// Scheduled transmissions closer than this are started immediately.
pub const TX_MIN_DELAY_US: u64 = 300;

/// RX to TX turnaround time.
pub const TURNAROUND_TIME_US: u16 = 1_000;

/// Attenuation range of the power amplifier, in dB.
pub const MAX_ATTENUATION: u8 = 31;



#[derive(Clone, Copy, Debug)]
pub struct TrxConfig {
    /// The transceiver is used.
    pub(crate) enabled: bool,

    /// Band and operating mode.
    pub(crate) band: Band,

    /// Initial channel.
    pub(crate) channel: u16,

    /// PHY configuration.
    pub(crate) phy: PhyConfig,

    /// Energy detection averaging time of the CCA.
    pub(crate) cca_duration_us: u16,

    /// Energy level above which the channel is busy.
    pub(crate) cca_threshold_dbm: i8,
}

impl TrxConfig {
    /// Creates an enabled transceiver configuration on channel 0 of `band`.
    pub const fn new(band: Band) -> Self {
        Self {
            enabled: true,
            band,
            channel: 0,
            phy: band.phy(),
            cca_duration_us: 160,
            cca_threshold_dbm: -90,
        }
    }

    /// Leaves the transceiver unused.
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the initial channel. Out of band channels fall back to 0.
    pub const fn channel(mut self, channel: u16) -> Self {
        self.channel = if channel < self.band.channels() { channel } else { 0 };
        self
    }

    /// Overrides the default PHY of the band.
    pub const fn phy(mut self, phy: PhyConfig) -> Self {
        self.phy = phy;
        self
    }

    /// Set the clear channel assessment parameters.
    pub const fn cca(mut self, duration_us: u16, threshold_dbm: i8) -> Self {
        self.cca_duration_us = duration_us;
        self.cca_threshold_dbm = threshold_dbm;
        self
    }
}



#[derive(Clone, Copy, Debug)]
pub struct Rf215Config {
    /// Transceiver configurations, indexed by `Trx`.
    pub(crate) trx: [TrxConfig; 2],
}

impl Default for Rf215Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Rf215Config {
    /// Creates a new configuration instance.
    pub const fn new() -> Self {
        Self {
            trx: [
                TrxConfig::new(Band::Fsk863Opm1),
                TrxConfig::new(Band::Fsk2450Opm1),
            ],
        }
    }

    /// Set the configuration of the transceiver serving the band.
    pub const fn trx(mut self, config: TrxConfig) -> Self {
        self.trx[config.band.trx().index()] = config;
        self
    }
}



#[derive(Clone, Copy, Debug)]
pub struct PalConfig {
    /// Transceiver carrying the RF medium.
    pub(crate) rf_trx: Trx,

    /// Sniffer enabled at start on the RF medium.
    pub(crate) sniffer_rf: bool,

    /// Sniffer enabled at start on the PLC medium.
    pub(crate) sniffer_plc: bool,

    /// Robust modulation policy of the RF medium.
    pub(crate) robust_mode: RobustMode,
}

impl Default for PalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PalConfig {
    /// Creates a new configuration instance.
    pub const fn new() -> Self {
        Self { rf_trx: Trx::Rf09, sniffer_rf: false, sniffer_plc: false, robust_mode: RobustMode::Auto }
    }

    /// Set the transceiver used by the RF medium.
    pub const fn rf_trx(mut self, trx: Trx) -> Self {
        self.rf_trx = trx;
        self
    }

    /// Set the sniffer state at start.
    pub const fn sniffer(mut self, rf: bool, plc: bool) -> Self {
        self.sniffer_rf = rf;
        self.sniffer_plc = plc;
        self
    }

    /// Set the robust modulation policy of the RF medium.
    pub const fn robust_mode(mut self, mode: RobustMode) -> Self {
        self.robust_mode = mode;
        self
    }
}
