use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::sensirion::*;

pub mod asynch;
pub mod commands;
pub mod humidity;

pub const DEFAULT_ADDR: u8 = 0x58;

/// Feature set codes of SGP30 firmware this driver knows how to talk to.
pub const SUPPORTED_FEATURE_SETS: &[u16] = &[0x0020, 0x0022];

const SELF_TEST_PASSED: u16 = 0xd400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    pub address: u8,
    /// Feature set codes accepted during initialization.
    pub feature_sets: &'static [u16],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDR,
            feature_sets: SUPPORTED_FEATURE_SETS,
        }
    }
}

impl Config {
    fn validate<E>(&self) -> Result<(), Error<E>> {
        if self.address > 0x7f {
            return Err(Error::InvalidArgument("address must be 7 bits"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AirQuality {
    pub co2eq_ppm: u16,
    pub tvoc_ppb: u16,
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ppm CO2eq, {} ppb TVOC", self.co2eq_ppm, self.tvoc_ppb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSignals {
    pub h2: u16,
    pub ethanol: u16,
}

impl fmt::Display for RawSignals {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "H2 {} ticks, ethanol {} ticks", self.h2, self.ethanol)
    }
}

fn serial_from_words(words: [u16; 3]) -> u64 {
    u64::from(words[0]) << 32 | u64::from(words[1]) << 16 | u64::from(words[2])
}

fn check_feature_set<E>(config: &Config, feature_set: u16) -> Result<(), Error<E>> {
    if config.feature_sets.contains(&feature_set) {
        Ok(())
    } else {
        warn!("unsupported feature set {:#x}", feature_set);
        Err(Error::DeviceNotRecognized(feature_set))
    }
}

/// Argument words for set baseline. The sensor expects TVOC first, the reverse
/// of what get baseline returns.
fn baseline_args<E>(co2eq: u16, tvoc: u16) -> Result<[u16; 2], Error<E>> {
    if co2eq == 0 && tvoc == 0 {
        return Err(Error::InvalidArgument("baseline must not be zero"));
    }
    Ok([tvoc, co2eq])
}

fn humidity_arg<E>(grams_per_cubic_meter: f32) -> Result<u16, Error<E>> {
    humidity::to_fixed_point(grams_per_cubic_meter)
        .ok_or(Error::InvalidArgument("absolute humidity out of range"))
}

/// SGP30 gas sensor with the air quality algorithm running.
///
/// The only way to get one is [`SGP30::new`] or [`SGP30::with_config`], which
/// identify the sensor and start the algorithm first, so every method here
/// talks to an initialized device.
#[derive(Debug)]
pub struct SGP30<I2C, D> {
    sensor: Sensor<I2C, D>,
    serial: u64,
    feature_set: u16,
}

impl<I2C, D> SGP30<I2C, D> {
    /// 48-bit serial number read during initialization.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn feature_set(&self) -> u16 {
        self.feature_set
    }

    pub fn address(&self) -> u8 {
        self.sensor.addr()
    }

    /// Ends the session and gives back the bus and the delay.
    pub fn release(self) -> (I2C, D) {
        self.sensor.release()
    }
}

impl<I2C: I2c, D: DelayNs> SGP30<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Self::with_config(i2c, delay, Config::default())
    }

    /// Reads the serial number, checks the feature set against
    /// `config.feature_sets` and initializes the air quality algorithm.
    /// On any failure the bus is dropped and no driver is returned.
    pub fn with_config(i2c: I2C, delay: D, config: Config) -> Result<Self, Error<I2C::Error>> {
        config.validate::<I2C::Error>()?;
        let mut sensor = Sensor::new(i2c, delay, config.address);

        let serial = serial_from_words(sensor.transact(&commands::GET_SERIAL_ID, &[])?);
        let [feature_set] = sensor.transact(&commands::GET_FEATURE_SET, &[])?;
        check_feature_set::<I2C::Error>(&config, feature_set)?;

        sensor.transact(&commands::IAQ_INIT, &[])?;
        debug!("sgp30 {:#x} ready, feature set {:#x}", serial, feature_set);

        Ok(Self {
            sensor,
            serial,
            feature_set,
        })
    }

    /// Restarts the air quality algorithm. Readings during the following 15 s
    /// are fixed at 400 ppm CO2eq and 0 ppb TVOC.
    pub fn iaq_init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.transact(&commands::IAQ_INIT, &[])?;
        Ok(())
    }

    /// Should be called at 1 Hz for the algorithm's baseline compensation to
    /// behave.
    pub fn measure_air_quality(&mut self) -> Result<AirQuality, Error<I2C::Error>> {
        let [co2eq_ppm, tvoc_ppb] = self.sensor.transact(&commands::MEASURE_IAQ, &[])?;
        Ok(AirQuality {
            co2eq_ppm,
            tvoc_ppb,
        })
    }

    pub fn measure_raw_signals(&mut self) -> Result<RawSignals, Error<I2C::Error>> {
        let [h2, ethanol] = self.sensor.transact(&commands::MEASURE_RAW_SIGNALS, &[])?;
        Ok(RawSignals { h2, ethanol })
    }

    /// Returns the algorithm baseline as (CO2eq, TVOC).
    pub fn get_baseline(&mut self) -> Result<(u16, u16), Error<I2C::Error>> {
        let [co2eq, tvoc] = self.sensor.transact(&commands::GET_IAQ_BASELINE, &[])?;
        Ok((co2eq, tvoc))
    }

    /// Restores a baseline previously read with [`Self::get_baseline`].
    /// An all-zero baseline is rejected without touching the bus.
    pub fn set_baseline(&mut self, co2eq: u16, tvoc: u16) -> Result<(), Error<I2C::Error>> {
        let args = baseline_args::<I2C::Error>(co2eq, tvoc)?;
        self.sensor.transact(&commands::SET_IAQ_BASELINE, &args)?;
        Ok(())
    }

    /// Sets absolute humidity in g/m³ for compensation. Zero turns
    /// compensation off. Values outside `0.0..256.0` are rejected.
    pub fn set_humidity(&mut self, grams_per_cubic_meter: f32) -> Result<(), Error<I2C::Error>> {
        let arg = humidity_arg::<I2C::Error>(grams_per_cubic_meter)?;
        self.sensor
            .transact(&commands::SET_ABSOLUTE_HUMIDITY, &[arg])?;
        Ok(())
    }

    pub fn set_relative_humidity(
        &mut self,
        temp_celsius: f32,
        relative_humidity_percent: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.set_humidity(humidity::absolute_humidity(
            temp_celsius,
            relative_humidity_percent,
        ))
    }

    /// Runs the on-chip self-test. Returns true if successful, false if failed.
    /// The test disturbs the algorithm state, so it is initialized again
    /// afterwards, also when reading the test result failed. An error from the
    /// test itself takes precedence over one from the re-initialization.
    pub fn self_test(&mut self) -> Result<bool, Error<I2C::Error>> {
        let test = self.sensor.transact(&commands::MEASURE_TEST, &[]);
        let reinit = self.iaq_init();

        let [result] = test?;
        reinit?;

        Ok(result == SELF_TEST_PASSED)
    }
}
