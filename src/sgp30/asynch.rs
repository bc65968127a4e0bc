//! The same driver over `embedded-hal-async`.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::{
    AirQuality, Config, RawSignals, SELF_TEST_PASSED, baseline_args, check_feature_set, commands,
    humidity, humidity_arg, serial_from_words,
};
use crate::sensirion::Error;
use crate::sensirion::asynch::AsyncSensor;

/// Async SGP30 with the air quality algorithm running. See
/// [`super::SGP30`] for the operations; each one awaits the settling delay
/// instead of blocking.
///
/// A command future must be driven to completion: dropping it after the write
/// leaves the sensor processing a command nobody will read.
#[derive(Debug)]
pub struct SGP30<I2C, D> {
    sensor: AsyncSensor<I2C, D>,
    serial: u64,
    feature_set: u16,
}

impl<I2C, D> SGP30<I2C, D> {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn feature_set(&self) -> u16 {
        self.feature_set
    }

    pub fn address(&self) -> u8 {
        self.sensor.addr()
    }

    pub fn release(self) -> (I2C, D) {
        self.sensor.release()
    }
}

impl<I2C: I2c, D: DelayNs> SGP30<I2C, D> {
    pub async fn new(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Self::with_config(i2c, delay, Config::default()).await
    }

    pub async fn with_config(
        i2c: I2C,
        delay: D,
        config: Config,
    ) -> Result<Self, Error<I2C::Error>> {
        config.validate::<I2C::Error>()?;
        let mut sensor = AsyncSensor::new(i2c, delay, config.address);

        let serial = serial_from_words(sensor.transact(&commands::GET_SERIAL_ID, &[]).await?);
        let [feature_set] = sensor.transact(&commands::GET_FEATURE_SET, &[]).await?;
        check_feature_set::<I2C::Error>(&config, feature_set)?;

        sensor.transact(&commands::IAQ_INIT, &[]).await?;
        debug!("sgp30 {:#x} ready, feature set {:#x}", serial, feature_set);

        Ok(Self {
            sensor,
            serial,
            feature_set,
        })
    }

    pub async fn iaq_init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.transact(&commands::IAQ_INIT, &[]).await?;
        Ok(())
    }

    pub async fn measure_air_quality(&mut self) -> Result<AirQuality, Error<I2C::Error>> {
        let [co2eq_ppm, tvoc_ppb] = self.sensor.transact(&commands::MEASURE_IAQ, &[]).await?;
        Ok(AirQuality {
            co2eq_ppm,
            tvoc_ppb,
        })
    }

    pub async fn measure_raw_signals(&mut self) -> Result<RawSignals, Error<I2C::Error>> {
        let [h2, ethanol] = self
            .sensor
            .transact(&commands::MEASURE_RAW_SIGNALS, &[])
            .await?;
        Ok(RawSignals { h2, ethanol })
    }

    pub async fn get_baseline(&mut self) -> Result<(u16, u16), Error<I2C::Error>> {
        let [co2eq, tvoc] = self
            .sensor
            .transact(&commands::GET_IAQ_BASELINE, &[])
            .await?;
        Ok((co2eq, tvoc))
    }

    pub async fn set_baseline(&mut self, co2eq: u16, tvoc: u16) -> Result<(), Error<I2C::Error>> {
        let args = baseline_args::<I2C::Error>(co2eq, tvoc)?;
        self.sensor
            .transact(&commands::SET_IAQ_BASELINE, &args)
            .await?;
        Ok(())
    }

    pub async fn set_humidity(
        &mut self,
        grams_per_cubic_meter: f32,
    ) -> Result<(), Error<I2C::Error>> {
        let arg = humidity_arg::<I2C::Error>(grams_per_cubic_meter)?;
        self.sensor
            .transact(&commands::SET_ABSOLUTE_HUMIDITY, &[arg])
            .await?;
        Ok(())
    }

    pub async fn set_relative_humidity(
        &mut self,
        temp_celsius: f32,
        relative_humidity_percent: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.set_humidity(humidity::absolute_humidity(
            temp_celsius,
            relative_humidity_percent,
        ))
        .await
    }

    pub async fn self_test(&mut self) -> Result<bool, Error<I2C::Error>> {
        let test = self.sensor.transact(&commands::MEASURE_TEST, &[]).await;
        let reinit = self.iaq_init().await;

        let [result] = test?;
        reinit?;

        Ok(result == SELF_TEST_PASSED)
    }
}
