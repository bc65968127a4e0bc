use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::{Command, Error, MAX_REPLY_LEN, MAX_REPLY_WORDS, WORD_LEN, decode_reply, encode_request};

/// Async counterpart of [`Sensor`](super::Sensor).
///
/// Dropping a `transact` future between the write and the read leaves the
/// sensor mid-command; the next command may be answered with garbage.
#[derive(Debug)]
pub struct AsyncSensor<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C, D> AsyncSensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    pub fn addr(&self) -> u8 {
        self.addr
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }
}

impl<I2C: I2c, D: DelayNs> AsyncSensor<I2C, D> {
    pub async fn transact<const N: usize>(
        &mut self,
        cmd: &Command<N>,
        args: &[u16],
    ) -> Result<[u16; N], Error<I2C::Error>> {
        const { assert!(N <= MAX_REPLY_WORDS) };

        let (request, len) = encode_request::<I2C::Error>(&cmd.opcode, args)?;
        trace!(
            "command {:#x}, {} argument words, {} reply words",
            cmd.id(),
            args.len(),
            cmd.reply_words()
        );

        self.i2c.write(self.addr, &request[..len]).await?;
        self.delay.delay_ms(cmd.delay_ms).await;

        if N == 0 {
            return Ok([0; N]);
        }

        let mut raw = [0u8; MAX_REPLY_LEN];
        let raw = &mut raw[..N * WORD_LEN];
        self.i2c.read(self.addr, raw).await?;

        decode_reply(raw)
    }
}
