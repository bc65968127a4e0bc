//! Sensirion word protocol: every data word travels as two big-endian bytes
//! followed by a CRC-8 over those two bytes.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use thiserror::Error;

pub mod asynch;

pub type Cmd = [u8; 2];

/// Bytes per word on the wire: two data bytes plus the CRC.
pub const WORD_LEN: usize = 3;

/// Most argument words any command takes.
pub const MAX_ARGS: usize = 2;

/// Most reply words any command returns.
pub const MAX_REPLY_WORDS: usize = 3;

const MAX_REQUEST_LEN: usize = 2 + MAX_ARGS * WORD_LEN;
const MAX_REPLY_LEN: usize = MAX_REPLY_WORDS * WORD_LEN;

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cError> {
    #[error("device not recognized (feature set {0:#06x})")]
    DeviceNotRecognized(u16),
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    I2c(#[from] I2cError),
}

impl<E> embedded_hal::i2c::Error for Error<E>
where
    E: embedded_hal::i2c::Error,
{
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::I2c(err) => err.kind(),
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// A command the sensor understands, replying with `N` words once `delay_ms`
/// has elapsed after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command<const N: usize> {
    pub opcode: Cmd,
    pub delay_ms: u32,
}

impl<const N: usize> Command<N> {
    pub const fn new(opcode: Cmd, delay_ms: u32) -> Self {
        Self { opcode, delay_ms }
    }

    pub const fn reply_words(&self) -> usize {
        N
    }

    fn id(&self) -> u16 {
        u16::from_be_bytes(self.opcode)
    }
}

// https://sensirion.com/media/documents/984E0DD5/61644B8B/Sensirion_Gas_Sensors_Datasheet_SGP30.pdf
// Section 6.6
pub fn crc(data: &[u8]) -> u8 {
    let mut crc = 0xff;

    for byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// `data` is one word as received: two data bytes and the CRC.
fn check_crc<E>(data: &[u8]) -> Result<(), Error<E>> {
    if crc(&data[..2]) != data[2] {
        Err(Error::ChecksumMismatch)
    } else {
        Ok(())
    }
}

/// Serializes a word as `[high, low, crc]`.
pub fn encode_word(word: u16) -> [u8; WORD_LEN] {
    let [hi, lo] = word.to_be_bytes();
    [hi, lo, crc(&[hi, lo])]
}

fn encode_request<E>(cmd: &Cmd, args: &[u16]) -> Result<([u8; MAX_REQUEST_LEN], usize), Error<E>> {
    if args.len() > MAX_ARGS {
        return Err(Error::InvalidArgument("too many command arguments"));
    }

    let mut request = [0u8; MAX_REQUEST_LEN];
    request[..2].copy_from_slice(cmd);

    let mut len = 2;
    for arg in args {
        request[len..len + WORD_LEN].copy_from_slice(&encode_word(*arg));
        len += WORD_LEN;
    }

    Ok((request, len))
}

/// Verifies and decodes `N` words. Nothing is returned unless every CRC matches.
fn decode_reply<E, const N: usize>(raw: &[u8]) -> Result<[u16; N], Error<E>> {
    let mut words = [0u16; N];

    for (word, piece) in words.iter_mut().zip(raw.chunks_exact(WORD_LEN)) {
        check_crc::<E>(piece)?;
        *word = u16::from_be_bytes([piece[0], piece[1]]);
    }

    Ok(words)
}

/// One sensor on the bus. Owns the bus and the delay for the lifetime of the
/// session, so a `&mut` borrow covers a whole write, wait and read cycle.
#[derive(Debug)]
pub struct Sensor<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C, D> Sensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    pub fn addr(&self) -> u8 {
        self.addr
    }

    /// Gives back the bus and the delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }
}

impl<I2C: I2c, D: DelayNs> Sensor<I2C, D> {
    /// Writes `cmd` followed by `args`, waits out the command's delay and reads
    /// back `N` CRC-checked words. Write-only commands (`N == 0`) skip the read.
    pub fn transact<const N: usize>(
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

        self.i2c.write(self.addr, &request[..len])?;
        self.delay.delay_ms(cmd.delay_ms);

        if N == 0 {
            return Ok([0; N]);
        }

        let mut raw = [0u8; MAX_REPLY_LEN];
        let raw = &mut raw[..N * WORD_LEN];
        self.i2c.read(self.addr, raw)?;

        decode_reply(raw)
    }
}
