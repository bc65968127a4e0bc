use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};

use embedded_hal::i2c::{Error, ErrorType, Operation};

use crate::sensirion::{WORD_LEN, crc, encode_word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    InvalidTest,
    Nack,
}

impl Error for DummyError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match &self {
            DummyError::InvalidTest => embedded_hal::i2c::ErrorKind::Other,
            DummyError::Nack => embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ),
        }
    }
}

/// Replies to every read with the same canned bytes.
pub struct DummyBus<'a> {
    pub response: &'a [u8],
}

impl DummyBus<'_> {
    fn run(&mut self, operations: &mut [Operation<'_>]) -> Result<(), DummyError> {
        match operations {
            [Operation::Write(_), Operation::Read(response)] | [Operation::Read(response)] => {
                if response.len() != self.response.len() {
                    return Err(DummyError::InvalidTest);
                }

                response.copy_from_slice(self.response);

                Ok(())
            }
            [Operation::Write(_)] => Ok(()),
            // Other transactions are invalid
            _ => Err(DummyError::InvalidTest),
        }
    }
}

impl ErrorType for DummyBus<'_> {
    type Error = DummyError;
}

impl embedded_hal::i2c::I2c for DummyBus<'_> {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

impl embedded_hal_async::i2c::I2c for DummyBus<'_> {
    async fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

/// Adds up every delay requested instead of sleeping.
#[derive(Debug, Default)]
pub struct FakeDelay {
    total_ns: u64,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// An SGP30 that answers the real command set from in-memory state.
///
/// Set baseline arrives as (TVOC, CO2eq) on the wire and get baseline answers
/// (CO2eq, TVOC), as on the real part.
#[derive(Debug, Clone)]
pub struct FakeSgp30 {
    pub address: u8,
    pub serial: [u16; 3],
    pub feature_set: u16,
    pub air_quality: [u16; 2],
    pub raw_signals: [u16; 2],
    pub self_test: u16,
    /// Stored as (CO2eq, TVOC).
    pub baseline: [u16; 2],
    pub humidity: Option<u16>,
    pub iaq_inits: usize,
    /// Flips a bit in the CRC of this reply word of the next read.
    pub corrupt_word: Option<usize>,
    /// Fails the next read with a NACK.
    pub nack_next_read: bool,
    pub writes: Vec<Vec<u8>>,
    /// Reply bytes for the next read, set by the last command written.
    pub pending: Option<Vec<u8>>,
}

impl Default for FakeSgp30 {
    fn default() -> Self {
        Self {
            address: 0x58,
            serial: [0x0000, 0x0123, 0x4567],
            feature_set: 0x0022,
            air_quality: [400, 0],
            raw_signals: [13_600, 18_200],
            self_test: 0xd400,
            baseline: [0, 0],
            humidity: None,
            iaq_inits: 0,
            corrupt_word: None,
            nack_next_read: false,
            writes: Vec::new(),
            pending: None,
        }
    }
}

impl FakeSgp30 {
    pub fn with_feature_set(feature_set: u16) -> Self {
        Self {
            feature_set,
            ..Self::default()
        }
    }

    fn args(payload: &[u8]) -> Result<Vec<u16>, DummyError> {
        if payload.len() % WORD_LEN != 0 {
            return Err(DummyError::InvalidTest);
        }

        payload
            .chunks_exact(WORD_LEN)
            .map(|piece| {
                if crc(&piece[..2]) == piece[2] {
                    Ok(u16::from_be_bytes([piece[0], piece[1]]))
                } else {
                    Err(DummyError::InvalidTest)
                }
            })
            .collect()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DummyError> {
        self.writes.push(bytes.to_vec());
        self.pending = None;

        let (opcode, payload) = bytes.split_at_checked(2).ok_or(DummyError::InvalidTest)?;
        let args = Self::args(payload)?;

        let reply = match (opcode, args.as_slice()) {
            ([0x36, 0x82], []) => self.serial.to_vec(),
            ([0x20, 0x2f], []) => vec![self.feature_set],
            ([0x20, 0x08], []) => self.air_quality.to_vec(),
            ([0x20, 0x50], []) => self.raw_signals.to_vec(),
            ([0x20, 0x32], []) => vec![self.self_test],
            ([0x20, 0x15], []) => self.baseline.to_vec(),
            ([0x20, 0x03], []) => {
                self.iaq_inits += 1;
                return Ok(());
            }
            ([0x20, 0x1e], [tvoc, co2eq]) => {
                self.baseline = [*co2eq, *tvoc];
                return Ok(());
            }
            ([0x20, 0x61], [humidity]) => {
                self.humidity = Some(*humidity);
                return Ok(());
            }
            _ => return Err(DummyError::InvalidTest),
        };

        self.pending = Some(reply.into_iter().flat_map(encode_word).collect());

        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), DummyError> {
        if self.nack_next_read {
            self.nack_next_read = false;
            return Err(DummyError::Nack);
        }

        let mut reply = self.pending.take().ok_or(DummyError::InvalidTest)?;
        if reply.len() != buffer.len() {
            return Err(DummyError::InvalidTest);
        }

        if let Some(word) = self.corrupt_word.take() {
            reply[word * WORD_LEN + 2] ^= 0x01;
        }

        buffer.copy_from_slice(&reply);

        Ok(())
    }

    fn run(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), DummyError> {
        if address != self.address {
            return Err(DummyError::Nack);
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.write(bytes)?,
                Operation::Read(buffer) => self.read(buffer)?,
            }
        }

        Ok(())
    }
}

impl ErrorType for FakeSgp30 {
    type Error = DummyError;
}

impl embedded_hal::i2c::I2c for FakeSgp30 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for FakeSgp30 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

/// Polls `future` to completion. Only suitable for futures that never pend,
/// which holds for everything built on the fakes above.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());

    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}
