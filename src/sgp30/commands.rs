use crate::sensirion::Command;

// Air quality
pub const IAQ_INIT: Command<0> = Command::new([0x20, 0x03], 10);
pub const MEASURE_IAQ: Command<2> = Command::new([0x20, 0x08], 50);
pub const GET_IAQ_BASELINE: Command<2> = Command::new([0x20, 0x15], 10);
pub const SET_IAQ_BASELINE: Command<0> = Command::new([0x20, 0x1e], 10);
pub const SET_ABSOLUTE_HUMIDITY: Command<0> = Command::new([0x20, 0x61], 10);

// Signals and diagnostics
pub const MEASURE_RAW_SIGNALS: Command<2> = Command::new([0x20, 0x50], 25);
pub const MEASURE_TEST: Command<1> = Command::new([0x20, 0x32], 220);

// Identification
pub const GET_FEATURE_SET: Command<1> = Command::new([0x20, 0x2f], 10);
pub const GET_SERIAL_ID: Command<3> = Command::new([0x36, 0x82], 10);
