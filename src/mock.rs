//! In-memory PCA9685 for tests: a register file plus an ordered log of
//! everything the driver did to it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::transport::{Delay, I2cTransport};

/// Power-on value of `mode1`: sleeping, all-call enabled.
pub const MODE1_POWER_ON: u8 = 0x11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write { address: u8, bytes: Vec<u8> },
    Read { address: u8, register: u8, len: usize },
    Delay(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub usize);

struct State {
    registers: [u8; 256],
    log: Vec<Event>,
    transactions: usize,
    fail_at: Option<usize>,
    short_reads: bool,
}

#[derive(Clone)]
pub struct MockBus {
    state: Rc<RefCell<State>>,
}

pub struct MockDelay {
    state: Rc<RefCell<State>>,
}

impl MockBus {
    pub fn new() -> MockBus {
        let mut registers = [0u8; 256];
        registers[0] = MODE1_POWER_ON;
        MockBus {
            state: Rc::new(RefCell::new(State {
                registers,
                log: Vec::new(),
                transactions: 0,
                fail_at: None,
                short_reads: false,
            })),
        }
    }

    /// A delay that records into this bus's log.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            state: self.state.clone(),
        }
    }

    /// Makes the `n`-th transaction (0-based) fail. Failed transactions are
    /// not logged and leave the registers alone.
    pub fn fail_at(&self, n: usize) {
        self.state.borrow_mut().fail_at = Some(n);
    }

    pub fn return_empty_reads(&self) {
        self.state.borrow_mut().short_reads = true;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.borrow().registers[register as usize]
    }

    pub fn set_register(&self, register: u8, value: u8) {
        self.state.borrow_mut().registers[register as usize] = value;
    }

    pub fn log(&self) -> Vec<Event> {
        self.state.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log()
            .into_iter()
            .filter_map(|event| match event {
                Event::Write { bytes, .. } => Some(bytes),
                _ => None,
            })
            .collect()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.log()
            .into_iter()
            .filter_map(|event| match event {
                Event::Delay(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    fn begin(&self) -> Result<(), MockError> {
        let mut state = self.state.borrow_mut();
        let n = state.transactions;
        state.transactions += 1;
        if state.fail_at == Some(n) {
            Err(MockError(n))
        } else {
            Ok(())
        }
    }
}

impl I2cTransport for MockBus {
    type Error = MockError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), MockError> {
        self.begin()?;
        let mut state = self.state.borrow_mut();
        if let Some((register, data)) = bytes.split_first() {
            for (i, value) in data.iter().enumerate() {
                state.registers[register.wrapping_add(i as u8) as usize] = *value;
            }
        }
        state.log.push(Event::Write {
            address,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn write_then_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, MockError> {
        self.begin()?;
        let mut state = self.state.borrow_mut();
        let register = bytes.first().copied().unwrap_or(0);
        state.log.push(Event::Read {
            address,
            register,
            len: read_len,
        });
        if state.short_reads {
            return Ok(Vec::new());
        }
        Ok((0..read_len)
            .map(|i| state.registers[register.wrapping_add(i as u8) as usize])
            .collect())
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.state.borrow_mut().log.push(Event::Delay(ms));
    }
}
