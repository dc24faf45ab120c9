//! End-to-end transactions through the public hooks only.

use modbus_core::modbus_proto::crc;
use modbus_core::{
    BusState, Exchange, ExceptionCode, FunctionCode, Port, RtuSlave, SharedSlave, SlaveConfig,
    Timing,
};

const ADDRESS: u8 = 0x11;

#[derive(Default)]
struct Uart {
    tx_ready: bool,
}

impl Port for Uart {
    fn enable_tx_ready(&mut self) {
        self.tx_ready = true;
    }

    fn disable_tx_ready(&mut self) {
        self.tx_ready = false;
    }
}

/// Line model: feeds frames and collects responses like the UART interrupts.
struct Bus<const N: usize> {
    slave: RtuSlave<Uart, N>,
    timing: Timing,
}

impl<const N: usize> Bus<N> {
    fn new(baud: u32) -> Self {
        let timing = Timing::from_baud(baud, 100);
        Self {
            slave: RtuSlave::new(SlaveConfig::single(ADDRESS, timing), Uart::default()),
            timing,
        }
    }

    fn idle(&mut self, ticks: u16) {
        for _ in 0..ticks {
            self.slave.on_tick();
        }
    }

    fn request(&mut self, payload: &[u8]) {
        let mut frame = [0u8; 300];
        frame[..payload.len()].copy_from_slice(payload);
        crc::generate(&mut frame, payload.len() - 1).unwrap();
        self.raw(&frame[..payload.len() + 2]);
    }

    fn raw(&mut self, frame: &[u8]) {
        self.idle(self.timing.frame_delay_start);
        for &byte in frame {
            self.slave.on_byte_received(byte);
        }
        self.idle(self.timing.frame_delay_end);
    }

    fn response(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        while self.slave.port().tx_ready {
            out.extend(self.slave.on_tx_ready());
        }
        self.slave.on_transmit_complete();
        out
    }
}

fn framed(payload: &[u8]) -> Vec<u8> {
    let mut frame = payload.to_vec();
    frame.extend_from_slice(&crc::calculate_crc16(payload).to_le_bytes());
    frame
}

/// Foreground loop body of a small device with all four tables.
struct Device {
    coils: [u8; 2],
    discrete: [u8; 1],
    holding: [u16; 8],
    input: [u16; 4],
}

impl Device {
    fn new() -> Self {
        Self {
            coils: [0; 2],
            discrete: [0b1010_0101],
            holding: [0; 8],
            input: [100, 200, 300, 400],
        }
    }

    fn serve<const N: usize>(&mut self, slave: &mut RtuSlave<Uart, N>) -> Exchange {
        let Some(request) = slave.request() else {
            return Exchange::NotHandled;
        };
        let outcome = match request.function_code() {
            Some(FunctionCode::ReadInputStatus) => slave.exchange_bits(&mut self.discrete, 0, 8),
            Some(FunctionCode::ReadInputRegisters) => slave.exchange_registers(&mut self.input, 0),
            Some(code) if code.is_bit_access() => slave.exchange_bits(&mut self.coils, 0, 12),
            Some(code) if code.is_register_access() => {
                slave.exchange_registers(&mut self.holding, 0x10)
            }
            _ => slave
                .send_exception(ExceptionCode::IllegalFunction)
                .map(|()| Exchange::Exception(ExceptionCode::IllegalFunction)),
        };
        outcome.unwrap()
    }
}

#[test]
fn read_holding_registers_reference_exchange() {
    let mut bus = Bus::<256>::new(9600);
    bus.raw(&[0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87]);
    assert_eq!(bus.slave.bus_state(), BusState::ReceiveCompleted);

    let mut table = [0x0102, 0x0304, 0x0506];
    assert_eq!(
        bus.slave.exchange_registers(&mut table, 0x6B),
        Ok(Exchange::Response)
    );
    assert_eq!(
        bus.response(),
        framed(&[0x11, 0x03, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06])
    );
    assert_eq!(bus.slave.bus_state(), BusState::Idle);
}

#[test]
fn device_session() {
    let mut bus = Bus::<64>::new(19_200);
    let mut device = Device::new();

    // Write four holding registers, read two back.
    bus.request(&[
        ADDRESS, 0x10, 0x00, 0x10, 0x00, 0x04, 0x08, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00,
        0x04,
    ]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(
        bus.response(),
        framed(&[ADDRESS, 0x10, 0x00, 0x10, 0x00, 0x04])
    );
    assert_eq!(&device.holding[..5], &[1, 2, 3, 4, 0]);

    bus.request(&[ADDRESS, 0x03, 0x00, 0x12, 0x00, 0x02]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(
        bus.response(),
        framed(&[ADDRESS, 0x03, 0x04, 0x00, 0x03, 0x00, 0x04])
    );

    // Input registers and discrete inputs come from their own tables.
    bus.request(&[ADDRESS, 0x04, 0x00, 0x02, 0x00, 0x02]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(
        bus.response(),
        framed(&[ADDRESS, 0x04, 0x04, 0x01, 0x2C, 0x01, 0x90])
    );

    bus.request(&[ADDRESS, 0x02, 0x00, 0x01, 0x00, 0x06]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(bus.response(), framed(&[ADDRESS, 0x02, 0x01, 0b01_0010]));

    // Ten coils, then read back across the byte boundary.
    bus.request(&[ADDRESS, 0x0F, 0x00, 0x01, 0x00, 0x0A, 0x02, 0xFF, 0x02]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(
        bus.response(),
        framed(&[ADDRESS, 0x0F, 0x00, 0x01, 0x00, 0x0A])
    );
    assert_eq!(device.coils, [0xFE, 0x05]);

    bus.request(&[ADDRESS, 0x01, 0x00, 0x00, 0x00, 0x0C]);
    assert_eq!(device.serve(&mut bus.slave), Exchange::Response);
    assert_eq!(bus.response(), framed(&[ADDRESS, 0x01, 0x02, 0xFE, 0x05]));

    // Unknown function code.
    bus.request(&[ADDRESS, 0x2B, 0x0E, 0x01, 0x00]);
    assert_eq!(
        device.serve(&mut bus.slave),
        Exchange::Exception(ExceptionCode::IllegalFunction)
    );
    assert_eq!(bus.response(), framed(&[ADDRESS, 0xAB, 0x01]));

    let stats = bus.slave.stats();
    assert_eq!(stats.accepted, 7);
    assert_eq!(stats.responses, 6);
    assert_eq!(stats.exceptions, 1);
    assert_eq!(stats.rejected(), 0);
}

#[test]
fn rejected_frames_never_complete() {
    let mut bus = Bus::<64>::new(19_200);

    let mut corrupted = framed(&[ADDRESS, 0x03, 0x00, 0x00, 0x00, 0x01]);
    corrupted[3] ^= 0x40;
    bus.raw(&corrupted);
    assert_eq!(bus.slave.bus_state(), BusState::Idle);

    bus.request(&[0x05, 0x03, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(bus.slave.bus_state(), BusState::Idle);

    // Broadcast address is another address in single mode.
    bus.request(&[0x00, 0x06, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(bus.slave.bus_state(), BusState::Idle);

    let stats = bus.slave.stats();
    assert_eq!(stats.crc_errors, 1);
    assert_eq!(stats.address_mismatches, 2);
    assert_eq!(stats.accepted, 0);

    // The line recovers for the next good frame.
    bus.request(&[ADDRESS, 0x03, 0x00, 0x00, 0x00, 0x01]);
    assert!(bus.slave.is_receive_completed());
}

#[test]
fn oversized_frame_is_dropped_and_line_recovers() {
    let mut bus = Bus::<8>::new(115_200);

    bus.request(&[ADDRESS, 0x10, 0x00, 0x00, 0x00, 0x01, 0x02, 0x12, 0x34]);
    assert!(!bus.slave.is_receive_completed());
    assert!(bus.slave.request().is_none());
    assert_eq!(bus.slave.stats().overflows, 1);

    bus.request(&[ADDRESS, 0x06, 0x00, 0x00, 0x12, 0x34]);
    let mut table = [0u16; 1];
    assert_eq!(
        bus.slave.exchange_registers(&mut table, 0),
        Ok(Exchange::Response)
    );
    assert_eq!(table, [0x1234]);
    assert_eq!(bus.response().len(), 8);
}

#[test]
fn application_defined_response() {
    let mut bus = Bus::<64>::new(19_200);
    // User-defined function code answered with a device tag.
    bus.request(&[ADDRESS, 0x41]);

    let mut table = [0u16; 4];
    assert_eq!(
        bus.slave.exchange_registers(&mut table, 0),
        Ok(Exchange::NotHandled)
    );

    let id = b"MB";
    let frame = bus.slave.frame_mut().unwrap();
    frame.resize(3 + id.len() + 1).unwrap();
    frame.set(2, id.len() as u8 + 1).unwrap();
    for (i, &b) in id.iter().enumerate() {
        frame.set(3 + i, b).unwrap();
    }
    frame.set(3 + id.len(), 0xFF).unwrap();
    bus.slave.send_message(3 + id.len()).unwrap();

    assert_eq!(
        bus.response(),
        framed(&[ADDRESS, 0x41, 0x03, b'M', b'B', 0xFF])
    );
}

#[test]
fn interrupt_shared_slave() {
    let shared: SharedSlave<Uart, 32> = SharedSlave::new(RtuSlave::new(
        SlaveConfig::promiscuous(Timing::from_baud(115_200, 100)),
        Uart::default(),
    ));

    let frame = framed(&[0x2A, 0x05, 0x00, 0x03, 0xFF, 0x00]);
    for _ in 0..16 {
        shared.on_tick();
    }
    for byte in &frame {
        shared.on_byte_received(*byte);
    }
    for _ in 0..18 {
        shared.on_tick();
    }
    assert!(shared.is_receive_completed());

    let mut coils = [0u8; 1];
    let outcome = shared.lock(|s| {
        assert_eq!(s.requested_slave(), Some(0x2A));
        s.exchange_bits(&mut coils, 0, 8)
    });
    assert_eq!(outcome, Ok(Exchange::Response));
    assert_eq!(coils, [0x08]);

    let mut echoed = Vec::new();
    while let Some(byte) = shared.on_tx_ready() {
        echoed.push(byte);
    }
    shared.on_transmit_complete();
    assert_eq!(echoed, frame);
    assert_eq!(shared.bus_state(), BusState::Idle);
}
