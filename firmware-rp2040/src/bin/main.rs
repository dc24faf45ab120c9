#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx, UartTx};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use heapless::Vec;
use modbus_core::RtuSlave;
use modbus_rp2040::{
    slave_config, tables, DeviceTables, LinePort, Slave, SignalPort, TxSignal, BAUD_RATE,
    FRAME_SIZE, SERVED_REQUESTS, TICK_US,
};
use portable_atomic::Ordering;
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => embassy_rp::uart::InterruptHandler<UART0>;
});

/// Wakes the transmit task when the engine queues a response.
static TX_SIGNAL: StaticCell<TxSignal> = StaticCell::new();

/// The engine, shared by every task.
static SLAVE: StaticCell<Slave> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Modbus RTU slave starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal: &'static TxSignal = TX_SIGNAL.init(Signal::new());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let uart = Uart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- Line driver ---
    #[cfg(not(feature = "rs232"))]
    let port: LinePort =
        modbus_core::HalfDuplex::new(SignalPort::new(signal), Output::new(p.PIN_2, Level::Low));
    #[cfg(feature = "rs232")]
    let port: LinePort = SignalPort::new(signal);

    let config = slave_config();
    info!(
        "addressing {:?}, timing {:?}",
        config.addressing, config.timing
    );
    let slave: &'static Slave = SLAVE.init(Slave::new(RtuSlave::new(config, port)));

    // On-board LED mirrors coil 0
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(tick_task(slave).unwrap());
    spawner.spawn(rx_task(rx, slave).unwrap());
    spawner.spawn(tx_task(tx, slave, signal).unwrap());
    spawner.spawn(app_task(slave, led).unwrap());

    info!("Modbus RTU slave initialized, {} baud", BAUD_RATE);
}

/// Tick task - advances the engine's frame timer.
#[embassy_executor::task]
async fn tick_task(slave: &'static Slave) {
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(TICK_US)));
    loop {
        ticker.next().await;
        slave.on_tick();
    }
}

/// Receive task - hands every byte from the line to the engine.
#[embassy_executor::task]
async fn rx_task(mut rx: UartRx<'static, Async>, slave: &'static Slave) {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => slave.on_byte_received(byte[0]),
            // The damaged frame fails its CRC; nothing else to do here.
            Err(e) => warn!("UART receive error: {:?}", e),
        }
    }
}

/// Transmit task - drains a queued response and turns the line around.
#[embassy_executor::task]
async fn tx_task(
    mut tx: UartTx<'static, Async>,
    slave: &'static Slave,
    signal: &'static TxSignal,
) {
    let mut frame: Vec<u8, FRAME_SIZE> = Vec::new();
    loop {
        signal.wait().await;

        frame.clear();
        while let Some(byte) = slave.on_tx_ready() {
            if frame.push(byte).is_err() {
                break;
            }
        }
        if frame.is_empty() {
            continue;
        }
        if let Err(e) = tx.write(&frame).await {
            warn!("UART transmit error: {:?}", e);
        }

        // Last stop bit must leave the shift register before the
        // transceiver switches back to receive.
        while tx.busy() {
            yield_now().await;
        }
        slave.on_transmit_complete();
    }
}

/// Application task - serves completed requests and refreshes the tables.
#[embassy_executor::task]
async fn app_task(slave: &'static Slave, mut led: Output<'static>) {
    let mut device = DeviceTables::new();
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(TICK_US)));

    loop {
        ticker.next().await;
        if !slave.is_receive_completed() {
            continue;
        }

        let served = SERVED_REQUESTS.load(Ordering::Relaxed);
        device.set_input_register(
            tables::input::UPTIME_SECS,
            Instant::now().as_secs() as u16,
        );
        device.set_input_register(tables::input::SERVED_LO, served as u16);
        device.set_input_register(tables::input::SERVED_HI, (served >> 16) as u16);

        let result = slave.lock(|s| {
            let rejected = s.stats().rejected();
            device.set_input_register(
                tables::input::REJECTED,
                u16::try_from(rejected).unwrap_or(u16::MAX),
            );
            device.set_discrete_input(tables::FRAME_ERROR_INPUT, rejected > 0);
            device.serve(s)
        });
        if let Err(e) = result {
            warn!("request not served: {:?}", e);
            slave.reset();
        }

        led.set_level(if device.coil(0) { Level::High } else { Level::Low });
    }
}
