//! Link to the joystick node
//!
//! Messages from the joystick node reach this board through a CAN-to-UART gateway on UART0,
//! postcard-encoded with COBS framing. The receive half collects bytes up to each delimiter and
//! dispatches the decoded message; the transmit half drains the outbound queue.
//!
//! # Inbound
//! - Joystick state (id 0x000): published to the paddle task, Y axis forwarded to the servo
//! - Game over (id 0x001, `0xFF`): the joystick node ended the game
//!
//! # Outbound
//! - Game over when the goal beam is broken

use defmt::{info, warn};
use embassy_futures::join::join;
use embassy_rp::uart::{self, Async, Uart, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use paddle_control::link::{encode, MessageDecoder, MAX_ENCODED_LEN};
use paddle_control::{servo, Message};

use crate::system::config::LINK_BAUD_RATE;
use crate::system::event::{self, Events};
use crate::system::resources::{Irqs, LinkResources};
use crate::system::session;
use crate::task::servo::set_position;

/// Messages waiting to be written to the gateway
static OUTBOUND: Channel<CriticalSectionRawMutex, Message, 4> = Channel::new();

/// Queues a message for transmission
pub async fn send(message: Message) {
    OUTBOUND.send(message).await;
}

#[embassy_executor::task]
pub async fn link(r: LinkResources) {
    let mut config = uart::Config::default();
    config.baudrate = LINK_BAUD_RATE;

    let uart = Uart::new(r.uart, r.tx_pin, r.rx_pin, Irqs, r.tx_dma, r.rx_dma, config);
    let (mut tx, mut rx) = uart.split();

    info!("Link up at {} baud", LINK_BAUD_RATE);
    join(receive(&mut rx), transmit(&mut tx)).await;
}

async fn receive(rx: &mut UartRx<'static, Async>) {
    let mut decoder = MessageDecoder::new();
    let mut buf = [0u8; 1];

    loop {
        if let Err(e) = rx.read(&mut buf).await {
            warn!("Link read error: {}", e);
            decoder.reset();
            continue;
        }

        match decoder.push_byte(buf[0]) {
            Ok(Some(message)) => dispatch(message).await,
            Ok(None) => {}
            Err(e) => warn!("Link dropped message: {}", e),
        }
    }
}

async fn dispatch(message: Message) {
    match message {
        Message::Joystick(joystick) => {
            session::publish_joystick(joystick);
            set_position(servo::position_from_joystick(joystick.y));
        }
        Message::GameOver => {
            info!("Game over received from joystick node");
            event::send(Events::GameOverReceived).await;
        }
    }
}

async fn transmit(tx: &mut UartTx<'static, Async>) {
    let mut buf = [0u8; MAX_ENCODED_LEN];

    loop {
        let message = OUTBOUND.receive().await;
        let bytes = match encode(&message, &mut buf) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Link cannot encode {}: {}", message, e);
                continue;
            }
        };
        if let Err(e) = tx.write(bytes).await {
            warn!("Link write error: {}", e);
        }
    }
}
