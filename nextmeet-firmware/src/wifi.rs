//! CYW43 bring-up and WiFi join
//!
//! Pico W wiring: power on GPIO 23, chip select on GPIO 25, gSPI clock on
//! GPIO 29 and data on GPIO 24, driven from PIO0.

use cyw43::{Control, JoinOptions};
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::Peri;
use embassy_time::{with_timeout, Duration, Timer};
use nextmeet_core::config::NetworkSettings;
use nextmeet_core::error::FetchError;
use static_cell::StaticCell;

use crate::tasks::{net_task, wifi_task};
use crate::Irqs;

/// Join attempts before giving up until the next reconnect
const JOIN_ATTEMPTS: u8 = 5;

/// How long to wait for a DHCP lease after joining
pub const DHCP_TIMEOUT: Duration = Duration::from_secs(20);

/// Sockets: one TCP connection plus DNS and DHCP
const SOCKETS: usize = 4;

/// Radio pins and peripherals
pub struct WifiResources {
    pub pwr: Peri<'static, PIN_23>,
    pub cs: Peri<'static, PIN_25>,
    pub dio: Peri<'static, PIN_24>,
    pub clk: Peri<'static, PIN_29>,
    pub pio: Peri<'static, PIO0>,
    pub dma: Peri<'static, DMA_CH0>,
}

/// Power up the radio, start the network stack and join the network
///
/// Returns even if joining failed; fetches then report the link as down
/// and the next reconnect tries again.
pub async fn start(
    spawner: Spawner,
    res: WifiResources,
    network: &NetworkSettings,
) -> (Stack<'static>, Control<'static>) {
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(res.pwr, Level::Low);
    let cs = Output::new(res.cs, Level::High);
    let mut pio = Pio::new(res.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        res.dio,
        res.clk,
        res.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(unwrap!(wifi_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(Default::default());
    let seed = 0x5e4d_3c2b_1a09_f8e7;

    static RESOURCES: StaticCell<StackResources<SOCKETS>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<SOCKETS>::new()),
        seed,
    );
    spawner.spawn(unwrap!(net_task(runner)));

    match join(&mut control, stack, network).await {
        Ok(()) => {
            if let Some(config) = stack.config_v4() {
                info!("IP address: {}", config.address);
            }
        }
        Err(e) => warn!("WiFi not up yet: {}", e),
    }

    (stack, control)
}

/// Join the configured network and wait for an address
pub async fn join(
    control: &mut Control<'static>,
    stack: Stack<'static>,
    network: &NetworkSettings,
) -> Result<(), FetchError> {
    info!("Joining WiFi network {}", network.ssid.as_str());
    let mut joined = false;
    for attempt in 1..=JOIN_ATTEMPTS {
        match control.join(network.ssid.as_str(), join_options(network)).await {
            Ok(()) => {
                joined = true;
                break;
            }
            Err(err) => {
                warn!("Join attempt {} failed: status {}", attempt, err.status);
                Timer::after_secs(1).await;
            }
        }
    }
    if !joined {
        return Err(FetchError::LinkDown);
    }

    info!("WiFi joined, waiting for DHCP...");
    with_timeout(DHCP_TIMEOUT, stack.wait_config_up())
        .await
        .map_err(|_| FetchError::LinkDown)
}

/// An empty password joins an open network
fn join_options(network: &NetworkSettings) -> JoinOptions<'_> {
    if network.password.is_empty() {
        JoinOptions::new_open()
    } else {
        JoinOptions::new(network.password.as_bytes())
    }
}
