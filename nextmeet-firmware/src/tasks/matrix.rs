//! Matrix refresh task
//!
//! Lights one row pair per pass and yields in between, so the panel is
//! refreshed whenever nothing else needs the CPU. A new frame is copied in
//! only when the main loop has published one.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use nextmeet_display::PackedFrame;
use nextmeet_drivers::matrix::{COLS, ROWS};
use nextmeet_drivers::Hub75;

use crate::channels::{FRAME, FRAME_READY};

#[embassy_executor::task]
pub async fn matrix_task(mut hub75: Hub75<Output<'static>>) -> ! {
    info!("Matrix refresh task started");

    let mut frame: PackedFrame = [[0; COLS]; ROWS];

    loop {
        if FRAME_READY.try_take().is_some() {
            FRAME.lock(|packed| frame = *packed.borrow());
        }

        // GPIO writes on the RP2040 cannot fail
        let _ = hub75.scan_next(&frame);
        yield_now().await;
    }
}
