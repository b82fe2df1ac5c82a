use std::time::Duration;

use chrono::TimeZone;

use super::engine::CountdownEngine;
use crate::error::CountdownError;
use crate::events::Event;
use crate::scheduler::RecurringTimer;
use crate::surface::Surface;
use crate::time::Clock;

/// Period of the countdown display refresh.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drive a countdown until it ends.
///
/// Starts the engine, reveals the surface and re-renders once per
/// [`TICK_PERIOD`]. Returns when the end message has been rendered, or
/// immediately with an error if the engine cannot start.
pub async fn run_countdown<Z, C, S>(
    engine: &mut CountdownEngine<Z, C>,
    surface: &mut S,
) -> Result<(), CountdownError>
where
    Z: TimeZone,
    C: Clock,
    S: Surface + ?Sized,
{
    engine.start()?;
    surface.reveal();

    let mut ticker = RecurringTimer::new("countdown");
    ticker.arm(TICK_PERIOD);

    while ticker.is_armed() {
        ticker.tick().await;
        match engine.tick() {
            Some(Event::CountdownTicked { display, .. }) => surface.render(&display),
            Some(Event::CountdownEnded { display, .. }) => {
                surface.render(&display);
                ticker.cancel();
            }
            _ => {
                ticker.cancel();
            }
        }
    }

    Ok(())
}
