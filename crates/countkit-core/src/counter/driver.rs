use std::future::Future;
use std::pin::Pin;

use rand::Rng;

use super::animator::{CountState, CounterAnimator, PollOutcome};
use super::source::DataSource;
use crate::config::CounterConfig;
use crate::error::FetchError;
use crate::events::Event;
use crate::scheduler::RecurringTimer;
use crate::surface::Surface;

type Fetch<'a> = Pin<Box<dyn Future<Output = Result<f64, FetchError>> + Send + 'a>>;

async fn settle(slot: &mut Option<Fetch<'_>>) -> Result<f64, FetchError> {
    match slot.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

/// Drive a counter widget.
///
/// Polls `source` immediately and then every `poll_interval`; after each
/// poll the step timer is re-armed so the remaining gap animates within
/// the animation budget. A fetch in flight does not block animation steps.
///
/// Returns the final state once the widget is quiescent: polling halted
/// after repeated failures and no animation left to run. A healthy counter
/// polls forever.
pub async fn run_counter<D, S, R>(
    config: &CounterConfig,
    animator: &mut CounterAnimator<R>,
    source: &D,
    surface: &mut S,
) -> CountState
where
    D: DataSource,
    S: Surface + ?Sized,
    R: Rng,
{
    let mut poll_timer = RecurringTimer::new("counter-poll");
    let mut step_timer = RecurringTimer::new("counter-step");
    let mut in_flight: Option<Fetch<'_>> = None;
    let mut revealed = false;

    poll_timer.arm_immediate(config.poll_interval());

    while poll_timer.is_armed() || step_timer.is_armed() || in_flight.is_some() {
        tokio::select! {
            biased;

            result = settle(&mut in_flight) => {
                in_flight = None;
                let events = animator.on_poll(PollOutcome::from(result));
                show(&events, surface, &mut revealed);

                match animator.animation_period() {
                    Some(period) => {
                        step_timer.arm(period);
                    }
                    None => {
                        step_timer.cancel();
                    }
                }
                if animator.polling_halted() {
                    poll_timer.cancel();
                }
            }

            _ = poll_timer.tick() => {
                if animator.polling_halted() {
                    poll_timer.cancel();
                } else if in_flight.is_none() {
                    in_flight = Some(Box::pin(source.fetch_value(&config.endpoint, &config.property)));
                } else {
                    tracing::debug!(endpoint = %config.endpoint, "previous poll still in flight; skipping");
                }
            }

            _ = step_timer.tick() => {
                if let Some(event) = animator.step() {
                    show(std::slice::from_ref(&event), surface, &mut revealed);
                }
                if animator.state().is_settled() {
                    step_timer.cancel();
                }
            }
        }
    }

    tracing::info!(endpoint = %config.endpoint, value = animator.state().current, "counter quiescent");
    animator.state()
}

fn show<S: Surface + ?Sized>(events: &[Event], surface: &mut S, revealed: &mut bool) {
    for event in events {
        if let Event::CounterChanged { current, .. } = event {
            surface.render(&crate::format::group_thousands(*current));
            if !*revealed {
                surface.reveal();
                *revealed = true;
            }
        }
    }
}
